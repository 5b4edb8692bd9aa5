use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{info, warn};

use smarthome_common::{
    AnswerAction, AttemptOutcome, AuthGate, AutomationPass, Credential, LightAutomation,
    MenuEffect, MenuEngine, MenuState, NightAnswer, Opcode, PanelConfig, Role, PASS_LEN,
};

use crate::hmi::{Hmi, Led};
use crate::link::CommandLink;

const WELCOME_HOLD_MS: u64 = 1_000;

/// The front panel application: login gate, menu session, and the
/// smart lighting pass, all executed against one command link.
pub struct App<S, H> {
    config: PanelConfig,
    link: CommandLink<S>,
    hmi: H,
    auth: AuthGate,
    menu: MenuEngine,
    automation: LightAutomation,
    role: Role,
}

impl<S, H> App<S, H>
where
    S: AsyncRead + AsyncWrite + Unpin,
    H: Hmi,
{
    pub fn new(config: PanelConfig, link: CommandLink<S>, hmi: H) -> Self {
        let auth = AuthGate::new(
            Credential::new(config.admin_pass),
            Credential::new(config.guest_pass),
            config.tries_allowed,
        );
        Self {
            config,
            link,
            hmi,
            auth,
            menu: MenuEngine::new(),
            automation: LightAutomation::new(),
            role: Role::None,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        self.hmi.show("Welcome to", "Smart Home");
        tokio::time::sleep(Duration::from_millis(WELCOME_HOLD_MS)).await;

        if self.config.provision_on_boot {
            self.provision().await;
        }

        loop {
            self.login_phase().await?;
            self.session().await?;
        }
    }

    /// First-boot credential capture, both roles in turn. No old
    /// password is asked for; the gate starts from whatever is set here.
    async fn provision(&mut self) {
        self.hmi.show("First boot", "set passwords");
        let admin = self.collect_digits("Admin pass:").await;
        self.auth.set_credential(Role::Admin, admin);
        let guest = self.collect_digits("Guest Pass:").await;
        self.auth.set_credential(Role::Guest, guest);
        self.show_message("Passwords set", "").await;
    }

    /// Block until a credential is accepted. A lockout runs its full
    /// audible countdown here before the prompt comes back.
    async fn login_phase(&mut self) -> anyhow::Result<()> {
        loop {
            self.hmi.show("Select mode:", "0:Admin 1:Guest");
            let candidate = loop {
                match self.wait_key().await {
                    '0' => break Role::Admin,
                    '1' => break Role::Guest,
                    _ => {
                        self.hmi.beep();
                        self.show_message("Wrong input", "").await;
                        self.hmi.show("Select mode:", "0:Admin 1:Guest");
                    }
                }
            };

            let prompt = if candidate.is_admin() {
                "Admin pass:"
            } else {
                "Guest pass:"
            };
            let entered = self.collect_digits(prompt).await;

            match self.auth.attempt(candidate, &entered) {
                AttemptOutcome::Accepted => {
                    self.role = candidate;
                    let led = if candidate.is_admin() {
                        Led::Admin
                    } else {
                        Led::Guest
                    };
                    self.hmi.set_led(led, true);
                    // Double click signals the accepted login.
                    self.hmi.beep();
                    self.hmi.beep();
                    self.menu.enter_main();
                    info!(role = candidate.as_str(), "login accepted");
                    return Ok(());
                }
                AttemptOutcome::Rejected { tries_left } => {
                    warn!(tries_left, "login rejected");
                    self.hmi.beep();
                    self.show_message("Wrong password", "").await;
                }
                AttemptOutcome::LockedOut => {
                    warn!("too many failures, locking the panel");
                    self.lockout().await;
                }
            }
        }
    }

    async fn session(&mut self) -> anyhow::Result<()> {
        while self.role != Role::None {
            self.session_step().await?;
        }
        Ok(())
    }

    /// One pass of the session loop: render the current screen, take at
    /// most one key, execute its effects. Sub-menus that stay idle past
    /// the role's budget fall back to Main.
    async fn session_step(&mut self) -> anyhow::Result<()> {
        let screen = self.menu.screen(self.role);
        match self.menu.state() {
            MenuState::Main => return self.main_pass().await,
            MenuState::Room(room) => {
                // Fresh status on entry so the screen reflects the node.
                let on = self.link.query_on_off(Opcode::RoomStatus(room)).await?;
                let line1 = format!("{} {}", screen.line1, if on { "ON" } else { "OFF" });
                self.hmi.show(&line1, screen.line2);
            }
            _ => self.hmi.show(screen.line1, screen.line2),
        }

        match self.wait_key_session().await {
            Some(key) => self.dispatch_key(key).await?,
            None => {
                info!(state = self.menu.state().as_str(), "session idle, back to main");
                self.menu.reset_to_main();
            }
        }
        Ok(())
    }

    /// Main screen pass: a pending key always navigates; the smart
    /// lighting pass runs only when the bounded scan came up empty.
    async fn main_pass(&mut self) -> anyhow::Result<()> {
        let screen = self.menu.screen(self.role);
        self.hmi.show(screen.line1, screen.line2);

        if let Some(key) = self.scan_key(self.config.menu_scan_window_ms).await {
            return self.dispatch_key(key).await;
        }

        if self.menu.smart_mode() {
            self.automation_pass().await?;
        }
        Ok(())
    }

    async fn automation_pass(&mut self) -> anyhow::Result<()> {
        let status = self.link.query_light().await?;
        match self.automation.observe(status) {
            AutomationPass::DayReset => {
                for room in 0..4u8 {
                    self.link.exchange(Opcode::RoomOff(room)).await?;
                    self.pace().await;
                }
                self.hmi.show("Daylight", "All lights OFF");
            }
            AutomationPass::NightPrompt => {
                // Two steps: yes/no first, then how. An unanswered
                // window leaves the latch clear so the next pass asks
                // again.
                self.hmi.show("Turn lights on?", "1:Yes 2:No");
                let answer = match self.scan_key(self.config.menu_scan_window_ms).await {
                    Some('1') => {
                        self.hmi.show("1:All rooms", "2:Select");
                        match self.scan_key(self.config.menu_scan_window_ms).await {
                            Some('1') => NightAnswer::AllRooms,
                            Some('2') => NightAnswer::SelectRooms,
                            _ => return Ok(()),
                        }
                    }
                    Some('2') => NightAnswer::No,
                    _ => return Ok(()),
                };
                match self.automation.answer(answer) {
                    AnswerAction::TurnOnAllRooms => {
                        for room in 0..4u8 {
                            self.link.exchange(Opcode::RoomOn(room)).await?;
                            self.pace().await;
                        }
                        self.show_message("All lights ON", "").await;
                    }
                    AnswerAction::ManualSelect => self.menu.goto_light_control(),
                    AnswerAction::Nothing => {}
                }
            }
            AutomationPass::NightStatus => {}
        }
        Ok(())
    }

    async fn dispatch_key(&mut self, key: char) -> anyhow::Result<()> {
        let effects = self.menu.press(self.role, key);
        if !effects.contains(&MenuEffect::InvalidInput) {
            // Key click for an accepted press.
            self.hmi.beep();
        }
        for effect in effects {
            match effect {
                MenuEffect::Send(opcode) => {
                    self.link.exchange(opcode).await?;
                    self.pace().await;
                }
                MenuEffect::SendTemperature(value) => {
                    self.link
                        .exchange_with_payload(Opcode::SetTemperature, value)
                        .await?;
                    self.pace().await;
                }
                MenuEffect::Message(line1, line2) => self.show_message(line1, line2).await,
                MenuEffect::InvalidInput => self.hmi.beep(),
                MenuEffect::SmartMode(enabled) => {
                    info!(enabled, "smart mode");
                    if !enabled {
                        // Forget any latched night answer for the next enable.
                        self.automation = LightAutomation::new();
                    }
                }
                MenuEffect::ChangePassword(target) => {
                    let prompt = if target.is_admin() {
                        "Admin pass:"
                    } else {
                        "Guest Pass:"
                    };
                    let digits = self.collect_digits(prompt).await;
                    self.auth.set_credential(target, digits);
                    self.menu.complete_password_change();
                    self.show_message("Password set", "").await;
                }
                MenuEffect::Logout => {
                    self.hmi.set_led(Led::Admin, false);
                    self.hmi.set_led(Led::Guest, false);
                    info!(role = self.role.as_str(), "session ended");
                    self.role = Role::None;
                }
            }
        }
        Ok(())
    }

    /// Four digits with a `*` echo per accepted key; anything else beeps
    /// and is ignored.
    async fn collect_digits(&mut self, prompt: &str) -> [u8; PASS_LEN] {
        let mut digits = [0u8; PASS_LEN];
        let mut mask = String::new();
        self.hmi.show(prompt, &mask);

        let mut filled = 0;
        while filled < PASS_LEN {
            let key = self.wait_key().await;
            let Some(digit) = key.to_digit(10) else {
                self.hmi.beep();
                continue;
            };
            digits[filled] = digit as u8;
            filled += 1;
            mask.push('*');
            self.hmi.beep();
            self.hmi.show(prompt, &mask);
        }
        digits
    }

    /// The audible lockout countdown; the gate reopens only after every
    /// tick has run.
    async fn lockout(&mut self) {
        let half = Duration::from_millis(self.config.lockout_half_tick_ms);
        self.hmi.show("Locked out", "wait...");
        for _ in 0..self.config.lockout_ticks {
            self.hmi.set_led(Led::Block, true);
            self.hmi.beep();
            tokio::time::sleep(half).await;
            self.hmi.set_led(Led::Block, false);
            tokio::time::sleep(half).await;
        }
        self.auth.clear_lockout();
    }

    async fn wait_key(&mut self) -> char {
        loop {
            if let Some(key) = self.hmi.poll_key() {
                return key;
            }
            self.poll_pause().await;
        }
    }

    /// Bounded wait inside a sub-menu; `None` means the idle budget for
    /// the current role ran out.
    async fn wait_key_session(&mut self) -> Option<char> {
        let polls = if self.role.is_admin() {
            self.config.admin_idle_polls
        } else {
            self.config.guest_idle_polls
        };
        for _ in 0..polls {
            if let Some(key) = self.hmi.poll_key() {
                return Some(key);
            }
            self.poll_pause().await;
        }
        None
    }

    async fn scan_key(&mut self, window_ms: u64) -> Option<char> {
        let polls = (window_ms / self.config.key_poll_interval_ms).max(1);
        for _ in 0..polls {
            if let Some(key) = self.hmi.poll_key() {
                return Some(key);
            }
            self.poll_pause().await;
        }
        None
    }

    async fn show_message(&mut self, line1: &str, line2: &str) {
        self.hmi.show(line1, line2);
        tokio::time::sleep(Duration::from_millis(self.config.menu_scan_window_ms)).await;
    }

    async fn pace(&mut self) {
        tokio::time::sleep(Duration::from_millis(self.config.inter_command_delay_ms)).await;
    }

    async fn poll_pause(&mut self) {
        tokio::time::sleep(Duration::from_millis(self.config.key_poll_interval_ms)).await;
    }
}
