use crate::protocol::Opcode;
use crate::types::{MenuState, Role};

/// Two lines of 16x2 display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    pub line1: &'static str,
    pub line2: &'static str,
}

impl Screen {
    const fn new(line1: &'static str, line2: &'static str) -> Self {
        Self { line1, line2 }
    }
}

/// Side effects requested by one key press. The engine never touches
/// I/O itself; the panel loop executes these in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEffect {
    /// Fire one catalog command over the link, expect the ack.
    Send(Opcode),
    /// `SetTemperature` followed by its payload byte.
    SendTemperature(u8),
    /// One-shot two-line message before the next screen.
    Message(&'static str, &'static str),
    /// Key outside the state's accepted set; redisplay the prompt.
    InvalidInput,
    SmartMode(bool),
    /// Run the digit-collection flow overwriting this role's credential.
    ChangePassword(Role),
    /// End the session: the caller resets role and the role LEDs.
    Logout,
}

/// Front-end finite-state machine: `(state, role, key) -> effects`.
///
/// Admin-only branches are absent from the guest dispatch, so guest
/// input that would select them falls through to `InvalidInput`.
#[derive(Debug, Clone)]
pub struct MenuEngine {
    state: MenuState,
    smart_mode: bool,
    temp_tens: Option<u8>,
}

impl Default for MenuEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuEngine {
    pub fn new() -> Self {
        Self {
            state: MenuState::Login,
            smart_mode: false,
            temp_tens: None,
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn smart_mode(&self) -> bool {
        self.smart_mode
    }

    /// Called by the login loop once the auth gate accepts a credential.
    pub fn enter_main(&mut self) {
        self.state = MenuState::Main;
    }

    /// Called after the app finished a password-change digit flow.
    pub fn complete_password_change(&mut self) {
        if matches!(
            self.state,
            MenuState::ChangeAdminPassword | MenuState::ChangeGuestPassword
        ) {
            self.state = MenuState::Main;
        }
    }

    /// The automation may hand control to manual room selection.
    pub fn goto_light_control(&mut self) {
        self.state = MenuState::LightControl;
    }

    /// Fallback when a sub-menu key wait exceeds the session idle budget.
    pub fn reset_to_main(&mut self) {
        if self.state != MenuState::Login {
            self.state = MenuState::Main;
            self.temp_tens = None;
        }
    }

    pub fn screen(&self, role: Role) -> Screen {
        match self.state {
            MenuState::Login => Screen::new("Select mode:", "0:Admin 1:Guest"),
            MenuState::Main => {
                if role.is_admin() {
                    Screen::new("1:Lgh 2:Pas 3:AC", "4:TV 5:Blo 0:Out")
                } else {
                    Screen::new("1:Lght 0:Out", "")
                }
            }
            MenuState::LightControl => Screen::new("1:R1 2:R2 3:R3", "4:R4 5:Smt 0:Ret"),
            MenuState::Room(room) => Screen::new(room_name(room), "1:ON 2:OFF 0:Ret"),
            MenuState::SmartSetup => {
                if self.smart_mode {
                    Screen::new("Smart Mode: ON", "1:On 2:Off 0:Ret")
                } else {
                    Screen::new("Smart Mode: OFF", "1:On 2:Off 0:Ret")
                }
            }
            MenuState::Password => Screen::new("1:Admin 2:Guest", "0:Ret"),
            MenuState::ChangeAdminPassword => Screen::new("Set Admin pass", "Admin pass:"),
            MenuState::ChangeGuestPassword => Screen::new("Set Guest Pass", "Guest Pass:"),
            MenuState::Climate => Screen::new("1:Set Temp", "2:Ctrl 0:Ret"),
            MenuState::ClimateOnOff => Screen::new("AC Control", "1:ON 2:OFF 0:Ret"),
            MenuState::SetTemperature => Screen::new("Set temp.:__ C", ""),
            MenuState::Blower => Screen::new("Blower Control", "1:ON 2:OFF 0:Ret"),
            MenuState::Tv => Screen::new("TV Control", "1:ON 2:OFF 0:Ret"),
        }
    }

    pub fn press(&mut self, role: Role, key: char) -> Vec<MenuEffect> {
        match self.state {
            MenuState::Login => vec![MenuEffect::InvalidInput],
            MenuState::Main => self.press_main(role, key),
            MenuState::LightControl => self.press_light_control(role, key),
            MenuState::Room(room) => self.press_room(room, key),
            MenuState::SmartSetup => self.press_smart_setup(key),
            MenuState::Password => self.press_password(key),
            MenuState::ChangeAdminPassword | MenuState::ChangeGuestPassword => {
                // Digit collection runs in the app; keys never get here.
                vec![MenuEffect::InvalidInput]
            }
            MenuState::Climate => self.press_climate(key),
            MenuState::ClimateOnOff => self.press_on_off_menu(
                key,
                Opcode::AcOn,
                Opcode::AcOff,
                ("AC Enabled", "AC Disabled"),
                MenuState::Climate,
            ),
            MenuState::SetTemperature => self.press_set_temperature(key),
            MenuState::Blower => self.press_on_off_menu(
                key,
                Opcode::BlowerOn,
                Opcode::BlowerOff,
                ("Blower ON", "Blower OFF"),
                MenuState::Main,
            ),
            MenuState::Tv => self.press_on_off_menu(
                key,
                Opcode::TvOn,
                Opcode::TvOff,
                ("TV ON", "TV OFF"),
                MenuState::Main,
            ),
        }
    }

    /// The logout effect list; every off-command is independent and
    /// idempotent, and the order is fixed so peers see one sequence.
    pub fn logout_effects() -> Vec<MenuEffect> {
        vec![
            MenuEffect::Message("Shutting Down...", ""),
            MenuEffect::Send(Opcode::RoomOff(0)),
            MenuEffect::Send(Opcode::RoomOff(1)),
            MenuEffect::Send(Opcode::RoomOff(2)),
            MenuEffect::Send(Opcode::RoomOff(3)),
            MenuEffect::Send(Opcode::TvOff),
            MenuEffect::Send(Opcode::AcOff),
            MenuEffect::Send(Opcode::BlowerOff),
            MenuEffect::SmartMode(false),
            MenuEffect::Logout,
        ]
    }

    fn logout(&mut self) -> Vec<MenuEffect> {
        self.smart_mode = false;
        self.state = MenuState::Login;
        Self::logout_effects()
    }

    fn press_main(&mut self, role: Role, key: char) -> Vec<MenuEffect> {
        match key {
            '1' => {
                self.state = MenuState::LightControl;
                Vec::new()
            }
            '2' if role.is_admin() => {
                self.state = MenuState::Password;
                Vec::new()
            }
            '3' if role.is_admin() => {
                self.state = MenuState::Climate;
                Vec::new()
            }
            '4' if role.is_admin() => {
                self.state = MenuState::Tv;
                Vec::new()
            }
            '5' if role.is_admin() => {
                self.state = MenuState::Blower;
                Vec::new()
            }
            '0' => self.logout(),
            // Main shows a one-shot message and falls back to itself.
            _ => vec![MenuEffect::Message("Wrong input", "")],
        }
    }

    fn press_light_control(&mut self, role: Role, key: char) -> Vec<MenuEffect> {
        match key {
            '1'..='4' => {
                self.state = MenuState::Room(key as u8 - b'1');
                Vec::new()
            }
            '5' if role.is_admin() => {
                self.state = MenuState::SmartSetup;
                Vec::new()
            }
            '0' => {
                self.state = MenuState::Main;
                Vec::new()
            }
            _ => vec![MenuEffect::InvalidInput],
        }
    }

    fn press_room(&mut self, room: u8, key: char) -> Vec<MenuEffect> {
        match key {
            '1' => {
                self.state = MenuState::LightControl;
                vec![
                    MenuEffect::Send(Opcode::RoomOn(room)),
                    MenuEffect::Message(room_name(room), "light ON"),
                ]
            }
            '2' => {
                self.state = MenuState::LightControl;
                vec![
                    MenuEffect::Send(Opcode::RoomOff(room)),
                    MenuEffect::Message(room_name(room), "light OFF"),
                ]
            }
            '0' => {
                self.state = MenuState::LightControl;
                Vec::new()
            }
            _ => vec![MenuEffect::InvalidInput],
        }
    }

    fn press_smart_setup(&mut self, key: char) -> Vec<MenuEffect> {
        match key {
            '1' => {
                self.smart_mode = true;
                self.state = MenuState::Main;
                vec![
                    MenuEffect::SmartMode(true),
                    MenuEffect::Message("Smart Enabled", ""),
                ]
            }
            '2' => {
                // Stay on the setup screen so the status line refreshes.
                self.smart_mode = false;
                vec![
                    MenuEffect::SmartMode(false),
                    MenuEffect::Message("Smart Disabled", ""),
                ]
            }
            '0' => {
                self.state = MenuState::LightControl;
                Vec::new()
            }
            _ => vec![MenuEffect::InvalidInput],
        }
    }

    fn press_password(&mut self, key: char) -> Vec<MenuEffect> {
        match key {
            '1' => {
                self.state = MenuState::ChangeAdminPassword;
                vec![MenuEffect::ChangePassword(Role::Admin)]
            }
            '2' => {
                self.state = MenuState::ChangeGuestPassword;
                vec![MenuEffect::ChangePassword(Role::Guest)]
            }
            '0' => {
                self.state = MenuState::Main;
                Vec::new()
            }
            _ => vec![MenuEffect::InvalidInput],
        }
    }

    fn press_climate(&mut self, key: char) -> Vec<MenuEffect> {
        match key {
            '1' => {
                self.temp_tens = None;
                self.state = MenuState::SetTemperature;
                Vec::new()
            }
            '2' => {
                self.state = MenuState::ClimateOnOff;
                Vec::new()
            }
            '0' => {
                self.state = MenuState::Main;
                Vec::new()
            }
            _ => vec![MenuEffect::InvalidInput],
        }
    }

    fn press_on_off_menu(
        &mut self,
        key: char,
        on: Opcode,
        off: Opcode,
        messages: (&'static str, &'static str),
        back: MenuState,
    ) -> Vec<MenuEffect> {
        match key {
            '1' => {
                self.state = back;
                vec![MenuEffect::Send(on), MenuEffect::Message(messages.0, "")]
            }
            '2' => {
                self.state = back;
                vec![MenuEffect::Send(off), MenuEffect::Message(messages.1, "")]
            }
            '0' => {
                self.state = back;
                Vec::new()
            }
            _ => vec![MenuEffect::InvalidInput],
        }
    }

    /// Two digits, tens then ones; a non-digit or a computed value of
    /// zero discards the partial entry and recaptures both digits.
    fn press_set_temperature(&mut self, key: char) -> Vec<MenuEffect> {
        let Some(digit) = key.to_digit(10) else {
            self.temp_tens = None;
            return vec![MenuEffect::InvalidInput];
        };

        match self.temp_tens.take() {
            None => {
                self.temp_tens = Some(digit as u8);
                Vec::new()
            }
            Some(tens) => {
                let value = tens * 10 + digit as u8;
                if value == 0 {
                    return vec![MenuEffect::InvalidInput];
                }
                self.state = MenuState::Climate;
                vec![
                    MenuEffect::SendTemperature(value),
                    MenuEffect::Message("Temperature Sent", ""),
                ]
            }
        }
    }
}

fn room_name(room: u8) -> &'static str {
    match room {
        0 => "Room 1",
        1 => "Room 2",
        2 => "Room 3",
        _ => "Room 4",
    }
}
