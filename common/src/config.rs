use serde::{Deserialize, Serialize};

use crate::auth::PASS_LEN;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Digits of the factory admin credential.
    pub admin_pass: [u8; PASS_LEN],
    /// Digits of the factory guest credential.
    pub guest_pass: [u8; PASS_LEN],
    /// Run the set-credential flow for both roles before the first login.
    pub provision_on_boot: bool,
    pub tries_allowed: u8,
    pub lockout_ticks: u8,
    /// Half-period of one lockout tick (LED/buzzer on, then off).
    pub lockout_half_tick_ms: u64,
    /// Bounded key-scan window on each Main-menu pass.
    pub menu_scan_window_ms: u64,
    pub key_poll_interval_ms: u64,
    /// Idle polls before a sub-menu wait gives up, per role.
    pub admin_idle_polls: u16,
    pub guest_idle_polls: u16,
    pub link_timeout_ms: u64,
    /// Pause between consecutive commands in a batch (logout, all-on).
    pub inter_command_delay_ms: u64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            admin_pass: [0, 0, 0, 0],
            guest_pass: [1, 1, 1, 1],
            provision_on_boot: false,
            tries_allowed: 3,
            lockout_ticks: 20,
            lockout_half_tick_ms: 500,
            menu_scan_window_ms: 500,
            key_poll_interval_ms: 10,
            admin_idle_polls: 3000,
            guest_idle_polls: 2000,
            link_timeout_ms: 1000,
            inter_command_delay_ms: 10,
        }
    }
}

impl PanelConfig {
    pub fn sanitize(&mut self) {
        for digit in self.admin_pass.iter_mut().chain(self.guest_pass.iter_mut()) {
            *digit = (*digit).min(9);
        }
        self.tries_allowed = self.tries_allowed.clamp(1, 9);
        self.lockout_ticks = self.lockout_ticks.max(1);
        self.lockout_half_tick_ms = self.lockout_half_tick_ms.clamp(10, 5_000);
        self.menu_scan_window_ms = self.menu_scan_window_ms.clamp(50, 5_000);
        self.key_poll_interval_ms = self.key_poll_interval_ms.clamp(1, 100);
        self.link_timeout_ms = self.link_timeout_ms.clamp(10, 60_000);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClimateConfig {
    /// Heater engages below this measured temperature (°C).
    pub heater_on_below: u8,
    /// Air conditioner engages above this measured temperature (°C).
    pub ac_on_above: u8,
    /// Fan starts above this measured temperature (°C).
    pub fan_on_above: u8,
    /// Fan reaches full duty at this measured temperature (°C).
    pub fan_full_at: u8,
    pub default_target: u8,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            heater_on_below: 10,
            ac_on_above: 25,
            fan_on_above: 30,
            fan_full_at: 40,
            default_target: 24,
        }
    }
}

impl ClimateConfig {
    pub fn sanitize(&mut self) {
        if self.fan_full_at <= self.fan_on_above {
            self.fan_full_at = self.fan_on_above + 10;
        }
        if self.default_target == 0 {
            self.default_target = 24;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub climate: ClimateConfig,
    /// Ambient-light reading above this value classifies as day.
    pub light_threshold: u16,
    /// PWM sub-tick period; one unit of the 100-unit duty cycle.
    pub pwm_tick_ms: u64,
    /// Control tick fires every this many PWM sub-ticks.
    pub control_every_ticks: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            climate: ClimateConfig::default(),
            light_threshold: 512,
            pwm_tick_ms: 1,
            control_every_ticks: 150,
        }
    }
}

impl NodeConfig {
    pub fn sanitize(&mut self) {
        self.climate.sanitize();
        self.pwm_tick_ms = self.pwm_tick_ms.clamp(1, 100);
        self.control_every_ticks = self.control_every_ticks.clamp(1, 10_000);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub panel: PanelConfig,
    #[serde(default)]
    pub node: NodeConfig,
}

impl RuntimeConfig {
    pub fn sanitize(&mut self) {
        self.panel.sanitize();
        self.node.sanitize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_firmware_constants() {
        let config = RuntimeConfig::default();
        assert_eq!(config.panel.admin_pass, [0, 0, 0, 0]);
        assert_eq!(config.panel.guest_pass, [1, 1, 1, 1]);
        assert_eq!(config.panel.lockout_ticks, 20);
        assert_eq!(config.node.light_threshold, 512);
        assert_eq!(config.node.climate.default_target, 24);
        assert_eq!(config.node.control_every_ticks, 150);
    }

    #[test]
    fn sanitize_clamps_out_of_range_values() {
        let mut config = RuntimeConfig::default();
        config.panel.admin_pass = [12, 0, 0, 0];
        config.panel.tries_allowed = 0;
        config.node.climate.fan_full_at = 5;
        config.node.pwm_tick_ms = 0;
        config.sanitize();

        assert_eq!(config.panel.admin_pass, [9, 0, 0, 0]);
        assert_eq!(config.panel.tries_allowed, 1);
        assert!(config.node.climate.fan_full_at > config.node.climate.fan_on_above);
        assert_eq!(config.node.pwm_tick_ms, 1);
    }
}
