use crate::config::ClimateConfig;
use crate::types::FanDirection;

/// Actuator outputs recomputed by one control tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClimateOutputs {
    pub heater_on: bool,
    pub ac_on: bool,
    pub fan_duty: u8,
    pub fan_direction: FanDirection,
}

/// The back end's always-on climate regulator.
///
/// Holds the fields shared between the command dispatcher and the
/// periodic control tick: target temperature, the auto-climate master
/// gate, the blower override, and the fan output. The dispatcher calls
/// the command methods; the control tick calls [`tick`](Self::tick).
/// Callers guard the whole struct with one lock — no field needs a
/// multi-field transaction.
#[derive(Debug, Clone)]
pub struct ClimateController {
    config: ClimateConfig,
    target: u8,
    auto_enabled: bool,
    blower_override: bool,
    heater_on: bool,
    ac_on: bool,
    fan_duty: u8,
    fan_direction: FanDirection,
}

impl ClimateController {
    pub fn new(config: ClimateConfig) -> Self {
        let target = config.default_target;
        Self {
            config,
            target,
            auto_enabled: true,
            blower_override: false,
            heater_on: false,
            ac_on: false,
            fan_duty: 0,
            fan_direction: FanDirection::Forward,
        }
    }

    pub fn target(&self) -> u8 {
        self.target
    }

    pub fn auto_enabled(&self) -> bool {
        self.auto_enabled
    }

    pub fn blower_override(&self) -> bool {
        self.blower_override
    }

    pub fn ac_on(&self) -> bool {
        self.ac_on
    }

    pub fn fan_duty(&self) -> u8 {
        self.fan_duty
    }

    pub fn set_target(&mut self, target: u8) {
        self.target = target;
    }

    /// `AcOn` opcode: re-arm the automatic regulation. The next control
    /// tick recomputes every output from the sensor reading.
    pub fn arm_auto(&mut self) {
        self.auto_enabled = true;
    }

    /// `AcOff` opcode: disarm regulation and force the AC relay and the
    /// heater off immediately, without waiting for the next tick.
    pub fn disarm_auto(&mut self) -> ClimateOutputs {
        self.auto_enabled = false;
        self.heater_on = false;
        self.ac_on = false;
        if !self.blower_override {
            self.fan_duty = 0;
        }
        self.outputs()
    }

    /// `BlowerOn` opcode: reverse direction at full duty until cleared.
    pub fn blower_on(&mut self) -> ClimateOutputs {
        self.blower_override = true;
        self.fan_direction = FanDirection::Reverse;
        self.fan_duty = 100;
        self.outputs()
    }

    /// `BlowerOff` opcode: clear the override and stop the fan now.
    pub fn blower_off(&mut self) -> ClimateOutputs {
        self.blower_override = false;
        self.fan_duty = 0;
        self.outputs()
    }

    /// One periodic control tick against a fresh temperature sample.
    pub fn tick(&mut self, measured: u8) -> ClimateOutputs {
        if !self.auto_enabled {
            self.heater_on = false;
            self.ac_on = false;
            if !self.blower_override {
                self.fan_duty = 0;
            }
            return self.outputs();
        }

        self.heater_on = measured < self.config.heater_on_below;

        // Dead band between target and the high threshold: keep state.
        if measured > self.config.ac_on_above {
            self.ac_on = true;
        } else if measured < self.target {
            self.ac_on = false;
        }

        if !self.blower_override {
            if measured > self.config.fan_on_above {
                self.fan_direction = FanDirection::Forward;
                self.fan_duty = if measured >= self.config.fan_full_at {
                    100
                } else {
                    // Widened: the ramp can exceed u8 under a wide
                    // configured span before the clamp applies.
                    let ramp = u16::from(measured - self.config.fan_on_above) * 10;
                    ramp.min(100) as u8
                };
            } else {
                self.fan_duty = 0;
            }
        }

        self.outputs()
    }

    fn outputs(&self) -> ClimateOutputs {
        ClimateOutputs {
            heater_on: self.heater_on,
            ac_on: self.ac_on,
            fan_duty: self.fan_duty,
            fan_direction: self.fan_direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn controller() -> ClimateController {
        ClimateController::new(ClimateConfig::default())
    }

    #[test]
    fn fan_duty_follows_the_linear_ramp() {
        let mut climate = controller();
        assert_eq!(climate.tick(30).fan_duty, 0);
        assert_eq!(climate.tick(35).fan_duty, 50);
        assert_eq!(climate.tick(40).fan_duty, 100);
        assert_eq!(climate.tick(45).fan_duty, 100);
        assert_eq!(climate.tick(31).fan_direction, FanDirection::Forward);
    }

    #[test]
    fn heater_engages_below_ten_degrees() {
        let mut climate = controller();
        assert!(climate.tick(9).heater_on);
        assert!(!climate.tick(10).heater_on);
    }

    #[test]
    fn ac_holds_state_inside_the_dead_band() {
        let mut climate = controller();
        assert!(climate.tick(26).ac_on);
        // Between target (24) and 25 the relay keeps its last state.
        assert!(climate.tick(25).ac_on);
        assert!(climate.tick(24).ac_on);
        assert!(!climate.tick(23).ac_on);
        assert!(!climate.tick(25).ac_on);
    }

    #[test]
    fn ac_turn_off_point_tracks_the_target() {
        let mut climate = controller();
        climate.set_target(20);
        assert!(climate.tick(26).ac_on);
        assert!(climate.tick(21).ac_on);
        assert!(!climate.tick(19).ac_on);
    }

    #[test]
    fn disarm_forces_everything_off_regardless_of_temperature() {
        let mut climate = controller();
        climate.tick(45);
        let outputs = climate.disarm_auto();
        assert!(!outputs.heater_on);
        assert!(!outputs.ac_on);
        assert_eq!(outputs.fan_duty, 0);

        // Stays off on subsequent ticks at any reading.
        for measured in [5u8, 26, 45] {
            let outputs = climate.tick(measured);
            assert!(!outputs.heater_on);
            assert!(!outputs.ac_on);
            assert_eq!(outputs.fan_duty, 0);
        }
    }

    #[test]
    fn blower_override_pins_the_fan() {
        let mut climate = controller();
        let outputs = climate.blower_on();
        assert_eq!(outputs.fan_duty, 100);
        assert_eq!(outputs.fan_direction, FanDirection::Reverse);

        // Temperature no longer drives the fan while the override holds.
        assert_eq!(climate.tick(20).fan_duty, 100);
        assert_eq!(climate.tick(45).fan_duty, 100);
        assert_eq!(climate.tick(45).fan_direction, FanDirection::Reverse);

        let outputs = climate.blower_off();
        assert_eq!(outputs.fan_duty, 0);
        assert_eq!(climate.tick(35).fan_duty, 50);
    }

    #[test]
    fn blower_override_survives_disarmed_regulation() {
        let mut climate = controller();
        climate.blower_on();
        let outputs = climate.disarm_auto();
        assert_eq!(outputs.fan_duty, 100);
        assert_eq!(climate.tick(20).fan_duty, 100);
    }

    #[test]
    fn wide_ramp_span_saturates_instead_of_overflowing() {
        // A span wider than 25 degrees would overflow u8 mid-ramp.
        let mut climate = ClimateController::new(ClimateConfig {
            fan_full_at: 200,
            ..ClimateConfig::default()
        });
        assert_eq!(climate.tick(80).fan_duty, 100);
        assert_eq!(climate.tick(35).fan_duty, 50);
    }

    #[test]
    fn duty_never_leaves_the_percent_range() {
        let mut climate = controller();
        for measured in 0u8..=60 {
            let duty = climate.tick(measured).fan_duty;
            assert!(duty <= 100, "duty {duty} at {measured}");
        }
    }
}
