use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use tokio::sync::Mutex;

use smarthome_common::{
    Channel, ClimateController, ClimateOutputs, FanDirection, NodeConfig,
};

/// Independent boolean outputs, one atomic per relay.
///
/// The dispatcher and the control tick both write here; every channel is
/// independently consistent, so plain relaxed atomics are enough.
#[derive(Debug, Default)]
pub struct RelayBank {
    rooms: [AtomicBool; 4],
    tv: AtomicBool,
    ac: AtomicBool,
    heater: AtomicBool,
}

impl RelayBank {
    pub fn set(&self, channel: Channel, on: bool) {
        self.cell(channel).store(on, Ordering::Relaxed);
    }

    pub fn get(&self, channel: Channel) -> bool {
        self.cell(channel).load(Ordering::Relaxed)
    }

    fn cell(&self, channel: Channel) -> &AtomicBool {
        match channel {
            Channel::Room1 => &self.rooms[0],
            Channel::Room2 => &self.rooms[1],
            Channel::Room3 => &self.rooms[2],
            Channel::Room4 => &self.rooms[3],
            Channel::Tv => &self.tv,
            Channel::AirConditioner => &self.ac,
            Channel::Heater => &self.heater,
        }
    }

    pub fn room(&self, index: u8) -> Channel {
        Channel::ROOMS[index as usize & 0x03]
    }
}

/// Fan output published for the PWM sub-tick, decoupled from the
/// control computation that produces it.
#[derive(Debug, Default)]
pub struct FanOutput {
    duty: AtomicU8,
    reverse: AtomicBool,
    enable: AtomicBool,
}

impl FanOutput {
    pub fn publish(&self, duty: u8, direction: FanDirection) {
        self.duty.store(duty.min(100), Ordering::Relaxed);
        self.reverse
            .store(direction == FanDirection::Reverse, Ordering::Relaxed);
    }

    pub fn duty(&self) -> u8 {
        self.duty.load(Ordering::Relaxed)
    }

    pub fn direction(&self) -> FanDirection {
        if self.reverse.load(Ordering::Relaxed) {
            FanDirection::Reverse
        } else {
            FanDirection::Forward
        }
    }

    /// Driven by the PWM sub-tick: on-fraction over a 100-unit cycle.
    pub fn set_enable(&self, on: bool) {
        self.enable.store(on, Ordering::Relaxed);
    }

    pub fn enabled(&self) -> bool {
        self.enable.load(Ordering::Relaxed)
    }
}

/// Everything the dispatcher and the control tick share.
pub struct NodeState {
    pub config: NodeConfig,
    pub climate: Mutex<ClimateController>,
    pub relays: RelayBank,
    pub fan: FanOutput,
}

impl NodeState {
    pub fn new(config: NodeConfig) -> Self {
        let climate = ClimateController::new(config.climate.clone());
        Self {
            config,
            climate: Mutex::new(climate),
            relays: RelayBank::default(),
            fan: FanOutput::default(),
        }
    }

    /// Push one control-tick result to the actuator outputs.
    pub fn apply(&self, outputs: ClimateOutputs) {
        self.relays.set(Channel::Heater, outputs.heater_on);
        self.relays.set(Channel::AirConditioner, outputs.ac_on);
        self.fan.publish(outputs.fan_duty, outputs.fan_direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smarthome_common::ClimateConfig;

    #[test]
    fn apply_pushes_outputs_to_relays_and_fan() {
        let state = NodeState::new(NodeConfig::default());
        state.apply(ClimateOutputs {
            heater_on: true,
            ac_on: true,
            fan_duty: 70,
            fan_direction: FanDirection::Reverse,
        });

        assert!(state.relays.get(Channel::Heater));
        assert!(state.relays.get(Channel::AirConditioner));
        assert_eq!(state.fan.duty(), 70);
        assert_eq!(state.fan.direction(), FanDirection::Reverse);
    }

    #[test]
    fn published_duty_is_clamped_to_percent() {
        let state = NodeState::new(NodeConfig::default());
        state.fan.publish(250, FanDirection::Forward);
        assert_eq!(state.fan.duty(), 100);
    }

    #[test]
    fn default_climate_uses_the_configured_target() {
        let config = NodeConfig {
            climate: ClimateConfig {
                default_target: 18,
                ..ClimateConfig::default()
            },
            ..NodeConfig::default()
        };
        let state = NodeState::new(config);
        assert_eq!(state.climate.try_lock().unwrap().target(), 18);
    }
}
