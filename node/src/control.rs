use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

use crate::sensors::{AnalogSensor, SensorChannel};
use crate::state::NodeState;

/// Spawn the periodic regulation task.
///
/// One fast sub-tick drives the software fan PWM over a 100-unit cycle;
/// every `control_every_ticks` sub-ticks the climate rules run against a
/// fresh temperature sample. Both cadences live in one task, mirroring
/// the single timer interrupt they model, and stay asynchronous to the
/// dispatcher.
pub fn spawn(state: Arc<NodeState>, sensors: Arc<dyn AnalogSensor>) -> tokio::task::JoinHandle<()> {
    let pwm_tick = Duration::from_millis(state.config.pwm_tick_ms);
    let control_every = state.config.control_every_ticks;

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(pwm_tick);
        let mut pwm_counter: u8 = 0;
        let mut sub_ticks: u32 = 0;

        loop {
            interval.tick().await;

            pwm_counter = (pwm_counter + 1) % 100;
            state.fan.set_enable(pwm_counter < state.fan.duty());

            sub_ticks += 1;
            if sub_ticks >= control_every {
                sub_ticks = 0;
                let measured = sensors.sample(SensorChannel::Temperature).min(u8::MAX as u16) as u8;
                let outputs = {
                    let mut climate = state.climate.lock().await;
                    climate.tick(measured)
                };
                state.apply(outputs);
                trace!(
                    measured,
                    heater = outputs.heater_on,
                    ac = outputs.ac_on,
                    fan_duty = outputs.fan_duty,
                    "control tick"
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::testing::FixedSensors;
    use pretty_assertions::assert_eq;
    use smarthome_common::{Channel, NodeConfig};

    #[tokio::test(start_paused = true)]
    async fn control_tick_drives_the_actuators() {
        let mut config = NodeConfig::default();
        config.control_every_ticks = 2;
        let state = Arc::new(NodeState::new(config));
        let sensors = Arc::new(FixedSensors::new(35, 700));

        let handle = spawn(state.clone(), sensors.clone());
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(state.fan.duty(), 50);
        assert!(!state.relays.get(Channel::Heater));

        sensors
            .temperature
            .store(5, std::sync::atomic::Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(state.fan.duty(), 0);
        assert!(state.relays.get(Channel::Heater));

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn disarmed_regulation_keeps_outputs_off_each_tick() {
        let mut config = NodeConfig::default();
        config.control_every_ticks = 2;
        let state = Arc::new(NodeState::new(config));
        let sensors = Arc::new(FixedSensors::new(45, 700));

        state.climate.lock().await.disarm_auto();
        let handle = spawn(state.clone(), sensors);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(!state.relays.get(Channel::Heater));
        assert!(!state.relays.get(Channel::AirConditioner));
        assert_eq!(state.fan.duty(), 0);

        handle.abort();
    }
}
