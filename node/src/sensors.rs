use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorChannel {
    Temperature,
    AmbientLight,
}

/// One named analog input. Temperature samples are degrees Celsius;
/// ambient light is the raw 10-bit style reading compared against the
/// configured day/night threshold.
pub trait AnalogSensor: Send + Sync {
    fn sample(&self, channel: SensorChannel) -> u16;
}

/// Simulated sensors for host runs.
///
/// Hardware integration point: replace with real ADC reads on target.
/// `SIM_TEMP_C` / `SIM_LIGHT` environment variables pin either channel
/// for demos; otherwise both follow slow deterministic ramps.
#[derive(Debug, Default)]
pub struct SimSensors {
    ticks: AtomicU32,
}

impl SimSensors {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnalogSensor for SimSensors {
    fn sample(&self, channel: SensorChannel) -> u16 {
        let tick = self.ticks.fetch_add(1, Ordering::Relaxed);
        match channel {
            SensorChannel::Temperature => env_override("SIM_TEMP_C")
                .unwrap_or_else(|| 22 + (tick / 4 % 8) as u16),
            SensorChannel::AmbientLight => env_override("SIM_LIGHT")
                .unwrap_or_else(|| if tick / 32 % 2 == 0 { 700 } else { 300 }),
        }
    }
}

fn env_override(name: &str) -> Option<u16> {
    std::env::var(name).ok()?.trim().parse().ok()
}
