use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use smarthome_common::protocol::{
    Opcode, REPLY_ACK, REPLY_DAY, REPLY_NIGHT, REPLY_OFF, REPLY_ON,
};
use smarthome_common::Channel;

use crate::sensors::{AnalogSensor, SensorChannel};
use crate::state::NodeState;

/// Serve one peer: block for an opcode, act, reply one byte, loop.
///
/// Returns cleanly when the peer hangs up. An out-of-catalog byte has no
/// effect but is still acked so the request/reply stream cannot
/// desynchronise.
pub async fn serve<S>(
    mut stream: S,
    state: &NodeState,
    sensors: &dyn AnalogSensor,
) -> anyhow::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut byte = [0u8; 1];
    loop {
        match stream.read_exact(&mut byte).await {
            Ok(_) => {}
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(()),
            Err(err) => return Err(err.into()),
        }

        let reply = match Opcode::from_byte(byte[0]) {
            Ok(opcode) => handle(opcode, &mut stream, state, sensors).await?,
            Err(err) => {
                warn!("{err}");
                REPLY_ACK
            }
        };

        stream.write_all(&[reply]).await?;
    }
}

async fn handle<S>(
    opcode: Opcode,
    stream: &mut S,
    state: &NodeState,
    sensors: &dyn AnalogSensor,
) -> anyhow::Result<u8>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    debug!(opcode = ?opcode, "dispatch");
    let reply = match opcode {
        Opcode::RoomStatus(room) => on_off_reply(state.relays.get(state.relays.room(room))),
        Opcode::TvStatus => on_off_reply(state.relays.get(Channel::Tv)),
        Opcode::AcStatus => on_off_reply(state.relays.get(Channel::AirConditioner)),

        Opcode::RoomOn(room) => {
            state.relays.set(state.relays.room(room), true);
            REPLY_ACK
        }
        Opcode::RoomOff(room) => {
            state.relays.set(state.relays.room(room), false);
            REPLY_ACK
        }
        Opcode::TvOn => {
            state.relays.set(Channel::Tv, true);
            REPLY_ACK
        }
        Opcode::TvOff => {
            state.relays.set(Channel::Tv, false);
            REPLY_ACK
        }

        // Arms the control loop's own hysteresis logic; the relay itself
        // follows on the next control tick.
        Opcode::AcOn => {
            state.climate.lock().await.arm_auto();
            REPLY_ACK
        }
        // Edge action: relay and heater drop now, not at the next tick.
        Opcode::AcOff => {
            let outputs = state.climate.lock().await.disarm_auto();
            state.apply(outputs);
            REPLY_ACK
        }

        Opcode::SetTemperature => {
            let mut payload = [0u8; 1];
            stream.read_exact(&mut payload).await?;
            state.climate.lock().await.set_target(payload[0]);
            REPLY_ACK
        }

        Opcode::BlowerOn => {
            let outputs = state.climate.lock().await.blower_on();
            state.apply(outputs);
            REPLY_ACK
        }
        Opcode::BlowerOff => {
            let outputs = state.climate.lock().await.blower_off();
            state.apply(outputs);
            REPLY_ACK
        }

        Opcode::GetLightStatus => {
            let reading = sensors.sample(SensorChannel::AmbientLight);
            if reading > state.config.light_threshold {
                REPLY_DAY
            } else {
                REPLY_NIGHT
            }
        }
    };
    Ok(reply)
}

fn on_off_reply(on: bool) -> u8 {
    if on {
        REPLY_ON
    } else {
        REPLY_OFF
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::testing::FixedSensors;
    use pretty_assertions::assert_eq;
    use smarthome_common::{FanDirection, NodeConfig};
    use tokio::io::duplex;

    async fn exchange(peer: &mut (impl AsyncRead + AsyncWrite + Unpin), bytes: &[u8]) -> u8 {
        peer.write_all(bytes).await.unwrap();
        let mut reply = [0u8; 1];
        peer.read_exact(&mut reply).await.unwrap();
        reply[0]
    }

    fn harness(
        temperature: u16,
        light: u16,
    ) -> (std::sync::Arc<NodeState>, std::sync::Arc<FixedSensors>) {
        (
            std::sync::Arc::new(NodeState::new(NodeConfig::default())),
            std::sync::Arc::new(FixedSensors::new(temperature, light)),
        )
    }

    fn spawn_server(
        state: std::sync::Arc<NodeState>,
        sensors: std::sync::Arc<FixedSensors>,
        stream: tokio::io::DuplexStream,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let _ = serve(stream, &state, sensors.as_ref()).await;
        })
    }

    #[tokio::test]
    async fn write_then_query_round_trips_room_state() {
        let (state, sensors) = harness(22, 700);
        let (mut peer, server_side) = duplex(16);
        spawn_server(state.clone(), sensors, server_side);

        assert_eq!(exchange(&mut peer, &[Opcode::RoomOn(1).to_byte()]).await, REPLY_ACK);
        assert_eq!(exchange(&mut peer, &[Opcode::RoomStatus(1).to_byte()]).await, REPLY_ON);
        assert_eq!(exchange(&mut peer, &[Opcode::RoomOff(1).to_byte()]).await, REPLY_ACK);
        assert_eq!(exchange(&mut peer, &[Opcode::RoomStatus(1).to_byte()]).await, REPLY_OFF);
        assert!(!state.relays.get(Channel::Room2));
    }

    #[tokio::test]
    async fn ac_off_is_an_immediate_edge_action() {
        let (state, sensors) = harness(45, 700);
        state.relays.set(Channel::AirConditioner, true);
        state.relays.set(Channel::Heater, true);

        let (mut peer, server_side) = duplex(16);
        spawn_server(state.clone(), sensors, server_side);

        assert_eq!(exchange(&mut peer, &[Opcode::AcOff.to_byte()]).await, REPLY_ACK);
        assert!(!state.relays.get(Channel::AirConditioner));
        assert!(!state.relays.get(Channel::Heater));
        assert!(!state.climate.lock().await.auto_enabled());

        assert_eq!(exchange(&mut peer, &[Opcode::AcOn.to_byte()]).await, REPLY_ACK);
        assert!(state.climate.lock().await.auto_enabled());
    }

    #[tokio::test]
    async fn set_temperature_consumes_its_payload_byte() {
        let (state, sensors) = harness(22, 700);
        let (mut peer, server_side) = duplex(16);
        spawn_server(state.clone(), sensors, server_side);

        let reply = exchange(&mut peer, &[Opcode::SetTemperature.to_byte(), 5]).await;
        assert_eq!(reply, REPLY_ACK);
        assert_eq!(state.climate.lock().await.target(), 5);

        // The stream stays aligned for the next exchange.
        assert_eq!(exchange(&mut peer, &[Opcode::TvStatus.to_byte()]).await, REPLY_OFF);
    }

    #[tokio::test]
    async fn blower_commands_pin_and_release_the_fan() {
        let (state, sensors) = harness(22, 700);
        let (mut peer, server_side) = duplex(16);
        spawn_server(state.clone(), sensors, server_side);

        exchange(&mut peer, &[Opcode::BlowerOn.to_byte()]).await;
        assert_eq!(state.fan.duty(), 100);
        assert_eq!(state.fan.direction(), FanDirection::Reverse);

        exchange(&mut peer, &[Opcode::BlowerOff.to_byte()]).await;
        assert_eq!(state.fan.duty(), 0);
    }

    #[tokio::test]
    async fn light_query_classifies_against_the_threshold() {
        let (state, sensors) = harness(22, 700);
        let (mut peer, server_side) = duplex(16);
        spawn_server(state, sensors.clone(), server_side);

        assert_eq!(exchange(&mut peer, &[Opcode::GetLightStatus.to_byte()]).await, REPLY_DAY);

        sensors
            .light
            .store(300, std::sync::atomic::Ordering::Relaxed);
        assert_eq!(
            exchange(&mut peer, &[Opcode::GetLightStatus.to_byte()]).await,
            REPLY_NIGHT
        );
    }

    #[tokio::test]
    async fn unknown_bytes_are_acked_without_effect() {
        let (state, sensors) = harness(22, 700);
        let (mut peer, server_side) = duplex(16);
        spawn_server(state.clone(), sensors, server_side);

        assert_eq!(exchange(&mut peer, &[0xEE]).await, REPLY_ACK);
        assert_eq!(exchange(&mut peer, &[Opcode::RoomStatus(0).to_byte()]).await, REPLY_OFF);
    }
}
