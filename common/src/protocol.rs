use thiserror::Error;

use crate::types::LightStatus;

/// Reply byte acknowledging a write command.
pub const REPLY_ACK: u8 = 0x06;
/// Reply byte for a status query: channel is on.
pub const REPLY_ON: u8 = 0x01;
/// Reply byte for a status query: channel is off.
pub const REPLY_OFF: u8 = 0x00;
/// Reply byte for the light query: bright outside.
pub const REPLY_DAY: u8 = 0x01;
/// Reply byte for the light query: dark outside.
pub const REPLY_NIGHT: u8 = 0x00;

/// One boolean output on the back end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Room1,
    Room2,
    Room3,
    Room4,
    Tv,
    AirConditioner,
    Heater,
}

impl Channel {
    pub const ROOMS: [Channel; 4] = [Self::Room1, Self::Room2, Self::Room3, Self::Room4];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Room1 => "room1",
            Self::Room2 => "room2",
            Self::Room3 => "room3",
            Self::Room4 => "room4",
            Self::Tv => "tv",
            Self::AirConditioner => "ac",
            Self::Heater => "heater",
        }
    }
}

/// The closed single-byte command catalog exchanged between the nodes.
///
/// The blower and light-query commands keep their legacy byte values;
/// the remaining groups fill adjacent ranges so related commands decode
/// by offset. Every request elicits exactly one reply byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    RoomStatus(u8), // 0..=3
    TvStatus,
    AcStatus,
    RoomOn(u8), // 0..=3
    TvOn,
    RoomOff(u8), // 0..=3
    TvOff,
    AcOn,
    AcOff,
    SetTemperature,
    BlowerOn,
    BlowerOff,
    GetLightStatus,
}

const ROOM_STATUS_BASE: u8 = 0x10;
const TV_STATUS: u8 = 0x14;
const AC_STATUS: u8 = 0x15;
const ROOM_ON_BASE: u8 = 0x20;
const TV_ON: u8 = 0x24;
const ROOM_OFF_BASE: u8 = 0x30;
const TV_OFF: u8 = 0x34;
const AC_ON: u8 = 0x40;
const AC_OFF: u8 = 0x41;
const SET_TEMPERATURE: u8 = 0x42;
const BLOWER_ON: u8 = 0x50;
const BLOWER_OFF: u8 = 0x51;
const GET_LIGHT_STATUS: u8 = 0x52;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("byte 0x{0:02X} is not in the opcode catalog")]
    UnknownOpcode(u8),
}

impl Opcode {
    pub fn to_byte(self) -> u8 {
        match self {
            Self::RoomStatus(i) => ROOM_STATUS_BASE + (i & 0x03),
            Self::TvStatus => TV_STATUS,
            Self::AcStatus => AC_STATUS,
            Self::RoomOn(i) => ROOM_ON_BASE + (i & 0x03),
            Self::TvOn => TV_ON,
            Self::RoomOff(i) => ROOM_OFF_BASE + (i & 0x03),
            Self::TvOff => TV_OFF,
            Self::AcOn => AC_ON,
            Self::AcOff => AC_OFF,
            Self::SetTemperature => SET_TEMPERATURE,
            Self::BlowerOn => BLOWER_ON,
            Self::BlowerOff => BLOWER_OFF,
            Self::GetLightStatus => GET_LIGHT_STATUS,
        }
    }

    pub fn from_byte(byte: u8) -> Result<Self, ProtocolError> {
        match byte {
            b if (ROOM_STATUS_BASE..ROOM_STATUS_BASE + 4).contains(&b) => {
                Ok(Self::RoomStatus(b - ROOM_STATUS_BASE))
            }
            TV_STATUS => Ok(Self::TvStatus),
            AC_STATUS => Ok(Self::AcStatus),
            b if (ROOM_ON_BASE..ROOM_ON_BASE + 4).contains(&b) => Ok(Self::RoomOn(b - ROOM_ON_BASE)),
            TV_ON => Ok(Self::TvOn),
            b if (ROOM_OFF_BASE..ROOM_OFF_BASE + 4).contains(&b) => {
                Ok(Self::RoomOff(b - ROOM_OFF_BASE))
            }
            TV_OFF => Ok(Self::TvOff),
            AC_ON => Ok(Self::AcOn),
            AC_OFF => Ok(Self::AcOff),
            SET_TEMPERATURE => Ok(Self::SetTemperature),
            BLOWER_ON => Ok(Self::BlowerOn),
            BLOWER_OFF => Ok(Self::BlowerOff),
            GET_LIGHT_STATUS => Ok(Self::GetLightStatus),
            other => Err(ProtocolError::UnknownOpcode(other)),
        }
    }

    /// Write commands that carry one extra request byte.
    pub fn has_payload(self) -> bool {
        matches!(self, Self::SetTemperature)
    }

    pub fn room_on(room: Channel) -> Option<Self> {
        Channel::ROOMS
            .iter()
            .position(|c| *c == room)
            .map(|i| Self::RoomOn(i as u8))
    }

    pub fn room_off(room: Channel) -> Option<Self> {
        Channel::ROOMS
            .iter()
            .position(|c| *c == room)
            .map(|i| Self::RoomOff(i as u8))
    }
}

pub fn decode_light_reply(byte: u8) -> LightStatus {
    if byte == REPLY_DAY {
        LightStatus::Day
    } else {
        LightStatus::Night
    }
}
