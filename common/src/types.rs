use serde::{Deserialize, Serialize};

/// Session privilege level. `None` means the login loop owns the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    None,
    Admin,
    Guest,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Admin => "ADMIN",
            Self::Guest => "GUEST",
        }
    }

    pub fn is_admin(self) -> bool {
        self == Self::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Login,
    Main,
    LightControl,
    Room(u8), // 0..=3
    SmartSetup,
    Password,
    ChangeAdminPassword,
    ChangeGuestPassword,
    Climate,
    ClimateOnOff,
    SetTemperature,
    Blower,
    Tv,
}

impl MenuState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::Main => "MAIN",
            Self::LightControl => "LIGHT_CONTROL",
            Self::Room(_) => "ROOM",
            Self::SmartSetup => "SMART_SETUP",
            Self::Password => "PASSWORD",
            Self::ChangeAdminPassword => "CHANGE_ADMIN_PASSWORD",
            Self::ChangeGuestPassword => "CHANGE_GUEST_PASSWORD",
            Self::Climate => "CLIMATE",
            Self::ClimateOnOff => "CLIMATE_ON_OFF",
            Self::SetTemperature => "SET_TEMPERATURE",
            Self::Blower => "BLOWER",
            Self::Tv => "TV",
        }
    }
}

/// Binary classification of the ambient-light reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightStatus {
    Day,
    Night,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FanDirection {
    Forward,
    Reverse,
}

impl FanDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "FORWARD",
            Self::Reverse => "REVERSE",
        }
    }
}
