pub mod auth;
pub mod climate;
pub mod config;
pub mod lights;
pub mod menu;
pub mod protocol;
pub mod types;

pub use auth::{AttemptOutcome, AuthGate, Credential, PASS_LEN};
pub use climate::{ClimateController, ClimateOutputs};
pub use config::{ClimateConfig, NodeConfig, PanelConfig, RuntimeConfig};
pub use lights::{AnswerAction, AutomationPass, LightAutomation, NightAnswer};
pub use menu::{MenuEffect, MenuEngine, Screen};
pub use protocol::{Channel, Opcode, ProtocolError};
pub use types::{FanDirection, LightStatus, MenuState, Role};
