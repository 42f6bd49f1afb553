pub mod config;
pub mod gate;
pub mod level;

pub use config::GateConfig;
pub use gate::{GateDecision, GateState, VoiceGate};
pub use level::LevelMeter;
