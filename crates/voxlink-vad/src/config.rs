use serde::{Deserialize, Serialize};

/// Gate tuning. The defaults are empirical starting points for ordinary
/// ambient noise; both knobs are meant to be overridden from configuration
/// rather than matched exactly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// RMS level above which a frame counts as speech.
    pub silence_threshold: f32,
    /// Consecutive sub-threshold frames required before leaving the
    /// speaking state (hangover).
    pub max_silence_frames: u32,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            silence_threshold: 0.01,
            max_silence_frames: 30,
        }
    }
}
