use std::path::Path;

use serde::{Deserialize, Serialize};
use voxlink_audio::{IngestConfig, TARGET_SAMPLE_RATE_HZ};
use voxlink_foundation::PipelineError;
use voxlink_vad::GateConfig;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Rate all outbound chunks are resampled to (Hz).
    pub target_sample_rate: u32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            target_sample_rate: TARGET_SAMPLE_RATE_HZ,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    pub batch_frames: usize,
    pub min_frames: usize,
    pub flush_cooldown_ms: u64,
}

impl Default for IngestSettings {
    fn default() -> Self {
        let cfg = IngestConfig::default();
        Self {
            batch_frames: cfg.batch_frames,
            min_frames: cfg.min_frames,
            flush_cooldown_ms: cfg.flush_cooldown_ms,
        }
    }
}

impl IngestSettings {
    pub fn to_config(self) -> IngestConfig {
        IngestConfig {
            batch_frames: self.batch_frames,
            min_frames: self.min_frames,
            flush_cooldown_ms: self.flush_cooldown_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub audio: AudioSettings,
    pub vad: GateConfig,
    pub ingest: IngestSettings,
}

impl AppConfig {
    /// Load from a TOML file, falling back to defaults for any field the
    /// file omits. No path means all defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("reading {}: {}", path.display(), e)))?;
        toml::from_str(&raw)
            .map_err(|e| PipelineError::Config(format!("parsing {}: {}", path.display(), e)))
    }
}
