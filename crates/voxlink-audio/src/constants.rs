//! Shared audio constants for the pipeline.

/// Rate every outbound chunk is resampled to before transmission (Hz).
pub const TARGET_SAMPLE_RATE_HZ: u32 = 16_000;
