pub mod boundary;
pub mod constants;
pub mod frame;
pub mod ingest;
pub mod playback;
pub mod resampler;

// Public API
pub use boundary::{AudioDecoder, DeviceOutput, OutboundTransport};
pub use constants::TARGET_SAMPLE_RATE_HZ;
pub use frame::{AudioChunk, AudioFrame, DecodedAudio};
pub use ingest::{IngestBuffer, IngestConfig};
pub use playback::{PlaybackScheduler, SegmentToken};
pub use resampler::resample;
