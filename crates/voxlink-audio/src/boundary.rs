//! Boundary traits for the pipeline's external collaborators.
//!
//! The transport, decoder, and output device live outside the core; the
//! pipeline holds them only behind these seams so tests can substitute
//! deterministic fakes.

use voxlink_foundation::PipelineError;

use crate::frame::{AudioChunk, DecodedAudio};
use crate::playback::SegmentToken;

/// Outbound path to the remote session. Fire-and-forget: the core never
/// observes the result of an individual send.
pub trait OutboundTransport: Send + Sync {
    fn send(&self, chunk: AudioChunk);
}

/// Decodes raw inbound bytes into playable samples.
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedAudio, PipelineError>;
}

/// Output device abstraction. Completion of a scheduled segment is
/// delivered back to the pipeline as an event carrying the token, never as
/// a synchronous return.
pub trait DeviceOutput: Send + Sync {
    /// Current position of the device clock, in seconds.
    fn now(&self) -> f64;

    /// Begin playing `decoded` at `start_time` on the device clock.
    fn schedule_at(&self, decoded: DecodedAudio, start_time: f64, token: SegmentToken);

    /// Stop a scheduled or playing segment immediately.
    fn stop(&self, token: SegmentToken);
}
