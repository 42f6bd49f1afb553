//! Demo implementations of the pipeline's external collaborators.
//!
//! The real transport and output device belong to the session layer; these
//! stand-ins are enough to run the binary end to end and to drive the
//! integration tests deterministically.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use voxlink_audio::{AudioChunk, AudioDecoder, DecodedAudio, DeviceOutput, OutboundTransport, SegmentToken};
use voxlink_foundation::PipelineError;

/// Fire-and-forget transport that only logs what would go to the session.
pub struct LoggingTransport;

impl OutboundTransport for LoggingTransport {
    fn send(&self, chunk: AudioChunk) {
        info!(
            samples = chunk.len(),
            secs = format!("{:.2}", chunk.duration_secs()),
            "chunk sent to session"
        );
    }
}

/// 16-bit little-endian PCM decoder, the common realtime-API encoding.
pub struct Pcm16Decoder {
    sample_rate: u32,
}

impl Pcm16Decoder {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }
}

impl AudioDecoder for Pcm16Decoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedAudio, PipelineError> {
        if bytes.len() % 2 != 0 {
            return Err(PipelineError::Decode(
                "odd byte length for 16-bit PCM".to_string(),
            ));
        }
        let samples = bytes
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0)
            .collect();
        Ok(DecodedAudio::new(samples, self.sample_rate))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledPlayback {
    pub token: SegmentToken,
    pub start_time: f64,
    pub end_time: f64,
}

struct VirtualOutputState {
    clock: f64,
    scheduled: Vec<ScheduledPlayback>,
}

/// Output device with a simulated clock. Segments "play" when the clock is
/// advanced past their end time; `advance_to` reports which finished so the
/// caller can feed completion events back into the pipeline.
pub struct VirtualOutput {
    state: Mutex<VirtualOutputState>,
}

impl VirtualOutput {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(VirtualOutputState {
                clock: 0.0,
                scheduled: Vec::new(),
            }),
        })
    }

    /// Move the device clock forward, returning tokens of segments that
    /// finished naturally by the new time.
    pub fn advance_to(&self, time: f64) -> Vec<SegmentToken> {
        let mut state = self.state.lock();
        if time > state.clock {
            state.clock = time;
        }
        let clock = state.clock;

        let mut finished = Vec::new();
        state.scheduled.retain(|s| {
            if s.end_time <= clock {
                finished.push(s.token);
                false
            } else {
                true
            }
        });
        finished
    }

    pub fn scheduled(&self) -> Vec<ScheduledPlayback> {
        self.state.lock().scheduled.clone()
    }
}

impl DeviceOutput for VirtualOutput {
    fn now(&self) -> f64 {
        self.state.lock().clock
    }

    fn schedule_at(&self, decoded: DecodedAudio, start_time: f64, token: SegmentToken) {
        let mut state = self.state.lock();
        state.scheduled.push(ScheduledPlayback {
            token,
            start_time,
            end_time: start_time + decoded.duration_secs(),
        });
        debug!(token = token.value(), start_time, "virtual output scheduled");
    }

    fn stop(&self, token: SegmentToken) {
        let mut state = self.state.lock();
        state.scheduled.retain(|s| s.token != token);
        debug!(token = token.value(), "virtual output stopped");
    }
}
