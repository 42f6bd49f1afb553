use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, trace};
use voxlink_foundation::clock::SharedClock;
use voxlink_telemetry::{PipelineMetrics, PipelineStage};

use crate::boundary::OutboundTransport;
use crate::frame::{AudioChunk, AudioFrame};

#[derive(Debug, Clone, Copy)]
pub struct IngestConfig {
    /// Flush once this many frames are pending, speech still ongoing or not.
    pub batch_frames: usize,
    /// Below this many pending frames a flush is suppressed as not-ready.
    pub min_frames: usize,
    /// How long the in-flight guard stays set after each flush.
    pub flush_cooldown_ms: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_frames: 20,
            min_frames: 10,
            flush_cooldown_ms: 50,
        }
    }
}

/// Accumulates gated, resampled frames and flushes them to the outbound
/// transport as one contiguous chunk.
///
/// Backpressure: at most one flush is considered in flight at a time. The
/// guard is a deadline on the injected clock rather than a timer, so frames
/// keep accumulating while it is set and tests can drive virtual time. The
/// transport gives no completion callback; the cooldown models its send
/// latency.
pub struct IngestBuffer {
    cfg: IngestConfig,
    clock: SharedClock,
    transport: Arc<dyn OutboundTransport>,
    pending: Vec<AudioFrame>,
    in_flight_until: Option<Instant>,
    // A flush condition fired while the guard was set; retry once it clears
    // even if the condition (an utterance end) does not recur.
    flush_deferred: bool,
    metrics: Option<Arc<PipelineMetrics>>,
}

impl IngestBuffer {
    pub fn new(cfg: IngestConfig, clock: SharedClock, transport: Arc<dyn OutboundTransport>) -> Self {
        Self {
            cfg,
            clock,
            transport,
            pending: Vec::new(),
            in_flight_until: None,
            flush_deferred: false,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<PipelineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Append a frame when the gate currently reports speech; frames during
    /// pure silence are dropped outright, which is the bandwidth saving the
    /// gate exists for.
    pub fn push(&mut self, frame: AudioFrame, speaking: bool) {
        if !speaking {
            trace!("dropping silent frame");
            if let Some(m) = &self.metrics {
                m.increment_silent_frames_dropped();
            }
            return;
        }
        self.pending.push(frame);
    }

    pub fn pending_frames(&self) -> usize {
        self.pending.len()
    }

    /// A flush condition fired while the guard was set; the pending chunk
    /// will go out on a later `maybe_flush` once the cooldown elapses.
    pub fn flush_deferred(&self) -> bool {
        self.flush_deferred
    }

    fn guard_active(&self) -> bool {
        matches!(self.in_flight_until, Some(deadline) if self.clock.now() < deadline)
    }

    /// Flush when a batch is full or the utterance just ended with enough
    /// buffered. Returns the flushed sample count, `None` when nothing was
    /// sent. While the in-flight guard is set no second flush triggers;
    /// pending frames are retained until the guard clears.
    pub fn maybe_flush(&mut self, just_stopped_speaking: bool) -> Option<usize> {
        let batch_ready = self.pending.len() >= self.cfg.batch_frames;
        let utterance_ready = just_stopped_speaking && self.pending.len() >= self.cfg.min_frames;
        let retry_ready = self.flush_deferred && self.pending.len() >= self.cfg.min_frames;
        if !batch_ready && !utterance_ready && !retry_ready {
            return None;
        }

        if self.guard_active() {
            debug!(
                pending = self.pending.len(),
                "flush deferred, previous send still in flight"
            );
            self.flush_deferred = true;
            if let Some(m) = &self.metrics {
                m.increment_flushes_deferred();
            }
            return None;
        }

        self.flush()
    }

    /// Flush whatever is pending regardless of batch size or guard, as on an
    /// explicit stop. Fewer than `min_frames` pending is still dropped as a
    /// not-ready chunk.
    pub fn force_flush(&mut self) -> Option<usize> {
        if self.pending.is_empty() {
            return None;
        }
        if self.pending.len() < self.cfg.min_frames {
            debug!(
                frames = self.pending.len(),
                "pending below minimum, dropping not-ready chunk"
            );
            self.pending.clear();
            return None;
        }
        self.flush()
    }

    /// Discard pending frames and clear the guard without sending anything.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.in_flight_until = None;
        self.flush_deferred = false;
    }

    fn flush(&mut self) -> Option<usize> {
        let sample_rate = self.pending.first()?.sample_rate;
        let total: usize = self.pending.iter().map(|f| f.len()).sum();

        let mut samples = Vec::with_capacity(total);
        for frame in self.pending.drain(..) {
            samples.extend(frame.samples);
        }

        let chunk = AudioChunk::new(samples, sample_rate);
        debug!(samples = chunk.len(), secs = chunk.duration_secs(), "flushing chunk");

        self.flush_deferred = false;
        self.in_flight_until =
            Some(self.clock.now() + Duration::from_millis(self.cfg.flush_cooldown_ms));

        if let Some(m) = &self.metrics {
            m.increment_chunks_sent();
            m.mark_stage_active(PipelineStage::Ingest);
        }

        let flushed = chunk.len();
        self.transport.send(chunk);
        Some(flushed)
    }
}
