use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use voxlink_audio::{
    resample, AudioDecoder, AudioFrame, DeviceOutput, IngestBuffer, OutboundTransport,
    PlaybackScheduler, SegmentToken,
};
use voxlink_foundation::clock::SharedClock;
use voxlink_foundation::{ConversationPhase, ConversationTracker, PipelineError};
use voxlink_telemetry::{FpsTracker, PipelineMetrics, PipelineStage};
use voxlink_vad::{LevelMeter, VoiceGate};

use crate::config::AppConfig;

/// Everything the pipeline reacts to, delivered strictly serially. There is
/// no parallelism inside the core: capture callbacks, decode results,
/// completion signals, and control events all pass through this one queue.
#[derive(Debug)]
pub enum PipelineEvent {
    /// A raw frame from the capture source, at the device rate.
    CaptureFrame(AudioFrame),
    /// Encoded reply audio from the session.
    InboundAudio(Vec<u8>),
    /// A scheduled segment finished playing naturally.
    PlaybackFinished(SegmentToken),
    /// The session detected the user talking over the reply.
    Interrupted,
    Start,
    Stop,
}

pub struct PipelineRuntime {
    target_sample_rate: u32,
    meter: LevelMeter,
    gate: VoiceGate,
    ingest: IngestBuffer,
    scheduler: PlaybackScheduler,
    decoder: Arc<dyn AudioDecoder>,
    output: Arc<dyn DeviceOutput>,
    conversation: ConversationTracker,
    metrics: Arc<PipelineMetrics>,
    capture_fps: FpsTracker,
    started: bool,
}

impl PipelineRuntime {
    pub fn new(
        config: &AppConfig,
        clock: SharedClock,
        transport: Arc<dyn OutboundTransport>,
        output: Arc<dyn DeviceOutput>,
        decoder: Arc<dyn AudioDecoder>,
    ) -> Self {
        let metrics = Arc::new(PipelineMetrics::new());
        let ingest = IngestBuffer::new(config.ingest.to_config(), clock, transport)
            .with_metrics(metrics.clone());
        let scheduler = PlaybackScheduler::new(output.clone()).with_metrics(metrics.clone());

        Self {
            target_sample_rate: config.audio.target_sample_rate,
            meter: LevelMeter::new(),
            gate: VoiceGate::new(&config.vad),
            ingest,
            scheduler,
            decoder,
            output,
            conversation: ConversationTracker::new(),
            metrics,
            capture_fps: FpsTracker::new(),
            started: false,
        }
    }

    pub fn metrics(&self) -> Arc<PipelineMetrics> {
        self.metrics.clone()
    }

    pub fn phase(&self) -> ConversationPhase {
        self.conversation.current()
    }

    pub fn subscribe_phases(&self) -> crossbeam_channel::Receiver<ConversationPhase> {
        self.conversation.subscribe()
    }

    pub fn playback_idle(&self) -> bool {
        self.scheduler.is_empty()
    }

    pub fn handle_event(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::CaptureFrame(frame) => self.on_capture_frame(frame),
            PipelineEvent::InboundAudio(bytes) => self.on_inbound_audio(&bytes),
            PipelineEvent::PlaybackFinished(token) => self.on_playback_finished(token),
            PipelineEvent::Interrupted => self.on_interrupted(),
            PipelineEvent::Start => self.on_start(),
            PipelineEvent::Stop => self.on_stop(),
        }
    }

    /// Consume events until the channel closes. The loop is the single
    /// logical thread of control the core's invariants assume.
    pub async fn run(mut self, mut rx: mpsc::Receiver<PipelineEvent>) {
        info!("pipeline runtime started");
        while let Some(event) = rx.recv().await {
            self.handle_event(event);
        }
        info!("pipeline runtime stopped");
    }

    fn advance(&self, to: ConversationPhase) {
        if let Err(e) = self.conversation.transition(to) {
            warn!("conversation transition rejected: {}", e);
        }
    }

    fn on_start(&mut self) {
        self.gate.reset();
        self.ingest.reset();
        self.started = true;
        info!("capture started");
    }

    fn on_stop(&mut self) {
        let flushed = self.ingest.force_flush();
        self.ingest.reset();
        self.gate.reset();
        self.metrics.set_speaking(false);
        self.started = false;

        if self.conversation.current() == ConversationPhase::Listening {
            if flushed.is_some() {
                self.advance(ConversationPhase::Processing);
            } else {
                self.advance(ConversationPhase::Waiting);
            }
        }
        info!("capture stopped");
    }

    fn on_capture_frame(&mut self, frame: AudioFrame) {
        if !self.started {
            return;
        }
        if frame.is_empty() {
            warn!("{}", PipelineError::EmptyFrame { stage: "capture" });
            return;
        }

        self.metrics.increment_capture_frames();
        self.metrics.mark_stage_active(PipelineStage::Capture);
        if let Some(fps) = self.capture_fps.tick() {
            self.metrics.update_capture_fps(fps);
        }

        let rms = self.meter.rms(&frame.samples);
        self.metrics
            .update_audio_level(rms, self.meter.rms_to_dbfs(rms));

        let decision = self.gate.update(rms);
        self.metrics.set_speaking(self.gate.is_speaking());

        if decision.is_speech && self.conversation.current() == ConversationPhase::Waiting {
            self.advance(ConversationPhase::Listening);
        }

        let resampled = resample(frame, self.target_sample_rate);
        self.ingest.push(resampled, self.gate.is_speaking());
        let flushed = self.ingest.maybe_flush(decision.just_stopped_speaking);

        if decision.just_stopped_speaking
            && self.conversation.current() == ConversationPhase::Listening
        {
            // A flush deferred by the cooldown guard still goes out once the
            // guard clears; the utterance is outbound either way.
            if flushed.is_some() || self.ingest.flush_deferred() {
                self.advance(ConversationPhase::Processing);
            } else {
                // Utterance too short to send; nothing is outbound.
                self.advance(ConversationPhase::Waiting);
            }
        }
    }

    fn on_inbound_audio(&mut self, bytes: &[u8]) {
        let decoded = match self.decoder.decode(bytes) {
            Ok(decoded) => decoded,
            Err(e) => {
                // External failure; buffers and timeline stay intact.
                warn!("inbound decode failed: {}", e);
                return;
            }
        };
        if decoded.is_empty() {
            return;
        }

        let device_clock_now = self.output.now();
        let token = self.scheduler.enqueue(decoded, device_clock_now);
        debug!(token = token.value(), "reply fragment scheduled");

        if self.conversation.current() == ConversationPhase::Processing {
            self.advance(ConversationPhase::Responding);
        }
    }

    fn on_playback_finished(&mut self, token: SegmentToken) {
        if self.scheduler.on_complete(token) {
            info!("playback drained");
            if self.conversation.current() == ConversationPhase::Responding {
                self.advance(ConversationPhase::Waiting);
            }
        }
    }

    fn on_interrupted(&mut self) {
        info!("barge-in: cancelling playback");
        self.scheduler.cancel_all();
        if self.conversation.current() == ConversationPhase::Responding {
            self.advance(ConversationPhase::Waiting);
        }
    }
}
