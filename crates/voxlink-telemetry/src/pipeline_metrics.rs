use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Capture,
    Ingest,
    Playback,
}

/// Shared metrics for cross-thread pipeline monitoring.
///
/// Everything is an atomic behind an `Arc` so the hot audio path never takes
/// a lock to record a counter.
#[derive(Clone)]
pub struct PipelineMetrics {
    // Audio level monitoring
    pub current_rms: Arc<AtomicU64>,    // RMS * 1000 for precision
    pub audio_level_db: Arc<AtomicI64>, // dBFS * 10

    // Pipeline stage tracking
    pub stage_capture: Arc<AtomicBool>,
    pub stage_ingest: Arc<AtomicBool>,
    pub stage_playback: Arc<AtomicBool>,

    // Ingest path counters
    pub capture_frames: Arc<AtomicU64>,
    pub silent_frames_dropped: Arc<AtomicU64>,
    pub chunks_sent: Arc<AtomicU64>,
    pub flushes_deferred: Arc<AtomicU64>,

    // Egress path counters
    pub segments_scheduled: Arc<AtomicU64>,
    pub segments_completed: Arc<AtomicU64>,
    pub segments_cancelled: Arc<AtomicU64>,

    // Frame rate tracking
    pub capture_fps: Arc<AtomicU64>, // Frames per second * 10

    // Activity indicators
    pub is_speaking: Arc<AtomicBool>,
    pub last_speech_time: Arc<RwLock<Option<Instant>>>,
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self {
            current_rms: Arc::new(AtomicU64::new(0)),
            audio_level_db: Arc::new(AtomicI64::new(-1000)),

            stage_capture: Arc::new(AtomicBool::new(false)),
            stage_ingest: Arc::new(AtomicBool::new(false)),
            stage_playback: Arc::new(AtomicBool::new(false)),

            capture_frames: Arc::new(AtomicU64::new(0)),
            silent_frames_dropped: Arc::new(AtomicU64::new(0)),
            chunks_sent: Arc::new(AtomicU64::new(0)),
            flushes_deferred: Arc::new(AtomicU64::new(0)),

            segments_scheduled: Arc::new(AtomicU64::new(0)),
            segments_completed: Arc::new(AtomicU64::new(0)),
            segments_cancelled: Arc::new(AtomicU64::new(0)),

            capture_fps: Arc::new(AtomicU64::new(0)),

            is_speaking: Arc::new(AtomicBool::new(false)),
            last_speech_time: Arc::new(RwLock::new(None)),
        }
    }
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_capture_frames(&self) {
        self.capture_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_silent_frames_dropped(&self) {
        self.silent_frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_chunks_sent(&self) {
        self.chunks_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_flushes_deferred(&self) {
        self.flushes_deferred.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_segments_scheduled(&self) {
        self.segments_scheduled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_segments_completed(&self) {
        self.segments_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_segments_cancelled(&self) {
        self.segments_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn update_audio_level(&self, rms: f32, dbfs: f32) {
        self.current_rms
            .store((rms * 1000.0) as u64, Ordering::Relaxed);
        self.audio_level_db
            .store((dbfs * 10.0) as i64, Ordering::Relaxed);
    }

    pub fn update_capture_fps(&self, fps: f64) {
        self.capture_fps.store((fps * 10.0) as u64, Ordering::Relaxed);
    }

    pub fn set_speaking(&self, speaking: bool) {
        self.is_speaking.store(speaking, Ordering::Relaxed);
        if speaking {
            *self.last_speech_time.write() = Some(Instant::now());
        }
    }

    pub fn mark_stage_active(&self, stage: PipelineStage) {
        match stage {
            PipelineStage::Capture => self.stage_capture.store(true, Ordering::Relaxed),
            PipelineStage::Ingest => self.stage_ingest.store(true, Ordering::Relaxed),
            PipelineStage::Playback => self.stage_playback.store(true, Ordering::Relaxed),
        }
    }
}
