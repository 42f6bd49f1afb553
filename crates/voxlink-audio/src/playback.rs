use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};
use voxlink_telemetry::{PipelineMetrics, PipelineStage};

use crate::boundary::DeviceOutput;
use crate::frame::DecodedAudio;

/// Cancellation bookkeeping handle for one scheduled segment. Tokens are
/// never compared for ordering; arrival order is what orders playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentToken(u64);

impl SegmentToken {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
struct ScheduledSegment {
    start_time: f64,
    end_time: f64,
}

/// Schedules decoded reply fragments back-to-back on the device timeline.
///
/// A single monotonic cursor (`next_start_time`) guarantees gapless,
/// non-overlapping playback: each enqueue reads the cursor, clamps it to the
/// device clock, and advances it by the segment duration in one step. The
/// whole pipeline runs on one logical thread, so the read-modify-write never
/// interleaves.
pub struct PlaybackScheduler {
    output: Arc<dyn DeviceOutput>,
    active: HashMap<SegmentToken, ScheduledSegment>,
    next_start_time: f64,
    next_token: u64,
    metrics: Option<Arc<PipelineMetrics>>,
}

impl PlaybackScheduler {
    pub fn new(output: Arc<dyn DeviceOutput>) -> Self {
        Self {
            output,
            active: HashMap::new(),
            next_start_time: 0.0,
            next_token: 0,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<PipelineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Schedule a decoded fragment at the earliest gapless position and hand
    /// it to the output device.
    pub fn enqueue(&mut self, decoded: DecodedAudio, device_clock_now: f64) -> SegmentToken {
        // Catch-up clamp: if the device clock outran the timeline (stalled
        // consumer), start now instead of in the past.
        let start_time = if device_clock_now > self.next_start_time {
            device_clock_now
        } else {
            self.next_start_time
        };
        let duration = decoded.duration_secs();

        let token = SegmentToken(self.next_token);
        self.next_token += 1;

        self.active.insert(
            token,
            ScheduledSegment {
                start_time,
                end_time: start_time + duration,
            },
        );
        self.next_start_time = start_time + duration;

        debug!(
            token = token.value(),
            start_time,
            duration,
            "segment scheduled"
        );
        if let Some(m) = &self.metrics {
            m.increment_segments_scheduled();
            m.mark_stage_active(PipelineStage::Playback);
        }

        self.output.schedule_at(decoded, start_time, token);
        token
    }

    /// Natural-completion signal from the output device. Returns `true` when
    /// this completion drained the active set. A token that is no longer
    /// active (cancelled, or completed twice) is a no-op.
    pub fn on_complete(&mut self, token: SegmentToken) -> bool {
        if self.active.remove(&token).is_none() {
            return false;
        }
        if let Some(m) = &self.metrics {
            m.increment_segments_completed();
        }
        self.active.is_empty()
    }

    /// Hard interruption: stop every pending/playing segment and reset the
    /// timeline so the next enqueue schedules immediately. Idempotent; a
    /// segment is never stopped twice because it leaves the set here.
    pub fn cancel_all(&mut self) {
        if !self.active.is_empty() {
            info!(segments = self.active.len(), "cancelling playback");
        }
        for (token, _) in self.active.drain() {
            self.output.stop(token);
            if let Some(m) = &self.metrics {
                m.increment_segments_cancelled();
            }
        }
        self.next_start_time = 0.0;
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn active_segments(&self) -> usize {
        self.active.len()
    }

    pub fn next_start_time(&self) -> f64 {
        self.next_start_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum OutputCall {
        Schedule { token: u64, start_time: f64 },
        Stop { token: u64 },
    }

    struct RecordingOutput {
        calls: Mutex<Vec<OutputCall>>,
    }

    impl RecordingOutput {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<OutputCall> {
            self.calls.lock().clone()
        }
    }

    impl DeviceOutput for RecordingOutput {
        fn now(&self) -> f64 {
            0.0
        }

        fn schedule_at(&self, _decoded: DecodedAudio, start_time: f64, token: SegmentToken) {
            self.calls.lock().push(OutputCall::Schedule {
                token: token.value(),
                start_time,
            });
        }

        fn stop(&self, token: SegmentToken) {
            self.calls.lock().push(OutputCall::Stop {
                token: token.value(),
            });
        }
    }

    fn seconds(secs: f64) -> DecodedAudio {
        DecodedAudio::new(vec![0.0; (secs * 24_000.0) as usize], 24_000)
    }

    #[test]
    fn segments_schedule_back_to_back() {
        let output = RecordingOutput::new();
        let mut scheduler = PlaybackScheduler::new(output.clone());

        scheduler.enqueue(seconds(1.0), 0.0);
        scheduler.enqueue(seconds(0.5), 0.0);
        scheduler.enqueue(seconds(0.2), 0.0);

        let starts: Vec<f64> = output
            .calls()
            .iter()
            .filter_map(|c| match c {
                OutputCall::Schedule { start_time, .. } => Some(*start_time),
                _ => None,
            })
            .collect();

        assert_eq!(starts.len(), 3);
        assert!((starts[0] - 0.0).abs() < 1e-9);
        assert!((starts[1] - 1.0).abs() < 1e-9);
        assert!((starts[2] - 1.5).abs() < 1e-9);
        assert!((scheduler.next_start_time() - 1.7).abs() < 1e-9);
    }

    #[test]
    fn device_clock_ahead_of_timeline_clamps_forward() {
        let output = RecordingOutput::new();
        let mut scheduler = PlaybackScheduler::new(output.clone());

        scheduler.enqueue(seconds(0.5), 0.0);
        // Consumer stalled: the clock is way past the cursor.
        scheduler.enqueue(seconds(0.5), 10.0);

        assert!((scheduler.next_start_time() - 10.5).abs() < 1e-9);
    }

    #[test]
    fn cancel_all_stops_everything_and_resets_the_timeline() {
        let output = RecordingOutput::new();
        let mut scheduler = PlaybackScheduler::new(output.clone());

        scheduler.enqueue(seconds(1.0), 0.0);
        scheduler.enqueue(seconds(0.5), 0.0);
        scheduler.enqueue(seconds(0.2), 0.0);

        scheduler.cancel_all();
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.next_start_time(), 0.0);

        let stops = output
            .calls()
            .iter()
            .filter(|c| matches!(c, OutputCall::Stop { .. }))
            .count();
        assert_eq!(stops, 3);

        // Next enqueue schedules at the device clock, not the old cursor.
        scheduler.enqueue(seconds(0.5), 5.0);
        let last = *output.calls().last().unwrap();
        assert_eq!(
            last,
            OutputCall::Schedule {
                token: 3,
                start_time: 5.0
            }
        );
    }

    #[test]
    fn cancel_all_on_empty_set_is_a_noop() {
        let output = RecordingOutput::new();
        let mut scheduler = PlaybackScheduler::new(output.clone());

        scheduler.cancel_all();
        scheduler.cancel_all();
        assert!(output.calls().is_empty());
        assert_eq!(scheduler.next_start_time(), 0.0);
    }

    #[test]
    fn completion_drains_the_active_set_once() {
        let output = RecordingOutput::new();
        let mut scheduler = PlaybackScheduler::new(output);

        let a = scheduler.enqueue(seconds(1.0), 0.0);
        let b = scheduler.enqueue(seconds(0.5), 0.0);

        assert!(!scheduler.on_complete(a));
        assert!(scheduler.on_complete(b));
        // Late or duplicate completion after drain is a no-op.
        assert!(!scheduler.on_complete(b));
    }

    #[test]
    fn completion_racing_cancellation_never_double_stops() {
        let output = RecordingOutput::new();
        let mut scheduler = PlaybackScheduler::new(output.clone());

        let a = scheduler.enqueue(seconds(0.2), 0.0);
        let _b = scheduler.enqueue(seconds(0.5), 0.0);

        // Segment finished naturally just before the interrupt arrived.
        scheduler.on_complete(a);
        scheduler.cancel_all();

        let stops: Vec<OutputCall> = output
            .calls()
            .into_iter()
            .filter(|c| matches!(c, OutputCall::Stop { .. }))
            .collect();
        assert_eq!(stops, vec![OutputCall::Stop { token: 1 }]);
    }
}
