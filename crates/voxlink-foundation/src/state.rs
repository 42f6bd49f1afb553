use crate::error::PipelineError;
use crossbeam_channel::{Receiver, Sender};
use parking_lot::RwLock;
use std::sync::Arc;

/// Conversation status derived from the two audio paths. The tracker holds
/// no timers of its own; every transition is driven by a pipeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationPhase {
    /// Idle, microphone open, nothing buffered.
    Waiting,
    /// Speech frames are being gated into the ingest buffer.
    Listening,
    /// An utterance chunk was sent; the session has not replied yet.
    Processing,
    /// Decoded reply audio is scheduled or playing.
    Responding,
}

pub struct ConversationTracker {
    phase: Arc<RwLock<ConversationPhase>>,
    phase_tx: Sender<ConversationPhase>,
    phase_rx: Receiver<ConversationPhase>,
}

impl Default for ConversationTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationTracker {
    pub fn new() -> Self {
        let (phase_tx, phase_rx) = crossbeam_channel::unbounded();
        Self {
            phase: Arc::new(RwLock::new(ConversationPhase::Waiting)),
            phase_tx,
            phase_rx,
        }
    }

    pub fn transition(&self, new_phase: ConversationPhase) -> Result<(), PipelineError> {
        let mut current = self.phase.write();

        if *current == new_phase {
            return Ok(());
        }

        // Listening/Processing may fall back to Waiting when an utterance was
        // suppressed as not-ready or playback was cancelled before it began.
        let valid = matches!(
            (&*current, &new_phase),
            (ConversationPhase::Waiting, ConversationPhase::Listening)
                | (ConversationPhase::Listening, ConversationPhase::Processing)
                | (ConversationPhase::Listening, ConversationPhase::Waiting)
                | (ConversationPhase::Processing, ConversationPhase::Responding)
                | (ConversationPhase::Processing, ConversationPhase::Waiting)
                | (ConversationPhase::Responding, ConversationPhase::Waiting)
        );

        if !valid {
            return Err(PipelineError::InvalidTransition {
                from: *current,
                to: new_phase,
            });
        }

        tracing::info!("Conversation transition: {:?} -> {:?}", *current, new_phase);
        *current = new_phase;
        let _ = self.phase_tx.send(new_phase);
        Ok(())
    }

    pub fn current(&self) -> ConversationPhase {
        *self.phase.read()
    }

    pub fn subscribe(&self) -> Receiver<ConversationPhase> {
        self.phase_rx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_turn_cycle_is_valid() {
        let tracker = ConversationTracker::new();
        assert_eq!(tracker.current(), ConversationPhase::Waiting);

        tracker.transition(ConversationPhase::Listening).unwrap();
        tracker.transition(ConversationPhase::Processing).unwrap();
        tracker.transition(ConversationPhase::Responding).unwrap();
        tracker.transition(ConversationPhase::Waiting).unwrap();
    }

    #[test]
    fn skipping_phases_is_rejected() {
        let tracker = ConversationTracker::new();
        let err = tracker
            .transition(ConversationPhase::Responding)
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidTransition { .. }));
        assert_eq!(tracker.current(), ConversationPhase::Waiting);
    }

    #[test]
    fn same_phase_transition_is_a_noop() {
        let tracker = ConversationTracker::new();
        tracker.transition(ConversationPhase::Waiting).unwrap();
        assert_eq!(tracker.current(), ConversationPhase::Waiting);
    }

    #[test]
    fn subscribers_observe_transitions() {
        let tracker = ConversationTracker::new();
        let rx = tracker.subscribe();

        tracker.transition(ConversationPhase::Listening).unwrap();
        tracker.transition(ConversationPhase::Processing).unwrap();

        assert_eq!(rx.try_recv().unwrap(), ConversationPhase::Listening);
        assert_eq!(rx.try_recv().unwrap(), ConversationPhase::Processing);
    }
}
