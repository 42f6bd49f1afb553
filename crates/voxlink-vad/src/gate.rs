use crate::config::GateConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Silence,
    Speaking,
}

/// Per-frame classification result.
#[derive(Debug, Clone, Copy, Default)]
pub struct GateDecision {
    /// This frame's level cleared the threshold.
    pub is_speech: bool,
    /// The hangover just expired on this frame. Fires exactly once per
    /// utterance end, never on subsequent silent frames.
    pub just_stopped_speaking: bool,
}

/// Single-threshold energy gate with hangover hysteresis.
///
/// A frame above the threshold opens the gate immediately; the gate closes
/// only after `max_silence_frames` consecutive frames below it, so brief
/// dips inside an utterance do not chop the speech.
pub struct VoiceGate {
    silence_threshold: f32,
    max_silence_frames: u32,
    state: GateState,
    silence_run: u32,
}

impl VoiceGate {
    pub fn new(config: &GateConfig) -> Self {
        Self {
            silence_threshold: config.silence_threshold,
            max_silence_frames: config.max_silence_frames,
            state: GateState::Silence,
            silence_run: 0,
        }
    }

    pub fn update(&mut self, level: f32) -> GateDecision {
        if level > self.silence_threshold {
            self.silence_run = 0;
            self.state = GateState::Speaking;
            return GateDecision {
                is_speech: true,
                just_stopped_speaking: false,
            };
        }

        self.silence_run = self.silence_run.saturating_add(1);
        let just_stopped =
            self.state == GateState::Speaking && self.silence_run >= self.max_silence_frames;
        if just_stopped {
            self.state = GateState::Silence;
        }

        GateDecision {
            is_speech: false,
            just_stopped_speaking: just_stopped,
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.state == GateState::Speaking
    }

    pub fn current_state(&self) -> GateState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = GateState::Silence;
        self.silence_run = 0;
    }
}
