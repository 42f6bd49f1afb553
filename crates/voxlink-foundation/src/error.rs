use thiserror::Error;

use crate::state::ConversationPhase;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid conversation transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: ConversationPhase,
        to: ConversationPhase,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Empty audio frame rejected at {stage}")]
    EmptyFrame { stage: &'static str },

    #[error("Decode error: {0}")]
    Decode(String),
}
