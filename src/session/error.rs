use super::SessionId;
use crate::provider::PlacementError;
use thiserror::Error;

/// Bad input at call creation, reported synchronously to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid phone number {0:?}: expected 10 to 15 digits")]
    InvalidPhoneNumber(String),

    #[error("speech text cannot be empty")]
    EmptySpeechText,

    #[error("speech text too long ({len} characters, max {max})")]
    SpeechTextTooLong { len: usize, max: usize },

    #[error("speech text contains unsupported character {0:?}")]
    UnsupportedCharacter(char),

    #[error("audio reference cannot be empty")]
    EmptyAudioReference,
}

/// Errors returned by the state machine's caller-facing operations.
#[derive(Debug, Error)]
pub enum CallError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("call placement failed: {0}")]
    Placement(#[from] PlacementError),

    #[error("call session {0} not found")]
    SessionNotFound(SessionId),

    #[error("call session {0} has already been placed")]
    AlreadyPlaced(SessionId),

    #[error("call session {id} is bound to provider call {bound}, placement returned {placed}")]
    CallIdConflict {
        id: SessionId,
        bound: String,
        placed: String,
    },
}
