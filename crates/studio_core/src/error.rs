use thiserror::Error;

use crate::{OptionsError, SelectionError};

/// Core-side view of any failure to reach the backend or read its answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A generation request refused before anything was sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationRejected {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("Invalid generation options: {0}")]
    Options(#[from] OptionsError),
}
