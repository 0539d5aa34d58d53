use std::fmt;

use studio_core::{DocumentId, DocumentRecord, JobId, JobReport, JobTicket, UploadId};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    RegistryRefreshed {
        seq: u64,
        result: Result<Vec<DocumentRecord>, BackendError>,
    },
    UploadCompleted {
        upload_id: UploadId,
        /// Newest registry tick issued when the backend acknowledged the upload.
        refresh_horizon: u64,
        result: Result<DocumentId, BackendError>,
    },
    JobSubmitted {
        ticket: JobTicket,
        result: Result<JobId, BackendError>,
    },
    JobPolled {
        ticket: JobTicket,
        seq: u64,
        result: Result<JobReport, BackendError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct BackendError {
    pub kind: FailureKind,
    pub message: String,
}

impl BackendError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Failures that may clear up on their own: timeouts, connection trouble
    /// and 5xx answers.
    pub fn is_transient(&self) -> bool {
        match self.kind {
            FailureKind::Timeout | FailureKind::Network => true,
            FailureKind::HttpStatus(code) => (500..600).contains(&code),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "unexpected response body"),
            FailureKind::Io => write!(f, "file error"),
        }
    }
}
