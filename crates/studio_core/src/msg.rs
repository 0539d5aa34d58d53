use std::path::PathBuf;

use crate::{
    DocumentId, DocumentRecord, GenerationOptions, JobId, JobReport, JobTicket, TransportError,
    UploadId,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// The view came up; start keeping the registry in sync.
    ViewOpened,
    /// The view is being torn down; stop every heartbeat.
    ViewClosed,
    /// User picked a file to upload.
    UploadRequested { path: PathBuf },
    /// Backend answered an upload.
    UploadCompleted {
        upload_id: UploadId,
        /// Newest registry tick issued when the answer arrived.
        refresh_horizon: u64,
        result: Result<DocumentId, TransportError>,
    },
    /// Registry heartbeat tick `seq` finished.
    RegistryRefreshed {
        seq: u64,
        result: Result<Vec<DocumentRecord>, TransportError>,
    },
    /// User asked for a quiz or flashcards, optionally naming the document.
    GenerateRequested {
        options: GenerationOptions,
        target: Option<DocumentId>,
    },
    /// Backend answered a job submission.
    JobSubmitted {
        ticket: JobTicket,
        result: Result<JobId, TransportError>,
    },
    /// Job heartbeat tick `seq` finished.
    JobPolled {
        ticket: JobTicket,
        seq: u64,
        result: Result<JobReport, TransportError>,
    },
    /// User abandoned the current generation request.
    CancelGeneration,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
