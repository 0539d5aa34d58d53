use std::path::PathBuf;

use crate::{DocumentId, GenerationOptions, JobId, JobKind, JobTicket, UploadId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Begin the permanent registry refresh heartbeat.
    StartRegistryHeartbeat,
    /// Stop the registry heartbeat; no snapshot may be delivered afterwards.
    StopRegistryHeartbeat,
    UploadDocument {
        upload_id: UploadId,
        path: PathBuf,
        display_name: String,
    },
    SubmitJob {
        ticket: JobTicket,
        document_id: DocumentId,
        options: GenerationOptions,
    },
    /// Poll the job until a terminal status, replacing any other job poller.
    StartJobPolling {
        ticket: JobTicket,
        kind: JobKind,
        job_id: JobId,
    },
    CancelJobPolling {
        ticket: JobTicket,
    },
}
