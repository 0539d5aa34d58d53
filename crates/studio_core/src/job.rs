//! Generation job controller.
//!
//! Each accepted request gets a fresh [`JobTicket`]; responses are matched
//! against the ticket of the current phase and dropped otherwise, so at most one
//! job is ever tracked and a superseded or cancelled job cannot change state.
use crate::{
    DocumentId, DocumentRegistry, DocumentStatus, Effect, GeneratedArtifact, GenerationOptions,
    JobId, JobKind, JobReport, JobStatus, Selection, TransportError,
};

/// Client-generated key for one accepted generation request.
pub type JobTicket = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The backend reported `FAILED` for the job.
    Backend,
    /// Polling could not reach the backend or read its answer.
    Transport(String),
    /// The awaited document failed processing.
    DocumentFailed(DocumentId),
    /// The awaited document is no longer listed for this session.
    DocumentMissing(DocumentId),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JobPhase {
    #[default]
    Idle,
    AwaitingDocument {
        ticket: JobTicket,
        document_id: DocumentId,
        options: GenerationOptions,
    },
    Submitting {
        ticket: JobTicket,
        document_id: DocumentId,
        kind: JobKind,
    },
    Polling {
        ticket: JobTicket,
        document_id: DocumentId,
        kind: JobKind,
        job_id: JobId,
        status: JobStatus,
        last_seq: Option<u64>,
    },
    Ready {
        ticket: JobTicket,
        job_id: JobId,
        artifact: GeneratedArtifact,
    },
    Failed {
        ticket: JobTicket,
        kind: JobKind,
        job_id: Option<JobId>,
        reason: FailureReason,
    },
    SubmitFailed {
        ticket: JobTicket,
        kind: JobKind,
        message: String,
    },
    Cancelled {
        ticket: JobTicket,
        kind: JobKind,
    },
}

impl JobPhase {
    pub fn ticket(&self) -> Option<JobTicket> {
        match self {
            JobPhase::Idle => None,
            JobPhase::AwaitingDocument { ticket, .. }
            | JobPhase::Submitting { ticket, .. }
            | JobPhase::Polling { ticket, .. }
            | JobPhase::Ready { ticket, .. }
            | JobPhase::Failed { ticket, .. }
            | JobPhase::SubmitFailed { ticket, .. }
            | JobPhase::Cancelled { ticket, .. } => Some(*ticket),
        }
    }

    pub fn kind(&self) -> Option<JobKind> {
        match self {
            JobPhase::Idle => None,
            JobPhase::AwaitingDocument { options, .. } => Some(options.kind()),
            JobPhase::Ready { artifact, .. } => Some(artifact.kind),
            JobPhase::Submitting { kind, .. }
            | JobPhase::Polling { kind, .. }
            | JobPhase::Failed { kind, .. }
            | JobPhase::SubmitFailed { kind, .. }
            | JobPhase::Cancelled { kind, .. } => Some(*kind),
        }
    }

    /// True until a terminal outcome (or cancellation) is reached.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            JobPhase::AwaitingDocument { .. }
                | JobPhase::Submitting { .. }
                | JobPhase::Polling { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobController {
    phase: JobPhase,
    last_ticket: JobTicket,
}

impl JobController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &JobPhase {
        &self.phase
    }

    /// Starts tracking a new request, superseding whatever was tracked before.
    pub fn begin(
        &mut self,
        selection: Selection,
        options: GenerationOptions,
    ) -> (JobTicket, Vec<Effect>) {
        let mut effects = self.stop_polling();
        self.last_ticket += 1;
        let ticket = self.last_ticket;

        match selection {
            Selection::Ready(document_id) => {
                self.phase = JobPhase::Submitting {
                    ticket,
                    document_id: document_id.clone(),
                    kind: options.kind(),
                };
                effects.push(Effect::SubmitJob {
                    ticket,
                    document_id,
                    options,
                });
            }
            Selection::NotYetProcessed(document_id) => {
                self.phase = JobPhase::AwaitingDocument {
                    ticket,
                    document_id,
                    options,
                };
            }
        }
        (ticket, effects)
    }

    /// Re-evaluates a request waiting for its document after a snapshot was applied.
    pub fn on_registry_updated(&mut self, registry: &DocumentRegistry) -> Option<Vec<Effect>> {
        let JobPhase::AwaitingDocument {
            ticket,
            document_id,
            options,
        } = &self.phase
        else {
            return None;
        };
        let ticket = *ticket;

        match registry.get(document_id).map(|entry| entry.status()) {
            Some(DocumentStatus::Uploaded | DocumentStatus::Processing) => None,
            Some(DocumentStatus::Processed) => {
                let document_id = document_id.clone();
                let options = options.clone();
                self.phase = JobPhase::Submitting {
                    ticket,
                    document_id: document_id.clone(),
                    kind: options.kind(),
                };
                Some(vec![Effect::SubmitJob {
                    ticket,
                    document_id,
                    options,
                }])
            }
            Some(DocumentStatus::Failed) => {
                self.phase = JobPhase::Failed {
                    ticket,
                    kind: options.kind(),
                    job_id: None,
                    reason: FailureReason::DocumentFailed(document_id.clone()),
                };
                Some(Vec::new())
            }
            None => {
                self.phase = JobPhase::Failed {
                    ticket,
                    kind: options.kind(),
                    job_id: None,
                    reason: FailureReason::DocumentMissing(document_id.clone()),
                };
                Some(Vec::new())
            }
        }
    }

    /// Applies the answer to a submission. Returns `None` when the answer
    /// belongs to a request that is no longer tracked.
    pub fn on_submitted(
        &mut self,
        ticket: JobTicket,
        result: Result<JobId, TransportError>,
    ) -> Option<Vec<Effect>> {
        let (document_id, kind) = match &self.phase {
            JobPhase::Submitting {
                ticket: current,
                document_id,
                kind,
            } if *current == ticket => (document_id.clone(), *kind),
            _ => return None,
        };

        match result {
            Ok(job_id) => {
                self.phase = JobPhase::Polling {
                    ticket,
                    document_id,
                    kind,
                    job_id: job_id.clone(),
                    status: JobStatus::Pending,
                    last_seq: None,
                };
                Some(vec![Effect::StartJobPolling {
                    ticket,
                    kind,
                    job_id,
                }])
            }
            Err(err) => {
                self.phase = JobPhase::SubmitFailed {
                    ticket,
                    kind,
                    message: err.to_string(),
                };
                Some(Vec::new())
            }
        }
    }

    /// Applies the response of polling tick `seq`. Returns `None` when the
    /// response belongs to a job that is no longer tracked, or is a progress
    /// report older than one already applied.
    ///
    /// Terminal outcomes end the job whatever their tick: the poller stops on
    /// them, so a late one is the last answer that will ever arrive.
    pub fn on_polled(
        &mut self,
        ticket: JobTicket,
        seq: u64,
        result: Result<JobReport, TransportError>,
    ) -> Option<Vec<Effect>> {
        let JobPhase::Polling {
            ticket: current,
            kind,
            job_id,
            status,
            last_seq,
            ..
        } = &mut self.phase
        else {
            return None;
        };
        if *current != ticket {
            return None;
        }
        let (kind, job_id) = (*kind, job_id.clone());

        let phase = match result {
            Ok(report @ (JobReport::Pending | JobReport::InProgress)) => {
                if last_seq.is_some_and(|last| seq <= last) {
                    return None;
                }
                *status = report.status();
                *last_seq = Some(seq);
                return Some(Vec::new());
            }
            Ok(JobReport::Ready(items)) => JobPhase::Ready {
                ticket,
                job_id,
                artifact: GeneratedArtifact { kind, items },
            },
            Ok(JobReport::Failed) => JobPhase::Failed {
                ticket,
                kind,
                job_id: Some(job_id),
                reason: FailureReason::Backend,
            },
            Err(err) => JobPhase::Failed {
                ticket,
                kind,
                job_id: Some(job_id),
                reason: FailureReason::Transport(err.to_string()),
            },
        };
        self.phase = phase;
        Some(vec![Effect::CancelJobPolling { ticket }])
    }

    /// Stops tracking the current request. Returns `None` when nothing is active.
    pub fn cancel(&mut self) -> Option<Vec<Effect>> {
        if !self.phase.is_active() {
            return None;
        }
        let ticket = self.phase.ticket()?;
        let kind = self.phase.kind()?;
        let effects = self.stop_polling();
        self.phase = JobPhase::Cancelled { ticket, kind };
        Some(effects)
    }

    fn stop_polling(&self) -> Vec<Effect> {
        match &self.phase {
            JobPhase::Polling { ticket, .. } => vec![Effect::CancelJobPolling { ticket: *ticket }],
            _ => Vec::new(),
        }
    }
}
