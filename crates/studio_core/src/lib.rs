//! Study studio core: pure state machine and view-model helpers.
//!
//! Document registry sync, target selection and the generation job lifecycle
//! live here. IO is requested through [`Effect`]s and its results come back as
//! [`Msg`]s.
mod document;
mod effect;
mod error;
mod generation;
mod job;
mod msg;
mod registry;
mod selection;
mod state;
mod update;
mod view_model;

pub use document::{DocumentId, DocumentRecord, DocumentStatus};
pub use effect::Effect;
pub use error::{GenerationRejected, TransportError};
pub use generation::{
    Difficulty, FlashcardOptions, GeneratedArtifact, GenerationOptions, JobId, JobKind, JobReport,
    JobStatus, OptionsError, QuestionType, QuizOptions, MAX_FLASHCARDS, MAX_QUIZ_QUESTIONS,
};
pub use job::{FailureReason, JobController, JobPhase, JobTicket};
pub use msg::Msg;
pub use registry::{DocumentRegistry, PendingUpload, RegistryEntry, SnapshotOutcome, UploadId};
pub use selection::{select_target, Selection, SelectionError};
pub use state::{AppState, UploadStatus, ViewState, SUPPORTED_UPLOAD_EXTENSIONS};
pub use update::update;
pub use view_model::{AppViewModel, DocumentRowView};
