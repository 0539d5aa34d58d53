//! Study studio engine: backend IO, polling and effect execution.
mod backend;
mod engine;
mod poll;
mod session;
mod types;
mod wire;

pub use backend::{EngineSettings, ReqwestBackend, StudioBackend, UploadFile};
pub use engine::EngineHandle;
pub use poll::{PollControl, PollHandle, Poller};
pub use session::{SessionToken, SESSION_HEADER};
pub use types::{BackendError, EngineEvent, FailureKind};
