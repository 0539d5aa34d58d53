use std::collections::BTreeMap;
use std::path::Path;

use crate::view_model::{self, AppViewModel};
use crate::{
    DocumentId, DocumentRegistry, GenerationRejected, JobController, PendingUpload, UploadId,
};

/// File extensions the upload picker accepts.
pub const SUPPORTED_UPLOAD_EXTENSIONS: [&str; 3] = ["pdf", "docx", "txt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Live,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Uploading { display_name: String },
    Uploaded { display_name: String, document_id: DocumentId },
    Failed { display_name: String, message: String },
    Unsupported { display_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    view_state: ViewState,
    registry: DocumentRegistry,
    jobs: JobController,
    uploads_in_flight: BTreeMap<UploadId, String>,
    last_upload_id: UploadId,
    upload_status: Option<UploadStatus>,
    rejection: Option<GenerationRejected>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        view_model::build(self)
    }

    pub fn view_state(&self) -> ViewState {
        self.view_state
    }

    pub fn registry(&self) -> &DocumentRegistry {
        &self.registry
    }

    pub fn jobs(&self) -> &JobController {
        &self.jobs
    }

    pub fn upload_status(&self) -> Option<&UploadStatus> {
        self.upload_status.as_ref()
    }

    pub fn rejection(&self) -> Option<&GenerationRejected> {
        self.rejection.as_ref()
    }

    pub fn uploads_in_flight(&self) -> usize {
        self.uploads_in_flight.len()
    }

    /// Returns whether anything visible changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_view_state(&mut self, view_state: ViewState) {
        self.view_state = view_state;
        self.mark_dirty();
    }

    pub(crate) fn registry_mut(&mut self) -> &mut DocumentRegistry {
        &mut self.registry
    }

    pub(crate) fn jobs_mut(&mut self) -> &mut JobController {
        &mut self.jobs
    }

    pub(crate) fn registry_and_jobs_mut(&mut self) -> (&DocumentRegistry, &mut JobController) {
        (&self.registry, &mut self.jobs)
    }

    pub(crate) fn set_rejection(&mut self, rejection: Option<GenerationRejected>) {
        self.rejection = rejection;
        self.mark_dirty();
    }

    pub(crate) fn set_upload_status(&mut self, status: UploadStatus) {
        self.upload_status = Some(status);
        self.mark_dirty();
    }

    /// Allocates an upload id for `display_name` and tracks it until answered.
    pub(crate) fn begin_upload(&mut self, display_name: &str) -> UploadId {
        self.last_upload_id += 1;
        let upload_id = self.last_upload_id;
        self.uploads_in_flight
            .insert(upload_id, display_name.to_string());
        self.set_upload_status(UploadStatus::Uploading {
            display_name: display_name.to_string(),
        });
        upload_id
    }

    pub(crate) fn finish_upload(&mut self, upload_id: UploadId) -> Option<String> {
        self.uploads_in_flight.remove(&upload_id)
    }

    pub(crate) fn record_optimistic_upload(&mut self, pending: PendingUpload) {
        if self.registry.record_optimistic_upload(pending) {
            self.mark_dirty();
        }
    }
}

/// Name shown for `path` and whether its extension is accepted for upload.
pub(crate) fn describe_upload(path: &Path) -> (String, bool) {
    let display_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let supported = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_UPLOAD_EXTENSIONS
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        });
    (display_name, supported && path.file_name().is_some())
}
