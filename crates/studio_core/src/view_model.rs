use crate::{
    AppState, DocumentId, DocumentRegistry, DocumentStatus, FailureReason, GeneratedArtifact,
    JobPhase, UploadStatus, ViewState,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub view_state: ViewState,
    pub documents: Vec<DocumentRowView>,
    pub upload_status: Option<String>,
    pub generation_status: Option<String>,
    pub artifact: Option<GeneratedArtifact>,
    pub refresh_failures: u32,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRowView {
    pub document_id: DocumentId,
    pub display_name: String,
    pub status: DocumentStatus,
    pub quality_score: i64,
    /// Not yet listed by the backend.
    pub pending: bool,
}

pub(crate) fn build(state: &AppState) -> AppViewModel {
    let registry = state.registry();
    let documents = registry
        .entries()
        .iter()
        .map(|entry| {
            let record = entry.to_record();
            DocumentRowView {
                document_id: record.id,
                display_name: record.display_name,
                status: record.status,
                quality_score: record.quality_score,
                pending: entry.is_pending(),
            }
        })
        .collect();

    let phase = state.jobs().phase();
    let generation_status = match state.rejection() {
        Some(rejection) => Some(rejection.to_string()),
        None => phase_status(phase, registry),
    };
    let artifact = match phase {
        JobPhase::Ready { artifact, .. } => Some(artifact.clone()),
        _ => None,
    };

    AppViewModel {
        view_state: state.view_state(),
        documents,
        upload_status: state.upload_status().map(upload_status_text),
        generation_status,
        artifact,
        refresh_failures: registry.consecutive_failures(),
        dirty: false,
    }
}

fn upload_status_text(status: &UploadStatus) -> String {
    match status {
        UploadStatus::Uploading { display_name } => format!("Uploading {display_name}..."),
        UploadStatus::Uploaded { .. } => "File uploaded successfully. Processing...".to_string(),
        UploadStatus::Failed { message, .. } => format!("File upload failed. ({message})"),
        UploadStatus::Unsupported { display_name } => {
            format!("Unsupported file type: {display_name}")
        }
    }
}

fn phase_status(phase: &JobPhase, registry: &DocumentRegistry) -> Option<String> {
    let text = match phase {
        JobPhase::Idle => return None,
        JobPhase::AwaitingDocument { document_id, .. } => {
            let name = registry
                .get(document_id)
                .map(|entry| entry.display_name().to_string())
                .unwrap_or_else(|| document_id.to_string());
            format!("Waiting for {name} to finish processing...")
        }
        JobPhase::Submitting { kind, .. } => format!("Generating {kind}..."),
        JobPhase::Polling { status, .. } => {
            format!("Generation in progress... Status: {status}")
        }
        JobPhase::Ready { artifact, .. } => {
            format!("{} generated successfully.", artifact.kind.title())
        }
        JobPhase::Failed { kind, reason, .. } => match reason {
            FailureReason::Backend => format!("Failed to generate {kind}."),
            FailureReason::Transport(_) => format!("Error checking {kind} status."),
            FailureReason::DocumentFailed(_) => "Document processing failed.".to_string(),
            FailureReason::DocumentMissing(document_id) => {
                format!("Document {document_id} was not found.")
            }
        },
        JobPhase::SubmitFailed { kind, .. } => format!("Failed to start {kind} generation."),
        JobPhase::Cancelled { kind, .. } => format!("{} generation cancelled.", kind.title()),
    };
    Some(text)
}
