use thiserror::Error;

use crate::{DocumentId, DocumentRegistry, DocumentStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The document is processed and a job can be submitted now.
    Ready(DocumentId),
    /// An explicitly named document that is still being processed.
    NotYetProcessed(DocumentId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("No documents are processed and ready for use.")]
    NothingReady,
    #[error("Document {0} was not found.")]
    UnknownDocument(DocumentId),
    #[error("Document processing failed.")]
    DocumentFailed(DocumentId),
}

/// Picks the document a generation request applies to.
///
/// Without an explicit target this is the last `PROCESSED` record in registry
/// order.
pub fn select_target(
    registry: &DocumentRegistry,
    explicit: Option<&DocumentId>,
) -> Result<Selection, SelectionError> {
    match explicit {
        None => registry
            .processed()
            .last()
            .map(|record| Selection::Ready(record.id.clone()))
            .ok_or(SelectionError::NothingReady),
        Some(id) => {
            let entry = registry
                .get(id)
                .ok_or_else(|| SelectionError::UnknownDocument(id.clone()))?;
            match entry.status() {
                DocumentStatus::Processed => Ok(Selection::Ready(id.clone())),
                DocumentStatus::Failed => Err(SelectionError::DocumentFailed(id.clone())),
                DocumentStatus::Uploaded | DocumentStatus::Processing => {
                    Ok(Selection::NotYetProcessed(id.clone()))
                }
            }
        }
    }
}
