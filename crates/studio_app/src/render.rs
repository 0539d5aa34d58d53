use std::fmt::Write;

use studio_core::{AppViewModel, DocumentRowView, ViewState};

/// Plain-text rendering of the view model for the terminal.
pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    let session_label = match view.view_state {
        ViewState::Idle => "Idle",
        ViewState::Live => "Live",
        ViewState::Closed => "Closed",
    };
    let _ = writeln!(
        out,
        "== Session: {} | Documents: {} ==",
        session_label,
        view.documents.len()
    );

    if view.documents.is_empty() {
        out.push_str("  (no documents yet)\n");
    }
    for row in &view.documents {
        out.push_str(&document_line(row));
        out.push('\n');
    }

    if view.refresh_failures > 0 {
        let _ = writeln!(
            out,
            "  ! document list out of date ({} failed refreshes)",
            view.refresh_failures
        );
    }
    if let Some(status) = &view.upload_status {
        let _ = writeln!(out, "Upload: {status}");
    }
    if let Some(status) = &view.generation_status {
        let _ = writeln!(out, "Generation: {status}");
    }
    if let Some(artifact) = &view.artifact {
        let _ = writeln!(out, "{} ({} items):", artifact.kind.title(), artifact.items.len());
        for (index, item) in artifact.items.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", index + 1, item);
        }
    }
    out
}

fn document_line(row: &DocumentRowView) -> String {
    let mut line = format!(
        "  [{:<10}] {} ({})",
        row.status.as_str(),
        row.display_name,
        row.document_id
    );
    if row.pending {
        line.push_str(" pending");
    } else if row.quality_score > 0 {
        let _ = write!(line, " quality {}", row.quality_score);
    }
    line
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use studio_core::{DocumentId, DocumentStatus};

    use super::*;

    #[test]
    fn renders_rows_and_statuses() {
        let view = AppViewModel {
            view_state: ViewState::Live,
            documents: vec![
                DocumentRowView {
                    document_id: DocumentId::new("d1"),
                    display_name: "notes.pdf".to_string(),
                    status: DocumentStatus::Processed,
                    quality_score: 8,
                    pending: false,
                },
                DocumentRowView {
                    document_id: DocumentId::new("d2"),
                    display_name: "draft.txt".to_string(),
                    status: DocumentStatus::Uploaded,
                    quality_score: 0,
                    pending: true,
                },
            ],
            upload_status: Some("File uploaded successfully. Processing...".to_string()),
            generation_status: Some("Generating quiz...".to_string()),
            ..AppViewModel::default()
        };

        assert_eq!(
            render(&view),
            "== Session: Live | Documents: 2 ==\n\
             \x20 [PROCESSED ] notes.pdf (d1) quality 8\n\
             \x20 [UPLOADED  ] draft.txt (d2) pending\n\
             Upload: File uploaded successfully. Processing...\n\
             Generation: Generating quiz...\n"
        );
    }

    #[test]
    fn empty_registry_is_called_out() {
        let text = render(&AppViewModel::default());
        assert!(text.contains("(no documents yet)"));
        assert!(text.starts_with("== Session: Idle"));
    }
}
