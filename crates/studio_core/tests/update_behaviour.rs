use std::path::PathBuf;
use std::sync::Once;

use pretty_assertions::assert_eq;
use studio_core::{
    update, AppState, DocumentId, DocumentRecord, DocumentStatus, Effect, Msg, TransportError,
    UploadStatus, ViewState,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(studio_logging::initialize_for_tests);
}

fn record(id: &str, status: DocumentStatus) -> DocumentRecord {
    DocumentRecord {
        id: DocumentId::new(id),
        display_name: format!("{id}.pdf"),
        status,
        quality_score: 0,
    }
}

fn refreshed(state: AppState, seq: u64, docs: Vec<DocumentRecord>) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::RegistryRefreshed {
            seq,
            result: Ok(docs),
        },
    )
}

fn open_view() -> AppState {
    let (state, effects) = update(AppState::new(), Msg::ViewOpened);
    assert_eq!(effects, vec![Effect::StartRegistryHeartbeat]);
    state
}

fn request_upload(state: AppState, path: &str) -> (AppState, u64) {
    let (state, effects) = update(
        state,
        Msg::UploadRequested {
            path: PathBuf::from(path),
        },
    );
    let upload_id = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::UploadDocument { upload_id, .. } => Some(*upload_id),
            _ => None,
        })
        .expect("upload effect");
    (state, upload_id)
}

#[test]
fn view_open_starts_heartbeat_once() {
    init_logging();
    let mut state = open_view();
    assert_eq!(state.view().view_state, ViewState::Live);
    assert!(state.consume_dirty());

    let (state, effects) = update(state, Msg::ViewOpened);
    assert!(effects.is_empty());
    assert_eq!(state.view_state(), ViewState::Live);
}

#[test]
fn refresh_replaces_registry_wholesale() {
    init_logging();
    let state = open_view();
    let (state, _) = refreshed(
        state,
        1,
        vec![
            record("a", DocumentStatus::Uploaded),
            record("b", DocumentStatus::Processing),
        ],
    );
    let (mut state, effects) = refreshed(state, 2, vec![record("b", DocumentStatus::Processed)]);

    assert!(effects.is_empty());
    assert!(state.consume_dirty());
    assert_eq!(
        state.registry().records(),
        vec![record("b", DocumentStatus::Processed)]
    );
}

#[test]
fn refresh_is_idempotent_for_unchanged_backend() {
    init_logging();
    let docs = vec![
        record("1", DocumentStatus::Processed),
        record("2", DocumentStatus::Uploaded),
    ];
    let (state, _) = refreshed(open_view(), 1, docs.clone());
    let first = state.registry().records();

    let mut state = state;
    for seq in 2..6 {
        let (next, _) = refreshed(state, seq, docs.clone());
        state = next;
        assert_eq!(state.registry().records(), first);
    }
    assert_eq!(state.view().documents.len(), 2);
}

#[test]
fn refresh_failure_keeps_cached_registry() {
    init_logging();
    let (state, _) = refreshed(open_view(), 1, vec![record("a", DocumentStatus::Processed)]);
    let before = state.registry().records();

    let (state, effects) = update(
        state,
        Msg::RegistryRefreshed {
            seq: 2,
            result: Err(TransportError::new("connection refused")),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.registry().records(), before);
    assert_eq!(state.view().refresh_failures, 1);

    let (state, _) = refreshed(state, 3, before.clone());
    assert_eq!(state.view().refresh_failures, 0);
}

#[test]
fn out_of_order_snapshot_is_discarded() {
    init_logging();
    let (state, _) = refreshed(open_view(), 5, vec![record("a", DocumentStatus::Processed)]);
    let (mut state, _) = update(state, Msg::Tick);
    state.consume_dirty();

    let (mut state, _) = refreshed(state, 4, vec![record("a", DocumentStatus::Processing)]);

    assert!(!state.consume_dirty());
    assert_eq!(
        state.registry().records(),
        vec![record("a", DocumentStatus::Processed)]
    );
}

#[test]
fn upload_appends_optimistic_record() {
    init_logging();
    let (state, _) = refreshed(open_view(), 1, vec![record("a", DocumentStatus::Processed)]);
    let (state, upload_id) = request_upload(state, "/tmp/notes.pdf");
    assert_eq!(
        state.view().upload_status.as_deref(),
        Some("Uploading notes.pdf...")
    );

    let (state, effects) = update(
        state,
        Msg::UploadCompleted {
            upload_id,
            refresh_horizon: 1,
            result: Ok(DocumentId::new("n1")),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.documents.len(), 2);
    let row = &view.documents[1];
    assert_eq!(row.document_id, DocumentId::new("n1"));
    assert_eq!(row.display_name, "notes.pdf");
    assert_eq!(row.status, DocumentStatus::Uploaded);
    assert_eq!(row.quality_score, 0);
    assert!(row.pending);
    assert_eq!(
        view.upload_status.as_deref(),
        Some("File uploaded successfully. Processing...")
    );
}

#[test]
fn upload_then_refreshes_reach_processed() {
    init_logging();
    let state = open_view();
    let (state, upload_id) = request_upload(state, "paper.docx");
    let (state, _) = update(
        state,
        Msg::UploadCompleted {
            upload_id,
            refresh_horizon: 0,
            result: Ok(DocumentId::new("p")),
        },
    );

    let mut paper = record("p", DocumentStatus::Uploaded);
    paper.display_name = "paper.docx".to_string();
    let (state, _) = refreshed(state, 1, vec![paper.clone()]);
    assert!(!state.registry().entries()[0].is_pending());

    paper.status = DocumentStatus::Processing;
    let (state, _) = refreshed(state, 2, vec![paper.clone()]);
    paper.status = DocumentStatus::Processed;
    let (state, _) = refreshed(state, 3, vec![paper.clone()]);

    assert_eq!(state.registry().records(), vec![paper]);
}

#[test]
fn upload_failure_leaves_registry_untouched() {
    init_logging();
    let (state, _) = refreshed(open_view(), 1, vec![record("a", DocumentStatus::Processed)]);
    let before = state.registry().clone();
    let (state, upload_id) = request_upload(state, "notes.txt");

    let (state, _) = update(
        state,
        Msg::UploadCompleted {
            upload_id,
            refresh_horizon: 1,
            result: Err(TransportError::new("http status 500")),
        },
    );

    assert_eq!(state.registry(), &before);
    assert_eq!(state.uploads_in_flight(), 0);
    assert_eq!(
        state.view().upload_status.as_deref(),
        Some("File upload failed. (http status 500)")
    );
    assert!(matches!(
        state.upload_status(),
        Some(UploadStatus::Failed { message, .. }) if message == "http status 500"
    ));
}

#[test]
fn unsupported_file_is_rejected_without_effects() {
    init_logging();
    let (state, effects) = update(
        open_view(),
        Msg::UploadRequested {
            path: PathBuf::from("slides.pptx"),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.uploads_in_flight(), 0);
    assert_eq!(
        state.view().upload_status.as_deref(),
        Some("Unsupported file type: slides.pptx")
    );
}

#[test]
fn extension_check_ignores_case() {
    init_logging();
    let (_state, effects) = update(
        open_view(),
        Msg::UploadRequested {
            path: PathBuf::from("REPORT.PDF"),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::UploadDocument {
            upload_id: 1,
            path: PathBuf::from("REPORT.PDF"),
            display_name: "REPORT.PDF".to_string(),
        }]
    );
}

#[test]
fn unknown_upload_answer_is_ignored() {
    init_logging();
    let state = open_view();
    let (state, _) = update(
        state,
        Msg::UploadCompleted {
            upload_id: 42,
            refresh_horizon: 0,
            result: Ok(DocumentId::new("x")),
        },
    );
    assert!(state.registry().is_empty());
    assert!(state.upload_status().is_none());
}

#[test]
fn teardown_stops_heartbeat_and_freezes_state() {
    init_logging();
    let (state, _) = refreshed(open_view(), 1, vec![record("a", DocumentStatus::Processed)]);

    let (state, effects) = update(state, Msg::ViewClosed);
    assert_eq!(effects, vec![Effect::StopRegistryHeartbeat]);
    assert_eq!(state.view_state(), ViewState::Closed);

    let before = state.clone();
    let (state, effects) = refreshed(state, 2, Vec::new());
    assert!(effects.is_empty());
    assert_eq!(state, before);
}
