use pretty_assertions::assert_eq;
use serde_json::json;
use studio_core::{
    DocumentId, DocumentRecord, DocumentStatus, FlashcardOptions, GenerationOptions, JobId,
    JobKind, JobReport,
};
use studio_engine::{
    EngineSettings, FailureKind, ReqwestBackend, SessionToken, StudioBackend, UploadFile,
    SESSION_HEADER,
};
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> ReqwestBackend {
    let settings = EngineSettings {
        base_url: server.uri(),
        ..EngineSettings::default()
    };
    ReqwestBackend::new(&settings).expect("valid base url")
}

#[tokio::test]
async fn list_documents_sends_session_and_maps_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents"))
        .and(header(SESSION_HEADER, "abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                { "doc_id": "d1", "filename": "notes.pdf", "status": "PROCESSED", "quality_score": 7 },
                { "doc_id": "d2", "filename": "draft.txt", "status": "UPLOADED", "quality_score": 0 },
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let records = backend_for(&server)
        .list_documents(&SessionToken::from_string("abc123"))
        .await
        .expect("list ok");

    assert_eq!(
        records,
        vec![
            DocumentRecord {
                id: DocumentId::new("d1"),
                display_name: "notes.pdf".to_string(),
                status: DocumentStatus::Processed,
                quality_score: 7,
            },
            DocumentRecord {
                id: DocumentId::new("d2"),
                display_name: "draft.txt".to_string(),
                status: DocumentStatus::Uploaded,
                quality_score: 0,
            },
        ]
    );
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .list_documents(&SessionToken::generate())
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(503));
    assert!(err.is_transient());
}

#[tokio::test]
async fn undecodable_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .list_documents(&SessionToken::generate())
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn upload_posts_multipart_file_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/documents"))
        .and(header(SESSION_HEADER, "sess"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"notes.txt\""))
        .and(body_string_contains("mitochondria"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "doc_id": "new-doc", "status": "UPLOADED" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let file_path = dir.path().join("notes.txt");
    std::fs::write(&file_path, "the mitochondria is the powerhouse").expect("write fixture");
    let file = UploadFile::read(&file_path, "notes.txt").await.expect("read fixture");

    let id = backend_for(&server)
        .upload_document(&SessionToken::from_string("sess"), file)
        .await
        .expect("upload ok");

    assert_eq!(id, DocumentId::new("new-doc"));
}

#[tokio::test]
async fn missing_upload_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = UploadFile::read(&dir.path().join("absent.pdf"), "absent.pdf")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Io);
}

#[tokio::test]
async fn quiz_submission_sends_options() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/documents/d1/quiz"))
        .and(body_json(json!({
            "difficulty": "medium",
            "question_count": 5,
            "question_types": ["multiple-choice"],
            "topics": [],
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "quiz_id": "q-9", "status": "PENDING" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let job = backend_for(&server)
        .submit_generation(&DocumentId::new("d1"), &GenerationOptions::quiz())
        .await
        .expect("submit ok");

    assert_eq!(job, JobId::new("q-9"));
}

#[tokio::test]
async fn flashcard_submission_sends_count() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/documents/d1/flashcards"))
        .and(body_json(json!({ "count": 12 })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "flashcards_id": "f-1", "status": "PENDING" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let options = GenerationOptions::Flashcards(FlashcardOptions { count: 12 });
    let job = backend_for(&server)
        .submit_generation(&DocumentId::new("d1"), &options)
        .await
        .expect("submit ok");

    assert_eq!(job, JobId::new("f-1"));
}

#[tokio::test]
async fn job_status_reports_ready_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/quiz/q-9/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quiz_id": "q-9",
            "status": "READY",
            "questions": [{ "question": "What is ATP?" }],
        })))
        .mount(&server)
        .await;

    let report = backend_for(&server)
        .job_status(JobKind::Quiz, &JobId::new("q-9"))
        .await
        .expect("status ok");

    assert_eq!(report, JobReport::Ready(vec![json!({ "question": "What is ATP?" })]));
}

#[tokio::test]
async fn job_status_accepts_generating() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flashcards/f-1/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "flashcards_id": "f-1", "status": "GENERATING" })),
        )
        .mount(&server)
        .await;

    let report = backend_for(&server)
        .job_status(JobKind::Flashcards, &JobId::new("f-1"))
        .await
        .expect("status ok");

    assert_eq!(report, JobReport::InProgress);
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let settings = EngineSettings {
        base_url: "http://127.0.0.1:9".to_string(),
        ..EngineSettings::default()
    };
    let backend = ReqwestBackend::new(&settings).expect("valid url");

    let err = backend
        .job_status(JobKind::Quiz, &JobId::new("q"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::Network);
}
