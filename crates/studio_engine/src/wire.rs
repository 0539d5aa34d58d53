use serde::{Deserialize, Serialize};
use serde_json::Value;
use studio_core::{
    DocumentId, DocumentRecord, DocumentStatus, FlashcardOptions, JobKind, JobReport, JobStatus,
    QuizOptions,
};

use crate::{BackendError, FailureKind};

#[derive(Debug, Deserialize)]
pub(crate) struct DocumentList {
    #[serde(default)]
    pub documents: Vec<DocumentEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DocumentEntry {
    pub doc_id: String,
    pub filename: String,
    pub status: String,
    #[serde(default)]
    pub quality_score: i64,
}

impl DocumentEntry {
    pub fn into_record(self) -> Result<DocumentRecord, BackendError> {
        let status = DocumentStatus::parse(&self.status).ok_or_else(|| {
            BackendError::new(
                FailureKind::Decode,
                format!("unknown document status {:?} for {}", self.status, self.doc_id),
            )
        })?;
        Ok(DocumentRecord {
            id: DocumentId::new(self.doc_id),
            display_name: self.filename,
            status,
            quality_score: self.quality_score,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadAccepted {
    pub doc_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizRequest<'a> {
    pub difficulty: &'static str,
    pub question_count: u32,
    pub question_types: Vec<&'static str>,
    pub topics: Vec<&'a str>,
}

impl<'a> From<&'a QuizOptions> for QuizRequest<'a> {
    fn from(options: &'a QuizOptions) -> Self {
        Self {
            difficulty: options.difficulty.as_str(),
            question_count: options.question_count,
            question_types: options.question_types.iter().map(|t| t.as_str()).collect(),
            topics: options.topics.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct FlashcardsRequest {
    pub count: u32,
}

impl From<&FlashcardOptions> for FlashcardsRequest {
    fn from(options: &FlashcardOptions) -> Self {
        Self {
            count: options.count,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuizAccepted {
    pub quiz_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FlashcardsAccepted {
    pub flashcards_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobStatusBody {
    pub status: String,
    #[serde(default)]
    pub questions: Option<Vec<Value>>,
    #[serde(default)]
    pub flashcards: Option<Vec<Value>>,
}

impl JobStatusBody {
    pub fn into_report(self, kind: JobKind) -> Result<JobReport, BackendError> {
        let status = JobStatus::parse(&self.status).ok_or_else(|| {
            BackendError::new(
                FailureKind::Decode,
                format!("unknown {kind} status {:?}", self.status),
            )
        })?;
        let report = match status {
            JobStatus::Pending => JobReport::Pending,
            JobStatus::InProgress => JobReport::InProgress,
            JobStatus::Failed => JobReport::Failed,
            JobStatus::Ready => {
                let payload = match kind {
                    JobKind::Quiz => self.questions,
                    JobKind::Flashcards => self.flashcards,
                };
                let items = payload.ok_or_else(|| {
                    BackendError::new(FailureKind::Decode, format!("{kind} is READY without items"))
                })?;
                JobReport::Ready(items)
            }
        };
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use studio_core::{Difficulty, QuestionType};

    #[test]
    fn quiz_request_uses_backend_names() {
        let options = QuizOptions {
            difficulty: Difficulty::Hard,
            question_count: 3,
            question_types: [QuestionType::MultipleChoice, QuestionType::TrueFalse].into(),
            topics: ["cells".to_string()].into(),
        };
        let body = serde_json::to_value(QuizRequest::from(&options)).unwrap();
        assert_eq!(
            body,
            json!({
                "difficulty": "hard",
                "question_count": 3,
                "question_types": ["multiple-choice", "true-false"],
                "topics": ["cells"],
            })
        );
    }

    #[test]
    fn ready_without_payload_is_a_decode_error() {
        let body: JobStatusBody =
            serde_json::from_value(json!({ "quiz_id": "q", "status": "READY" })).unwrap();
        let err = body.into_report(JobKind::Quiz).unwrap_err();
        assert_eq!(err.kind, FailureKind::Decode);
    }

    #[test]
    fn generating_counts_as_in_progress() {
        let body: JobStatusBody =
            serde_json::from_value(json!({ "flashcards_id": "f", "status": "GENERATING" }))
                .unwrap();
        assert_eq!(body.into_report(JobKind::Flashcards).unwrap(), JobReport::InProgress);
    }

    #[test]
    fn unknown_document_status_is_rejected() {
        let entry = DocumentEntry {
            doc_id: "d".into(),
            filename: "d.pdf".into(),
            status: "ARCHIVED".into(),
            quality_score: 0,
        };
        assert_eq!(entry.into_record().unwrap_err().kind, FailureKind::Decode);
    }
}
