use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use studio_core::{DocumentId, DocumentRecord, GenerationOptions, JobId, JobKind, JobReport};
use url::Url;

use crate::session::{SessionToken, SESSION_HEADER};
use crate::wire::{
    DocumentList, FlashcardsAccepted, FlashcardsRequest, JobStatusBody, QuizAccepted,
    QuizRequest, UploadAccepted,
};
use crate::{BackendError, FailureKind};

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub base_url: String,
    pub registry_interval: Duration,
    pub job_poll_interval: Duration,
    /// Consecutive transient poll failures swallowed before one is reported.
    pub job_poll_retry_limit: u32,
    pub connect_timeout: Duration,
    pub request_timeout: Option<Duration>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            registry_interval: Duration::from_secs(5),
            job_poll_interval: Duration::from_secs(5),
            job_poll_retry_limit: 0,
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
        }
    }
}

/// File contents ready to be sent as the multipart `file` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub async fn read(path: &Path, file_name: impl Into<String>) -> Result<Self, BackendError> {
        let bytes = tokio::fs::read(path).await.map_err(|err| {
            BackendError::new(FailureKind::Io, format!("{}: {err}", path.display()))
        })?;
        Ok(Self {
            file_name: file_name.into(),
            bytes,
        })
    }
}

#[async_trait::async_trait]
pub trait StudioBackend: Send + Sync {
    async fn list_documents(
        &self,
        session: &SessionToken,
    ) -> Result<Vec<DocumentRecord>, BackendError>;

    async fn upload_document(
        &self,
        session: &SessionToken,
        file: UploadFile,
    ) -> Result<DocumentId, BackendError>;

    async fn submit_generation(
        &self,
        document_id: &DocumentId,
        options: &GenerationOptions,
    ) -> Result<JobId, BackendError>;

    async fn job_status(&self, kind: JobKind, job_id: &JobId) -> Result<JobReport, BackendError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    base_url: Url,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: &EngineSettings) -> Result<Self, BackendError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|err| BackendError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::new(
                FailureKind::InvalidUrl,
                format!("{base_url} cannot be a base url"),
            ));
        }
        Ok(Self {
            base_url,
            client: build_client(settings)?,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::new(FailureKind::InvalidUrl, self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn build_client(settings: &EngineSettings) -> Result<reqwest::Client, BackendError> {
    let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
    if let Some(timeout) = settings.request_timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|err| BackendError::new(FailureKind::Network, err.to_string()))
}

#[async_trait::async_trait]
impl StudioBackend for ReqwestBackend {
    async fn list_documents(
        &self,
        session: &SessionToken,
    ) -> Result<Vec<DocumentRecord>, BackendError> {
        let url = self.endpoint(&["documents"])?;
        let response = self
            .client
            .get(url)
            .header(SESSION_HEADER, session.as_str())
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let list: DocumentList = read_json(response).await?;
        list.documents
            .into_iter()
            .map(|entry| entry.into_record())
            .collect()
    }

    async fn upload_document(
        &self,
        session: &SessionToken,
        file: UploadFile,
    ) -> Result<DocumentId, BackendError> {
        let url = self.endpoint(&["documents"])?;
        let part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.file_name);
        let form = reqwest::multipart::Form::new().part("file", part);
        let response = self
            .client
            .post(url)
            .header(SESSION_HEADER, session.as_str())
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let accepted: UploadAccepted = read_json(response).await?;
        Ok(DocumentId::new(accepted.doc_id))
    }

    async fn submit_generation(
        &self,
        document_id: &DocumentId,
        options: &GenerationOptions,
    ) -> Result<JobId, BackendError> {
        let kind = options.kind();
        let url = self.endpoint(&["documents", document_id.as_str(), kind.as_str()])?;
        let request = self.client.post(url);
        let request = match options {
            GenerationOptions::Quiz(quiz) => request.json(&QuizRequest::from(quiz)),
            GenerationOptions::Flashcards(cards) => request.json(&FlashcardsRequest::from(cards)),
        };
        let response = request.send().await.map_err(map_reqwest_error)?;
        let job_id = match kind {
            JobKind::Quiz => read_json::<QuizAccepted>(response).await?.quiz_id,
            JobKind::Flashcards => {
                read_json::<FlashcardsAccepted>(response)
                    .await?
                    .flashcards_id
            }
        };
        Ok(JobId::new(job_id))
    }

    async fn job_status(&self, kind: JobKind, job_id: &JobId) -> Result<JobReport, BackendError> {
        let url = self.endpoint(&[kind.as_str(), job_id.as_str(), "status"])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: JobStatusBody = read_json(response).await?;
        body.into_report(kind)
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    let status = response.status();
    if !status.is_success() {
        return Err(BackendError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ));
    }
    response.json::<T>().await.map_err(map_reqwest_error)
}

fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        return BackendError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return BackendError::new(FailureKind::Decode, err.to_string());
    }
    BackendError::new(FailureKind::Network, err.to_string())
}
