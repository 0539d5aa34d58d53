use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use studio_core::{
    DocumentId, DocumentRecord, GenerationOptions, JobId, JobKind, JobReport, JobTicket, UploadId,
};
use studio_logging::{studio_debug, studio_error, studio_info, studio_warn};
use tokio::sync::mpsc as command_mpsc;

use crate::backend::{EngineSettings, ReqwestBackend, StudioBackend, UploadFile};
use crate::poll::{PollControl, PollHandle, Poller};
use crate::session::SessionToken;
use crate::{BackendError, EngineEvent};

enum EngineCommand {
    StartRegistryHeartbeat,
    StopRegistryHeartbeat,
    Upload {
        upload_id: UploadId,
        path: PathBuf,
        display_name: String,
    },
    SubmitJob {
        ticket: JobTicket,
        document_id: DocumentId,
        options: GenerationOptions,
    },
    StartJobPolling {
        ticket: JobTicket,
        kind: JobKind,
        job_id: JobId,
    },
    CancelJobPolling {
        ticket: JobTicket,
    },
    Shutdown,
}

/// Owns the engine thread. Commands go in, [`EngineEvent`]s come out.
pub struct EngineHandle {
    cmd_tx: command_mpsc::UnboundedSender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    session: SessionToken,
    thread: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings, session: SessionToken) -> Result<Self, BackendError> {
        let backend = Arc::new(ReqwestBackend::new(&settings)?);
        Ok(Self::with_backend(settings, session, backend))
    }

    pub fn with_backend(
        settings: EngineSettings,
        session: SessionToken,
        backend: Arc<dyn StudioBackend>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = command_mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();
        let worker = EngineLoop {
            backend,
            session: session.clone(),
            settings,
            events: event_tx,
            refresh_sequence: Arc::new(AtomicU64::new(0)),
            registry: None,
            job: None,
        };

        let thread = thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    studio_error!("Engine runtime failed to start: {}", err);
                    return;
                }
            };
            runtime.block_on(worker.run(cmd_rx));
        });

        Self {
            cmd_tx,
            event_rx,
            session,
            thread: Some(thread),
        }
    }

    pub fn session(&self) -> &SessionToken {
        &self.session
    }

    pub fn start_registry_heartbeat(&self) {
        self.send(EngineCommand::StartRegistryHeartbeat);
    }

    pub fn stop_registry_heartbeat(&self) {
        self.send(EngineCommand::StopRegistryHeartbeat);
    }

    pub fn upload(&self, upload_id: UploadId, path: PathBuf, display_name: impl Into<String>) {
        self.send(EngineCommand::Upload {
            upload_id,
            path,
            display_name: display_name.into(),
        });
    }

    pub fn submit_job(
        &self,
        ticket: JobTicket,
        document_id: DocumentId,
        options: GenerationOptions,
    ) {
        self.send(EngineCommand::SubmitJob {
            ticket,
            document_id,
            options,
        });
    }

    pub fn start_job_polling(&self, ticket: JobTicket, kind: JobKind, job_id: JobId) {
        self.send(EngineCommand::StartJobPolling {
            ticket,
            kind,
            job_id,
        });
    }

    pub fn cancel_job_polling(&self, ticket: JobTicket) {
        self.send(EngineCommand::CancelJobPolling { ticket });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Cancels every poller and waits for the engine thread to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.send(EngineCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                studio_error!("Engine thread panicked");
            }
        }
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

struct EngineLoop {
    backend: Arc<dyn StudioBackend>,
    session: SessionToken,
    settings: EngineSettings,
    events: mpsc::Sender<EngineEvent>,
    /// Shared by every registry poller so tick numbers never repeat.
    refresh_sequence: Arc<AtomicU64>,
    registry: Option<PollHandle>,
    job: Option<(JobTicket, PollHandle)>,
}

impl EngineLoop {
    async fn run(mut self, mut commands: command_mpsc::UnboundedReceiver<EngineCommand>) {
        while let Some(command) = commands.recv().await {
            match command {
                EngineCommand::Shutdown => break,
                EngineCommand::StartRegistryHeartbeat => self.start_registry(),
                EngineCommand::StopRegistryHeartbeat => self.stop_registry(),
                EngineCommand::Upload {
                    upload_id,
                    path,
                    display_name,
                } => self.upload(upload_id, path, display_name),
                EngineCommand::SubmitJob {
                    ticket,
                    document_id,
                    options,
                } => self.submit(ticket, document_id, options),
                EngineCommand::StartJobPolling {
                    ticket,
                    kind,
                    job_id,
                } => self.start_job_polling(ticket, kind, job_id),
                EngineCommand::CancelJobPolling { ticket } => self.cancel_job_polling(ticket),
            }
        }
        self.stop_registry();
        if let Some((ticket, handle)) = self.job.take() {
            studio_debug!("Cancelling job polling for ticket {} on shutdown", ticket);
            handle.cancel();
        }
    }

    fn start_registry(&mut self) {
        if self.registry.as_ref().is_some_and(|handle| !handle.is_cancelled()) {
            return;
        }
        studio_debug!("Starting registry heartbeat");
        let backend = self.backend.clone();
        let session = self.session.clone();
        let events = self.events.clone();
        let handle = Poller::new(self.settings.registry_interval)
            .with_sequence(self.refresh_sequence.clone())
            .spawn(
                move |_seq| {
                    let backend = backend.clone();
                    let session = session.clone();
                    async move { backend.list_documents(&session).await }
                },
                move |seq, result: Result<Vec<DocumentRecord>, BackendError>| {
                    if let Err(err) = &result {
                        studio_warn!("Registry refresh #{} failed: {}", seq, err);
                    }
                    let _ = events.send(EngineEvent::RegistryRefreshed { seq, result });
                    PollControl::Continue
                },
            );
        self.registry = Some(handle);
    }

    fn stop_registry(&mut self) {
        if let Some(handle) = self.registry.take() {
            studio_debug!("Stopping registry heartbeat after {} ticks", handle.issued());
            handle.cancel();
        }
    }

    fn upload(&self, upload_id: UploadId, path: PathBuf, display_name: String) {
        let backend = self.backend.clone();
        let session = self.session.clone();
        let events = self.events.clone();
        let refresh_sequence = self.refresh_sequence.clone();
        tokio::spawn(async move {
            studio_info!("Uploading {} from {}", display_name, path.display());
            let result = match UploadFile::read(&path, display_name.clone()).await {
                Ok(file) => backend.upload_document(&session, file).await,
                Err(err) => Err(err),
            };
            let refresh_horizon = refresh_sequence.load(Ordering::SeqCst);
            match &result {
                Ok(document_id) => studio_info!("Uploaded {} as {}", display_name, document_id),
                Err(err) => studio_warn!("Upload of {} failed: {}", display_name, err),
            }
            let _ = events.send(EngineEvent::UploadCompleted {
                upload_id,
                refresh_horizon,
                result,
            });
        });
    }

    fn submit(&self, ticket: JobTicket, document_id: DocumentId, options: GenerationOptions) {
        let backend = self.backend.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let kind = options.kind();
            studio_info!("Submitting {} job #{} for {}", kind, ticket, document_id);
            let result = backend.submit_generation(&document_id, &options).await;
            if let Err(err) = &result {
                studio_warn!("Submitting {} job #{} failed: {}", kind, ticket, err);
            }
            let _ = events.send(EngineEvent::JobSubmitted { ticket, result });
        });
    }

    fn start_job_polling(&mut self, ticket: JobTicket, kind: JobKind, job_id: JobId) {
        if let Some((previous, handle)) = self.job.take() {
            studio_debug!("Job #{} superseded by #{}", previous, ticket);
            handle.cancel();
        }
        studio_debug!("Polling {} job {} for ticket {}", kind, job_id, ticket);

        let backend = self.backend.clone();
        let events = self.events.clone();
        let retry_limit = self.settings.job_poll_retry_limit;
        let mut failures = 0u32;
        let probe_job = job_id.clone();
        let handle = Poller::new(self.settings.job_poll_interval).spawn(
            move |_seq| {
                let backend = backend.clone();
                let job_id = probe_job.clone();
                async move { backend.job_status(kind, &job_id).await }
            },
            move |seq, result: Result<JobReport, BackendError>| {
                match &result {
                    Err(err) if err.is_transient() && failures < retry_limit => {
                        failures += 1;
                        studio_warn!(
                            "Status check #{} for {} failed ({}/{}): {}",
                            seq,
                            job_id,
                            failures,
                            retry_limit,
                            err
                        );
                        return PollControl::Continue;
                    }
                    Ok(report) => {
                        failures = 0;
                        studio_debug!("{} job {} is {}", kind, job_id, report.status());
                    }
                    Err(err) => {
                        studio_warn!("Status check #{} for {} failed: {}", seq, job_id, err);
                    }
                }
                let terminal = result
                    .as_ref()
                    .map_or(true, |report| report.status().is_terminal());
                let _ = events.send(EngineEvent::JobPolled {
                    ticket,
                    seq,
                    result,
                });
                if terminal {
                    PollControl::Stop
                } else {
                    PollControl::Continue
                }
            },
        );
        self.job = Some((ticket, handle));
    }

    fn cancel_job_polling(&mut self, ticket: JobTicket) {
        if !self.job.as_ref().is_some_and(|(active, _)| *active == ticket) {
            return;
        }
        if let Some((_, handle)) = self.job.take() {
            studio_debug!("Cancelling job polling for ticket {}", ticket);
            handle.cancel();
        }
    }
}
