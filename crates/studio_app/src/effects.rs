use studio_core::{Effect, Msg, TransportError};
use studio_engine::{BackendError, EngineEvent, EngineHandle};
use studio_logging::{studio_debug, studio_info};

/// Executes core effects on the engine and turns engine events back into
/// messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartRegistryHeartbeat => {
                    studio_info!("Session {} opened", self.engine.session());
                    self.engine.start_registry_heartbeat();
                }
                Effect::StopRegistryHeartbeat => self.engine.stop_registry_heartbeat(),
                Effect::UploadDocument {
                    upload_id,
                    path,
                    display_name,
                } => self.engine.upload(upload_id, path, display_name),
                Effect::SubmitJob {
                    ticket,
                    document_id,
                    options,
                } => self.engine.submit_job(ticket, document_id, options),
                Effect::StartJobPolling {
                    ticket,
                    kind,
                    job_id,
                } => self.engine.start_job_polling(ticket, kind, job_id),
                Effect::CancelJobPolling { ticket } => self.engine.cancel_job_polling(ticket),
            }
        }
    }

    /// Messages for every engine event received so far.
    pub fn drain(&self) -> Vec<Msg> {
        let mut msgs = Vec::new();
        while let Some(event) = self.engine.try_recv() {
            msgs.push(event_to_msg(event));
        }
        msgs
    }

    pub fn shutdown(self) {
        studio_debug!("Shutting down engine");
        self.engine.shutdown();
    }
}

pub fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::RegistryRefreshed { seq, result } => Msg::RegistryRefreshed {
            seq,
            result: result.map_err(transport),
        },
        EngineEvent::UploadCompleted {
            upload_id,
            refresh_horizon,
            result,
        } => Msg::UploadCompleted {
            upload_id,
            refresh_horizon,
            result: result.map_err(transport),
        },
        EngineEvent::JobSubmitted { ticket, result } => Msg::JobSubmitted {
            ticket,
            result: result.map_err(transport),
        },
        EngineEvent::JobPolled {
            ticket,
            seq,
            result,
        } => Msg::JobPolled {
            ticket,
            seq,
            result: result.map_err(transport),
        },
    }
}

fn transport(err: BackendError) -> TransportError {
    TransportError::new(err.to_string())
}
