use crate::state::describe_upload;
use crate::{
    select_target, AppState, Effect, GenerationRejected, Msg, PendingUpload, SnapshotOutcome,
    UploadStatus, ViewState,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    // Nothing may change once the view is torn down; late answers are dropped.
    if state.view_state() == ViewState::Closed {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::ViewOpened => {
            if state.view_state() == ViewState::Idle {
                state.set_view_state(ViewState::Live);
                vec![Effect::StartRegistryHeartbeat]
            } else {
                Vec::new()
            }
        }
        Msg::ViewClosed => {
            let mut effects = state.jobs_mut().cancel().unwrap_or_default();
            if state.view_state() == ViewState::Live {
                effects.push(Effect::StopRegistryHeartbeat);
            }
            state.set_view_state(ViewState::Closed);
            effects
        }
        Msg::UploadRequested { path } => {
            let (display_name, supported) = describe_upload(&path);
            if !supported {
                state.set_upload_status(UploadStatus::Unsupported { display_name });
                return (state, Vec::new());
            }
            let upload_id = state.begin_upload(&display_name);
            vec![Effect::UploadDocument {
                upload_id,
                path,
                display_name,
            }]
        }
        Msg::UploadCompleted {
            upload_id,
            refresh_horizon,
            result,
        } => {
            let Some(display_name) = state.finish_upload(upload_id) else {
                return (state, Vec::new());
            };
            match result {
                Ok(document_id) => {
                    state.record_optimistic_upload(PendingUpload {
                        upload_id,
                        document_id: document_id.clone(),
                        display_name: display_name.clone(),
                        refresh_horizon,
                    });
                    state.set_upload_status(UploadStatus::Uploaded {
                        display_name,
                        document_id,
                    });
                }
                Err(err) => {
                    state.set_upload_status(UploadStatus::Failed {
                        display_name,
                        message: err.to_string(),
                    });
                }
            }
            Vec::new()
        }
        Msg::RegistryRefreshed { seq, result } => match result {
            Ok(snapshot) => match state.registry_mut().apply_snapshot(seq, snapshot) {
                SnapshotOutcome::Stale => Vec::new(),
                SnapshotOutcome::Applied { .. } => {
                    state.mark_dirty();
                    let (registry, jobs) = state.registry_and_jobs_mut();
                    let effects = jobs.on_registry_updated(registry);
                    settle_job(&mut state, effects)
                }
            },
            Err(_) => {
                // The cached registry stays as it is; the next tick retries.
                state.registry_mut().record_refresh_failure();
                state.mark_dirty();
                Vec::new()
            }
        },
        Msg::GenerateRequested { options, target } => {
            if let Err(err) = options.validate() {
                state.set_rejection(Some(GenerationRejected::from(err)));
                return (state, Vec::new());
            }
            match select_target(state.registry(), target.as_ref()) {
                Ok(selection) => {
                    state.set_rejection(None);
                    let (_ticket, effects) = state.jobs_mut().begin(selection, options);
                    effects
                }
                Err(err) => {
                    state.set_rejection(Some(GenerationRejected::from(err)));
                    Vec::new()
                }
            }
        }
        Msg::JobSubmitted { ticket, result } => {
            let effects = state.jobs_mut().on_submitted(ticket, result);
            settle_job(&mut state, effects)
        }
        Msg::JobPolled {
            ticket,
            seq,
            result,
        } => {
            let effects = state.jobs_mut().on_polled(ticket, seq, result);
            settle_job(&mut state, effects)
        }
        Msg::CancelGeneration => {
            let effects = state.jobs_mut().cancel();
            settle_job(&mut state, effects)
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Marks a job transition as visible. Once the tracked job has an outcome it
/// replaces any earlier rejection on the status line.
fn settle_job(state: &mut AppState, effects: Option<Vec<Effect>>) -> Vec<Effect> {
    let Some(effects) = effects else {
        return Vec::new();
    };
    if state.rejection().is_some() && !state.jobs().phase().is_active() {
        state.set_rejection(None);
    }
    state.mark_dirty();
    effects
}
