use super::error::CallError;
use super::payload::{PayloadRequest, PhoneNumber};
use super::session::{CallSession, SessionId, Transition, UserId, VoiceResponse};
use super::status::{CallStatus, ProviderStatus};
use super::store::{SessionHandle, SessionStore};
use super::SessionConfig;
use crate::dispatch::{Outcome, ResultDispatcher};
use crate::extract::NumberExtractor;
use crate::provider::{CallbackUrls, TelephonyProvider};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Transcription status that carries usable text
const TRANSCRIPTION_COMPLETED: &str = "completed";

/// What a provider callback did to its session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// The event was recorded; the session is now in this status
    Applied(CallStatus),

    /// Late or repeated event; nothing changed
    Duplicate,

    /// No session matches the callback
    UnknownSession,
}

/// Drives call sessions from creation to their final result.
///
/// These methods are the only way session state changes. Each provider
/// callback maps to one of the `on_*` transitions, which lock the one session
/// they touch, apply a pure transition on [`CallSession`], release the lock
/// and only then notify the owner.
pub struct CallStateMachine {
    store: Arc<dyn SessionStore>,
    provider: Arc<dyn TelephonyProvider>,
    extractor: Arc<NumberExtractor>,
    dispatcher: ResultDispatcher,
    urls: CallbackUrls,
    config: SessionConfig,
    next_id: AtomicU64,
}

impl CallStateMachine {
    pub fn new(
        store: Arc<dyn SessionStore>,
        provider: Arc<dyn TelephonyProvider>,
        extractor: Arc<NumberExtractor>,
        dispatcher: ResultDispatcher,
        urls: CallbackUrls,
        config: SessionConfig,
    ) -> Self {
        Self {
            store,
            provider,
            extractor,
            dispatcher,
            urls,
            config,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Validate the request and store a new session in `initiated`.
    pub async fn create(
        &self,
        owner: UserId,
        target: &str,
        payload: PayloadRequest,
    ) -> Result<CallSession, CallError> {
        let target = PhoneNumber::parse(target)?;
        let payload = payload.validate(self.config.max_speech_text_length)?;

        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let session = CallSession::new(id, owner, target, payload);
        self.store.insert(session.clone()).await;

        info!(
            "Created call session {} for user {} to {}",
            id, owner, session.target
        );
        Ok(session)
    }

    /// Ask the provider to dial. Never retried: a second attempt could ring
    /// the callee twice, so the session is claimed before the request goes
    /// out and concurrent callers get `AlreadyPlaced`.
    pub async fn place(&self, id: SessionId) -> Result<String, CallError> {
        let handle = self
            .store
            .get(id)
            .await
            .ok_or(CallError::SessionNotFound(id))?;

        let request = {
            let mut session = handle.lock().await;
            if !session.begin_placement() {
                return Err(CallError::AlreadyPlaced(id));
            }
            self.urls.placement_request(id, session.target.as_str())
        };

        match self.provider.place_call(&request).await {
            Ok(call_id) => {
                let bound = {
                    let mut session = handle.lock().await;
                    if session.mark_placed(&call_id) {
                        None
                    } else {
                        session.provider_call_id().map(str::to_string)
                    }
                };

                if let Some(bound) = bound {
                    error!(
                        "Session {} already bound to provider call {}, placement returned {}",
                        id, bound, call_id
                    );
                    return Err(CallError::CallIdConflict {
                        id,
                        bound,
                        placed: call_id,
                    });
                }

                self.store.bind_provider_call_id(id, &call_id).await;
                info!(
                    "Session {} placed via {}: {}",
                    id,
                    self.provider.name(),
                    call_id
                );
                Ok(call_id)
            }
            Err(e) => {
                error!("Failed to place call for session {}: {}", id, e);

                let (transition, snapshot) = {
                    let mut session = handle.lock().await;
                    let transition = session.mark_placement_failed();
                    (transition, session.clone())
                };
                self.conclude(snapshot, transition, "placement").await;

                Err(CallError::Placement(e))
            }
        }
    }

    /// Status callback correlated by the provider's call id.
    pub async fn on_status_event(&self, call_id: &str, status: ProviderStatus) -> CallbackOutcome {
        let Some(handle) = self.store.find_by_provider_call_id(call_id).await else {
            warn!("Status {:?} for unknown provider call {}", status, call_id);
            return CallbackOutcome::UnknownSession;
        };

        self.apply_status(handle, Some(call_id), status).await
    }

    /// Status callback addressed to a session directly. A call id seen here
    /// before `place` has returned is bound to the session.
    pub async fn on_session_status_event(
        &self,
        id: SessionId,
        call_id: Option<&str>,
        status: ProviderStatus,
    ) -> CallbackOutcome {
        let Some(handle) = self.store.get(id).await else {
            warn!("Status {:?} for unknown session {}", status, id);
            return CallbackOutcome::UnknownSession;
        };

        self.apply_status(handle, call_id, status).await
    }

    /// The provider finished recording the callee's answer.
    pub async fn on_recording_captured(
        &self,
        id: SessionId,
        recording_ref: Option<&str>,
        call_id: Option<&str>,
    ) -> CallbackOutcome {
        let Some(handle) = self.store.get(id).await else {
            warn!("Recording for unknown session {}", id);
            return CallbackOutcome::UnknownSession;
        };

        let (transition, snapshot, newly_bound) = {
            let mut session = handle.lock().await;
            let newly_bound = bind_call_id(&mut session, call_id);
            let transition = session.capture_recording(recording_ref);
            (transition, session.clone(), newly_bound)
        };

        self.index(id, newly_bound).await;
        self.conclude(snapshot, transition, "recording").await
    }

    /// The transcription of the callee's answer arrived.
    ///
    /// A transcription that did not complete still finishes the session, with
    /// an empty response.
    pub async fn on_transcription(
        &self,
        id: SessionId,
        text: &str,
        transcription_status: &str,
    ) -> CallbackOutcome {
        let Some(handle) = self.store.get(id).await else {
            warn!("Transcription for unknown session {}", id);
            return CallbackOutcome::UnknownSession;
        };

        let response = if transcription_status.eq_ignore_ascii_case(TRANSCRIPTION_COMPLETED) {
            VoiceResponse::from_extraction(id, text, self.extractor.extract(text))
        } else {
            warn!(
                "Transcription for session {} ended with status {:?}",
                id, transcription_status
            );
            VoiceResponse::empty(id, text)
        };

        let (transition, snapshot) = {
            let mut session = handle.lock().await;
            let transition = session.attach_response(response.clone());
            (transition, session.clone())
        };

        if !transition.changed() {
            warn!(
                "Duplicate transcription for session {} (status {})",
                id,
                snapshot.status()
            );
            return CallbackOutcome::Duplicate;
        }

        info!(
            "Session {} answered: {} number(s), confidence {:.2}",
            id,
            response.numbers.len(),
            response.confidence
        );
        self.dispatcher
            .notify(&snapshot, Outcome::Final(response))
            .await;

        CallbackOutcome::Applied(snapshot.status())
    }

    /// Snapshot of a session
    pub async fn session(&self, id: SessionId) -> Option<CallSession> {
        let handle = self.store.get(id).await?;
        let session = handle.lock().await;
        Some(session.clone())
    }

    /// Snapshot of the session placed under a provider call id
    pub async fn session_by_provider_id(&self, call_id: &str) -> Option<CallSession> {
        let handle = self.store.find_by_provider_call_id(call_id).await?;
        let session = handle.lock().await;
        Some(session.clone())
    }

    async fn apply_status(
        &self,
        handle: SessionHandle,
        call_id: Option<&str>,
        status: ProviderStatus,
    ) -> CallbackOutcome {
        let (transition, snapshot, newly_bound) = {
            let mut session = handle.lock().await;
            let newly_bound = bind_call_id(&mut session, call_id);
            let transition = session.apply_status(status);
            (transition, session.clone(), newly_bound)
        };

        self.index(snapshot.id, newly_bound).await;
        self.conclude(snapshot, transition, "status").await
    }

    async fn index(&self, id: SessionId, call_id: Option<String>) {
        if let Some(call_id) = call_id {
            self.store.bind_provider_call_id(id, &call_id).await;
        }
    }

    async fn conclude(
        &self,
        session: CallSession,
        transition: Transition,
        event: &str,
    ) -> CallbackOutcome {
        match transition {
            Transition::Moved { from, to } => {
                info!("Session {} {} -> {} ({})", session.id, from, to, event);
                self.dispatcher
                    .notify(&session, Outcome::StatusChanged(to))
                    .await;
                CallbackOutcome::Applied(to)
            }
            Transition::Recorded => CallbackOutcome::Applied(session.status()),
            Transition::Ignored => {
                warn!(
                    "Duplicate {} callback for session {} (status {})",
                    event,
                    session.id,
                    session.status()
                );
                CallbackOutcome::Duplicate
            }
        }
    }
}

/// Bind a call id reported by a callback; returns it when it was new.
fn bind_call_id(session: &mut CallSession, call_id: Option<&str>) -> Option<String> {
    let call_id = call_id.filter(|c| !c.is_empty())?;

    if let Some(existing) = session.provider_call_id() {
        if existing != call_id {
            warn!(
                "Session {} is bound to {}, ignoring call id {}",
                session.id, existing, call_id
            );
        }
        return None;
    }

    session.bind_provider_call_id(call_id);
    Some(call_id.to_string())
}
