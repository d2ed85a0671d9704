use super::state::AppState;
use crate::session::{
    CallError, CallbackOutcome, PayloadRequest, ProviderStatus, SessionId, UserId,
};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    Form,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateCallRequest {
    /// Chat id the results are reported to
    pub owner: UserId,

    /// Number to dial, free-form
    pub to: String,

    pub payload: PayloadRequest,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Provider call status callback
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatusCallback {
    pub call_sid: Option<String>,
    pub call_status: Option<String>,
}

/// Provider recording-finished callback
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordingCallback {
    pub call_sid: Option<String>,
    pub recording_url: Option<String>,
}

/// Provider transcription callback
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TranscriptionCallback {
    pub transcription_text: Option<String>,
    pub transcription_status: Option<String>,
    pub call_sid: Option<String>,
}

fn error_response(status: StatusCode, error: impl ToString) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

fn twiml_response(xml: String) -> Response {
    ([(header::CONTENT_TYPE, "text/xml")], xml).into_response()
}

fn log_outcome(event: &str, id: SessionId, outcome: CallbackOutcome) {
    match outcome {
        CallbackOutcome::Applied(status) => {
            info!("{} callback for session {} applied: {}", event, id, status)
        }
        CallbackOutcome::Duplicate => {}
        CallbackOutcome::UnknownSession => {
            warn!("{} callback for unknown session {} acknowledged", event, id)
        }
    }
}

// ============================================================================
// Call API
// ============================================================================

/// POST /calls
/// Create a session and dial it
pub async fn create_call(
    State(state): State<AppState>,
    Json(req): Json<CreateCallRequest>,
) -> Response {
    let session = match state.machine.create(req.owner, &req.to, req.payload).await {
        Ok(session) => session,
        Err(e) => {
            warn!("Rejected call request for user {}: {}", req.owner, e);
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, e);
        }
    };

    if let Err(e) = state.machine.place(session.id).await {
        let status = match &e {
            CallError::Placement(_) => StatusCode::BAD_GATEWAY,
            CallError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            CallError::AlreadyPlaced(_) | CallError::CallIdConflict { .. } => {
                StatusCode::CONFLICT
            }
            CallError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        return error_response(status, e);
    }

    match state.machine.session(session.id).await {
        Some(session) => (StatusCode::CREATED, Json(session)).into_response(),
        None => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Session {} disappeared", session.id),
        ),
    }
}

/// GET /calls/:session_id
pub async fn get_call(State(state): State<AppState>, Path(session_id): Path<u64>) -> Response {
    match state.machine.session(SessionId(session_id)).await {
        Some(session) => (StatusCode::OK, Json(session)).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("Session {} not found", session_id),
        ),
    }
}

/// GET /calls/by-provider/:call_id
pub async fn get_call_by_provider_id(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
) -> Response {
    match state.machine.session_by_provider_id(&call_id).await {
        Some(session) => (StatusCode::OK, Json(session)).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("No session for provider call {}", call_id),
        ),
    }
}

// ============================================================================
// Provider webhooks
// ============================================================================
//
// The provider retries any callback that is not acknowledged with 2xx, so
// these handlers acknowledge duplicates and unknown sessions too.

/// POST /twiml/:session_id
/// Call instructions fetched when the callee answers
pub async fn call_instructions(
    State(state): State<AppState>,
    Path(session_id): Path<u64>,
) -> Response {
    let xml = match state.machine.session(SessionId(session_id)).await {
        Some(session) => state.twiml.for_session(&session),
        None => {
            warn!("Instructions requested for unknown session {}", session_id);
            state.twiml.message("Session not found.")
        }
    };
    twiml_response(xml)
}

/// POST /call_status/:session_id
pub async fn call_status(
    State(state): State<AppState>,
    Path(session_id): Path<u64>,
    Form(callback): Form<StatusCallback>,
) -> Response {
    let id = SessionId(session_id);
    let raw = callback.call_status.unwrap_or_default();

    match raw.parse::<ProviderStatus>() {
        Ok(status) => {
            let outcome = state
                .machine
                .on_session_status_event(id, callback.call_sid.as_deref(), status)
                .await;
            log_outcome("Status", id, outcome);
        }
        Err(e) => warn!("Ignoring status callback for session {}: {}", id, e),
    }

    Json(json!({ "status": "updated" })).into_response()
}

/// POST /capture_response/:session_id
/// Recording finished; say goodbye and hang up
pub async fn capture_response(
    State(state): State<AppState>,
    Path(session_id): Path<u64>,
    Form(callback): Form<RecordingCallback>,
) -> Response {
    let id = SessionId(session_id);
    let outcome = state
        .machine
        .on_recording_captured(
            id,
            callback.recording_url.as_deref(),
            callback.call_sid.as_deref(),
        )
        .await;
    log_outcome("Recording", id, outcome);

    twiml_response(state.twiml.goodbye())
}

/// POST /process_speech/:session_id
/// Transcription of the callee's answer
pub async fn process_speech(
    State(state): State<AppState>,
    Path(session_id): Path<u64>,
    Form(callback): Form<TranscriptionCallback>,
) -> Response {
    let id = SessionId(session_id);
    let text = callback.transcription_text.unwrap_or_default();
    let status = callback.transcription_status.unwrap_or_default();

    info!(
        "Transcription for session {} (call {}): {:?}",
        id,
        callback.call_sid.as_deref().unwrap_or("-"),
        status
    );

    let outcome = state.machine.on_transcription(id, &text, &status).await;
    log_outcome("Transcription", id, outcome);

    Json(json!({ "status": "processed" })).into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": state.service_name,
    }))
}
