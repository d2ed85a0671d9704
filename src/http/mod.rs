//! HTTP surface: provider webhooks and the call API
//!
//! Provider callbacks (form-encoded):
//! - POST /twiml/:id - Call instructions once the callee answers
//! - POST /call_status/:id - Call status changes
//! - POST /capture_response/:id - Recording finished
//! - POST /process_speech/:id - Transcription of the recording
//!
//! Call API (JSON):
//! - POST /calls - Create and place a call
//! - GET /calls/:id - Session snapshot
//! - GET /calls/by-provider/:call_id - Session snapshot by provider call id
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
