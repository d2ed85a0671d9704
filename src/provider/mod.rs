//! Telephony provider integration
//!
//! This module covers the provider side of a call:
//! - `TelephonyProvider` - the placement seam the state machine dials through
//! - `TwilioProvider` - REST call placement against a Twilio-compatible API
//! - `TwimlBuilder` - the call-instruction document fetched when the callee answers
//! - `ssml` - markup rendering for synthesized speech
//! - `CallbackUrls` - the webhook paths the provider calls back on

pub mod ssml;
pub mod twilio;
pub mod twiml;

pub use twilio::TwilioProvider;
pub use twiml::TwimlBuilder;

use crate::session::SessionId;
use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

/// Why the provider did not accept a call
#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("telephony provider is not configured")]
    NotConfigured,

    #[error("telephony request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("telephony provider rejected the call ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("telephony provider response carried no call id")]
    MissingCallId,
}

/// Everything the provider needs to dial one call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementRequest {
    pub session_id: SessionId,

    /// E.164 number to dial
    pub to: String,

    /// Where the provider fetches call instructions once answered
    pub instructions_url: String,

    /// Where the provider reports call status changes
    pub status_callback_url: String,
}

/// Places outbound calls.
///
/// Implementations must not retry on their own: a repeated request can ring
/// the callee twice.
#[async_trait]
pub trait TelephonyProvider: Send + Sync {
    /// Dial the call and return the provider's call id
    async fn place_call(&self, request: &PlacementRequest) -> Result<String, PlacementError>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Stand-in used when no provider credentials are configured; every call is
/// refused.
#[derive(Debug, Default)]
pub struct UnconfiguredProvider;

#[async_trait]
impl TelephonyProvider for UnconfiguredProvider {
    async fn place_call(&self, request: &PlacementRequest) -> Result<String, PlacementError> {
        warn!(
            "Cannot place call for session {} - telephony not configured",
            request.session_id
        );
        Err(PlacementError::NotConfigured)
    }

    fn name(&self) -> &str {
        "unconfigured"
    }
}

/// Webhook URLs under the service's public base URL.
///
/// The paths here must match the routes in [`crate::http`].
#[derive(Debug, Clone)]
pub struct CallbackUrls {
    base_url: String,
}

impl CallbackUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn instructions(&self, id: SessionId) -> String {
        format!("{}/twiml/{}", self.base_url, id)
    }

    pub fn call_status(&self, id: SessionId) -> String {
        format!("{}/call_status/{}", self.base_url, id)
    }

    pub fn capture_response(&self, id: SessionId) -> String {
        format!("{}/capture_response/{}", self.base_url, id)
    }

    pub fn process_speech(&self, id: SessionId) -> String {
        format!("{}/process_speech/{}", self.base_url, id)
    }

    pub fn placement_request(&self, id: SessionId, to: &str) -> PlacementRequest {
        PlacementRequest {
            session_id: id,
            to: to.to_string(),
            instructions_url: self.instructions(id),
            status_callback_url: self.call_status(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_urls_trim_trailing_slash() {
        let urls = CallbackUrls::new("https://calls.example.com/");
        assert_eq!(
            urls.instructions(SessionId(7)),
            "https://calls.example.com/twiml/7"
        );
        assert_eq!(
            urls.process_speech(SessionId(7)),
            "https://calls.example.com/process_speech/7"
        );

        let req = urls.placement_request(SessionId(7), "+14155551234");
        assert_eq!(req.to, "+14155551234");
        assert_eq!(req.status_callback_url, "https://calls.example.com/call_status/7");
    }

    #[tokio::test]
    async fn test_unconfigured_provider_refuses() {
        let urls = CallbackUrls::new("http://localhost");
        let err = UnconfiguredProvider
            .place_call(&urls.placement_request(SessionId(1), "+14155551234"))
            .await
            .unwrap_err();
        assert!(matches!(err, PlacementError::NotConfigured));
    }
}
