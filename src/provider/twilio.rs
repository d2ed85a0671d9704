use super::{PlacementError, PlacementRequest, TelephonyProvider};
use crate::config::TelephonyConfig;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info};

/// Status events the provider should report back
const STATUS_CALLBACK_EVENTS: &[&str] = &["initiated", "ringing", "answered", "completed"];

/// Call resource returned by the Calls endpoint
#[derive(Debug, Deserialize)]
struct CallResource {
    sid: Option<String>,
}

/// Error body returned on a refused request
#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
}

/// Places calls through the Twilio REST API (or a compatible endpoint).
pub struct TwilioProvider {
    client: reqwest::Client,
    api_base: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
    ring_timeout_secs: u32,
}

impl TwilioProvider {
    /// Build a provider from configuration; `None` when credentials are
    /// missing or still hold placeholder values.
    pub fn from_config(config: &TelephonyConfig) -> Option<Self> {
        if !config.is_configured() {
            return None;
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| error!("Failed to build telephony HTTP client: {}", e))
            .ok()?;

        Some(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
            ring_timeout_secs: config.ring_timeout_secs,
        })
    }

    fn calls_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Calls.json",
            self.api_base, self.account_sid
        )
    }

    fn form(&self, request: &PlacementRequest) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("To", request.to.clone()),
            ("From", self.from_number.clone()),
            ("Url", request.instructions_url.clone()),
            ("Method", "POST".to_string()),
            ("Timeout", self.ring_timeout_secs.to_string()),
            ("StatusCallback", request.status_callback_url.clone()),
            ("StatusCallbackMethod", "POST".to_string()),
        ];
        form.extend(
            STATUS_CALLBACK_EVENTS
                .iter()
                .map(|event| ("StatusCallbackEvent", event.to_string())),
        );
        form
    }
}

#[async_trait]
impl TelephonyProvider for TwilioProvider {
    async fn place_call(&self, request: &PlacementRequest) -> Result<String, PlacementError> {
        info!(
            "Placing call for session {} to {}",
            request.session_id, request.to
        );

        let response = self
            .client
            .post(self.calls_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&self.form(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or(body);
            error!(
                "Call for session {} rejected ({}): {}",
                request.session_id, status, message
            );
            return Err(PlacementError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let call: CallResource = response.json().await?;
        let sid = call.sid.ok_or(PlacementError::MissingCallId)?;

        info!("Call initiated for session {}: {}", request.session_id, sid);
        Ok(sid)
    }

    fn name(&self) -> &str {
        "twilio"
    }
}
