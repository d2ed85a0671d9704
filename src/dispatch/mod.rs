//! Result dispatch
//!
//! Translates session outcomes into messages for the user who requested the
//! call and hands them to a [`Notifier`]. Delivery failures are logged and
//! dropped; they never touch session state.

mod notifier;

pub use notifier::{LogNotifier, Notifier, TelegramNotifier};

use crate::session::{CallSession, CallStatus, VoiceResponse};
use std::sync::Arc;
use tracing::{debug, error};

/// Something worth telling the user about
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    StatusChanged(CallStatus),
    Final(VoiceResponse),
}

/// Intermediate message for a status, if the status has one
pub fn status_message(status: CallStatus) -> Option<&'static str> {
    match status {
        CallStatus::Ringing => Some("Phone is ringing..."),
        CallStatus::InProgress => Some("Call answered! Playing your message..."),
        CallStatus::Busy => Some("Line busy - call failed"),
        CallStatus::NoAnswer => Some("No answer - call failed"),
        CallStatus::Failed => Some("Call failed"),
        _ => None,
    }
}

/// Summary sent once the callee's answer has been processed
pub fn final_message(session: &CallSession, response: &VoiceResponse) -> String {
    let mut message = format!(
        "Call completed to {}\n\nFull response:\n\"{}\"\n\n",
        session.target, response.transcription
    );

    if response.numbers.is_empty() {
        message.push_str("No numbers detected in response");
    } else {
        message.push_str(&format!(
            "Numbers extracted: {}\nConfidence: {:.2}",
            response.numbers.join(", "),
            response.confidence
        ));
    }

    message
}

/// Formats outcomes and delivers them to the session owner
#[derive(Clone)]
pub struct ResultDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl ResultDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Render the message for an outcome; `None` when there is nothing to say
    pub fn render(session: &CallSession, outcome: &Outcome) -> Option<String> {
        match outcome {
            Outcome::StatusChanged(status) => status_message(*status).map(str::to_string),
            Outcome::Final(response) => Some(final_message(session, response)),
        }
    }

    /// Notify the session owner. Never fails.
    pub async fn notify(&self, session: &CallSession, outcome: Outcome) {
        let Some(message) = Self::render(session, &outcome) else {
            debug!("No notification for session {}: {:?}", session.id, outcome);
            return;
        };

        if let Err(e) = self.notifier.send(session.owner, &message).await {
            error!(
                "Failed to notify user {} about session {}: {:#}",
                session.owner, session.id, e
            );
        }
    }
}
