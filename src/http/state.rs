use crate::provider::TwimlBuilder;
use crate::session::CallStateMachine;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Every session mutation goes through the state machine
    pub machine: Arc<CallStateMachine>,

    /// Renders call instructions for the provider
    pub twiml: TwimlBuilder,

    /// Reported by the health check
    pub service_name: String,
}

impl AppState {
    pub fn new(
        machine: Arc<CallStateMachine>,
        twiml: TwimlBuilder,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            machine,
            twiml,
            service_name: service_name.into(),
        }
    }
}
