// Shared fakes for integration tests
#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use call_capture::{
    CallStateMachine, CallbackUrls, MemorySessionStore, Notifier, NumberExtractor,
    PlacementError, PlacementRequest, ResultDispatcher, SessionConfig, TelephonyProvider, UserId,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE_URL: &str = "https://calls.example.com";

/// Provider that answers every placement with a fixed call id, or refuses
pub struct FakeProvider {
    call_id: Option<String>,
    delay: Option<Duration>,
    requests: Mutex<Vec<PlacementRequest>>,
}

impl FakeProvider {
    pub fn accepting(call_id: &str) -> Self {
        Self {
            call_id: Some(call_id.to_string()),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            call_id: None,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer only after `millis`, like a slow provider API
    pub fn with_delay(mut self, millis: u64) -> Self {
        self.delay = Some(Duration::from_millis(millis));
        self
    }

    pub fn requests(&self) -> Vec<PlacementRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TelephonyProvider for FakeProvider {
    async fn place_call(&self, request: &PlacementRequest) -> Result<String, PlacementError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.call_id {
            Some(id) => Ok(id.clone()),
            None => Err(PlacementError::Rejected {
                status: 400,
                message: "The 'To' number is not a valid phone number.".to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Notifier that keeps every message it is asked to send
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(UserId, String)>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn messages(&self) -> Vec<(UserId, String)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.messages().into_iter().map(|(_, text)| text).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, user: UserId, message: &str) -> Result<()> {
        self.messages.lock().unwrap().push((user, message.to_string()));
        if self.fail {
            bail!("chat service unavailable");
        }
        Ok(())
    }
}

pub struct Harness {
    pub machine: Arc<CallStateMachine>,
    pub provider: Arc<FakeProvider>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn harness_with(provider: FakeProvider, notifier: RecordingNotifier) -> Harness {
    let provider = Arc::new(provider);
    let notifier = Arc::new(notifier);

    let machine = CallStateMachine::new(
        Arc::new(MemorySessionStore::new()),
        provider.clone(),
        Arc::new(NumberExtractor::default()),
        ResultDispatcher::new(notifier.clone()),
        CallbackUrls::new(BASE_URL),
        SessionConfig::default(),
    );

    Harness {
        machine: Arc::new(machine),
        provider,
        notifier,
    }
}

pub fn harness(provider: FakeProvider) -> Harness {
    harness_with(provider, RecordingNotifier::default())
}
