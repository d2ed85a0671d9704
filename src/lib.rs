pub mod config;
pub mod dispatch;
pub mod extract;
pub mod http;
pub mod provider;
pub mod session;

pub use config::Config;
pub use dispatch::{LogNotifier, Notifier, Outcome, ResultDispatcher, TelegramNotifier};
pub use extract::{Extraction, ExtractionMethod, ExtractorTables, NumberExtractor};
pub use http::{create_router, AppState};
pub use provider::{
    CallbackUrls, PlacementError, PlacementRequest, TelephonyProvider, TwilioProvider,
    TwimlBuilder, UnconfiguredProvider,
};
pub use session::{
    CallError, CallSession, CallStateMachine, CallStatus, CallbackOutcome, MemorySessionStore,
    Payload, PayloadRequest, PhoneNumber, ProviderStatus, SessionConfig, SessionId, SessionStore,
    UserId, ValidationError, VoiceConfig, VoiceResponse,
};
