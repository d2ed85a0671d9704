//! Call session management
//!
//! This module owns the lifecycle of an outbound call:
//! - `CallSession` - one call, its payload, status and final response
//! - `CallStatus` / `ProviderStatus` - the monotonic status lattice and the
//!   provider's status vocabulary
//! - `SessionStore` - per-session locked storage with a provider id index
//! - `CallStateMachine` - the named transitions every callback goes through

mod config;
mod error;
mod machine;
mod payload;
mod session;
mod status;
mod store;

pub use config::SessionConfig;
pub use error::{CallError, ValidationError};
pub use machine::{CallStateMachine, CallbackOutcome};
pub use payload::{Payload, PayloadRequest, PhoneNumber, VoiceConfig};
pub use session::{CallSession, SessionId, Transition, UserId, VoiceResponse};
pub use status::{CallStatus, ProviderStatus, UnknownProviderStatus};
pub use store::{MemorySessionStore, SessionHandle, SessionStore};
