use super::payload::{Payload, PhoneNumber};
use super::status::{CallStatus, ProviderStatus};
use crate::extract::Extraction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Process-unique, monotonically allocated call session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Chat identifier of the user who requested the call
pub type UserId = i64;

/// The callee's answer: what was said and the figures found in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceResponse {
    pub session_id: SessionId,
    pub transcription: String,
    pub numbers: Vec<String>,
    pub confidence: f32,
    pub received_at: DateTime<Utc>,
}

impl VoiceResponse {
    pub fn from_extraction(
        session_id: SessionId,
        transcription: impl Into<String>,
        extraction: Extraction,
    ) -> Self {
        Self {
            session_id,
            transcription: transcription.into(),
            numbers: extraction.numbers,
            confidence: extraction.confidence,
            received_at: Utc::now(),
        }
    }

    /// Response for a transcription that failed or never completed
    pub fn empty(session_id: SessionId, transcription: impl Into<String>) -> Self {
        Self::from_extraction(session_id, transcription, Extraction::default())
    }
}

/// Result of applying one event to a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// State moved from one status to another
    Moved { from: CallStatus, to: CallStatus },

    /// Event recorded without a status change (response attached to an
    /// already completed call, provider id bound)
    Recorded,

    /// Event repeats or predates what is already known; nothing changed
    Ignored,
}

impl Transition {
    pub fn changed(self) -> bool {
        !matches!(self, Transition::Ignored)
    }
}

/// One outbound call from request to final result.
///
/// All mutation goes through the transition methods below, which keep the
/// invariants: status only moves forward, terminal states are final, the
/// provider call id is written once, and at most one [`VoiceResponse`] is
/// attached.
#[derive(Debug, Clone, Serialize)]
pub struct CallSession {
    pub id: SessionId,
    pub owner: UserId,
    pub target: PhoneNumber,
    pub payload: Payload,
    provider_call_id: Option<String>,
    status: CallStatus,
    pub created_at: DateTime<Utc>,
    placed_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    recording_ref: Option<String>,
    response: Option<VoiceResponse>,
    /// A placement request is in flight with the provider
    #[serde(skip)]
    placing: bool,
}

impl CallSession {
    pub fn new(id: SessionId, owner: UserId, target: PhoneNumber, payload: Payload) -> Self {
        Self {
            id,
            owner,
            target,
            payload,
            provider_call_id: None,
            status: CallStatus::Initiated,
            created_at: Utc::now(),
            placed_at: None,
            ended_at: None,
            recording_ref: None,
            response: None,
            placing: false,
        }
    }

    pub fn status(&self) -> CallStatus {
        self.status
    }

    pub fn provider_call_id(&self) -> Option<&str> {
        self.provider_call_id.as_deref()
    }

    pub fn placed_at(&self) -> Option<DateTime<Utc>> {
        self.placed_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn recording_ref(&self) -> Option<&str> {
        self.recording_ref.as_deref()
    }

    pub fn response(&self) -> Option<&VoiceResponse> {
        self.response.as_ref()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Record the provider's call id. Returns `false` if a different id is
    /// already bound (the first one wins).
    pub fn bind_provider_call_id(&mut self, call_id: &str) -> bool {
        match &self.provider_call_id {
            Some(existing) => existing == call_id,
            None => {
                self.provider_call_id = Some(call_id.to_string());
                true
            }
        }
    }

    /// Claim the session for placement. Returns `false` if it was placed,
    /// is being placed, already has a provider call or has ended.
    pub fn begin_placement(&mut self) -> bool {
        if self.placing
            || self.placed_at.is_some()
            || self.provider_call_id.is_some()
            || self.is_terminal()
        {
            return false;
        }
        self.placing = true;
        true
    }

    /// The provider accepted the call. Returns `false` if a different call id
    /// was bound while the request was in flight.
    pub fn mark_placed(&mut self, call_id: &str) -> bool {
        self.placing = false;
        self.placed_at.get_or_insert_with(Utc::now);
        self.bind_provider_call_id(call_id)
    }

    /// The provider refused the call.
    pub fn mark_placement_failed(&mut self) -> Transition {
        self.placing = false;
        if self.is_terminal() {
            return Transition::Ignored;
        }
        self.enter(CallStatus::Failed)
    }

    /// Apply a provider status report.
    ///
    /// Success-path statuses only move forward; `busy`, `no-answer` and
    /// `failed` end any call that has not ended yet.
    pub fn apply_status(&mut self, status: ProviderStatus) -> Transition {
        if self.is_terminal() {
            return Transition::Ignored;
        }

        let target = status.target();
        match (target.rank(), self.status.rank()) {
            (Some(next), Some(current)) if next <= current => Transition::Ignored,
            _ => self.enter(target),
        }
    }

    /// The provider finished recording the callee's answer.
    pub fn capture_recording(&mut self, recording_ref: Option<&str>) -> Transition {
        if self.is_terminal() || self.status == CallStatus::RecordingCaptured {
            return Transition::Ignored;
        }

        if let Some(url) = recording_ref {
            self.recording_ref = Some(url.to_string());
        }
        self.enter(CallStatus::RecordingCaptured)
    }

    /// Attach the one and only response and complete the call.
    ///
    /// A call the provider already reported `completed` still takes its
    /// response, since transcriptions arrive after the call has ended.
    /// Calls that ended busy, unanswered or failed take none.
    pub fn attach_response(&mut self, response: VoiceResponse) -> Transition {
        if self.response.is_some() {
            return Transition::Ignored;
        }

        match self.status {
            CallStatus::NoAnswer | CallStatus::Busy | CallStatus::Failed => Transition::Ignored,
            CallStatus::Completed => {
                self.response = Some(response);
                Transition::Recorded
            }
            _ => {
                self.response = Some(response);
                self.enter(CallStatus::Completed)
            }
        }
    }

    fn enter(&mut self, next: CallStatus) -> Transition {
        let from = self.status;
        self.status = next;
        if next.is_terminal() {
            self.ended_at.get_or_insert_with(Utc::now);
        }
        Transition::Moved { from, to: next }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::payload::PayloadRequest;

    fn session() -> CallSession {
        CallSession::new(
            SessionId(1),
            42,
            PhoneNumber::parse("+14155551234").unwrap(),
            PayloadRequest::speech("please say your PIN")
                .validate(4000)
                .unwrap(),
        )
    }

    #[test]
    fn test_status_never_moves_backward() {
        let mut s = session();
        assert!(s.apply_status(ProviderStatus::Ringing).changed());
        assert!(s.apply_status(ProviderStatus::InProgress).changed());
        assert_eq!(s.apply_status(ProviderStatus::Ringing), Transition::Ignored);
        assert_eq!(s.apply_status(ProviderStatus::InProgress), Transition::Ignored);
        assert_eq!(s.status(), CallStatus::InProgress);
    }

    #[test]
    fn test_failure_status_ends_call_once() {
        let mut s = session();
        s.apply_status(ProviderStatus::Ringing);
        assert_eq!(
            s.apply_status(ProviderStatus::Busy),
            Transition::Moved {
                from: CallStatus::Ringing,
                to: CallStatus::Busy
            }
        );
        let ended = s.ended_at();
        assert!(ended.is_some());

        assert_eq!(s.apply_status(ProviderStatus::Busy), Transition::Ignored);
        assert_eq!(s.apply_status(ProviderStatus::Failed), Transition::Ignored);
        assert_eq!(s.ended_at(), ended);
        assert_eq!(s.status(), CallStatus::Busy);
    }

    #[test]
    fn test_provider_call_id_is_write_once() {
        let mut s = session();
        assert!(s.bind_provider_call_id("CA123"));
        assert!(s.bind_provider_call_id("CA123"));
        assert!(!s.bind_provider_call_id("CA999"));
        assert_eq!(s.provider_call_id(), Some("CA123"));
    }

    #[test]
    fn test_placement_is_claimed_once() {
        let mut s = session();
        assert!(s.begin_placement());
        assert!(!s.begin_placement());

        assert!(s.mark_placed("CA123"));
        assert!(!s.begin_placement());
    }

    #[test]
    fn test_failed_placement_cannot_be_claimed_again() {
        let mut s = session();
        assert!(s.begin_placement());
        assert!(s.mark_placement_failed().changed());
        assert_eq!(s.status(), CallStatus::Failed);
        assert!(!s.begin_placement());
    }

    #[test]
    fn test_placed_call_id_conflicts_with_earlier_callback() {
        let mut s = session();
        assert!(s.begin_placement());
        assert!(s.bind_provider_call_id("CA777"));
        assert!(!s.mark_placed("CA123"));
        assert_eq!(s.provider_call_id(), Some("CA777"));
    }

    #[test]
    fn test_recording_capture_moves_forward_only() {
        let mut s = session();
        s.apply_status(ProviderStatus::InProgress);
        assert!(s.capture_recording(Some("https://rec/1")).changed());
        assert_eq!(s.status(), CallStatus::RecordingCaptured);
        assert_eq!(s.capture_recording(Some("https://rec/2")), Transition::Ignored);
        assert_eq!(s.recording_ref(), Some("https://rec/1"));
        assert_eq!(s.apply_status(ProviderStatus::InProgress), Transition::Ignored);
    }

    #[test]
    fn test_single_response() {
        let mut s = session();
        s.apply_status(ProviderStatus::InProgress);
        assert!(s.attach_response(VoiceResponse::empty(s.id, "")).changed());
        assert_eq!(s.status(), CallStatus::Completed);
        assert_eq!(
            s.attach_response(VoiceResponse::empty(s.id, "again")),
            Transition::Ignored
        );
        assert_eq!(s.response().unwrap().transcription, "");
    }

    #[test]
    fn test_response_after_provider_completed() {
        let mut s = session();
        s.apply_status(ProviderStatus::InProgress);
        s.apply_status(ProviderStatus::Completed);
        assert_eq!(
            s.attach_response(VoiceResponse::empty(s.id, "late")),
            Transition::Recorded
        );
        assert_eq!(s.status(), CallStatus::Completed);
        assert!(s.response().is_some());
    }

    #[test]
    fn test_no_response_for_unanswered_call() {
        let mut s = session();
        s.apply_status(ProviderStatus::NoAnswer);
        assert_eq!(
            s.attach_response(VoiceResponse::empty(s.id, "")),
            Transition::Ignored
        );
        assert!(s.response().is_none());
    }
}
