use super::{ssml, CallbackUrls};
use crate::session::{CallSession, Payload, SessionId, VoiceConfig};
use tracing::info;

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Voice used for service messages (errors, goodbye)
const SERVICE_VOICE: &str = "alice";

/// Seconds of silence between the message and the start of recording
const PAUSE_BEFORE_RECORDING_SECS: u32 = 2;

/// Builds TwiML call-instruction documents.
///
/// Every payload document follows the same shape: play or speak the message,
/// pause, record the answer with transcription enabled, hang up.
#[derive(Debug, Clone)]
pub struct TwimlBuilder {
    urls: CallbackUrls,
    max_listening_secs: u32,
}

impl TwimlBuilder {
    pub fn new(urls: CallbackUrls, max_listening_secs: u32) -> Self {
        Self {
            urls,
            max_listening_secs,
        }
    }

    /// Instructions for a session, chosen by its payload
    pub fn for_session(&self, session: &CallSession) -> String {
        match &session.payload {
            Payload::Audio { url } => self.audio(session.id, url),
            Payload::Speech { text, voice } => self.speech(session.id, text, voice),
        }
    }

    /// Play an audio file, then record the answer
    pub fn audio(&self, id: SessionId, audio_url: &str) -> String {
        let play = format!("<Play>{}</Play>", escape_xml(audio_url));
        info!("Generated audio TwiML for session {}", id);
        self.document(&[play, self.pause(), self.record(id), hangup()])
    }

    /// Speak text (plain or SSML), then record the answer. A `<speak>`
    /// document is rendered as SSML even when the voice does not ask for it.
    pub fn speech(&self, id: SessionId, text: &str, voice: &VoiceConfig) -> String {
        let body = if voice.ssml || ssml::is_document(text) {
            ssml::render(text, voice)
        } else {
            escape_xml(text)
        };

        let say = format!(
            r#"<Say voice="{}" language="{}">{}</Say>"#,
            escape_xml(&voice.voice_name),
            escape_xml(&voice.language),
            body
        );
        info!("Generated speech TwiML for session {}", id);
        self.document(&[say, self.pause(), self.record(id), hangup()])
    }

    /// Say a short message and hang up
    pub fn message(&self, text: &str) -> String {
        let say = format!(
            r#"<Say voice="{}">{}</Say>"#,
            SERVICE_VOICE,
            escape_xml(text)
        );
        self.document(&[say, hangup()])
    }

    /// Reply to the recording callback
    pub fn goodbye(&self) -> String {
        self.message("Thank you for your response. Goodbye.")
    }

    fn pause(&self) -> String {
        format!(r#"<Pause length="{}"/>"#, PAUSE_BEFORE_RECORDING_SECS)
    }

    fn record(&self, id: SessionId) -> String {
        format!(
            r##"<Record action="{}" method="POST" maxLength="{}" transcribe="true" transcribeCallback="{}" playBeep="false" finishOnKey="#"/>"##,
            escape_xml(&self.urls.capture_response(id)),
            self.max_listening_secs,
            escape_xml(&self.urls.process_speech(id)),
        )
    }

    fn document(&self, verbs: &[String]) -> String {
        format!("{}<Response>{}</Response>", XML_HEADER, verbs.concat())
    }
}

fn hangup() -> String {
    "<Hangup/>".to_string()
}

/// Escape the five XML special characters
pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
