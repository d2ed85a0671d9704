//! SSML rendering for speech payloads.
//!
//! Produces the markup that goes inside a `<Say>` element: optional
//! `<prosody>` wrapper, breaks after punctuation, emphasis on security words
//! and digit-by-digit reading of numbers.

use super::twiml::escape_xml;
use crate::session::VoiceConfig;
use once_cell::sync::Lazy;
use regex::Regex;

static EMPHASIS_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(pin|password|security|verification|code|account)\b").unwrap()
});

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[0-9]+\b").unwrap());

/// Render `text` as SSML according to `voice`.
///
/// Text that already is an SSML document (`<speak ...>`) is passed through
/// with its root element removed.
pub fn render(text: &str, voice: &VoiceConfig) -> String {
    if is_document(text) {
        return strip_speak_root(text.trim()).to_string();
    }

    let mut body = escape_xml(text);

    if voice.pauses {
        body = add_pauses(&body);
    }
    if voice.emphasis {
        body = EMPHASIS_WORDS
            .replace_all(&body, r#"<emphasis level="strong">$1</emphasis>"#)
            .into_owned();
    }
    if voice.spell_numbers {
        body = DIGIT_RUN
            .replace_all(&body, r#"<say-as interpret-as="spell-out">$0</say-as>"#)
            .into_owned();
    }

    match prosody_attributes(voice) {
        Some(attrs) => format!("<prosody{}>{}</prosody>", attrs, body),
        None => body,
    }
}

/// Whether `text` is already a complete SSML document
pub fn is_document(text: &str) -> bool {
    text.trim_start().starts_with("<speak")
}

fn prosody_attributes(voice: &VoiceConfig) -> Option<String> {
    let mut attrs = String::new();
    if (voice.speed - 1.0).abs() > f32::EPSILON {
        attrs.push_str(&format!(r#" rate="{:.0}%""#, voice.speed * 100.0));
    }
    if voice.pitch.abs() > f32::EPSILON {
        attrs.push_str(&format!(r#" pitch="{:+.1}Hz""#, voice.pitch));
    }
    (!attrs.is_empty()).then_some(attrs)
}

fn add_pauses(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        out.push(c);
        match c {
            '.' | '?' | '!' => out.push_str(r#"<break time="500ms"/>"#),
            ',' => out.push_str(r#"<break time="200ms"/>"#),
            _ => {}
        }
    }
    out
}

fn strip_speak_root(doc: &str) -> &str {
    let inner_start = doc.find('>').map(|i| i + 1).unwrap_or(0);
    let inner_end = doc.rfind("</speak>").unwrap_or(doc.len());
    if inner_start <= inner_end {
        doc[inner_start..inner_end].trim()
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_voice_only_escapes() {
        let voice = VoiceConfig::default();
        assert_eq!(render("Tom & Jerry", &voice), "Tom &amp; Jerry");
    }

    #[test]
    fn test_prosody_for_speed_and_pitch() {
        let voice = VoiceConfig {
            speed: 0.8,
            pitch: 5.0,
            ..VoiceConfig::default()
        };
        assert_eq!(
            render("hello", &voice),
            r#"<prosody rate="80%" pitch="+5.0Hz">hello</prosody>"#
        );
    }

    #[test]
    fn test_pauses_emphasis_and_spelling() {
        let voice = VoiceConfig {
            pauses: true,
            emphasis: true,
            spell_numbers: true,
            ..VoiceConfig::default()
        };
        let out = render("Enter your PIN, then press 1.", &voice);
        assert_eq!(
            out,
            r#"Enter your <emphasis level="strong">PIN</emphasis>,<break time="200ms"/> then press <say-as interpret-as="spell-out">1</say-as>.<break time="500ms"/>"#
        );
    }

    #[test]
    fn test_existing_document_passes_through() {
        let voice = VoiceConfig::default();
        assert_eq!(
            render(r#"<speak version="1.0">Hi <break time="1s"/></speak>"#, &voice),
            r#"Hi <break time="1s"/>"#
        );
    }
}
