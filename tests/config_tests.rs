// Integration tests for configuration loading

use anyhow::Result;
use call_capture::Config;
use std::fs;
use tempfile::TempDir;

const FULL_CONFIG: &str = r#"
[service]
name = "call-capture"

[service.http]
bind = "0.0.0.0"
port = 9000

[telephony]
account_sid = "AC0123"
auth_token = "secret"
from_number = "+15005550006"
public_base_url = "https://calls.example.com"
ring_timeout_secs = 20

[limits]
max_speech_text_length = 500

[logging]
level = "debug"
json = true
"#;

const MINIMAL_CONFIG: &str = r#"
[service]
name = "minimal"

[service.http]
bind = "127.0.0.1"
port = 8000
"#;

fn write_config(dir: &TempDir, name: &str, contents: &str) -> Result<String> {
    let path = dir.path().join(format!("{}.toml", name));
    fs::write(&path, contents)?;
    Ok(dir.path().join(name).to_string_lossy().into_owned())
}

#[test]
fn test_load_full_config() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_config(&dir, "full", FULL_CONFIG)?;

    let cfg = Config::load(&path)?;

    assert_eq!(cfg.service.name, "call-capture");
    assert_eq!(cfg.bind_address(), "0.0.0.0:9000");
    assert_eq!(cfg.telephony.account_sid, "AC0123");
    assert_eq!(cfg.telephony.public_base_url, "https://calls.example.com");
    assert_eq!(cfg.telephony.ring_timeout_secs, 20);
    assert_eq!(cfg.telephony.max_listening_secs, 60);
    assert_eq!(cfg.telephony.api_base, "https://api.twilio.com");
    assert!(cfg.telephony.is_configured());
    assert_eq!(cfg.limits.max_speech_text_length, 500);
    assert_eq!(cfg.logging.level, "debug");
    assert!(cfg.logging.json);

    Ok(())
}

#[test]
fn test_missing_sections_use_defaults() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_config(&dir, "minimal", MINIMAL_CONFIG)?;

    let cfg = Config::load(&path)?;

    assert_eq!(cfg.service.name, "minimal");
    assert!(!cfg.telephony.is_configured());
    assert_eq!(cfg.telephony.ring_timeout_secs, 30);
    assert_eq!(cfg.limits.max_speech_text_length, 4000);
    assert_eq!(cfg.logging.level, "info");
    assert!(!cfg.logging.json);

    Ok(())
}

#[test]
fn test_placeholder_credentials_are_not_configured() -> Result<()> {
    let dir = TempDir::new()?;
    let placeholder = MINIMAL_CONFIG.to_string()
        + r#"
[telephony]
account_sid = "your_account_sid"
auth_token = "your_auth_token"
from_number = "your_phone_number"
"#;
    let path = write_config(&dir, "placeholder", &placeholder)?;

    let cfg = Config::load(&path)?;
    assert!(!cfg.telephony.is_configured());

    Ok(())
}

#[test]
fn test_environment_overrides_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_config(&dir, "env", MINIMAL_CONFIG)?;

    std::env::set_var("CALL_CAPTURE__NOTIFIER__TELEGRAM_BOT_TOKEN", "123:from-env");
    let cfg = Config::load(&path);
    std::env::remove_var("CALL_CAPTURE__NOTIFIER__TELEGRAM_BOT_TOKEN");

    assert_eq!(cfg?.notifier.telegram_bot_token, "123:from-env");

    Ok(())
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent").to_string_lossy().into_owned();

    assert!(Config::load(&path).is_err());
}
