use anyhow::{Context, Result};
use call_capture::{
    create_router, AppState, CallStateMachine, CallbackUrls, Config, LogNotifier,
    MemorySessionStore, Notifier, NumberExtractor, ResultDispatcher, SessionConfig,
    TelegramNotifier, TelephonyProvider, TwilioProvider, TwimlBuilder, UnconfiguredProvider,
};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Outbound call service: speaks or plays a message, records the answer and
/// reports the numbers spoken in it.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Config file (extension optional)
    #[arg(short, long, default_value = "config/call-capture")]
    config: String,

    /// Override the HTTP bind address
    #[arg(long)]
    bind: Option<String>,

    /// Override the HTTP port
    #[arg(long)]
    port: Option<u16>,
}

fn init_tracing(cfg: &Config) {
    let filter = EnvFilter::try_new(&cfg.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if cfg.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_provider(cfg: &Config) -> Arc<dyn TelephonyProvider> {
    match TwilioProvider::from_config(&cfg.telephony) {
        Some(provider) => Arc::new(provider),
        None => {
            warn!("Telephony credentials not configured - calls cannot be placed");
            Arc::new(UnconfiguredProvider)
        }
    }
}

fn build_notifier(cfg: &Config) -> Result<Arc<dyn Notifier>> {
    match TelegramNotifier::from_config(&cfg.notifier)? {
        Some(notifier) => Ok(Arc::new(notifier)),
        None => {
            warn!("No bot token configured - results will only be logged");
            Ok(Arc::new(LogNotifier))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = Config::load(&cli.config)?;
    if let Some(bind) = cli.bind {
        cfg.service.http.bind = bind;
    }
    if let Some(port) = cli.port {
        cfg.service.http.port = port;
    }

    init_tracing(&cfg);

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Loaded config from {}", cli.config);

    let urls = CallbackUrls::new(cfg.telephony.public_base_url.clone());
    info!("Provider callbacks will use {}", urls.base_url());

    let provider = build_provider(&cfg);
    let dispatcher = ResultDispatcher::new(build_notifier(&cfg)?);
    let session_config = SessionConfig {
        max_speech_text_length: cfg.limits.max_speech_text_length,
    };

    let machine = Arc::new(CallStateMachine::new(
        Arc::new(MemorySessionStore::new()),
        provider,
        Arc::new(NumberExtractor::default()),
        dispatcher,
        urls.clone(),
        session_config,
    ));
    info!("Telephony provider: {}", machine.provider_name());

    let twiml = TwimlBuilder::new(urls, cfg.telephony.max_listening_secs);
    let app = create_router(AppState::new(machine, twiml, cfg.service.name.clone()));

    let addr = cfg.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind HTTP server to {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down");
}
