use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use interview_client::{
    create_router, open_session, AppState, AudioFile, AudioSource, ChatMessage, Config,
    ConnectionState, Mode, SessionError, Signal,
};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "interview-client")]
#[command(about = "Real-time interview session client")]
struct Cli {
    /// Configuration file (extension optional)
    #[arg(short, long, default_value = "config/interview-client")]
    settings: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP control API
    Serve,

    /// Run one session, streaming a WAV file or a test tone as the answer
    Run {
        /// Interview mode (gd, hcs, pcs, upsc, csat, polity, practice)
        #[arg(short, long)]
        mode: Mode,

        /// Mode configuration as inline JSON or a path to a JSON file
        #[arg(short, long)]
        config: String,

        /// WAV file to stream; a 440 Hz tone is used when omitted
        #[arg(short, long)]
        audio: Option<PathBuf>,

        /// Language to answer a language prompt with
        #[arg(short, long)]
        language: Option<String>,

        /// Seconds to stream the tone for when no WAV file is given
        #[arg(long, default_value = "10")]
        duration: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.settings)?;

    info!("Interview client v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);
    info!("Backend base URL: {}", cfg.endpoints.base_url);

    match cli.command {
        Command::Serve => serve(cfg).await,
        Command::Run {
            mode,
            config,
            audio,
            language,
            duration,
        } => run(cfg, mode, &config, audio, language, duration).await,
    }
}

async fn serve(cfg: Config) -> Result<()> {
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let app = create_router(AppState::new(cfg));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;
    Ok(())
}

fn read_mode_config(raw: &str) -> Result<Value> {
    let text = if raw.trim_start().starts_with('{') {
        raw.to_string()
    } else {
        std::fs::read_to_string(raw).with_context(|| format!("Failed to read {}", raw))?
    };
    serde_json::from_str(&text).context("Mode configuration is not valid JSON")
}

async fn run(
    cfg: Config,
    mode: Mode,
    raw_config: &str,
    audio: Option<PathBuf>,
    language: Option<String>,
    duration: u64,
) -> Result<()> {
    let mode_config = read_mode_config(raw_config)?;

    let stream_for = match &audio {
        Some(path) => {
            let file = AudioFile::open(path)?;
            info!(
                "Streaming {} ({:.1}s, {} Hz, {} ch)",
                path.display(),
                file.duration_seconds,
                file.sample_rate,
                file.channels
            );
            Duration::from_secs_f64(file.duration_seconds) + Duration::from_secs(1)
        }
        None => Duration::from_secs(duration),
    };

    let session = open_session(mode, &cfg)?;

    let _messages = session.subscribe_messages(Box::new(|message: &ChatMessage| {
        info!("[{}] {}", message.speaker.display_name(), message.content());
    }));
    let _errors = session.subscribe_errors(Box::new(|err: &SessionError| {
        warn!("Session error: {}", err)
    }));
    let _status = session.subscribe_status(Box::new(|state: &ConnectionState| {
        info!("Phase: {}", state)
    }));

    let info = session.configure_json(mode_config).await?;
    info!(
        "Session {} configured (code: {})",
        info.session_id,
        info.session_code.as_deref().unwrap_or("none")
    );

    if let Some(language) = &language {
        session.select_language(language);
    }

    let source = match audio {
        Some(path) => AudioSource::File(path),
        None => AudioSource::Synthetic(Signal::Tone {
            frequency_hz: 440.0,
            amplitude: 0.2,
        }),
    };
    session.start_recording(source).await?;

    tokio::select! {
        _ = tokio::time::sleep(stream_for) => {}
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    session.stop_recording().await?;

    match session.end_interview().await {
        Ok(Some(summary)) => {
            info!("Summary received");
            println!("{}", serde_json::to_string_pretty(&summary.raw)?);
        }
        Ok(None) => warn!("Session ended without a summary"),
        Err(e) => bail!("Failed to end interview: {}", e),
    }

    let stats = session.stats();
    info!(
        "Sent {} frames ({} bytes), dropped {}, {} transcript entries",
        stats.frames_sent, stats.bytes_sent, stats.frames_dropped, stats.transcript_entries
    );
    Ok(())
}
