use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use voice_notes::{
    create_router, AppState, AudioBackend, AudioBackendFactory, AudioBlob, AudioSource,
    ChannelBackend, ClipboardSink, Config, GeminiClient, JsonFileStore, NoteSession,
    SystemClipboard,
};

#[derive(Parser)]
#[command(name = "voice-notes", version, about = "Voice notes with AI transcription")]
struct Cli {
    /// Config file (without extension)
    #[arg(short, long, default_value = "config/voice-notes")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Transcribe and enrich a WAV file, then print the note as JSON
    Process {
        /// Path to a WAV recording
        wav: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("Voice Notes v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(cfg).await,
        Command::Process { wav } => process(cfg, wav).await,
    }
}

fn build_session(cfg: &Config, backend: Box<dyn AudioBackend>) -> Result<NoteSession> {
    let ai = Arc::new(GeminiClient::new(&cfg.ai)?);
    let store = Arc::new(JsonFileStore::new(&cfg.storage.data_dir)?);
    let clipboard: Arc<dyn ClipboardSink> = Arc::new(SystemClipboard);

    info!("Notes stored in {}", cfg.storage.data_dir);

    Ok(NoteSession::new(cfg.session(), backend, ai, store, clipboard))
}

async fn serve(cfg: Config) -> Result<()> {
    let source = AudioSource::parse(&cfg.audio.source)?;
    let session = build_session(&cfg, AudioBackendFactory::create(source)?)?;

    let app = create_router(AppState::new(session.clone()));
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received");
        })
        .await
        .context("HTTP server failed")?;

    session.shutdown().await;
    Ok(())
}

async fn process(cfg: Config, wav: PathBuf) -> Result<()> {
    let blob = AudioBlob::from_wav_file(&wav)?
        .with_context(|| format!("No audio data in {}", wav.display()))?;

    // The recording is already captured; the session never opens a device
    let (backend, _feeder) = ChannelBackend::new();
    let session = build_session(&cfg, Box::new(backend))?;

    // Start from an empty note so the recording is not appended to the draft
    session.new_note().await;
    session.process_audio(blob).await;

    let view = session.view().await;
    info!("{}", view.status);

    let note = session.current_note().await;
    println!("{}", serde_json::to_string_pretty(&note)?);

    session.shutdown().await;
    Ok(())
}
