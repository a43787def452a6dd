use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use zoomreel::capture::{available_resolutions, enumerate_devices};
use zoomreel::pointer::system_pointer;
use zoomreel::session::LogNotifier;
use zoomreel::{
    create_router, AppState, Config, FfmpegCapture, FixedDestination, NatsNotifier,
    NotificationSink, RecordingSession, SessionConfig, SessionState,
};

#[derive(Parser)]
#[command(name = "zoomreel", version, about = "Screen recorder with click-driven zoom")]
struct Cli {
    /// Config file path (extension optional)
    #[arg(short, long, default_value = "config/zoomreel")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP control API
    Serve,
    /// Record for a fixed time and save the result
    Record {
        /// Recording length in seconds
        #[arg(short, long, default_value_t = 10)]
        seconds: u64,
        /// Where to save the recording
        #[arg(short, long)]
        output: PathBuf,
        /// Capture device index
        #[arg(short, long)]
        device: Option<u32>,
        /// Resolution, e.g. 1920x1080
        #[arg(short, long)]
        resolution: Option<String>,
    },
    /// List capture devices
    Devices,
    /// List supported resolutions
    Resolutions,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zoomreel=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config))?;

    info!("Zoomreel v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);

    match cli.command {
        Command::Serve => serve(cfg).await,
        Command::Record {
            seconds,
            output,
            device,
            resolution,
        } => record(cfg, seconds, output, device, resolution).await,
        Command::Devices => {
            let devices = enumerate_devices(&cfg.capture.program, &cfg.capture.input_format).await?;
            for device in devices {
                println!("[{}] {}", device.index, device.name);
            }
            Ok(())
        }
        Command::Resolutions => {
            for resolution in available_resolutions() {
                println!("{}", resolution);
            }
            Ok(())
        }
    }
}

async fn build_session(cfg: &Config) -> Result<RecordingSession> {
    let session_config = SessionConfig::from_config(cfg)?;

    let notifier: Arc<dyn NotificationSink> = match &cfg.nats.url {
        Some(url) => Arc::new(
            NatsNotifier::connect(
                url,
                session_config.session_id.clone(),
                cfg.nats.subject_prefix.clone(),
            )
            .await?,
        ),
        None => Arc::new(LogNotifier),
    };

    Ok(RecordingSession::new(
        session_config,
        Box::new(FfmpegCapture::new(cfg.capture.clone())),
        system_pointer(),
        notifier,
    ))
}

async fn serve(cfg: Config) -> Result<()> {
    let session = Arc::new(build_session(&cfg).await?);
    let app = create_router(AppState::new(
        session,
        cfg.capture.clone(),
        cfg.output.recordings_dir(),
    ));

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn record(
    cfg: Config,
    seconds: u64,
    output: PathBuf,
    device: Option<u32>,
    resolution: Option<String>,
) -> Result<()> {
    let session = build_session(&cfg).await?;

    if let Some(device) = device {
        session.set_selected_device(device)?;
    }
    if let Some(resolution) = resolution {
        session.set_resolution(&resolution)?;
    }

    session.start()?;
    info!("Recording for {} seconds (Ctrl-C to stop early)", seconds);

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(seconds)) => {}
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    while session.state() == SessionState::Preparing {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    if let Err(e) = session.stop() {
        warn!("Recording did not run: {}", e);
    }
    session.wait_for_completion().await;

    let saved = session.save(&FixedDestination::new(output)).await?;
    info!(
        "Saved {} ({} zoom points)",
        saved.display(),
        session.zoom_points().len()
    );

    Ok(())
}
