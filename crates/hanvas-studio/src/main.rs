//! Studio binary: replay a recorded session and export the drawing.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hanvas_studio::StudioConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("hanvas=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true).with_thread_ids(false))
            .with(env_filter)
            .init();
    }

    let mut config = StudioConfig::from_env();
    if let Some(recording) = std::env::args().nth(1) {
        config.recording = recording.into();
    }
    info!(
        recording = %config.recording.display(),
        output_dir = %config.output_dir.display(),
        share = config.share,
        "Starting hanvas-studio"
    );

    let report = hanvas_studio::run(&config)
        .await
        .with_context(|| format!("studio run failed for {}", config.recording.display()))?;

    info!(
        frames = report.frames_rendered,
        snapshot = %report.snapshot_path.display(),
        "Done"
    );
    Ok(())
}
