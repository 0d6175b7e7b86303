//! Studio configuration.

use std::path::PathBuf;

use hanvas_canvas::CanvasConfig;
use hanvas_sync::SyncConfig;

#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// JSON-lines landmark recording to replay
    pub recording: PathBuf,
    /// Where exported PNGs are written
    pub output_dir: PathBuf,
    /// Publish the snapshot to the community feed
    pub share: bool,
    /// Force CPU detector initialization
    pub cpu_only: bool,
    pub canvas: CanvasConfig,
    pub sync: SyncConfig,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            recording: PathBuf::from("session.jsonl"),
            output_dir: PathBuf::from("exports"),
            share: false,
            cpu_only: false,
            canvas: CanvasConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl StudioConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            recording: std::env::var("STUDIO_RECORDING")
                .map(PathBuf::from)
                .unwrap_or(defaults.recording),
            output_dir: std::env::var("STUDIO_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            share: std::env::var("STUDIO_SHARE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.share),
            cpu_only: std::env::var("STUDIO_CPU_ONLY")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.cpu_only),
            canvas: CanvasConfig::from_env(),
            sync: SyncConfig::from_env(),
        }
    }
}
