//! Offline drawing sessions.
//!
//! Replays a recorded landmark stream through the real frame orchestrator,
//! exports the mirrored PNG and optionally shares it to the community feed.

pub mod config;
pub mod error;

use std::path::PathBuf;
use std::sync::Arc;

use hanvas_canvas::{ConnectorPainter, FrameOrchestrator, Recording, ReplayCapture, ReplayLoader};
use hanvas_sync::{CommunitySync, SyncReport};
use tracing::{info, warn};

pub use config::StudioConfig;
pub use error::{StudioError, StudioResult};

/// What one studio run produced.
#[derive(Debug)]
pub struct StudioReport {
    pub frames_rendered: u64,
    pub trail_points: usize,
    pub snapshot_path: PathBuf,
    /// Present when sharing was requested.
    pub shared: Option<SyncReport>,
}

/// Replay, export and optionally share one session.
pub async fn run(config: &StudioConfig) -> StudioResult<StudioReport> {
    let recording = Arc::new(Recording::load(&config.recording).await?);

    let mut loader = ReplayLoader::new(Arc::clone(&recording));
    if config.cpu_only {
        loader = loader.without_gpu();
    }

    let mut canvas = config.canvas.clone();
    // The snapshot is taken after the recording ends
    canvas.clear_trail_on_stop = false;

    let mut orchestrator =
        FrameOrchestrator::with_loader(canvas, Box::new(ReplayCapture::new(recording)), &loader)
            .await
            .with_painter(Box::new(ConnectorPainter::default()));

    orchestrator.start().await?;
    let frames_rendered = orchestrator.run().await?;
    let trail_points = orchestrator.session().trails().point_count();
    info!(
        frames = frames_rendered,
        trails = orchestrator.session().trails().len(),
        points = trail_points,
        "Replay finished"
    );

    let snapshot = orchestrator.export_snapshot()?;
    let snapshot_path = snapshot.write_to_dir(&config.output_dir).await?;
    info!(path = %snapshot_path.display(), "Snapshot written");

    let shared = if config.share {
        let mut sync = CommunitySync::from_config(&config.sync)?;
        let report = sync.publish(&snapshot.to_data_url()).await?;
        if let Some(message) = &report.message {
            warn!("{}", message);
        }
        info!(mode = %report.mode, feed_size = report.posts.len(), "Snapshot shared");
        Some(report)
    } else {
        None
    };

    Ok(StudioReport {
        frames_rendered,
        trail_points,
        snapshot_path,
        shared,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hanvas_canvas::CanvasError;
    use hanvas_sync::SyncMode;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Landmarks for a closed fist centered on (x, y).
    fn fist_at(x: f64, y: f64) -> serde_json::Value {
        let mut points = vec![[x, y + 0.2, 0.0]; 21];
        // Fingertips curled in toward the wrist, closer than their bases.
        for (tip, base) in [(8, 5), (12, 9), (16, 13), (20, 17)] {
            points[base] = [x, y + 0.05, 0.0];
            points[tip] = [x, y + 0.12, 0.0];
        }
        points[0] = [x, y + 0.2, 0.0];
        serde_json::json!(points)
    }

    fn write_recording(dir: &TempDir) -> PathBuf {
        let lines: Vec<String> = (0..6)
            .map(|i| {
                let x = 0.3 + 0.02 * i as f64;
                serde_json::json!({
                    "timeMs": i as f64 * 33.0,
                    "width": 64,
                    "height": 48,
                    "hands": [{ "side": "Left", "landmarks": fist_at(x, 0.4) }]
                })
                .to_string()
            })
            .collect();
        let path = dir.path().join("session.jsonl");
        std::fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    fn studio_config(dir: &TempDir) -> StudioConfig {
        let mut config = StudioConfig {
            recording: write_recording(dir),
            output_dir: dir.path().join("exports"),
            ..StudioConfig::default()
        };
        config.canvas.frame_interval = Duration::from_millis(1);
        config.sync.local_feed_path = dir.path().join("feed.json");
        config
    }

    #[tokio::test]
    async fn test_run_exports_snapshot() {
        let dir = TempDir::new().unwrap();
        let config = studio_config(&dir);

        let report = run(&config).await.unwrap();
        assert_eq!(report.frames_rendered, 6);
        assert!(report.trail_points > 0);
        assert!(report.snapshot_path.starts_with(dir.path().join("exports")));
        assert!(report.snapshot_path.exists());
        assert!(report.shared.is_none());
    }

    #[tokio::test]
    async fn test_run_on_cpu_only() {
        let dir = TempDir::new().unwrap();
        let config = StudioConfig {
            cpu_only: true,
            ..studio_config(&dir)
        };
        assert_eq!(run(&config).await.unwrap().frames_rendered, 6);
    }

    #[tokio::test]
    async fn test_missing_recording() {
        let dir = TempDir::new().unwrap();
        let config = StudioConfig {
            recording: dir.path().join("absent.jsonl"),
            ..studio_config(&dir)
        };
        assert!(matches!(
            run(&config).await,
            Err(StudioError::Canvas(CanvasError::FileNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_share_to_remote_feed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/community-posts"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "post": { "imageDataUrl": "data:image/png;base64,AA", "sharedAt": "2024-01-01T00:00:00.000Z" },
                "posts": [{ "imageDataUrl": "data:image/png;base64,AA", "sharedAt": "2024-01-01T00:00:00.000Z" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let mut config = StudioConfig {
            share: true,
            ..studio_config(&dir)
        };
        config.sync.server_url = server.uri();

        let shared = run(&config).await.unwrap().shared.unwrap();
        assert_eq!(shared.mode, SyncMode::Remote);
        assert_eq!(shared.posts.len(), 1);
    }

    #[tokio::test]
    async fn test_share_falls_back_to_local_feed() {
        let dir = TempDir::new().unwrap();
        let mut config = StudioConfig {
            share: true,
            ..studio_config(&dir)
        };
        config.sync.server_url = "http://127.0.0.1:9".to_string();
        config.sync.connect_timeout = Duration::from_millis(200);
        config.sync.timeout = Duration::from_millis(500);

        let shared = run(&config).await.unwrap().shared.unwrap();
        assert_eq!(shared.mode, SyncMode::Local);
        assert_eq!(shared.posts.len(), 1);
        assert!(shared.posts[0].image_data_url.starts_with("data:image/png;base64,"));
        assert!(dir.path().join("feed.json").exists());
    }
}
