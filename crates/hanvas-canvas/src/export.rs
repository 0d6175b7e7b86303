//! Snapshot export.
//!
//! The live view is shown mirrored, so the exported PNG is flipped
//! horizontally to match what the user saw while drawing.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use tracing::info;

use crate::compositor::Surface;
use crate::error::{CanvasError, CanvasResult};

/// MIME prefix of a PNG data URL.
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// An encoded, mirrored copy of the drawing surface.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl Snapshot {
    /// Mirror and encode the surface.
    pub fn capture(surface: &Surface, at: DateTime<Utc>) -> CanvasResult<Self> {
        if surface.is_empty() {
            return Err(CanvasError::EmptySurface(
                "Nothing to export yet. Start webcam and draw first.".to_string(),
            ));
        }

        let mirrored = image::imageops::flip_horizontal(surface.image());
        let (width, height) = mirrored.dimensions();

        let mut png = Vec::new();
        PngEncoder::new(&mut png).write_image(mirrored.as_raw(), width, height, ColorType::Rgba8)?;

        Ok(Self {
            file_name: snapshot_file_name(at),
            width,
            height,
            png,
        })
    }

    /// `data:image/png;base64,...` form used for sharing.
    pub fn to_data_url(&self) -> String {
        format!("{}{}", PNG_DATA_URL_PREFIX, general_purpose::STANDARD.encode(&self.png))
    }

    /// Write the PNG into `dir` under its file name.
    pub async fn write_to_dir(&self, dir: &Path) -> CanvasResult<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, &self.png).await?;

        info!(
            path = %path.display(),
            width = self.width,
            height = self.height,
            bytes = self.png.len(),
            "Exported drawing as PNG"
        );
        Ok(path)
    }
}

/// `drawing-<ISO-8601 with ':' and '.' replaced by '-'>.png`.
pub fn snapshot_file_name(at: DateTime<Utc>) -> String {
    format!("drawing-{}.png", at.format("%Y-%m-%dT%H-%M-%S-%3fZ"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::{CompositeOp, SurfaceSize};
    use chrono::TimeZone;
    use hanvas_models::PaintColor;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap() + chrono::Duration::milliseconds(89)
    }

    #[test]
    fn test_file_name_format() {
        assert_eq!(snapshot_file_name(at()), "drawing-2026-03-04T05-06-07-089Z.png");
    }

    #[test]
    fn test_empty_surface_is_rejected() {
        let surface = Surface::new(SurfaceSize::new(0, 0));
        let err = Snapshot::capture(&surface, at()).unwrap_err();
        assert!(matches!(err, CanvasError::EmptySurface(_)));
    }

    #[test]
    fn test_snapshot_is_mirrored() {
        let mut surface = Surface::new(SurfaceSize::new(8, 4));
        surface.fill_ellipse(0.5, 0.5, 0.6, 0.6, PaintColor::rgb(255, 0, 0), CompositeOp::SourceOver);
        assert_eq!(surface.pixel(0, 0), Some([255, 0, 0, 255]));

        let snapshot = Snapshot::capture(&surface, at()).unwrap();
        let decoded = image::load_from_memory(&snapshot.png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (8, 4));
        assert_eq!(decoded.get_pixel(7, 0).0, [255, 0, 0, 255]);
        assert_eq!(decoded.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_data_url_prefix() {
        let surface = Surface::new(SurfaceSize::new(2, 2));
        let snapshot = Snapshot::capture(&surface, at()).unwrap();
        let url = snapshot.to_data_url();
        assert!(url.starts_with(PNG_DATA_URL_PREFIX));
        let payload = general_purpose::STANDARD
            .decode(&url[PNG_DATA_URL_PREFIX.len()..])
            .unwrap();
        assert_eq!(payload, snapshot.png);
    }

    #[tokio::test]
    async fn test_write_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let surface = Surface::new(SurfaceSize::new(3, 3));
        let snapshot = Snapshot::capture(&surface, at()).unwrap();
        let path = snapshot.write_to_dir(&dir.path().join("out")).await.unwrap();
        assert!(path.ends_with("drawing-2026-03-04T05-06-07-089Z.png"));
        assert_eq!(std::fs::read(path).unwrap(), snapshot.png);
    }
}
