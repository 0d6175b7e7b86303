//! Video capture collaborator.

use std::sync::Arc;

use async_trait::async_trait;
use image::RgbaImage;

use crate::compositor::SurfaceSize;
use crate::error::CanvasResult;

/// One captured video frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Media time of the frame in seconds. Unchanged between two polls
    /// when the device has not produced a new frame.
    pub media_time: f64,
    pub width: u32,
    pub height: u32,
    /// Pixel data, when the source provides it.
    pub image: Option<Arc<RgbaImage>>,
}

impl Frame {
    pub fn new(media_time: f64, width: u32, height: u32) -> Self {
        Self {
            media_time,
            width,
            height,
            image: None,
        }
    }

    pub fn with_image(mut self, image: Arc<RgbaImage>) -> Self {
        self.image = Some(image);
        self
    }

    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.width, self.height)
    }
}

/// A started capture stream.
#[async_trait]
pub trait FrameSource: Send {
    /// Latest frame, or `None` once the stream has ended.
    async fn next_frame(&mut self) -> CanvasResult<Option<Frame>>;

    /// Release the underlying device.
    async fn stop(&mut self);
}

/// Something that can be asked for a capture stream (a webcam).
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Acquire the device. Fails with `CaptureUnavailable` when permission
    /// is denied or no device exists.
    async fn start(&self) -> CanvasResult<Box<dyn FrameSource>>;

    /// Device name for logging.
    fn name(&self) -> &'static str;
}
