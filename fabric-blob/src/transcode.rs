use std::io::Cursor;

use bytes::Bytes;
use image::{imageops::FilterType, DynamicImage, ImageFormat};
use tracing::debug;

use crate::{MediaConfig, MediaError, MediaResult};

/// Extension of every replicated object
pub const OUTPUT_EXTENSION: &str = "webp";

/// Content type of every replicated object
pub const OUTPUT_CONTENT_TYPE: &str = "image/webp";

/// Converts uploaded rasters into the canonical wire format: a fixed-size
/// RGBA WebP.
///
/// The resample stretches to the target size and does not keep the aspect
/// ratio. Input is expected to be pre-cropped portrait photography; arbitrary
/// user photos would come out distorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transcoder {
    width: u32,
    height: u32,
}

impl Default for Transcoder {
    fn default() -> Self {
        Self::from_config(&MediaConfig::default())
    }
}

impl Transcoder {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(config.target_width, config.target_height)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Decode, bilinear-resample and re-encode one image.
    pub fn transcode(&self, raw: &[u8]) -> MediaResult<Bytes> {
        if raw.is_empty() {
            return Err(MediaError::unsupported_format("empty input"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(MediaError::encode_failure(format!(
                "invalid target size {}x{}",
                self.width, self.height
            )));
        }

        let format = image::guess_format(raw)
            .map_err(|e| MediaError::unsupported_format(e.to_string()))?;
        let decoded = image::load_from_memory_with_format(raw, format)
            .map_err(|e| MediaError::unsupported_format(e.to_string()))?;

        debug!(
            source_format = ?format,
            source_width = decoded.width(),
            source_height = decoded.height(),
            "transcoding image"
        );

        let resized = decoded.resize_exact(self.width, self.height, FilterType::Triangle);
        let canonical = DynamicImage::ImageRgba8(resized.into_rgba8());

        let mut out = Cursor::new(Vec::new());
        canonical
            .write_to(&mut out, ImageFormat::WebP)
            .map_err(|e| MediaError::encode_failure(e.to_string()))?;

        Ok(Bytes::from(out.into_inner()))
    }

    /// [`transcode`](Self::transcode) on the blocking pool.
    pub async fn transcode_blocking(&self, raw: Bytes) -> MediaResult<Bytes> {
        let transcoder = *self;
        tokio::task::spawn_blocking(move || transcoder.transcode(&raw))
            .await
            .map_err(|e| MediaError::Task {
                message: e.to_string(),
            })?
    }
}
