//! QPhotos Media
//!
//! Image processing for the QPhotos upload server.
//!
//! ## Provided services
//!
//! - [`WatermarkAnnotator`]: the [`Annotator`](qphotos_core::Annotator) used at
//!   ingestion. It draws the caption in the bottom-right corner of the photo on a
//!   semi-transparent dark box and re-encodes the result as JPEG.
//! - [`PassthroughAnnotator`]: stores uploads byte for byte, without a caption.
//! - [`ThumbnailService`]: decodes a stored photo and returns a bounded JPEG
//!   re-encoding. Thumbnails are never written to storage.
//!
//! ## Example Usage
//!
//! ```no_run
//! use qphotos_core::{CoreConfig, FileLastProjectStore, PhotoStore};
//! use qphotos_media::{ThumbnailService, WatermarkAnnotator};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = CoreConfig::new(PathBuf::from("upload"), PathBuf::from("last_project.txt"))?;
//! let last_project = FileLastProjectStore::new(cfg.last_project_file());
//! let store = Arc::new(PhotoStore::new(
//!     Arc::new(cfg),
//!     Arc::new(WatermarkAnnotator::from_font_path(None)),
//!     Arc::new(last_project),
//! )?);
//!
//! let thumbnails = ThumbnailService::new(store);
//! let jpeg = thumbnails.render("09 SETIEMBRE/Wedding/2025-09-10/abc123.jpg")?;
//! # Ok(())
//! # }
//! ```

mod constants;
mod thumbnail;
mod watermark;

pub use constants::{
    CAPTION_BOX_ALPHA, CAPTION_FONT_SIZE, CAPTION_MARGIN, CAPTION_PADDING, FALLBACK_FONT_PATHS,
    THUMBNAIL_JPEG_QUALITY, THUMBNAIL_MAX_EDGE, WATERMARK_JPEG_QUALITY,
};
pub use thumbnail::{thumbnail_dimensions, ThumbnailService};
pub use watermark::{PassthroughAnnotator, WatermarkAnnotator};

use qphotos_core::StoreError;

/// Errors that can occur while processing images
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// The bytes are not an image in a supported format
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),

    /// The processed image could not be encoded as JPEG
    #[error("failed to encode image: {0}")]
    Encode(image::ImageError),

    /// Reading the source photo from storage failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type MediaResult<T> = std::result::Result<T, MediaError>;

/// Encodes `image` as baseline JPEG at `quality` (1-100).
pub(crate) fn encode_jpeg(image: &image::RgbImage, quality: u8) -> MediaResult<Vec<u8>> {
    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality)
        .encode(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(MediaError::Encode)?;
    Ok(out)
}
