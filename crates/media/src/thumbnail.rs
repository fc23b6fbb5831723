use crate::constants::{THUMBNAIL_JPEG_QUALITY, THUMBNAIL_MAX_EDGE};
use crate::{encode_jpeg, MediaError, MediaResult};
use image::imageops::FilterType;
use qphotos_core::PhotoStore;
use std::sync::Arc;

/// Size of a thumbnail for a `width` x `height` source fitted within `max_edge`.
///
/// Sources already within bounds keep their size. Larger ones are scaled by
/// `max_edge / max(width, height)`, each side rounded and kept at least 1.
pub fn thumbnail_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_edge {
        return (width, height);
    }

    let scale = f64::from(max_edge) / f64::from(longest);
    let fit = |side: u32| ((f64::from(side) * scale).round() as u32).max(1);
    (fit(width), fit(height))
}

/// Renders bounded JPEG previews of stored photos.
///
/// Thumbnails are computed per request and never persisted. Rendering takes no
/// lock, so it can race with a rename or delete of the same photo and then
/// fails with `NotFound`.
#[derive(Debug, Clone)]
pub struct ThumbnailService {
    store: Arc<PhotoStore>,
    max_edge: u32,
    quality: u8,
}

impl ThumbnailService {
    /// Creates a service producing 400 px thumbnails at JPEG quality 85.
    pub fn new(store: Arc<PhotoStore>) -> Self {
        Self::with_limits(store, THUMBNAIL_MAX_EDGE, THUMBNAIL_JPEG_QUALITY)
    }

    pub fn with_limits(store: Arc<PhotoStore>, max_edge: u32, quality: u8) -> Self {
        Self {
            store,
            max_edge,
            quality,
        }
    }

    /// Thumbnail of the photo at logical path `path`.
    ///
    /// # Errors
    ///
    /// - `MediaError::Store` with `Forbidden` or `NotFound` when the path cannot be served,
    /// - `MediaError::Decode` when the stored file is not an image,
    /// - `MediaError::Encode` when the thumbnail cannot be encoded.
    pub fn render(&self, path: &str) -> MediaResult<Vec<u8>> {
        let stored = self.store.read_file(path)?;
        self.render_bytes(&stored.bytes)
    }

    /// Thumbnail of an encoded image held in memory.
    pub fn render_bytes(&self, bytes: &[u8]) -> MediaResult<Vec<u8>> {
        let img = image::load_from_memory(bytes).map_err(MediaError::Decode)?;

        let (width, height) = thumbnail_dimensions(img.width(), img.height(), self.max_edge);
        let img = if (width, height) == (img.width(), img.height()) {
            img
        } else {
            img.resize_exact(width, height, FilterType::Lanczos3)
        };

        encode_jpeg(&img.to_rgb8(), self.quality)
    }
}
