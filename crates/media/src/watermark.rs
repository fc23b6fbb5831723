//! Caption watermarking of uploaded photos.

use crate::constants::{
    CAPTION_BOX_ALPHA, CAPTION_FONT_SIZE, CAPTION_MARGIN, CAPTION_PADDING, FALLBACK_FONT_PATHS,
    WATERMARK_JPEG_QUALITY,
};
use crate::{encode_jpeg, MediaError, MediaResult};
use ab_glyph::{FontRef, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use qphotos_core::{AnnotateError, Annotator};
use std::path::{Path, PathBuf};

/// Draws the caption in the bottom-right corner of the photo.
///
/// The text is white on a black box at 40% opacity, sized from the rendered
/// caption. The result is always re-encoded as JPEG, whatever the upload
/// format was.
///
/// Without a usable font the caption is skipped and the photo is only
/// re-encoded, so uploads keep working on hosts without fonts.
#[derive(Debug, Clone)]
pub struct WatermarkAnnotator {
    font_data: Option<Vec<u8>>,
    quality: u8,
}

impl WatermarkAnnotator {
    /// Loads the caption font from `configured`, then from the usual system locations.
    ///
    /// Logs a warning when no font can be loaded.
    pub fn from_font_path(configured: Option<&Path>) -> Self {
        let candidates = configured
            .map(Path::to_path_buf)
            .into_iter()
            .chain(FALLBACK_FONT_PATHS.iter().map(PathBuf::from));

        for path in candidates {
            match load_font(&path) {
                Some(data) => {
                    tracing::info!("caption font loaded from {}", path.display());
                    return Self::with_font_data(Some(data));
                }
                None if configured == Some(path.as_path()) => {
                    tracing::warn!("cannot load caption font {}", path.display());
                }
                None => {}
            }
        }

        tracing::warn!("no caption font available, photos will be stored without caption");
        Self::with_font_data(None)
    }

    /// Uses the given TrueType/OpenType font bytes, or no font at all.
    pub fn with_font_data(font_data: Option<Vec<u8>>) -> Self {
        Self {
            font_data,
            quality: WATERMARK_JPEG_QUALITY,
        }
    }

    pub fn has_font(&self) -> bool {
        self.font_data.is_some()
    }

    /// Decodes `image`, draws `caption` on it and encodes it as JPEG.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Decode` if `image` is not a supported image and
    /// `MediaError::Encode` if the result cannot be encoded.
    pub fn render(&self, image: &[u8], caption: &str) -> MediaResult<Vec<u8>> {
        let mut img = image::load_from_memory(image)
            .map_err(MediaError::Decode)?
            .to_rgb8();

        match self.font_data.as_deref().map(FontRef::try_from_slice) {
            Some(Ok(font)) => draw_caption(&mut img, &font, caption),
            Some(Err(e)) => tracing::warn!("caption font unusable: {}", e),
            None => {}
        }

        encode_jpeg(&img, self.quality)
    }
}

impl Annotator for WatermarkAnnotator {
    fn annotate(&self, image: &[u8], caption: &str) -> Result<Vec<u8>, AnnotateError> {
        Ok(self.render(image, caption)?)
    }
}

/// Stores uploads unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughAnnotator;

impl Annotator for PassthroughAnnotator {
    fn annotate(&self, image: &[u8], _caption: &str) -> Result<Vec<u8>, AnnotateError> {
        Ok(image.to_vec())
    }
}

fn load_font(path: &Path) -> Option<Vec<u8>> {
    let data = std::fs::read(path).ok()?;
    FontRef::try_from_slice(&data).ok()?;
    Some(data)
}

fn draw_caption(img: &mut RgbImage, font: &FontRef<'_>, caption: &str) {
    let scale = PxScale::from(CAPTION_FONT_SIZE);
    let (text_width, text_height) = text_size(scale, font, caption);

    let x = i64::from(img.width()) - i64::from(text_width) - CAPTION_MARGIN;
    let y = i64::from(img.height()) - i64::from(text_height) - CAPTION_MARGIN;

    darken_rect(
        img,
        (x - CAPTION_PADDING, y - CAPTION_PADDING),
        (
            x + i64::from(text_width) + CAPTION_PADDING,
            y + i64::from(text_height) + CAPTION_PADDING,
        ),
        CAPTION_BOX_ALPHA,
    );

    draw_text_mut(
        img,
        Rgb([255, 255, 255]),
        saturating_i32(x),
        saturating_i32(y),
        scale,
        font,
        caption,
    );
}

/// Blends black at `alpha` over the inclusive rectangle, clipped to the image.
fn darken_rect(img: &mut RgbImage, top_left: (i64, i64), bottom_right: (i64, i64), alpha: u8) {
    if img.width() == 0 || img.height() == 0 {
        return;
    }
    let max_x = i64::from(img.width()) - 1;
    let max_y = i64::from(img.height()) - 1;
    let (x0, y0) = (top_left.0.max(0), top_left.1.max(0));
    let (x1, y1) = (bottom_right.0.min(max_x), bottom_right.1.min(max_y));
    if x0 > x1 || y0 > y1 {
        return;
    }

    let keep = u32::from(u8::MAX - alpha);
    for y in y0..=y1 {
        for x in x0..=x1 {
            // bounds were clipped to the image above
            let pixel = img.get_pixel_mut(x as u32, y as u32);
            for channel in pixel.0.iter_mut() {
                *channel = ((u32::from(*channel) * keep + 127) / 255) as u8;
            }
        }
    }
}

fn saturating_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
