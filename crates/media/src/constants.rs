//! Rendering parameters for captions and thumbnails.

/// Longest side of a thumbnail, in pixels.
pub const THUMBNAIL_MAX_EDGE: u32 = 400;

/// JPEG quality of thumbnails.
pub const THUMBNAIL_JPEG_QUALITY: u8 = 85;

/// JPEG quality of stored, captioned photos.
pub const WATERMARK_JPEG_QUALITY: u8 = 95;

/// Caption font size, in pixels.
pub const CAPTION_FONT_SIZE: f32 = 40.0;

/// Distance between the caption text and the bottom-right corner of the photo.
pub const CAPTION_MARGIN: i64 = 20;

/// Padding of the caption box around the text.
pub const CAPTION_PADDING: i64 = 10;

/// Opacity of the black caption box (0-255).
pub const CAPTION_BOX_ALPHA: u8 = 102;

/// Fonts tried in order when no caption font is configured or it cannot be loaded.
pub const FALLBACK_FONT_PATHS: &[&str] = &[
    "arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];
