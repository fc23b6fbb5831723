//! Caption annotation seam.
//!
//! Ingestion stamps every photo with a caption before it is stored. The drawing
//! itself lives outside the storage engine; the engine only sees this trait.

/// Error returned by an [`Annotator`].
pub type AnnotateError = Box<dyn std::error::Error + Send + Sync>;

/// Overlays a caption onto an encoded image.
///
/// Implementations receive the raw uploaded bytes and return the bytes to store.
/// They must be callable from several threads at once.
pub trait Annotator: Send + Sync {
    fn annotate(&self, image: &[u8], caption: &str) -> Result<Vec<u8>, AnnotateError>;
}
