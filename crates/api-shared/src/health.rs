use crate::HealthRes;

/// Simple health service shared by the QPhotos entry points
///
/// Reports that the server is up. It does not touch the storage root.
#[derive(Clone)]
pub struct HealthService;

impl HealthService {
    /// Static method to check health without creating an instance
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "QPhotos is alive".into(),
        }
    }
}
