//! On-disk path definitions and path confinement for the photo hierarchy.
//!
//! `layout` contains **no I/O logic**, only typed path construction. `resolver` turns untrusted
//! client paths into locations guaranteed to sit under the storage root.

pub mod layout;
pub mod resolver;
