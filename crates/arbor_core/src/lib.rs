//! Foundational types shared by every Arbor crate.
//!
//! - [`errors`]: the engine-wide [`ArborError`] and [`Result`] alias
//! - [`bounds`]: axis-aligned bounding boxes
//! - [`keys`]: opaque handles for externally owned assets

pub mod bounds;
pub mod errors;
pub mod keys;

pub use bounds::Aabb;
pub use errors::{ArborError, Result};
pub use keys::{MaterialKey, MeshKey};
