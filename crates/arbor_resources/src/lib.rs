//! Transient per-frame GPU-visible memory and draw submission records.
//!
//! - [`uniform_cache`]: frame-scoped slot allocator for small uniform blocks
//! - [`draw`]: layer-scoped draw lists filled during scene traversal
//! - [`settings`]: uniform cache sizing presets

pub mod draw;
pub mod settings;
pub mod uniform_cache;

pub use draw::{DrawCall, DrawContext, Layer, MeshRef, ModelUniforms, ShadowDraw};
pub use settings::UniformSettings;
pub use uniform_cache::{FrameUniforms, UniformBlock, UniformCache, UniformDescriptor};
