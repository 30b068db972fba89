use std::cell::RefCell;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use arbor_core::{Aabb, MaterialKey, MeshKey};

use crate::uniform_cache::UniformDescriptor;

/// Draw layers, in the order a forward renderer usually visits them.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Background = 1000,
    Scene3D = 2000,
    Transparent = 3000,
    Ui = 4000,
}

/// Mesh handle plus the local-space bounds the scene needs for culling and
/// bounds queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshRef {
    pub key: MeshKey,
    pub bounds: Aabb,
}

impl MeshRef {
    #[must_use]
    pub fn new(key: MeshKey, bounds: Aabb) -> Self {
        Self { key, bounds }
    }
}

/// Per-draw uniform payload written into a uniform slot.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ModelUniforms {
    pub world: Mat4,
}

/// One recorded draw.
#[derive(Debug, Clone)]
pub struct DrawCall {
    pub mesh: MeshKey,
    pub material: MaterialKey,
    pub world: Mat4,
    /// Skinning matrices for skinned meshes.
    pub joints: Option<Arc<Vec<Mat4>>>,
    pub uniforms: Option<UniformDescriptor>,
}

/// Depth-only draw recorded while rendering a shadow map.
#[derive(Debug, Clone)]
pub struct ShadowDraw {
    pub mesh: MeshKey,
    pub world: Mat4,
    pub joints: Option<Arc<Vec<Mat4>>>,
}

/// Draw list of a single layer.
///
/// Controls only ever see a shared reference during traversal, so the list
/// uses interior mutability. It is never shared across threads.
#[derive(Debug)]
pub struct DrawContext {
    layer: Layer,
    list: RefCell<Vec<DrawCall>>,
}

impl DrawContext {
    #[must_use]
    pub fn new(layer: Layer) -> Self {
        Self {
            layer,
            list: RefCell::new(Vec::new()),
        }
    }

    #[inline]
    #[must_use]
    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn submit(&self, call: DrawCall) {
        self.list.borrow_mut().push(call);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.list.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.borrow().is_empty()
    }

    /// Snapshot of the recorded draws.
    #[must_use]
    pub fn draws(&self) -> Vec<DrawCall> {
        self.list.borrow().clone()
    }

    /// Moves the recorded draws out, leaving the list empty.
    pub fn take(&self) -> Vec<DrawCall> {
        std::mem::take(&mut *self.list.borrow_mut())
    }
}
