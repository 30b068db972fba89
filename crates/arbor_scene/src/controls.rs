//! General-purpose controls.

use std::sync::Arc;

use glam::{Mat4, Vec3};

use arbor_core::MaterialKey;
use arbor_resources::{DrawCall, Layer, MeshRef, ModelUniforms};

use crate::node::NodeControl;
use crate::phase::Phase;
use crate::process_info::ProcessInfo;

/// Runs several controls on one node in order, stopping as soon as one of
/// them hides the node.
#[derive(Clone, Default)]
pub struct MultiControl {
    pub controls: Vec<Arc<dyn NodeControl>>,
}

impl MultiControl {
    #[must_use]
    pub fn new(controls: Vec<Arc<dyn NodeControl>>) -> Self {
        Self { controls }
    }
}

impl NodeControl for MultiControl {
    fn process(&self, info: &mut ProcessInfo<'_>) {
        for control in &self.controls {
            control.process(info);
            if !info.visible {
                return;
            }
        }
    }
}

/// Post-multiplies the world transform by a fixed matrix.
#[derive(Debug, Clone, Copy)]
pub struct TransformControl {
    pub transform: Mat4,
}

impl TransformControl {
    #[must_use]
    pub fn new(transform: Mat4) -> Self {
        Self { transform }
    }
}

impl NodeControl for TransformControl {
    fn process(&self, info: &mut ProcessInfo<'_>) {
        info.world *= self.transform;
    }
}

/// Spins its subtree around `axis` at `speed` radians per second of scene
/// time, in every phase.
#[derive(Debug, Clone, Copy)]
pub struct RotateAnimate {
    pub axis: Vec3,
    pub speed: f32,
}

impl NodeControl for RotateAnimate {
    fn process(&self, info: &mut ProcessInfo<'_>) {
        let angle = self.speed * info.time as f32;
        info.world *= Mat4::from_axis_angle(self.axis.normalize_or_zero(), angle);
    }
}

/// Hides its subtree from shadow passes only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoShadow;

impl NodeControl for NoShadow {
    fn process(&self, info: &mut ProcessInfo<'_>) {
        if matches!(info.phase, Phase::Shadow(_)) {
            info.visible = false;
        }
    }
}

/// Static mesh in the 3D layer.
#[derive(Debug, Clone, Copy)]
pub struct MeshNodeControl {
    pub mesh: MeshRef,
    pub material: MaterialKey,
}

impl MeshNodeControl {
    #[must_use]
    pub fn new(mesh: MeshRef, material: MaterialKey) -> Self {
        Self { mesh, material }
    }
}

impl NodeControl for MeshNodeControl {
    fn process(&self, info: &mut ProcessInfo<'_>) {
        match info.phase {
            Phase::Draw(_) => {
                let Some(dc) = info.phase.draw_context(Layer::Scene3D) else {
                    return;
                };
                let uniforms = info.frame.uniforms().map(|u| {
                    let mut block = u.alloc();
                    block.write(&ModelUniforms { world: info.world });
                    block.descriptor()
                });
                dc.submit(DrawCall {
                    mesh: self.mesh.key,
                    material: self.material,
                    world: info.world,
                    joints: None,
                    uniforms,
                });
            }
            Phase::Shadow(shadow) => shadow.draw_shadow(self.mesh.key, info.world),
            Phase::Bounds(bounds) => bounds.add(self.mesh.bounds.transform(&info.world)),
            Phase::Animate | Phase::Predraw(_) | Phase::Light(_) => {}
        }
    }
}
