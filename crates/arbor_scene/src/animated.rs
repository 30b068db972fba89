//! Skinned mesh driven by a skeletal animation clip.

use std::sync::Arc;

use glam::Mat4;
use parking_lot::Mutex;

use arbor_animation::{JointPose, Pose, Skin};
use arbor_core::MaterialKey;
use arbor_resources::{DrawCall, Layer, MeshRef, ModelUniforms};

use crate::node::NodeControl;
use crate::phase::Phase;
use crate::process_info::ProcessInfo;
use crate::settings::SceneSettings;

struct AnimationState {
    animation: Option<usize>,
    /// Sampling origin; set by the first `Animate` visit if not given.
    start_time: Option<f64>,
    calc_time: f64,
    pose: Option<Pose>,
}

/// Samples the active clip of a [`Skin`] during `Animate` and draws the
/// latest pose in the 3D layer and in shadow passes.
///
/// Drawing never recomputes the pose, so the animation cadence is
/// independent from the number of draw passes. Until the first `Animate`
/// visit there is no pose and the node draws nothing.
pub struct AnimatedNodeControl {
    pub mesh: MeshRef,
    pub material: MaterialKey,
    skin: Arc<Skin>,
    interval: f64,
    state: Mutex<AnimationState>,
}

impl AnimatedNodeControl {
    #[must_use]
    pub fn new(mesh: MeshRef, material: MaterialKey, skin: Arc<Skin>) -> Self {
        Self::with_settings(mesh, material, skin, &SceneSettings::default())
    }

    #[must_use]
    pub fn with_settings(
        mesh: MeshRef,
        material: MaterialKey,
        skin: Arc<Skin>,
        settings: &SceneSettings,
    ) -> Self {
        let animation = (!skin.animations().is_empty()).then_some(0);
        Self {
            mesh,
            material,
            skin,
            interval: settings.animation_interval,
            state: Mutex::new(AnimationState {
                animation,
                start_time: None,
                calc_time: 0.0,
                pose: None,
            }),
        }
    }

    #[inline]
    #[must_use]
    pub fn skin(&self) -> &Arc<Skin> {
        &self.skin
    }

    /// Switches to clip `index`, sampling from `from_time`. Indices outside
    /// the skin's clip list are ignored.
    pub fn set_animation_index(&self, from_time: f64, index: usize) {
        if index >= self.skin.animations().len() {
            log::warn!(
                "Animation index {index} out of range ({} clips), ignored",
                self.skin.animations().len()
            );
            return;
        }
        let mut state = self.state.lock();
        state.animation = Some(index);
        state.start_time = Some(from_time);
        state.pose = None;
    }

    #[must_use]
    pub fn animation_index(&self) -> Option<usize> {
        self.state.lock().animation
    }

    #[must_use]
    pub fn start_time(&self) -> Option<f64> {
        self.state.lock().start_time
    }

    /// Skinning matrices of the latest pose.
    #[must_use]
    pub fn joint_matrices(&self) -> Option<Arc<Vec<Mat4>>> {
        self.state
            .lock()
            .pose
            .as_ref()
            .map(|p| Arc::clone(p.joint_matrices()))
    }

    #[must_use]
    pub fn local_joint(&self, index: usize) -> Option<JointPose> {
        self.state
            .lock()
            .pose
            .as_ref()
            .and_then(|p| p.locals().get(index).copied())
    }

    fn animate(&self, time: f64) {
        let mut state = self.state.lock();
        let start = *state.start_time.get_or_insert(time);
        if state.pose.is_some() && time - state.calc_time <= self.interval {
            return;
        }
        state.calc_time = time;

        let animation = state.animation.and_then(|i| self.skin.animation(i));
        let pose = state.pose.get_or_insert_with(|| Pose::new(&self.skin));
        match animation {
            Some(animation) => pose.evaluate(&self.skin, animation, time - start),
            None => pose.update_matrices(&self.skin),
        }
    }
}

impl NodeControl for AnimatedNodeControl {
    fn process(&self, info: &mut ProcessInfo<'_>) {
        match info.phase {
            Phase::Animate => self.animate(info.time),
            Phase::Draw(_) => {
                let Some(dc) = info.phase.draw_context(Layer::Scene3D) else {
                    return;
                };
                let Some(joints) = self.joint_matrices() else {
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
                    joints: Some(joints),
                    uniforms,
                });
            }
            Phase::Shadow(shadow) => {
                if let Some(joints) = self.joint_matrices() {
                    shadow.draw_skinned_shadow(self.mesh.key, info.world, joints);
                }
            }
            Phase::Bounds(bounds) => bounds.add(self.mesh.bounds.transform(&info.world)),
            Phase::Predraw(_) | Phase::Light(_) => {}
        }
    }
}
