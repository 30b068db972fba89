use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use smallvec::SmallVec;

use crate::channel::ChannelSample;
use crate::skin::{Animation, Skin};

/// Local transform of one joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointPose {
    pub translate: Vec3,
    pub rotate: Quat,
    pub scale: Vec3,
}

impl JointPose {
    #[inline]
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.translate)
            * Mat4::from_quat(self.rotate)
            * Mat4::from_scale(self.scale)
    }
}

/// Per-instance skeleton state: interpolated local joints, their global
/// matrices and the skinning matrices handed to draw calls.
///
/// Joints not driven by the active clip keep their previous local pose.
#[derive(Debug, Clone)]
pub struct Pose {
    locals: Vec<JointPose>,
    globals: Vec<Mat4>,
    joint_matrices: Arc<Vec<Mat4>>,
}

impl Pose {
    /// Rest pose of `skin`. Matrices are identity until the first
    /// [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn new(skin: &Skin) -> Self {
        let locals = skin
            .joints()
            .iter()
            .map(|j| JointPose {
                translate: j.translate,
                rotate: j.rotate,
                scale: j.scale,
            })
            .collect();
        let count = skin.joints().len();

        Self {
            locals,
            globals: vec![Mat4::IDENTITY; count],
            joint_matrices: Arc::new(vec![Mat4::IDENTITY; count]),
        }
    }

    /// Samples every channel of `animation` at `elapsed` seconds past the
    /// sampling origin, then rebuilds all matrices.
    pub fn evaluate(&mut self, skin: &Skin, animation: &Animation, elapsed: f64) {
        for channel in &animation.channels {
            let local = &mut self.locals[channel.joint];
            match channel.sample(elapsed) {
                ChannelSample::Translation(t) => local.translate = t,
                ChannelSample::Rotation(r) => local.rotate = r,
                ChannelSample::Scale(s) => local.scale = s,
            }
        }
        self.update_matrices(skin);
    }

    /// Walks the hierarchy top-down from the root joints.
    ///
    /// `global = parent_global * T * R * S`, skinning matrix
    /// `= global * inverse_bind_matrix`.
    pub fn update_matrices(&mut self, skin: &Skin) {
        // Draw calls may still hold the previous matrices; copy on write.
        let joint_matrices = Arc::make_mut(&mut self.joint_matrices);
        let joints = skin.joints();

        let mut stack: SmallVec<[(usize, Mat4); 16]> =
            skin.roots().iter().map(|&r| (r, Mat4::IDENTITY)).collect();

        while let Some((index, parent_global)) = stack.pop() {
            let global = parent_global * self.locals[index].matrix();
            self.globals[index] = global;
            joint_matrices[index] = global * joints[index].inverse_bind_matrix;
            for &child in &joints[index].children {
                stack.push((child, global));
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn locals(&self) -> &[JointPose] {
        &self.locals
    }

    #[inline]
    #[must_use]
    pub fn globals(&self) -> &[Mat4] {
        &self.globals
    }

    /// Skinning matrices, shared cheaply with in-flight draw submissions.
    #[inline]
    #[must_use]
    pub fn joint_matrices(&self) -> &Arc<Vec<Mat4>> {
        &self.joint_matrices
    }
}
