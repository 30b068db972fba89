use glam::{Mat4, Quat, Vec3};
use smallvec::SmallVec;

use arbor_core::{ArborError, Result};

use crate::channel::Channel;

/// One bone of a skeleton in its rest pose.
#[derive(Debug, Clone)]
pub struct Joint {
    pub name: String,
    pub translate: Vec3,
    pub rotate: Quat,
    pub scale: Vec3,
    /// Transforms mesh-space vertices into this bone's local space.
    pub inverse_bind_matrix: Mat4,
    /// Indices of child joints in the owning [`Skin`].
    pub children: Vec<usize>,
}

impl Joint {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            translate: Vec3::ZERO,
            rotate: Quat::IDENTITY,
            scale: Vec3::ONE,
            inverse_bind_matrix: Mat4::IDENTITY,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_translation(mut self, translate: Vec3) -> Self {
        self.translate = translate;
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotate: Quat) -> Self {
        self.rotate = rotate;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn with_inverse_bind_matrix(mut self, inverse_bind_matrix: Mat4) -> Self {
        self.inverse_bind_matrix = inverse_bind_matrix;
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<usize>) -> Self {
        self.children = children;
        self
    }
}

/// A named animation clip.
#[derive(Debug, Clone)]
pub struct Animation {
    pub name: String,
    pub channels: Vec<Channel>,
}

impl Animation {
    #[must_use]
    pub fn new(name: impl Into<String>, channels: Vec<Channel>) -> Self {
        Self {
            name: name.into(),
            channels,
        }
    }

    /// Longest channel period.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.channels
            .iter()
            .map(Channel::duration)
            .fold(0.0_f32, f32::max)
    }
}

/// A validated joint hierarchy together with the clips that animate it.
///
/// Joints form a forest: each joint has at most one parent and parent→child
/// links are the only edges. Roots are the joints nobody lists as a child.
#[derive(Debug, Clone)]
pub struct Skin {
    joints: Vec<Joint>,
    roots: SmallVec<[usize; 4]>,
    animations: Vec<Animation>,
}

impl Skin {
    pub fn new(joints: Vec<Joint>, animations: Vec<Animation>) -> Result<Self> {
        let count = joints.len();
        let mut has_parent = vec![false; count];

        for (joint, j) in joints.iter().enumerate() {
            for &child in &j.children {
                if child >= count {
                    return Err(ArborError::JointChildOutOfRange { joint, child, count });
                }
                if has_parent[child] {
                    return Err(ArborError::JointMultipleParents { joint: child });
                }
                has_parent[child] = true;
            }
        }

        let roots: SmallVec<[usize; 4]> = (0..count).filter(|&i| !has_parent[i]).collect();

        // Every joint has at most one parent, so anything unreachable from a
        // root sits on a cycle.
        let mut visited = vec![false; count];
        let mut stack: Vec<usize> = roots.to_vec();
        while let Some(index) = stack.pop() {
            visited[index] = true;
            stack.extend_from_slice(&joints[index].children);
        }
        if let Some(joint) = visited.iter().position(|v| !v) {
            return Err(ArborError::JointCycle { joint });
        }

        for animation in &animations {
            validate_animation(animation, count)?;
        }
        log::debug!(
            "Skin validated: {count} joints, {} roots, {} animations",
            roots.len(),
            animations.len()
        );

        Ok(Self {
            joints,
            roots,
            animations,
        })
    }

    #[inline]
    #[must_use]
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    #[inline]
    #[must_use]
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    #[inline]
    #[must_use]
    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    #[inline]
    #[must_use]
    pub fn animation(&self, index: usize) -> Option<&Animation> {
        self.animations.get(index)
    }
}

fn validate_animation(animation: &Animation, count: usize) -> Result<()> {
    for (channel, ch) in animation.channels.iter().enumerate() {
        if ch.joint >= count {
            return Err(ArborError::ChannelJointOutOfRange {
                animation: animation.name.clone(),
                channel,
                joint: ch.joint,
                count,
            });
        }
        if ch.input.is_empty() {
            return Err(ArborError::EmptyChannel {
                animation: animation.name.clone(),
                channel,
            });
        }
        if ch.input.len() != ch.values.len() {
            return Err(ArborError::KeyframeCountMismatch {
                animation: animation.name.clone(),
                channel,
                times: ch.input.len(),
                values: ch.values.len(),
            });
        }
        if let Some(index) = ch.input.windows(2).position(|w| w[1] < w[0]) {
            return Err(ArborError::UnsortedKeyframes {
                animation: animation.name.clone(),
                channel,
                index: index + 1,
            });
        }
    }
    Ok(())
}
