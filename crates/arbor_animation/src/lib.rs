//! Skeletal animation for Arbor.
//!
//! Data flow:
//!
//! ```text
//! Skin (joints + clips, read-only) ──► Pose::evaluate(clip, t) ──► joint matrices
//!                                        │
//!                                        ├─ Channel::sample   (keyframe search + lerp/slerp)
//!                                        └─ top-down walk     (parent_global * T * R * S * IBM)
//! ```
//!
//! Skins and clips are validated once when constructed and never change
//! afterwards; a [`Pose`] is the only mutable, per-instance state.

pub mod channel;
pub mod pose;
pub mod skin;
pub mod values;

pub use channel::{Channel, ChannelSample, ChannelTarget, ChannelValues, InterpolationMode, Keyframe};
pub use pose::{JointPose, Pose};
pub use skin::{Animation, Joint, Skin};
pub use values::Interpolatable;
