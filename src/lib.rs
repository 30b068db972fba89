//! # Arbor
//!
//! Scene traversal core: a node tree walked phase by phase, with deferred
//! mutation, reentrant traversal, per-frame uniform memory and skeletal
//! animation.
//!
//! ```text
//! arbor_core       shared keys, bounds, errors
//! arbor_animation  skins, clips, pose evaluation
//! arbor_resources  UniformCache, draw records
//! arbor_scene      Scene, Node, NodeControl, ProcessInfo, Phase, lights, cameras
//! ```

pub use arbor_animation as animation;
pub use arbor_core as core;
pub use arbor_resources as resources;
pub use arbor_scene as scene;

pub use arbor_animation::{Animation, Channel, Joint, Pose, Skin};
pub use arbor_core::{Aabb, ArborError, MaterialKey, MeshKey, Result};
pub use arbor_resources::{DrawCall, Layer, MeshRef, UniformCache, UniformSettings};
pub use arbor_scene::{
    AnimatedNodeControl, ExtraKey, Frame, Node, NodeControl, Phase, ProcessInfo, Scene,
    SceneSettings, SimpleFrame,
};
