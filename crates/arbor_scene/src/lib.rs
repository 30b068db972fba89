//! Scene tree and traversal for Arbor.
//!
//! A [`Scene`] owns a tree of [`Node`]s, each carrying an optional
//! [`NodeControl`]. The renderer walks the tree with
//! [`Scene::process`], once per [`Phase`]; controls react to the phases they
//! care about by matching on [`ProcessInfo::phase`].
//!
//! - [`scene`]: the tree, deferred mutations and reentrant traversal
//! - [`node`], [`controls`]: tree elements and general-purpose controls
//! - [`process_info`]: per-step context with scoped extras
//! - [`phase`]: the closed set of traversal phases and their payloads
//! - [`light`], [`shadow`]: light registration and shadow-casting lights
//! - [`animated`]: skinned meshes driven by `arbor_animation`
//! - [`camera`], [`frame`]: view setup supplied by the renderer

pub mod animated;
pub mod camera;
pub mod controls;
pub mod frame;
pub mod light;
pub mod node;
pub mod phase;
pub mod process_info;
pub mod scene;
pub mod settings;
pub mod shadow;

pub use animated::AnimatedNodeControl;
pub use camera::{Camera, PerspectiveCamera};
pub use controls::{MeshNodeControl, MultiControl, NoShadow, RotateAnimate, TransformControl};
pub use frame::{Frame, FrameData, SimpleFrame};
pub use light::{
    AmbientLight, DEFAULT_MAX_DISTANCE, DirectionalLight, LightKind, LightRecord, PointLight,
    SpotLight,
};
pub use node::{Node, NodeControl};
pub use phase::{
    BoundsPhase, DrawPhase, LightPhase, Phase, PhaseEnd, PredrawPhase, ShadowPhase,
};
pub use process_info::{ExtraKey, ProcessInfo};
pub use scene::{Mutation, Scene, SceneReadGuard};
pub use settings::SceneSettings;
pub use shadow::{ShadowMap, ShadowMapId, ShadowSpotLight};
