//! Traversal phases.
//!
//! The renderer hands [`Scene::process`](crate::Scene::process) an ordered
//! list of phases; every phase is one full depth-first walk of the tree.
//! The set of phases is closed, so controls dispatch with a `match` and the
//! compiler checks exhaustiveness:
//!
//! | Phase     | Typical reaction                                        |
//! |-----------|---------------------------------------------------------|
//! | `Animate` | advance animation state                                 |
//! | `Predraw` | render auxiliary views (shadow maps) via nested process |
//! | `Light`   | register lights in the accumulator                      |
//! | `Draw`    | submit draw calls to the layer's draw context           |
//! | `Shadow`  | submit depth-only draws for the active shadow map       |
//! | `Bounds`  | grow the world-space bounding box                       |
//!
//! Phase payloads are owned by the caller and borrowed by the enum, so the
//! caller can read accumulated results once the walk has finished.

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use glam::{Mat4, Vec4};
use smallvec::SmallVec;

use arbor_core::{Aabb, MeshKey};
use arbor_resources::{DrawCall, DrawContext, Layer, ShadowDraw};

use crate::light::LightRecord;
use crate::scene::Scene;
use crate::settings::SceneSettings;
use crate::shadow::{ShadowMap, ShadowMapId};

/// Closer returned by [`Phase::begin`], run once the whole tree is visited.
pub type PhaseEnd<'p> = Box<dyn FnOnce() + 'p>;

#[derive(Clone, Copy)]
pub enum Phase<'a> {
    Animate,
    Predraw(&'a PredrawPhase<'a>),
    Light(&'a LightPhase),
    Draw(&'a DrawPhase<'a>),
    Shadow(&'a ShadowPhase),
    Bounds(&'a BoundsPhase),
}

impl<'a> Phase<'a> {
    /// Opens the phase. The returned closer, if any, must run after the walk.
    #[must_use]
    pub fn begin(&self) -> Option<PhaseEnd<'a>> {
        match *self {
            Phase::Draw(draw) => draw.begin(),
            _ => None,
        }
    }

    /// Drawing context for `layer`, present only during a draw phase of
    /// that layer.
    #[inline]
    #[must_use]
    pub fn draw_context(&self, layer: Layer) -> Option<&'a DrawContext> {
        match *self {
            Phase::Draw(draw) => draw.context(layer),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Animate => "Animate",
            Phase::Predraw(_) => "Predraw",
            Phase::Light(_) => "Light",
            Phase::Draw(_) => "Draw",
            Phase::Shadow(_) => "Shadow",
            Phase::Bounds(_) => "Bounds",
        }
    }
}

impl std::fmt::Debug for Phase<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Draw(draw) => write!(f, "Draw({:?})", draw.layer()),
            other => f.write_str(other.name()),
        }
    }
}

// ─── Predraw ─────────────────────────────────────────────────────────────────

/// Auxiliary rendering stage. Controls may run nested traversals of
/// [`scene`](Self::scene) and register the produced maps as work the main
/// draw phases must wait for.
pub struct PredrawPhase<'a> {
    scene: &'a Scene,
    needed: RefCell<Vec<Arc<ShadowMap>>>,
}

impl<'a> PredrawPhase<'a> {
    #[must_use]
    pub fn new(scene: &'a Scene) -> Self {
        Self {
            scene,
            needed: RefCell::new(Vec::new()),
        }
    }

    #[inline]
    #[must_use]
    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    pub fn require(&self, map: Arc<ShadowMap>) {
        self.needed.borrow_mut().push(map);
    }

    /// Work produced during this phase, in submission order.
    #[must_use]
    pub fn needed(&self) -> Vec<Arc<ShadowMap>> {
        self.needed.borrow().clone()
    }
}

// ─── Light ───────────────────────────────────────────────────────────────────

/// Fixed-capacity lighting accumulator.
///
/// Both lights and shadow map image slots are soft limits: once full, the
/// add methods return `None` and the effect is skipped for this frame.
pub struct LightPhase {
    max_lights: usize,
    max_images: usize,
    lights: RefCell<SmallVec<[LightRecord; 16]>>,
    images: RefCell<SmallVec<[ShadowMapId; 8]>>,
    sph: Cell<Option<[Vec4; 9]>>,
}

impl LightPhase {
    #[must_use]
    pub fn new(max_lights: usize, max_images: usize) -> Self {
        Self {
            max_lights,
            max_images,
            lights: RefCell::new(SmallVec::new()),
            images: RefCell::new(SmallVec::new()),
            sph: Cell::new(None),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &SceneSettings) -> Self {
        Self::new(settings.max_lights, settings.max_frame_images)
    }

    /// Returns the light's slot, or `None` if the accumulator is full.
    pub fn add_light(&self, light: LightRecord) -> Option<usize> {
        let mut lights = self.lights.borrow_mut();
        if lights.len() >= self.max_lights {
            log::debug!("Light accumulator full ({} lights), light skipped", self.max_lights);
            return None;
        }
        lights.push(light);
        Some(lights.len() - 1)
    }

    /// Binds a shadow map image for this frame. Binding the same map twice
    /// returns the same slot.
    pub fn add_frame_image(&self, map: ShadowMapId) -> Option<usize> {
        let mut images = self.images.borrow_mut();
        if let Some(index) = images.iter().position(|&m| m == map) {
            return Some(index);
        }
        if images.len() >= self.max_images {
            log::debug!("No free frame image slot, shadow skipped");
            return None;
        }
        images.push(map);
        Some(images.len() - 1)
    }

    /// Spherical harmonics coefficients for ambient lighting.
    pub fn set_sph(&self, sph: [Vec4; 9]) {
        self.sph.set(Some(sph));
    }

    #[must_use]
    pub fn sph(&self) -> Option<[Vec4; 9]> {
        self.sph.get()
    }

    #[must_use]
    pub fn lights(&self) -> Vec<LightRecord> {
        self.lights.borrow().to_vec()
    }

    #[must_use]
    pub fn images(&self) -> Vec<ShadowMapId> {
        self.images.borrow().to_vec()
    }
}

impl Default for LightPhase {
    fn default() -> Self {
        Self::from_settings(&SceneSettings::default())
    }
}

// ─── Draw ────────────────────────────────────────────────────────────────────

/// Draw stage for one layer.
///
/// Without a commit hook the recorded draws stay in the context for the
/// caller to collect.
pub struct DrawPhase<'a> {
    context: DrawContext,
    on_begin: Option<Box<dyn Fn() + 'a>>,
    on_commit: Option<Box<dyn Fn(Vec<DrawCall>) + 'a>>,
}

impl<'a> DrawPhase<'a> {
    #[must_use]
    pub fn new(layer: Layer) -> Self {
        Self {
            context: DrawContext::new(layer),
            on_begin: None,
            on_commit: None,
        }
    }

    /// Runs before the walk, e.g. to open a render pass.
    #[must_use]
    pub fn on_begin(mut self, f: impl Fn() + 'a) -> Self {
        self.on_begin = Some(Box::new(f));
        self
    }

    /// Receives the draw list after the walk, e.g. to record and submit it.
    #[must_use]
    pub fn on_commit(mut self, f: impl Fn(Vec<DrawCall>) + 'a) -> Self {
        self.on_commit = Some(Box::new(f));
        self
    }

    #[inline]
    #[must_use]
    pub fn layer(&self) -> Layer {
        self.context.layer()
    }

    #[inline]
    #[must_use]
    pub fn context(&self, layer: Layer) -> Option<&DrawContext> {
        (self.context.layer() == layer).then_some(&self.context)
    }

    /// Draws recorded so far in this phase.
    #[must_use]
    pub fn draws(&self) -> Vec<DrawCall> {
        self.context.draws()
    }

    fn begin(&'a self) -> Option<PhaseEnd<'a>> {
        if let Some(begin) = &self.on_begin {
            begin();
        }
        let commit = self.on_commit.as_ref()?;
        Some(Box::new(move || commit(self.context.take())))
    }
}

// ─── Shadow ──────────────────────────────────────────────────────────────────

/// Depth-only stage rendering one shadow map.
pub struct ShadowPhase {
    view_projection: Mat4,
    draws: RefCell<Vec<ShadowDraw>>,
}

impl ShadowPhase {
    #[must_use]
    pub fn new(view_projection: Mat4) -> Self {
        Self {
            view_projection,
            draws: RefCell::new(Vec::new()),
        }
    }

    #[inline]
    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.view_projection
    }

    pub fn draw_shadow(&self, mesh: MeshKey, world: Mat4) {
        self.draws.borrow_mut().push(ShadowDraw {
            mesh,
            world,
            joints: None,
        });
    }

    pub fn draw_skinned_shadow(&self, mesh: MeshKey, world: Mat4, joints: Arc<Vec<Mat4>>) {
        self.draws.borrow_mut().push(ShadowDraw {
            mesh,
            world,
            joints: Some(joints),
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.draws.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.draws.borrow().is_empty()
    }

    pub fn take(&self) -> Vec<ShadowDraw> {
        std::mem::take(&mut *self.draws.borrow_mut())
    }
}

// ─── Bounds ──────────────────────────────────────────────────────────────────

/// Accumulates the world-space bounds of every mesh visited.
#[derive(Debug, Default)]
pub struct BoundsPhase {
    bounds: Cell<Option<Aabb>>,
}

impl BoundsPhase {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, aabb: Aabb) {
        let merged = match self.bounds.get() {
            Some(current) => current.union(&aabb),
            None => aabb,
        };
        self.bounds.set(Some(merged));
    }

    /// `None` if no mesh was visited.
    #[must_use]
    pub fn get(&self) -> Option<Aabb> {
        self.bounds.get()
    }
}
