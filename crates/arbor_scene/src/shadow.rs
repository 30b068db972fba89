//! Shadow-casting spot light.
//!
//! During `Predraw` the light renders the scene from its own point of view
//! with a nested [`Scene::process`](crate::Scene::process) call, then hands
//! the produced [`ShadowMap`] to the `Light` phase of the same frame.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use glam::{Mat4, Vec3};
use parking_lot::Mutex;

use arbor_resources::ShadowDraw;

use crate::frame::{Frame, SimpleFrame};
use crate::light::SpotLight;
use crate::node::NodeControl;
use crate::phase::{Phase, PredrawPhase, ShadowPhase};
use crate::process_info::ProcessInfo;

/// Shadow maps are skipped when the eye is this close to the light.
const MIN_EYE_DISTANCE: f32 = 0.1;
/// ... or farther than this many times the light's range.
const MAX_EYE_RANGE_FACTOR: f32 = 4.0;
const SHADOW_NEAR: f32 = 0.05;

static NEXT_SHADOW_MAP: AtomicU32 = AtomicU32::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShadowMapId(u32);

impl ShadowMapId {
    fn next() -> Self {
        Self(NEXT_SHADOW_MAP.fetch_add(1, Ordering::Relaxed))
    }
}

/// Depth-only rendering of the scene from one light.
#[derive(Debug, Clone)]
pub struct ShadowMap {
    pub id: ShadowMapId,
    pub size: u32,
    pub view_projection: Mat4,
    pub casters: Vec<ShadowDraw>,
    /// Scene time of the traversal that produced the map.
    pub rendered_at: f64,
}

#[derive(Default)]
struct ShadowState {
    countdown: u32,
    last: Option<Arc<ShadowMap>>,
}

pub struct ShadowSpotLight {
    pub light: SpotLight,
    pub map_size: u32,
    update_delay: u32,
    id: ShadowMapId,
    state: Mutex<ShadowState>,
}

impl ShadowSpotLight {
    #[must_use]
    pub fn new(light: SpotLight, map_size: u32) -> Self {
        Self {
            light,
            map_size,
            update_delay: 0,
            id: ShadowMapId::next(),
            state: Mutex::new(ShadowState::default()),
        }
    }

    /// Re-render the map only every `delay + 1` predraw passes.
    #[must_use]
    pub fn with_update_delay(mut self, delay: u32) -> Self {
        self.update_delay = delay;
        self
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> ShadowMapId {
        self.id
    }

    #[must_use]
    pub fn last_map(&self) -> Option<Arc<ShadowMap>> {
        self.state.lock().last.clone()
    }

    /// `(projection, view)` of the light for the given world placement.
    #[must_use]
    pub fn light_view(&self, world: &Mat4) -> (Mat4, Mat4) {
        let (position, direction) = self.light.placement(world);
        let up = if direction.y.abs() > 0.99 { Vec3::Z } else { Vec3::Y };
        let fov = 2.0 * self.light.outer_angle.to_radians();
        let projection = Mat4::perspective_rh(fov, 1.0, SHADOW_NEAR, self.light.max_distance());
        let view = Mat4::look_at_rh(position, position + direction, up);
        (projection, view)
    }

    fn predraw(&self, info: &ProcessInfo<'_>, predraw: &PredrawPhase<'_>) {
        let (position, _) = self.light.placement(&info.world);
        let distance = info.frame.eye_position().distance(position);
        if distance < MIN_EYE_DISTANCE || distance > MAX_EYE_RANGE_FACTOR * self.light.max_distance() {
            log::trace!("Shadow map {:?} skipped at eye distance {distance}", self.id);
            return;
        }

        {
            let mut state = self.state.lock();
            if state.countdown > 0 && state.last.is_some() {
                state.countdown -= 1;
                return;
            }
            state.countdown = self.update_delay;
        }

        // The state lock is released: the nested walk may visit this node again.
        let (projection, view) = self.light_view(&info.world);
        let view_projection = projection * view;
        let pass = ShadowPhase::new(view_projection);
        let mut frame = SimpleFrame::new(projection, view);
        if let Some(uniforms) = info.frame.uniforms() {
            frame = frame.with_uniforms(uniforms);
        }
        predraw
            .scene()
            .process(info.time, &frame, &[Phase::Shadow(&pass)]);

        let map = Arc::new(ShadowMap {
            id: self.id,
            size: self.map_size,
            view_projection,
            casters: pass.take(),
            rendered_at: info.time,
        });
        log::debug!(
            "Rendered shadow map {:?} with {} casters",
            self.id,
            map.casters.len()
        );
        predraw.require(Arc::clone(&map));
        self.state.lock().last = Some(map);
    }
}

impl NodeControl for ShadowSpotLight {
    fn process(&self, info: &mut ProcessInfo<'_>) {
        match info.phase {
            Phase::Predraw(predraw) => self.predraw(info, predraw),
            Phase::Light(lights) => {
                let mut record = self.light.record(&info.world);
                if self.state.lock().last.is_some() {
                    record.shadow_map = lights.add_frame_image(self.id);
                }
                lights.add_light(record);
            }
            Phase::Animate | Phase::Draw(_) | Phase::Shadow(_) | Phase::Bounds(_) => {}
        }
    }
}
