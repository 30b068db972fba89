use glam::{Mat4, Vec3, Vec4};

use crate::node::NodeControl;
use crate::phase::Phase;
use crate::process_info::ProcessInfo;

/// Range used when a light leaves `max_distance` at zero.
pub const DEFAULT_MAX_DISTANCE: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightKind {
    #[default]
    Directional,
    Point,
    Spot,
}

/// Light as registered with a [`LightPhase`](crate::LightPhase), already in
/// world space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LightRecord {
    pub kind: LightKind,
    pub intensity: Vec4,
    pub position: Vec4,
    pub direction: Vec4,
    /// `x + y*d + z*d^2` falloff, `w` is the maximum distance.
    pub attenuation: Vec4,
    /// Cosine of the inner cone angle (spot lights).
    pub inner_angle: f32,
    /// Cosine of the outer cone angle (spot lights).
    pub outer_angle: f32,
    /// Frame image slot of this light's shadow map, if it has one.
    pub shadow_map: Option<usize>,
}

fn effective_distance(max_distance: f32) -> f32 {
    if max_distance == 0.0 {
        DEFAULT_MAX_DISTANCE
    } else {
        max_distance
    }
}

#[derive(Debug, Clone)]
pub struct DirectionalLight {
    pub intensity: Vec3,
    pub direction: Vec3,
}

impl NodeControl for DirectionalLight {
    fn process(&self, info: &mut ProcessInfo<'_>) {
        if let Phase::Light(lights) = info.phase {
            lights.add_light(LightRecord {
                kind: LightKind::Directional,
                intensity: self.intensity.extend(1.0),
                direction: self.direction.extend(0.0),
                attenuation: Vec4::new(1.0, 0.0, 0.0, 0.0),
                ..LightRecord::default()
            });
        }
    }
}

/// Uniform ambient term, expressed as the first spherical harmonics band.
#[derive(Debug, Clone)]
pub struct AmbientLight {
    pub intensity: Vec3,
}

impl NodeControl for AmbientLight {
    fn process(&self, info: &mut ProcessInfo<'_>) {
        if let Phase::Light(lights) = info.phase {
            let mut sph = [Vec4::ZERO; 9];
            sph[0] = self.intensity.extend(1.0);
            lights.set_sph(sph);
        }
    }
}

#[derive(Debug, Clone)]
pub struct PointLight {
    pub intensity: Vec3,
    /// Falloff `a[0] + a[1]*d + a[2]*d^2`. Physically plausible lights only use `a[2]`.
    pub attenuation: Vec3,
    /// Zero means [`DEFAULT_MAX_DISTANCE`].
    pub max_distance: f32,
}

impl PointLight {
    #[inline]
    #[must_use]
    pub fn max_distance(&self) -> f32 {
        effective_distance(self.max_distance)
    }

    #[must_use]
    pub fn record(&self, world: &Mat4) -> LightRecord {
        LightRecord {
            kind: LightKind::Point,
            intensity: self.intensity.extend(1.0),
            position: world.w_axis,
            attenuation: self.attenuation.extend(self.max_distance()),
            ..LightRecord::default()
        }
    }
}

impl NodeControl for PointLight {
    fn process(&self, info: &mut ProcessInfo<'_>) {
        if let Phase::Light(lights) = info.phase {
            lights.add_light(self.record(&info.world));
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpotLight {
    pub intensity: Vec3,
    /// Direction in the node's local space.
    pub direction: Vec3,
    pub attenuation: Vec3,
    /// Outer cone angle in degrees.
    pub outer_angle: f32,
    /// Inner cone angle in degrees; zero means same as `outer_angle`.
    pub inner_angle: f32,
    pub max_distance: f32,
}

impl SpotLight {
    #[inline]
    #[must_use]
    pub fn max_distance(&self) -> f32 {
        effective_distance(self.max_distance)
    }

    #[must_use]
    pub fn outer_cos(&self) -> f32 {
        self.outer_angle.to_radians().cos()
    }

    #[must_use]
    pub fn inner_cos(&self) -> f32 {
        if self.inner_angle == 0.0 {
            self.outer_cos()
        } else {
            self.inner_angle.to_radians().cos()
        }
    }

    /// World-space position and normalized direction.
    #[must_use]
    pub fn placement(&self, world: &Mat4) -> (Vec3, Vec3) {
        let position = world.transform_point3(Vec3::ZERO);
        let direction = world.transform_vector3(self.direction).normalize_or_zero();
        (position, direction)
    }

    #[must_use]
    pub fn record(&self, world: &Mat4) -> LightRecord {
        let (position, direction) = self.placement(world);
        LightRecord {
            kind: LightKind::Spot,
            intensity: self.intensity.extend(1.0),
            position: position.extend(1.0),
            direction: direction.extend(0.0),
            attenuation: self.attenuation.extend(self.max_distance()),
            inner_angle: self.inner_cos(),
            outer_angle: self.outer_cos(),
            shadow_map: None,
        }
    }
}

impl NodeControl for SpotLight {
    fn process(&self, info: &mut ProcessInfo<'_>) {
        if let Phase::Light(lights) = info.phase {
            lights.add_light(self.record(&info.world));
        }
    }
}
