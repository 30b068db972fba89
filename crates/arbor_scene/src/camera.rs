use glam::{Mat4, UVec2, Vec3};

pub trait Camera {
    /// `(projection, view)` for a target of `size` pixels.
    fn camera_projection(&self, size: UVec2) -> (Mat4, Mat4);
}

#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub near: f32,
    pub far: f32,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl PerspectiveCamera {
    /// Camera at `(0, 0, -1)` looking at the origin, near plane at
    /// `far / 10000`.
    #[must_use]
    pub fn new(far: f32) -> Self {
        Self {
            near: far / 10000.0,
            far,
            fov: 1.0,
            position: Vec3::new(0.0, 0.0, -1.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }
}

impl Camera for PerspectiveCamera {
    fn camera_projection(&self, size: UVec2) -> (Mat4, Mat4) {
        let aspect = size.x as f32 / size.y.max(1) as f32;
        // glam's perspective_rh targets a 0..1 depth range; flip Y for
        // Vulkan-style clip space.
        let projection = Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
            * Mat4::from_scale(Vec3::new(1.0, -1.0, 1.0));
        (projection, self.view_matrix())
    }
}
