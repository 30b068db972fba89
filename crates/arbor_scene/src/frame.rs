use bytemuck::{Pod, Zeroable};
use glam::{Mat4, UVec2, Vec3};

use arbor_resources::{FrameUniforms, UniformDescriptor};

use crate::camera::Camera;

/// Per-call resource handle supplied by the renderer.
pub trait Frame {
    /// `(projection, view)`.
    fn view_projection(&self) -> (Mat4, Mat4);

    /// Transient uniform allocator of the frame being rendered, if any.
    fn uniforms(&self) -> Option<&FrameUniforms<'_>> {
        None
    }

    /// Camera position, recovered from the view matrix.
    fn eye_position(&self) -> Vec3 {
        let (_, view) = self.view_projection();
        view.inverse().w_axis.truncate()
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct FrameData {
    pub projection: Mat4,
    pub view: Mat4,
}

/// Frame with a fixed projection and view.
pub struct SimpleFrame<'u> {
    pub projection: Mat4,
    pub view: Mat4,
    uniforms: Option<&'u FrameUniforms<'u>>,
}

impl SimpleFrame<'_> {
    #[must_use]
    pub fn new(projection: Mat4, view: Mat4) -> Self {
        Self {
            projection,
            view,
            uniforms: None,
        }
    }

    #[must_use]
    pub fn from_camera(camera: &dyn Camera, size: UVec2) -> Self {
        let (projection, view) = camera.camera_projection(size);
        Self::new(projection, view)
    }
}

impl<'u> SimpleFrame<'u> {
    #[must_use]
    pub fn with_uniforms(mut self, uniforms: &'u FrameUniforms<'u>) -> Self {
        self.uniforms = Some(uniforms);
        self
    }

    /// Copies projection and view into a uniform slot.
    #[must_use]
    pub fn write_uniforms(&self) -> Option<UniformDescriptor> {
        let uniforms = self.uniforms?;
        let data = FrameData {
            projection: self.projection,
            view: self.view,
        };
        Some(uniforms.bind(bytemuck::bytes_of(&data)))
    }
}

impl Frame for SimpleFrame<'_> {
    fn view_projection(&self) -> (Mat4, Mat4) {
        (self.projection, self.view)
    }

    fn uniforms(&self) -> Option<&FrameUniforms<'_>> {
        self.uniforms
    }
}
