/// Tunables for scene traversal and the controls shipped with it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneSettings {
    /// Minimum seconds between two pose recomputations of an animated node.
    pub animation_interval: f64,
    /// Lights a single light phase accepts before rejecting more.
    pub max_lights: usize,
    /// Shadow map images a single light phase can bind.
    pub max_frame_images: usize,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            animation_interval: 0.01,
            max_lights: 64,
            max_frame_images: 16,
        }
    }
}
