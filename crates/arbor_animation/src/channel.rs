//! Keyframe channels.
//!
//! A channel animates one component (translation, rotation or scale) of one
//! joint. Input times are seconds from the start of the clip; the clip loops
//! with the period of the channel's last input time.

use glam::{Quat, Vec3};

use crate::values::Interpolatable;

/// Which component of a joint a channel drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelTarget {
    Translation,
    Rotation,
    Scale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    #[default]
    Linear,
    Step,
}

/// Output values of a channel, one per input time.
#[derive(Debug, Clone)]
pub enum ChannelValues {
    Translation(Vec<Vec3>),
    Rotation(Vec<Quat>),
    Scale(Vec<Vec3>),
}

impl ChannelValues {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Translation(v) | Self::Scale(v) => v.len(),
            Self::Rotation(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One sampled joint component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChannelSample {
    Translation(Vec3),
    Rotation(Quat),
    Scale(Vec3),
}

/// Bracketing keyframe pair `[index, index + 1]` and the blend fraction
/// between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub index: usize,
    pub fraction: f32,
}

#[derive(Debug, Clone)]
pub struct Channel {
    pub joint: usize,
    pub input: Vec<f32>,
    pub values: ChannelValues,
    pub interpolation: InterpolationMode,
}

impl Channel {
    #[must_use]
    pub fn translation(joint: usize, input: Vec<f32>, values: Vec<Vec3>) -> Self {
        Self {
            joint,
            input,
            values: ChannelValues::Translation(values),
            interpolation: InterpolationMode::Linear,
        }
    }

    #[must_use]
    pub fn rotation(joint: usize, input: Vec<f32>, values: Vec<Quat>) -> Self {
        Self {
            joint,
            input,
            values: ChannelValues::Rotation(values),
            interpolation: InterpolationMode::Linear,
        }
    }

    #[must_use]
    pub fn scale(joint: usize, input: Vec<f32>, values: Vec<Vec3>) -> Self {
        Self {
            joint,
            input,
            values: ChannelValues::Scale(values),
            interpolation: InterpolationMode::Linear,
        }
    }

    #[must_use]
    pub fn with_interpolation(mut self, interpolation: InterpolationMode) -> Self {
        self.interpolation = interpolation;
        self
    }

    #[must_use]
    pub fn target(&self) -> ChannelTarget {
        match self.values {
            ChannelValues::Translation(_) => ChannelTarget::Translation,
            ChannelValues::Rotation(_) => ChannelTarget::Rotation,
            ChannelValues::Scale(_) => ChannelTarget::Scale,
        }
    }

    /// Last input time, which is also the loop period.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.input.last().copied().unwrap_or(0.0)
    }

    /// Maps time since the animation origin onto the channel's loop.
    #[must_use]
    pub fn local_time(&self, elapsed: f64) -> f32 {
        let period = f64::from(self.duration());
        if period <= 0.0 {
            return 0.0;
        }
        elapsed.rem_euclid(period) as f32
    }

    /// Binary-searches the input times for the keyframe pair around `time`.
    ///
    /// Times before the first keyframe clamp to fraction 0 of the first pair,
    /// times past the last clamp to fraction 1 of the last pair.
    ///
    /// # Panics
    ///
    /// Panics if the channel has no keyframes. [`Skin::new`](crate::Skin::new)
    /// rejects such channels.
    #[must_use]
    pub fn locate(&self, time: f32) -> Keyframe {
        let len = self.input.len();
        assert!(len > 0, "Channel has no keyframes");

        if len == 1 {
            return Keyframe { index: 0, fraction: 0.0 };
        }

        // First keyframe strictly after `time`.
        let next = self.input.partition_point(|&t| t <= time);
        if next == 0 {
            return Keyframe { index: 0, fraction: 0.0 };
        }
        if next >= len {
            return Keyframe { index: len - 2, fraction: 1.0 };
        }

        let index = next - 1;
        let t0 = self.input[index];
        let dt = self.input[next] - t0;

        // Duplicate timestamps.
        let fraction = if dt > 1e-6 { (time - t0) / dt } else { 0.0 };

        Keyframe {
            index,
            fraction: fraction.clamp(0.0, 1.0),
        }
    }

    /// Samples the channel `elapsed` seconds after the animation origin.
    #[must_use]
    pub fn sample(&self, elapsed: f64) -> ChannelSample {
        let key = self.locate(self.local_time(elapsed));
        match &self.values {
            ChannelValues::Translation(v) => ChannelSample::Translation(self.blend(v, key)),
            ChannelValues::Rotation(v) => ChannelSample::Rotation(self.blend(v, key)),
            ChannelValues::Scale(v) => ChannelSample::Scale(self.blend(v, key)),
        }
    }

    fn blend<T: Interpolatable>(&self, values: &[T], key: Keyframe) -> T {
        let Some(&next) = values.get(key.index + 1) else {
            return values[key.index];
        };
        let current = values[key.index];

        match self.interpolation {
            InterpolationMode::Step if key.fraction >= 1.0 => next,
            InterpolationMode::Step => current,
            InterpolationMode::Linear => T::interpolate_linear(current, next, key.fraction),
        }
    }
}
