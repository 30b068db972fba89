/// Sizing of a [`UniformCache`](crate::UniformCache).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformSettings {
    /// Bytes per slot. Rounded up to a multiple of 16.
    pub slot_size: usize,
    /// Slots available before the first growth.
    pub min_entries: usize,
}

impl UniformSettings {
    /// 64 KiB per slot, the largest uniform range most desktop GPUs accept.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            slot_size: 65536,
            min_entries: 10,
        }
    }

    /// 4 KiB per slot for draws that only need a few matrices.
    #[must_use]
    pub const fn small() -> Self {
        Self {
            slot_size: 4096,
            min_entries: 10,
        }
    }
}

impl Default for UniformSettings {
    #[inline]
    fn default() -> Self {
        Self::standard()
    }
}
