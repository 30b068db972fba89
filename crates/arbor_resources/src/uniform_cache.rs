//! Uniform Cache
//!
//! Hands out fixed-size memory slots to draw calls during traversal. All
//! allocations live for exactly one frame:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      UniformCache                        │
//! │                                                          │
//! │  begin_frame(&mut self) → FrameUniforms<'f>   (renderer) │
//! │  FrameUniforms::alloc(&self) → UniformBlock<'f>  (draws) │
//! │  next begin_frame        ← rejected while 'f is alive    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Growth
//!
//! When the cursor reaches `capacity` the logical pool is replaced by one of
//! twice the size and the cursor restarts at zero. Blocks already handed out
//! in the current frame stay valid: their memory belongs to the frame arena,
//! which is only recycled by the next [`UniformCache::begin_frame`]. A frame
//! needing `k` slots from an initial capacity `N0` grows `O(log2(k / N0))`
//! times, and the grown capacity is kept for later frames.

use std::cell::Cell;

use bumpalo::Bump;
use bytemuck::Pod;

use crate::settings::UniformSettings;

/// 16-byte aligned backing unit so slots can be reinterpreted as std140 data.
type Chunk = [u32; 4];
const CHUNK_SIZE: usize = std::mem::size_of::<Chunk>();

/// Identifies one slot handed out by a [`UniformCache`].
///
/// Only meaningful during the frame that produced it; compare against
/// [`FrameUniforms::is_current`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformDescriptor {
    pub frame: u64,
    /// Number of pool growths that preceded this allocation.
    pub generation: u32,
    pub slot: u32,
    pub size: u32,
}

pub struct UniformCache {
    slot_size: usize,
    arena: Bump,
    frame: u64,
    capacity: Cell<usize>,
    cursor: Cell<usize>,
    generation: Cell<u32>,
    frame_reallocations: Cell<u32>,
}

impl UniformCache {
    /// # Panics
    ///
    /// Panics if `settings.min_entries` or `settings.slot_size` is zero.
    #[must_use]
    pub fn new(settings: UniformSettings) -> Self {
        assert!(settings.min_entries > 0, "UniformCache needs at least one entry");
        assert!(settings.slot_size > 0, "UniformCache slot size must be non-zero");

        let slot_size = settings.slot_size.next_multiple_of(CHUNK_SIZE);
        Self {
            slot_size,
            arena: Bump::with_capacity(slot_size * settings.min_entries),
            frame: 0,
            capacity: Cell::new(settings.min_entries),
            cursor: Cell::new(0),
            generation: Cell::new(0),
            frame_reallocations: Cell::new(0),
        }
    }

    #[must_use]
    pub fn standard() -> Self {
        Self::new(UniformSettings::standard())
    }

    #[must_use]
    pub fn small() -> Self {
        Self::new(UniformSettings::small())
    }

    /// Starts a new frame: recycles every slot of the previous frame and
    /// returns the token that allocates from this one.
    pub fn begin_frame(&mut self) -> FrameUniforms<'_> {
        self.arena.reset();
        self.frame += 1;
        self.cursor.set(0);
        self.frame_reallocations.set(0);
        FrameUniforms { cache: self }
    }

    #[inline]
    #[must_use]
    pub fn slot_size(&self) -> usize {
        self.slot_size
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Index of the current frame, starting at 1 after the first
    /// [`begin_frame`](Self::begin_frame).
    #[inline]
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Total number of pool growths since creation.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation.get()
    }

    fn grow(&self) {
        let capacity = self.capacity.get() * 2;
        log::info!(
            "UniformCache growing to {capacity} slots of {} bytes",
            self.slot_size
        );
        self.capacity.set(capacity);
        self.cursor.set(0);
        self.generation.set(self.generation.get() + 1);
        self.frame_reallocations
            .set(self.frame_reallocations.get() + 1);
    }
}

impl Default for UniformCache {
    fn default() -> Self {
        Self::standard()
    }
}

/// Per-frame allocation token borrowed from a [`UniformCache`].
///
/// Every block allocated through it borrows the token, so the compiler
/// rejects any use of a block after the next frame begins.
pub struct FrameUniforms<'f> {
    cache: &'f UniformCache,
}

impl<'f> FrameUniforms<'f> {
    /// Returns the next free slot, growing the pool if the current one is
    /// exhausted. Slot memory starts zeroed.
    #[must_use]
    pub fn alloc(&self) -> UniformBlock<'f> {
        let cache = self.cache;
        if cache.cursor.get() >= cache.capacity.get() {
            cache.grow();
        }

        let slot = cache.cursor.get();
        cache.cursor.set(slot + 1);

        let chunks = cache
            .arena
            .alloc_slice_fill_copy(cache.slot_size / CHUNK_SIZE, [0u32; 4]);

        UniformBlock {
            descriptor: UniformDescriptor {
                frame: cache.frame,
                generation: cache.generation.get(),
                slot: slot as u32,
                size: cache.slot_size as u32,
            },
            memory: bytemuck::cast_slice_mut(chunks),
        }
    }

    /// Allocates a slot and copies `content` to its start.
    ///
    /// # Panics
    ///
    /// Panics if `content` is larger than one slot.
    pub fn bind(&self, content: &[u8]) -> UniformDescriptor {
        let mut block = self.alloc();
        block.write_bytes(content);
        block.descriptor()
    }

    /// Whether `descriptor` was issued during this frame.
    #[inline]
    #[must_use]
    pub fn is_current(&self, descriptor: &UniformDescriptor) -> bool {
        descriptor.frame == self.cache.frame
    }

    #[inline]
    #[must_use]
    pub fn slot_size(&self) -> usize {
        self.cache.slot_size
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.cache.capacity.get()
    }

    /// Slots used in the current pool.
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cache.cursor.get()
    }

    /// Growths triggered during this frame.
    #[inline]
    #[must_use]
    pub fn reallocations(&self) -> u32 {
        self.cache.frame_reallocations.get()
    }

    #[inline]
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.cache.frame
    }
}

/// One slot of frame-scoped memory.
pub struct UniformBlock<'f> {
    descriptor: UniformDescriptor,
    memory: &'f mut [u8],
}

impl UniformBlock<'_> {
    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> UniformDescriptor {
        self.descriptor
    }

    #[inline]
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &*self.memory
    }

    #[inline]
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut *self.memory
    }

    /// Copies `content` to the start of the slot.
    ///
    /// # Panics
    ///
    /// Panics if `content` is larger than the slot.
    pub fn write_bytes(&mut self, content: &[u8]) {
        assert!(
            content.len() <= self.memory.len(),
            "Uniform content of {} bytes exceeds slot size {}",
            content.len(),
            self.memory.len()
        );
        self.memory[..content.len()].copy_from_slice(content);
    }

    pub fn write<T: Pod>(&mut self, value: &T) {
        self.write_bytes(bytemuck::bytes_of(value));
    }

    pub fn write_slice<T: Pod>(&mut self, values: &[T]) {
        self.write_bytes(bytemuck::cast_slice(values));
    }
}
