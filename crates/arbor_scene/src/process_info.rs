//! Per-step traversal context.
//!
//! A fresh [`ProcessInfo`] is built for every visited node that has a
//! control, copied from its parent's record. Records only live on the stack
//! of the traversal step that created them; the parent link is a plain
//! borrow, so the compiler guarantees none of them escape the walk.

use std::any::Any;
use std::sync::atomic::{AtomicU32, Ordering};

use glam::Mat4;
use rustc_hash::FxHashMap;

use crate::frame::Frame;
use crate::phase::Phase;

static NEXT_EXTRA_KEY: AtomicU32 = AtomicU32::new(1);

/// Key into the scoped side-channel of [`ProcessInfo`].
///
/// Keys are process-wide unique; create them once (typically in a `static`
/// `LazyLock` or at control construction) and reuse them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtraKey(u32);

impl ExtraKey {
    #[must_use]
    pub fn new() -> Self {
        Self(NEXT_EXTRA_KEY.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ExtraKey {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ProcessInfo<'a> {
    pub time: f64,
    /// Cleared by a control to prune this node's subtree for the current phase.
    pub visible: bool,
    /// Accumulated transform, recomputed every phase.
    pub world: Mat4,
    pub phase: Phase<'a>,
    pub frame: &'a dyn Frame,
    extras: Option<FxHashMap<ExtraKey, Box<dyn Any>>>,
    parent: Option<&'a ProcessInfo<'a>>,
}

impl<'a> ProcessInfo<'a> {
    /// Top-level record for one phase walk.
    #[must_use]
    pub fn root(time: f64, frame: &'a dyn Frame, phase: Phase<'a>) -> Self {
        Self {
            time,
            visible: true,
            world: Mat4::IDENTITY,
            phase,
            frame,
            extras: None,
            parent: None,
        }
    }

    /// Record for a child step: inherits time, phase, frame and transform,
    /// starts visible with no local extras.
    #[must_use]
    pub fn child(&self) -> ProcessInfo<'_> {
        ProcessInfo {
            time: self.time,
            visible: true,
            world: self.world,
            phase: self.phase,
            frame: self.frame,
            extras: None,
            parent: Some(self),
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<&ProcessInfo<'a>> {
        self.parent
    }

    /// Stores `value` for this node and its descendants, shadowing any
    /// ancestor value for the same key. Siblings and ancestors never see it.
    pub fn set<T: Any>(&mut self, key: ExtraKey, value: T) {
        self.extras
            .get_or_insert_with(FxHashMap::default)
            .insert(key, Box::new(value));
    }

    /// Nearest value for `key` on the path from this record up to the root.
    #[must_use]
    pub fn get(&self, key: ExtraKey) -> Option<&dyn Any> {
        let mut current = Some(self);
        while let Some(info) = current {
            if let Some(value) = info.extras.as_ref().and_then(|m| m.get(&key)) {
                return Some(value.as_ref());
            }
            current = info.parent;
        }
        None
    }

    /// Typed [`get`](Self::get). Returns `None` if the nearest value has a
    /// different type.
    #[must_use]
    pub fn get_as<T: Any>(&self, key: ExtraKey) -> Option<&T> {
        self.get(key).and_then(<dyn Any>::downcast_ref::<T>)
    }
}
