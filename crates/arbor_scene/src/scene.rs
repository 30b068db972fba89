//! Scene: the node tree plus the discipline that lets mutations and
//! traversals interleave.
//!
//! # Read-only traversal, deferred mutation
//!
//! ```text
//!  app threads ── update(f) ──┐          render thread ── process(t, frame, phases)
//!                             ▼                                 │
//!                  ┌─────────────────────┐   active 0 → 1       │
//!                  │ Coordinator (Mutex) │ ◄────────────────────┤ drain leftovers (FIFO)
//!                  │  active: usize      │                      │
//!                  │  pending: VecDeque  │                      ▼
//!                  └─────────────────────┘            walk root (read_recursive)
//!                             │                                 │
//!          active == 0: run f now (write lock)       controls may call process again
//!          active  > 0: enqueue f                    (nested: never drains)
//!                                                               │
//!                                               active 1 → 0: drain pending (FIFO)
//! ```
//!
//! Every traversal, nested or not, therefore sees the tree exactly as it was
//! when the outermost traversal started.
//!
//! [`Scene::read_root`] counts as a traversal too. Any read lock on the root
//! is held only while `active > 0`, so the write lock, which is taken only
//! under the coordinator with `active == 0`, is never contended.

use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::frame::Frame;
use crate::node::{Node, NodeControl};
use crate::phase::Phase;
use crate::process_info::ProcessInfo;

/// Deferred structural change. Must be self-contained: it may only capture
/// data that is already valid when it is queued.
pub type Mutation = Box<dyn FnOnce(&mut Node) + Send>;

#[derive(Default)]
struct Coordinator {
    /// Number of `process` calls currently on any stack.
    active: usize,
    pending: VecDeque<Mutation>,
}

pub struct Scene {
    root: RwLock<Node>,
    coordinator: Mutex<Coordinator>,
    time: AtomicU64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::with_root(Node::default())
    }

    #[must_use]
    pub fn with_root(root: Node) -> Self {
        Self {
            root: RwLock::new(root),
            coordinator: Mutex::new(Coordinator::default()),
            time: AtomicU64::new(0.0_f64.to_bits()),
        }
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Applies `mutation` to the root now if no traversal is running,
    /// otherwise queues it until the running traversals (and
    /// [`read_root`](Self::read_root) guards) have all ended.
    ///
    /// Mutations must not call back into this scene.
    pub fn update<F>(&self, mutation: F)
    where
        F: FnOnce(&mut Node) + Send + 'static,
    {
        let mut coordinator = self.coordinator.lock();
        if coordinator.active > 0 {
            coordinator.pending.push_back(Box::new(mutation));
            log::trace!(
                "Scene busy, mutation deferred ({} pending)",
                coordinator.pending.len()
            );
        } else {
            mutation(&mut self.root.write());
        }
    }

    /// Adds a node under the root.
    ///
    /// Requires exclusive access, which proves no traversal is running.
    /// Shared scenes use [`update`](Self::update) with
    /// [`Node::add_child`] instead.
    pub fn add_node(&mut self, control: Option<Arc<dyn NodeControl>>, children: Vec<Node>) -> &mut Node {
        self.root.get_mut().add_child(control, children)
    }

    #[inline]
    pub fn root_mut(&mut self) -> &mut Node {
        self.root.get_mut()
    }

    /// Read access to the tree outside of a traversal.
    ///
    /// The scene stays locked while the guard lives: updates from any
    /// thread are queued and applied when the last guard or traversal ends.
    #[must_use]
    pub fn read_root(&self) -> SceneReadGuard<'_> {
        let active = self.enter();
        SceneReadGuard {
            root: self.root.read_recursive(),
            _active: active,
        }
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Walks the tree once per phase, in order.
    ///
    /// Only an outermost call (one that finds no other traversal running)
    /// applies queued mutations: leftovers before walking, and everything
    /// queued during the walk once the last running traversal finishes.
    /// Calls made from inside a control are nested traversals of the same
    /// snapshot and never touch the queue.
    pub fn process(&self, time: f64, frame: &dyn Frame, phases: &[Phase<'_>]) {
        let _active = self.enter();
        let root = self.root.read_recursive();
        for phase in phases {
            log::trace!("Scene phase {phase:?} at t={time}");
            let end = phase.begin();
            let info = ProcessInfo::root(time, frame, *phase);
            process_node(&root, &info);
            if let Some(end) = end {
                end();
            }
        }
    }

    /// Marks a traversal as running. The first one in applies leftovers.
    fn enter(&self) -> ActiveGuard<'_> {
        let drain = {
            let mut coordinator = self.coordinator.lock();
            coordinator.active += 1;
            if coordinator.active == 1 && !coordinator.pending.is_empty() {
                // No reader can exist while active was zero, so the write
                // lock is free. Taking it before releasing the coordinator
                // keeps concurrent traversals from starting on a stale tree.
                Some((std::mem::take(&mut coordinator.pending), self.root.write()))
            } else {
                None
            }
        };
        let active = ActiveGuard { scene: self };
        if let Some((pending, root)) = drain {
            apply(pending, root);
        }
        active
    }

    /// Whether any traversal or [`read_root`](Self::read_root) guard is
    /// currently alive.
    #[must_use]
    pub fn locked(&self) -> bool {
        self.coordinator.lock().active > 0
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.coordinator.lock().pending.len()
    }

    // ========================================================================
    // Clock
    // ========================================================================

    #[must_use]
    pub fn time(&self) -> f64 {
        f64::from_bits(self.time.load(Ordering::Acquire))
    }

    pub fn set_time(&self, time: f64) {
        self.time.store(time.to_bits(), Ordering::Release);
    }

    /// Moves the clock forward by `dt` seconds and returns the new time.
    /// Negative steps are ignored so the clock never runs backwards.
    pub fn advance_time(&self, dt: f64) -> f64 {
        let step = dt.max(0.0);
        let previous = self
            .time
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                Some((f64::from_bits(bits) + step).to_bits())
            })
            .unwrap_or_else(|bits| bits);
        f64::from_bits(previous) + step
    }
}

/// Shared view of the root returned by [`Scene::read_root`].
pub struct SceneReadGuard<'s> {
    // Declared first so the read lock is released before `active` drops.
    root: RwLockReadGuard<'s, Node>,
    _active: ActiveGuard<'s>,
}

impl Deref for SceneReadGuard<'_> {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.root
    }
}

struct ActiveGuard<'s> {
    scene: &'s Scene,
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        let drain = {
            let mut coordinator = self.scene.coordinator.lock();
            coordinator.active -= 1;
            if coordinator.active == 0 && !coordinator.pending.is_empty() && !std::thread::panicking() {
                Some((std::mem::take(&mut coordinator.pending), self.scene.root.write()))
            } else {
                None
            }
        };
        if let Some((pending, root)) = drain {
            apply(pending, root);
        }
    }
}

fn apply(pending: VecDeque<Mutation>, mut root: RwLockWriteGuard<'_, Node>) {
    log::debug!("Applying {} deferred scene mutations", pending.len());
    for mutation in pending {
        mutation(&mut root);
    }
}

/// Depth-first, pre-order. Nodes without a control pass their parent's
/// record straight through.
fn process_node(node: &Node, parent: &ProcessInfo<'_>) {
    let Some(control) = &node.control else {
        for child in &node.children {
            process_node(child, parent);
        }
        return;
    };

    let mut info = parent.child();
    control.process(&mut info);
    if !info.visible {
        return;
    }
    for child in &node.children {
        process_node(child, &info);
    }
}
