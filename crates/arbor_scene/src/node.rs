use std::sync::Arc;

use glam::Mat4;

use crate::controls::{MultiControl, TransformControl};
use crate::process_info::ProcessInfo;

/// Behavior attached to a [`Node`].
///
/// `process` runs once per visited node per phase. Controls only ever get a
/// shared reference, so they cannot restructure the tree; per-instance state
/// that changes during traversal needs interior mutability.
pub trait NodeControl: Send + Sync {
    fn process(&self, info: &mut ProcessInfo<'_>);
}

impl<F> NodeControl for F
where
    F: Fn(&mut ProcessInfo<'_>) + Send + Sync,
{
    fn process(&self, info: &mut ProcessInfo<'_>) {
        self(info);
    }
}

/// One element of the scene tree.
///
/// Children are visited in insertion order, which is also draw order.
#[derive(Default, Clone)]
pub struct Node {
    pub control: Option<Arc<dyn NodeControl>>,
    pub children: Vec<Node>,
}

impl Node {
    #[must_use]
    pub fn new(control: Option<Arc<dyn NodeControl>>, children: Vec<Node>) -> Self {
        Self { control, children }
    }

    /// Leaf node carrying `control`.
    #[must_use]
    pub fn with_control(control: impl NodeControl + 'static) -> Self {
        Self {
            control: Some(Arc::new(control)),
            children: Vec::new(),
        }
    }

    /// Node placed at `transform`. The transform is applied before `control`.
    #[must_use]
    pub fn at(transform: Mat4, control: Option<Arc<dyn NodeControl>>, children: Vec<Node>) -> Self {
        let placement: Arc<dyn NodeControl> = Arc::new(TransformControl::new(transform));
        let control = match control {
            Some(control) => Arc::new(MultiControl::new(vec![placement, control])) as Arc<dyn NodeControl>,
            None => placement,
        };
        Self {
            control: Some(control),
            children,
        }
    }

    /// Appends a new child and returns it.
    pub fn add_child(&mut self, control: Option<Arc<dyn NodeControl>>, children: Vec<Node>) -> &mut Node {
        self.push(Node::new(control, children))
    }

    pub fn push(&mut self, node: Node) -> &mut Node {
        self.children.push(node);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("control", &self.control.is_some())
            .field("children", &self.children)
            .finish()
    }
}
