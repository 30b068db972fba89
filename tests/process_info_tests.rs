//! ProcessInfo Tests
//!
//! Tests for:
//! - Scoped extras: nearest ancestor-or-self wins, siblings isolated
//! - Extras never leak across phases
//! - Typed lookup with mismatched types
//! - Transform and visibility inheritance, control-less pass-through nodes

use std::sync::{Arc, Mutex};

use glam::{Mat4, Vec3};

use arbor::scene::{ExtraKey, Node, NodeControl, Phase, ProcessInfo, Scene, SimpleFrame};

type Seen = Arc<Mutex<Vec<(String, Option<i32>)>>>;

fn control<F>(f: F) -> Arc<dyn NodeControl>
where
    F: Fn(&mut ProcessInfo<'_>) + Send + Sync + 'static,
{
    Arc::new(f)
}

fn setter(key: ExtraKey, value: i32) -> Arc<dyn NodeControl> {
    control(move |info| info.set(key, value))
}

fn reader(seen: &Seen, key: ExtraKey, name: &str) -> Node {
    let seen = Arc::clone(seen);
    let name = name.to_string();
    Node::new(
        Some(control(move |info| {
            let value = info.get_as::<i32>(key).copied();
            seen.lock().unwrap().push((name.clone(), value));
        })),
        Vec::new(),
    )
}

fn frame() -> SimpleFrame<'static> {
    SimpleFrame::new(Mat4::IDENTITY, Mat4::IDENTITY)
}

// ============================================================================
// Scoped extras
// ============================================================================

#[test]
fn get_returns_nearest_setter_on_path() {
    let key = ExtraKey::new();
    let seen: Seen = Arc::default();

    // root
    // ├── a (k=1)
    // │   ├── b (k=2)
    // │   │   └── c
    // │   └── d
    // └── e
    let b = Node::new(Some(setter(key, 2)), vec![reader(&seen, key, "c")]);
    let a = Node::new(Some(setter(key, 1)), vec![b, reader(&seen, key, "d")]);
    let root = Node::new(None, vec![a, reader(&seen, key, "e")]);
    let scene = Scene::with_root(root);

    scene.process(0.0, &frame(), &[Phase::Animate]);

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            ("c".to_string(), Some(2)),
            ("d".to_string(), Some(1)),
            ("e".to_string(), None),
        ]
    );
}

#[test]
fn sibling_overrides_are_invisible() {
    let key = ExtraKey::new();
    let seen: Seen = Arc::default();

    let first = Node::new(Some(setter(key, 7)), Vec::new());
    let root = Node::new(None, vec![first, reader(&seen, key, "second")]);
    Scene::with_root(root).process(0.0, &frame(), &[Phase::Animate]);

    assert_eq!(*seen.lock().unwrap(), vec![("second".to_string(), None)]);
}

#[test]
fn extras_do_not_survive_into_next_phase() {
    let key = ExtraKey::new();
    let seen: Seen = Arc::default();

    let animate_only = control(move |info| {
        if matches!(info.phase, Phase::Animate) {
            info.set(key, 3);
        }
    });
    let root = Node::new(Some(animate_only), vec![reader(&seen, key, "child")]);
    let scene = Scene::with_root(root);

    let bounds = arbor::scene::BoundsPhase::new();
    scene.process(0.0, &frame(), &[Phase::Animate, Phase::Bounds(&bounds)]);

    assert_eq!(
        *seen.lock().unwrap(),
        vec![("child".to_string(), Some(3)), ("child".to_string(), None)]
    );
}

#[test]
fn node_without_control_passes_parent_record_through() {
    let key = ExtraKey::new();
    let seen: Seen = Arc::default();

    let passthrough = Node::new(None, vec![reader(&seen, key, "leaf")]);
    let root = Node::new(Some(setter(key, 5)), vec![passthrough]);
    Scene::with_root(root).process(0.0, &frame(), &[Phase::Animate]);

    assert_eq!(*seen.lock().unwrap(), vec![("leaf".to_string(), Some(5))]);
}

// ============================================================================
// Direct record API
// ============================================================================

#[test]
fn child_shadows_and_parent_keeps_value() {
    let key = ExtraKey::new();
    let frame = frame();
    let mut root = ProcessInfo::root(0.0, &frame, Phase::Animate);
    root.set(key, 5_u32);

    {
        let mut child = root.child();
        assert_eq!(child.get_as::<u32>(key), Some(&5));
        child.set(key, 7_u32);
        assert_eq!(child.get_as::<u32>(key), Some(&7));

        let grandchild = child.child();
        assert_eq!(grandchild.get_as::<u32>(key), Some(&7));
        assert!(grandchild.parent().is_some());
    }

    assert_eq!(root.get_as::<u32>(key), Some(&5));
    assert!(root.parent().is_none());
}

#[test]
fn get_as_with_wrong_type_is_none() {
    let key = ExtraKey::new();
    let frame = frame();
    let mut info = ProcessInfo::root(0.0, &frame, Phase::Animate);
    info.set(key, "label");

    assert!(info.get(key).is_some());
    assert_eq!(info.get_as::<&str>(key), Some(&"label"));
    assert!(info.get_as::<i32>(key).is_none());
}

#[test]
fn keys_are_distinct() {
    let a = ExtraKey::new();
    let b = ExtraKey::new();
    assert_ne!(a, b);

    let frame = frame();
    let mut info = ProcessInfo::root(0.0, &frame, Phase::Animate);
    info.set(a, 1_i32);
    assert!(info.get(b).is_none());
}

#[test]
fn child_inherits_transform_and_resets_visibility() {
    let frame = frame();
    let mut root = ProcessInfo::root(2.5, &frame, Phase::Animate);
    root.world = Mat4::from_translation(Vec3::Y);
    root.visible = false;

    let child = root.child();
    assert_eq!(child.world, Mat4::from_translation(Vec3::Y));
    assert_eq!(child.time, 2.5);
    assert!(child.visible);
}
