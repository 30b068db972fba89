//! UniformCache Tests
//!
//! Tests for:
//! - Geometric growth when a frame exceeds capacity
//! - Blocks from before a growth stay independently usable
//! - Frame reset: cursor, descriptors, kept capacity
//! - Mesh controls writing model uniforms during a draw phase

use std::sync::Arc;

use glam::{Mat4, Vec3};

use arbor::core::{Aabb, MaterialKey, MeshKey};
use arbor::resources::{Layer, MeshRef, ModelUniforms, UniformCache, UniformSettings};
use arbor::scene::{DrawPhase, MeshNodeControl, Node, Phase, Scene, SimpleFrame};

fn tiny(min_entries: usize) -> UniformCache {
    UniformCache::new(UniformSettings {
        slot_size: 64,
        min_entries,
    })
}

// ============================================================================
// Growth
// ============================================================================

#[test]
fn alloc_past_capacity_doubles_once() {
    let mut cache = tiny(4);
    let frame = cache.begin_frame();

    let mut blocks: Vec<_> = (0..5).map(|_| frame.alloc()).collect();

    assert_eq!(frame.reallocations(), 1);
    assert_eq!(frame.capacity(), 8);
    assert_eq!(frame.cursor(), 1);

    for (i, block) in blocks.iter_mut().enumerate() {
        block.write(&(i as u32));
    }
    for (i, block) in blocks.iter().enumerate() {
        let value: u32 = bytemuck::pod_read_unaligned(&block.bytes()[..4]);
        assert_eq!(value, i as u32);
    }

    let generations: Vec<u32> = blocks.iter().map(|b| b.descriptor().generation).collect();
    assert_eq!(generations, vec![0, 0, 0, 0, 1]);
}

#[test]
fn growth_count_is_logarithmic() {
    let mut cache = tiny(2);
    let frame = cache.begin_frame();
    for _ in 0..64 {
        let _ = frame.alloc();
    }
    // 2 -> 4 -> 8 -> 16 -> 32 -> 64
    assert_eq!(frame.reallocations(), 5);
    assert_eq!(frame.capacity(), 64);
}

#[test]
fn capacity_is_kept_across_frames() {
    let mut cache = tiny(1);
    {
        let frame = cache.begin_frame();
        let _ = frame.alloc();
        let _ = frame.alloc();
    }
    assert_eq!(cache.capacity(), 2);
    assert_eq!(cache.generation(), 1);

    let frame = cache.begin_frame();
    assert_eq!(frame.cursor(), 0);
    assert_eq!(frame.reallocations(), 0);
    let _ = frame.alloc();
    let _ = frame.alloc();
    assert_eq!(frame.reallocations(), 0);
}

// ============================================================================
// Frames
// ============================================================================

#[test]
fn slots_are_zeroed_and_sized() {
    let mut cache = UniformCache::small();
    let frame = cache.begin_frame();
    let block = frame.alloc();
    assert_eq!(block.bytes().len(), 4096);
    assert!(block.bytes().iter().all(|&b| b == 0));
    assert_eq!(block.descriptor().size, 4096);
}

#[test]
fn descriptors_expire_with_their_frame() {
    let mut cache = tiny(4);
    let old = {
        let frame = cache.begin_frame();
        frame.bind(&[1, 2, 3])
    };

    let frame = cache.begin_frame();
    let fresh = frame.bind(&[4]);
    assert!(!frame.is_current(&old));
    assert!(frame.is_current(&fresh));
    assert_eq!(fresh.slot, 0);
    assert_eq!(frame.frame(), 2);
}

#[test]
fn write_slice_fills_consecutive_bytes() {
    let mut cache = tiny(1);
    let frame = cache.begin_frame();
    let mut block = frame.alloc();
    block.write_slice(&[1.0_f32, 2.0, 3.0]);
    let floats: &[f32] = bytemuck::cast_slice(&block.bytes()[..12]);
    assert_eq!(floats, &[1.0, 2.0, 3.0]);
}

#[test]
#[should_panic(expected = "exceeds slot size")]
fn oversized_write_panics() {
    let mut cache = tiny(1);
    let frame = cache.begin_frame();
    frame.bind(&[0u8; 65]);
}

// ============================================================================
// Draw integration
// ============================================================================

#[test]
fn mesh_controls_write_model_uniforms() {
    let mesh = MeshRef::new(MeshKey::default(), Aabb::new(-Vec3::ONE, Vec3::ONE));
    let offset = Mat4::from_translation(Vec3::Z * 2.0);
    let root = Node::new(
        None,
        vec![
            Node::with_control(MeshNodeControl::new(mesh, MaterialKey::default())),
            Node::at(
                offset,
                Some(Arc::new(MeshNodeControl::new(mesh, MaterialKey::default()))),
                Vec::new(),
            ),
        ],
    );
    let scene = Scene::with_root(root);

    let mut cache = tiny(1);
    let uniforms = cache.begin_frame();
    let frame = SimpleFrame::new(Mat4::IDENTITY, Mat4::IDENTITY).with_uniforms(&uniforms);
    let draw = DrawPhase::new(Layer::Scene3D);
    scene.process(0.0, &frame, &[Phase::Draw(&draw)]);

    let draws = draw.draws();
    assert_eq!(draws.len(), 2);
    let slots: Vec<u32> = draws.iter().map(|d| d.uniforms.unwrap().slot).collect();
    // Second allocation grew the pool and restarted the cursor.
    assert_eq!(slots, vec![0, 0]);
    assert_eq!(draws[1].uniforms.unwrap().generation, 1);
    assert_eq!(uniforms.reallocations(), 1);
    assert_eq!(draws[1].world, offset);
    assert_eq!(std::mem::size_of::<ModelUniforms>(), 64);
}

#[test]
fn frame_uniforms_write_projection_and_view() {
    let mut cache = UniformCache::small();
    let uniforms = cache.begin_frame();
    let frame = SimpleFrame::new(Mat4::IDENTITY, Mat4::from_translation(Vec3::X))
        .with_uniforms(&uniforms);
    let descriptor = frame.write_uniforms().unwrap();
    assert!(uniforms.is_current(&descriptor));
    assert!(SimpleFrame::new(Mat4::IDENTITY, Mat4::IDENTITY).write_uniforms().is_none());
}
