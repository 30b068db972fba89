//! Light, Shadow & Camera Tests
//!
//! Tests for:
//! - Light records in world space, default distances and cone angles
//! - Light accumulator soft limits
//! - Shadow-casting spot light: nested shadow traversal, frame image slots,
//!   update delay, eye distance culling, NoShadow subtrees
//! - Perspective camera and SimpleFrame

use std::sync::Arc;

use glam::{Mat4, UVec2, Vec3, Vec4};
use slotmap::SlotMap;

use arbor::core::{Aabb, MaterialKey, MeshKey};
use arbor::resources::{Layer, MeshRef};
use arbor::scene::{
    AmbientLight, Camera, DEFAULT_MAX_DISTANCE, DirectionalLight, DrawPhase, Frame, LightKind,
    LightPhase, MeshNodeControl, NoShadow, Node, PerspectiveCamera, Phase, PointLight,
    PredrawPhase, Scene, ShadowSpotLight, SimpleFrame, SpotLight,
};

const EPSILON: f32 = 1e-5;

fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

fn frame() -> SimpleFrame<'static> {
    SimpleFrame::new(Mat4::IDENTITY, Mat4::IDENTITY)
}

fn frame_from(eye: Vec3) -> SimpleFrame<'static> {
    SimpleFrame::new(Mat4::IDENTITY, Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y))
}

fn point() -> PointLight {
    PointLight {
        intensity: Vec3::ONE,
        attenuation: Vec3::new(0.0, 0.0, 1.0),
        max_distance: 0.0,
    }
}

fn spot() -> SpotLight {
    SpotLight {
        intensity: Vec3::ONE,
        direction: Vec3::NEG_Y,
        attenuation: Vec3::new(0.0, 0.0, 1.0),
        outer_angle: 30.0,
        inner_angle: 0.0,
        max_distance: 0.0,
    }
}

fn mesh_node(key: MeshKey) -> Node {
    let mesh = MeshRef::new(key, Aabb::new(-Vec3::ONE, Vec3::ONE));
    Node::with_control(MeshNodeControl::new(mesh, MaterialKey::default()))
}

// ============================================================================
// Light records
// ============================================================================

#[test]
fn point_light_uses_world_position_and_default_range() {
    let at = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
    let scene = Scene::with_root(Node::at(at, Some(Arc::new(point())), Vec::new()));

    let lights = LightPhase::default();
    scene.process(0.0, &frame(), &[Phase::Light(&lights)]);

    let records = lights.lights();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, LightKind::Point);
    assert_eq!(records[0].position, Vec4::new(1.0, 2.0, 3.0, 1.0));
    assert_eq!(records[0].attenuation.w, DEFAULT_MAX_DISTANCE);
}

#[test]
fn spot_light_direction_follows_node_rotation() {
    let at = Mat4::from_rotation_x(std::f32::consts::FRAC_PI_2);
    let scene = Scene::with_root(Node::at(at, Some(Arc::new(spot())), Vec::new()));

    let lights = LightPhase::default();
    scene.process(0.0, &frame(), &[Phase::Light(&lights)]);

    let record = lights.lights()[0];
    assert_eq!(record.kind, LightKind::Spot);
    // -Y rotated 90° about X points to -Z.
    assert!(approx_vec3(record.direction.truncate(), Vec3::NEG_Z));
    let outer = 30.0_f32.to_radians().cos();
    assert!((record.outer_angle - outer).abs() < EPSILON);
    assert!((record.inner_angle - outer).abs() < EPSILON);
}

#[test]
fn directional_and_ambient_lights() {
    let root = Node::new(
        None,
        vec![
            Node::with_control(DirectionalLight {
                intensity: Vec3::splat(2.0),
                direction: Vec3::NEG_Y,
            }),
            Node::with_control(AmbientLight {
                intensity: Vec3::splat(0.25),
            }),
        ],
    );
    let scene = Scene::with_root(root);

    let lights = LightPhase::default();
    scene.process(0.0, &frame(), &[Phase::Light(&lights)]);

    assert_eq!(lights.lights()[0].kind, LightKind::Directional);
    assert_eq!(lights.lights()[0].direction, Vec4::new(0.0, -1.0, 0.0, 0.0));
    let sph = lights.sph().unwrap();
    assert_eq!(sph[0], Vec4::new(0.25, 0.25, 0.25, 1.0));
    assert_eq!(sph[1], Vec4::ZERO);
}

#[test]
fn lights_ignore_other_phases() {
    let scene = Scene::with_root(Node::with_control(point()));
    let draw = DrawPhase::new(Layer::Scene3D);
    scene.process(0.0, &frame(), &[Phase::Animate, Phase::Draw(&draw)]);
    assert!(draw.draws().is_empty());
}

// ============================================================================
// Accumulator limits
// ============================================================================

#[test]
fn full_light_accumulator_returns_none() {
    let root = Node::new(None, (0..3).map(|_| Node::with_control(point())).collect());
    let scene = Scene::with_root(root);

    let lights = LightPhase::new(2, 1);
    scene.process(0.0, &frame(), &[Phase::Light(&lights)]);
    assert_eq!(lights.lights().len(), 2);
    assert_eq!(lights.add_light(point().record(&Mat4::IDENTITY)), None);
}

#[test]
fn frame_images_dedupe_and_saturate() {
    let a = ShadowSpotLight::new(spot(), 512);
    let b = ShadowSpotLight::new(spot(), 512);
    assert_ne!(a.id(), b.id());

    let lights = LightPhase::new(8, 1);
    assert_eq!(lights.add_frame_image(a.id()), Some(0));
    assert_eq!(lights.add_frame_image(a.id()), Some(0));
    assert_eq!(lights.add_frame_image(b.id()), None);
    assert_eq!(lights.images(), vec![a.id()]);
}

// ============================================================================
// Shadow-casting spot light
// ============================================================================

struct ShadowScene {
    scene: Scene,
    light: Arc<ShadowSpotLight>,
    keys: Vec<MeshKey>,
}

fn shadow_scene(light: ShadowSpotLight) -> ShadowScene {
    let mut meshes: SlotMap<MeshKey, ()> = SlotMap::with_key();
    let keys: Vec<MeshKey> = (0..2).map(|_| meshes.insert(())).collect();
    let light = Arc::new(light);

    let root = Node::new(
        None,
        vec![
            Node::at(
                Mat4::from_translation(Vec3::Y * 5.0),
                Some(Arc::clone(&light) as _),
                Vec::new(),
            ),
            mesh_node(keys[0]),
            Node::new(Some(Arc::new(NoShadow)), vec![mesh_node(keys[1])]),
        ],
    );
    ShadowScene {
        scene: Scene::with_root(root),
        light,
        keys,
    }
}

#[test]
fn shadow_light_renders_map_in_predraw() {
    let s = shadow_scene(ShadowSpotLight::new(spot(), 1024));
    let frame = frame_from(Vec3::new(0.0, 0.0, 5.0));

    let predraw = PredrawPhase::new(&s.scene);
    let lights = LightPhase::default();
    let draw = DrawPhase::new(Layer::Scene3D);
    s.scene.process(
        0.0,
        &frame,
        &[Phase::Predraw(&predraw), Phase::Light(&lights), Phase::Draw(&draw)],
    );

    let needed = predraw.needed();
    assert_eq!(needed.len(), 1);
    let map = &needed[0];
    assert_eq!(map.id, s.light.id());
    assert_eq!(map.size, 1024);
    // The NoShadow subtree is absent from the shadow pass.
    assert_eq!(map.casters.len(), 1);
    assert_eq!(map.casters[0].mesh, s.keys[0]);

    let record = lights.lights()[0];
    assert_eq!(record.shadow_map, Some(0));
    assert_eq!(lights.images(), vec![s.light.id()]);

    // ...but still drawn in the main pass.
    assert_eq!(draw.draws().len(), 2);
    assert!(!s.scene.locked());
}

#[test]
fn shadow_light_honours_update_delay() {
    let s = shadow_scene(ShadowSpotLight::new(spot(), 256).with_update_delay(1));
    let frame = frame_from(Vec3::new(0.0, 0.0, 5.0));

    let mut rendered = Vec::new();
    for t in 0..3 {
        let time = f64::from(t);
        let predraw = PredrawPhase::new(&s.scene);
        s.scene.process(time, &frame, &[Phase::Predraw(&predraw)]);
        rendered.push((predraw.needed().len(), s.light.last_map().unwrap().rendered_at));
    }

    assert_eq!(rendered, vec![(1, 0.0), (0, 0.0), (1, 2.0)]);
}

#[test]
fn shadow_light_skips_distant_eye() {
    let s = shadow_scene(ShadowSpotLight::new(spot(), 256));
    let frame = frame_from(Vec3::new(0.0, 0.0, 100.0));

    let predraw = PredrawPhase::new(&s.scene);
    let lights = LightPhase::default();
    s.scene
        .process(0.0, &frame, &[Phase::Predraw(&predraw), Phase::Light(&lights)]);

    assert!(predraw.needed().is_empty());
    assert!(s.light.last_map().is_none());
    assert_eq!(lights.lights()[0].shadow_map, None);
}

#[test]
fn shadow_light_without_free_image_still_lights() {
    let s = shadow_scene(ShadowSpotLight::new(spot(), 256));
    let frame = frame_from(Vec3::new(0.0, 0.0, 5.0));

    let predraw = PredrawPhase::new(&s.scene);
    let lights = LightPhase::new(4, 0);
    s.scene
        .process(0.0, &frame, &[Phase::Predraw(&predraw), Phase::Light(&lights)]);

    assert_eq!(predraw.needed().len(), 1);
    assert_eq!(lights.lights().len(), 1);
    assert_eq!(lights.lights()[0].shadow_map, None);
}

#[test]
fn shadow_light_view_looks_along_direction() {
    let light = ShadowSpotLight::new(spot(), 256);
    let at = Mat4::from_translation(Vec3::Y * 5.0);
    let (_, view) = light.light_view(&at);
    // The point straight below the light lies on the view's -Z axis.
    let below = view.transform_point3(Vec3::ZERO);
    assert!(approx_vec3(below, Vec3::new(0.0, 0.0, -5.0)), "got {below}");
}

// ============================================================================
// Camera & frame
// ============================================================================

#[test]
fn perspective_camera_defaults() {
    let camera = PerspectiveCamera::new(100.0);
    assert!((camera.near - 0.01).abs() < EPSILON);
    assert_eq!(camera.position, Vec3::new(0.0, 0.0, -1.0));

    let (projection, _) = camera.camera_projection(UVec2::new(800, 600));
    assert!(projection.y_axis.y < 0.0);
}

#[test]
fn simple_frame_recovers_eye_position() {
    let mut camera = PerspectiveCamera::new(50.0);
    camera.position = Vec3::new(3.0, 4.0, 5.0);
    let frame = SimpleFrame::from_camera(&camera, UVec2::new(64, 64));
    assert!((frame.eye_position() - camera.position).length() < 1e-4);
}
