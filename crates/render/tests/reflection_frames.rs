use glam::{UVec2, Vec2, Vec3};
use tidewater_assets::builtin::{builtin_source, demo_manifest};
use tidewater_assets::{
    FsAssetSource, IntensitySpec, LightSpec, MaterialSpec, MemoryAssetSource, PlacementSpec, ProgramKind,
    SceneManifest, SkySpec, WaterSpec,
};
use tidewater_common::GpuMeshHandle;
use tidewater_input::{InputFrame, MoveIntent};
use tidewater_kernel::{Session, SessionConfig};
use tidewater_render::{Command, RecordingRenderer, ReflectionRenderer, RenderPass, build_session};

fn demo() -> (Session, ReflectionRenderer, RecordingRenderer) {
    let mut renderer = RecordingRenderer::new();
    let (session, reflection) = build_session(
        &demo_manifest(),
        &builtin_source(),
        &mut renderer,
        SessionConfig::default(),
        UVec2::new(1280, 720),
    )
    .unwrap();
    renderer.take_commands();
    (session, reflection, renderer)
}

/// A square of four positions and one quad face, placed once above water.
fn square_scene() -> (SceneManifest, MemoryAssetSource) {
    let mut source = MemoryAssetSource::new();
    source.insert_text("square.obj", "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n");
    let manifest = SceneManifest {
        meshes: [("square".to_string(), "square.obj".to_string())].into(),
        textures: Default::default(),
        materials: [
            ("plain".to_string(), MaterialSpec::default()),
            (
                "water".to_string(),
                MaterialSpec {
                    program: ProgramKind::Water,
                    ..MaterialSpec::default()
                },
            ),
        ]
        .into(),
        placements: vec![PlacementSpec {
            name: "sign".to_string(),
            mesh: "square".to_string(),
            material: "plain".to_string(),
            position: Vec3::new(0.0, 20.0, -30.0),
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            light: Some(LightSpec {
                position: Vec3::new(0.0, 25.0, -28.0),
                intensity: IntensitySpec::Fixed(1.25),
            }),
        }],
        water: WaterSpec {
            mesh: "square".to_string(),
            position: Vec3::new(0.0, 13.0, 0.0),
            rotation: Vec3::new(-90.0, 0.0, 0.0),
            scale: Vec3::splat(190.0),
            ripple: None,
        },
        sky: None,
    };
    (manifest, source)
}

#[test]
fn harbor_camera_mirrors_to_minus_seven_and_returns() {
    let (mut session, reflection, mut renderer) = demo();
    let report = reflection
        .render_frame(&mut session, &mut renderer, InputFrame::default())
        .unwrap();

    assert_eq!(report.mirror_distance, 40.0);
    assert_eq!(report.mirrored_camera_y, -7.0);
    assert_eq!(report.mirrored_pitch, -0.0);
    assert_eq!(report.camera_position, Vec3::new(0.0, 33.0, -4.0));
    assert_eq!(report.pitch, 0.0);
    assert_eq!(session.camera.position, Vec3::new(0.0, 33.0, -4.0));

    let reflection_eyes: Vec<Vec3> = renderer
        .draws_in(RenderPass::Reflection)
        .map(|d| d.frame.camera_position)
        .collect();
    assert!(reflection_eyes.iter().all(|e| *e == Vec3::new(0.0, -7.0, -4.0)));
    assert!(
        renderer
            .draws_in(RenderPass::Main)
            .all(|d| d.frame.camera_position == Vec3::new(0.0, 33.0, -4.0))
    );
}

#[test]
fn command_order_is_reflection_then_main_then_water() {
    let (mut session, reflection, mut renderer) = demo();
    let entries = session.scene.len();
    reflection
        .render_frame(&mut session, &mut renderer, InputFrame::default())
        .unwrap();

    let commands = renderer.commands();
    assert!(matches!(commands[0], Command::BeginFrame));
    assert!(matches!(commands[1], Command::BindTarget(s) if s == reflection.target().surface));
    let unbind = commands
        .iter()
        .position(|c| matches!(c, Command::UnbindTarget))
        .unwrap();
    // scene entries then the sky
    assert_eq!(unbind, 2 + entries + 1);
    assert!(commands[2..unbind].iter().all(
        |c| matches!(c, Command::Draw(d) if d.pass == RenderPass::Reflection && d.water.is_none())
    ));

    let main: Vec<_> = commands[unbind + 1..commands.len() - 1].to_vec();
    assert_eq!(main.len(), entries + 2);
    let Some(Command::Draw(water)) = main.last() else {
        panic!("water must be the last draw");
    };
    let water = water.water.expect("water uniforms");
    assert_eq!(water.reflection, reflection.target().texture);
    assert!(matches!(commands.last(), Some(Command::EndFrame)));
}

#[test]
fn sky_closes_both_passes() {
    let (mut session, reflection, mut renderer) = demo();
    let report = reflection
        .render_frame(&mut session, &mut renderer, InputFrame::default())
        .unwrap();
    assert!(report.sky);
    let sky = session.sky.as_ref().unwrap().material.program;

    let reflected: Vec<_> = renderer.draws_in(RenderPass::Reflection).collect();
    assert_eq!(reflected.len(), session.scene.len() + 1);
    assert_eq!(reflected.last().unwrap().program, sky);
    assert_eq!(reflected.last().unwrap().frame.camera_position.y, -7.0);

    let main: Vec<_> = renderer.draws_in(RenderPass::Main).collect();
    let before_water = main[main.len() - 2];
    assert_eq!(before_water.program, sky);
    assert_eq!(before_water.object.ambient, SkySpec::default().zenith);
    assert_eq!(before_water.object.diffuse, SkySpec::default().horizon);
    assert!(main.last().unwrap().water.is_some());
    assert_eq!(
        renderer.draws().filter(|d| d.program == sky).count(),
        2,
        "one sky per pass"
    );
}

#[test]
fn failed_reflection_pass_leaves_camera_unmirrored() {
    let (mut session, reflection, mut renderer) = demo();
    session.camera.pitch = 0.4;
    session.camera.recompute();
    let position = session.camera.position;
    let view = session.camera.view();
    let good_mesh = session.scene.entries()[0].mesh;
    session.scene.entries_mut()[0].mesh = GpuMeshHandle(9999);

    let err = reflection
        .render_frame(&mut session, &mut renderer, InputFrame::default())
        .unwrap_err();
    assert!(err.to_string().contains("9999"), "{err}");
    assert_eq!(session.camera.position, position);
    assert_eq!(session.camera.pitch.to_bits(), 0.4_f32.to_bits());
    assert_eq!(session.camera.view(), view);
    assert!(matches!(
        renderer.commands().last(),
        Some(Command::UnbindTarget)
    ));

    session.scene.entries_mut()[0].mesh = good_mesh;
    renderer.take_commands();
    let report = reflection
        .render_frame(&mut session, &mut renderer, InputFrame::default())
        .unwrap();
    assert_eq!(report.mirrored_camera_y, -7.0);
    assert_eq!(report.camera_position, position);
}

#[test]
fn both_passes_preserve_scene_order() {
    let (mut session, reflection, mut renderer) = demo();
    reflection
        .render_frame(&mut session, &mut renderer, InputFrame::default())
        .unwrap();
    let sky = session.sky.as_ref().unwrap().material.program;

    let expected: Vec<Vec3> = session
        .scene
        .entries()
        .iter()
        .map(|e| e.transform.matrix().w_axis.truncate())
        .collect();
    for pass in [RenderPass::Reflection, RenderPass::Main] {
        let seen: Vec<Vec3> = renderer
            .draws_in(pass)
            .filter(|d| d.water.is_none() && d.program != sky)
            .map(|d| d.object.model.w_axis.truncate())
            .collect();
        assert_eq!(seen, expected);
    }
}

#[test]
fn clip_plane_only_in_reflection_pass() {
    let (mut session, reflection, mut renderer) = demo();
    reflection
        .render_frame(&mut session, &mut renderer, InputFrame::default())
        .unwrap();
    for draw in renderer.draws() {
        match draw.pass {
            RenderPass::Reflection => {
                assert_eq!(draw.frame.clip_plane, glam::Vec4::new(0.0, 1.0, 0.0, -13.0))
            }
            RenderPass::Main => assert_eq!(draw.frame.clip_plane, glam::Vec4::ZERO),
        }
    }
}

#[test]
fn wave_factor_advances_and_wraps() {
    let config = SessionConfig {
        wave_speed: 0.25,
        ..SessionConfig::default()
    };
    let mut renderer = RecordingRenderer::new();
    let (mut session, reflection) = build_session(
        &demo_manifest(),
        &builtin_source(),
        &mut renderer,
        config,
        UVec2::new(800, 600),
    )
    .unwrap();

    let waves: Vec<f32> = (0..5)
        .map(|_| {
            reflection
                .render_frame(&mut session, &mut renderer, InputFrame::default())
                .unwrap()
                .wave_factor
        })
        .collect();
    assert_eq!(waves, vec![0.25, 0.5, 0.75, 0.0, 0.25]);
    let last_water = renderer
        .draws()
        .filter_map(|d| d.water)
        .last()
        .unwrap();
    assert_eq!(last_water.wave_factor, 0.25);
}

#[test]
fn input_is_applied_once_before_both_passes() {
    let (mut session, reflection, mut renderer) = demo();
    let input = InputFrame {
        intent: MoveIntent {
            forward: true,
            ..MoveIntent::default()
        },
        pointer_delta: Vec2::new(0.0, -100.0),
    };
    let report = reflection
        .render_frame(&mut session, &mut renderer, input)
        .unwrap();

    assert!((report.pitch - 0.3).abs() < 1e-6);
    assert!((report.mirrored_pitch + 0.3).abs() < 1e-6);
    assert!((report.camera_position.z - -4.1).abs() < 1e-6);
    let main_eye = renderer
        .draws_in(RenderPass::Main)
        .next()
        .unwrap()
        .frame
        .camera_position;
    let reflection_eye = renderer
        .draws_in(RenderPass::Reflection)
        .next()
        .unwrap()
        .frame
        .camera_position;
    assert_eq!(main_eye.z, reflection_eye.z);
    assert_eq!(main_eye.y, 33.0);
}

#[test]
fn many_frames_keep_camera_exact_and_pitch_bounded() {
    let (mut session, reflection, mut renderer) = demo();
    let limit = 89.0_f32.to_radians();
    for i in 0..200 {
        let input = InputFrame {
            intent: MoveIntent {
                forward: i % 3 == 0,
                backward: i % 5 == 0,
                left: i % 7 == 0,
                right: i % 2 == 0,
            },
            pointer_delta: Vec2::new((i as f32 * 1.7).sin() * 40.0, (i as f32 * 0.9).cos() * 90.0),
        };
        let before_y = session.camera.position.y;
        let report = reflection
            .render_frame(&mut session, &mut renderer, input)
            .unwrap();
        assert_eq!(report.camera_position.y.to_bits(), before_y.to_bits());
        assert!(report.pitch.abs() <= limit);
        renderer.take_commands();
    }
}

#[test]
fn square_scene_end_to_end() {
    let (manifest, source) = square_scene();
    let mut renderer = RecordingRenderer::new();
    let (mut session, reflection) = build_session(
        &manifest,
        &source,
        &mut renderer,
        SessionConfig::default(),
        UVec2::new(640, 480),
    )
    .unwrap();

    assert!(renderer.commands().iter().any(|c| matches!(
        c,
        Command::UploadMesh {
            vertices: 4,
            triangles: 2,
            ..
        }
    )));

    reflection
        .render_frame(&mut session, &mut renderer, InputFrame::default())
        .unwrap();
    let sign = renderer.draws_in(RenderPass::Main).next().unwrap();
    assert_eq!(sign.object.light_intensity, 1.25);
    assert_eq!(sign.object.light_position, Vec3::new(0.0, 25.0, -28.0));
    // no sky in this manifest
    assert_eq!(renderer.draws().count(), 3);
}

#[test]
fn resize_between_frames_changes_projection_only_once() {
    let (mut session, reflection, mut renderer) = demo();
    reflection
        .render_frame(&mut session, &mut renderer, InputFrame::default())
        .unwrap();
    let before = renderer.draws().next().unwrap().frame.projection;

    assert!(session.resize(640, 640));
    assert!(!session.resize(640, 640));
    renderer.take_commands();
    reflection
        .render_frame(&mut session, &mut renderer, InputFrame::default())
        .unwrap();
    let after = renderer.draws().next().unwrap().frame.projection;
    assert_ne!(before, after);
}

#[test]
fn pond_demo_loads_from_disk() {
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/pond");
    let manifest = SceneManifest::load(root.join("scene.json")).unwrap();
    let config = SessionConfig::load(root.join("session.json")).unwrap();
    assert_eq!(config.reflection_size, [1024, 1024]);

    let mut renderer = RecordingRenderer::new();
    let (mut session, reflection) = build_session(
        &manifest,
        &FsAssetSource::new(&root),
        &mut renderer,
        config,
        UVec2::new(800, 600),
    )
    .unwrap();
    // cube and quad are shared by every placement
    assert_eq!(renderer.mesh_count(), 2);
    assert_eq!(reflection.target().width, 1024);

    let mut lantern = Vec::new();
    for _ in 0..3 {
        renderer.take_commands();
        let report = reflection
            .render_frame(&mut session, &mut renderer, InputFrame::default())
            .unwrap();
        assert_eq!(report.reflection_draws, 4);
        assert_eq!(report.main_draws, 4);
        assert!((report.mirrored_camera_y - 4.0).abs() < 1e-5);

        let main: Vec<_> = renderer.draws_in(RenderPass::Main).collect();
        // four placements, the sky, the water
        assert_eq!(main.len(), 6);
        assert_eq!(main[4].object.ambient, glam::Vec4::new(0.2, 0.36, 0.58, 1.0));
        assert_eq!(main[0].object.light_intensity, 0.0);
        assert_eq!(main[3].object.light_intensity, 1.0);
        lantern.push(main[2].object.light_intensity);
    }
    assert!(lantern.iter().all(|i| (1.0..=1.5).contains(i)));
}
