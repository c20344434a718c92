use glam::{Mat3, Mat4, Vec3, Vec4};
use tidewater_common::ResourceError;
use tidewater_input::InputFrame;
use tidewater_kernel::{Camera, Session};

use crate::programs::WAVE_STRENGTH;
use crate::renderer::{
    DrawCall, FrameUniforms, ObjectUniforms, OffscreenTarget, RenderPass, Renderer, WaterUniforms,
};

/// Camera state saved while the camera is mirrored across the water plane.
///
/// [`MirroredView::restore`] writes the saved values back, so the camera
/// returns bit-identical regardless of rounding in the mirror offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirroredView {
    saved_pitch: f32,
    saved_y: f32,
    distance: f32,
}

impl MirroredView {
    /// Mirror the camera across the plane `y = water_height`: pitch is
    /// negated and Y moves down by `2 * (y - water_height)`. The view
    /// matrix is recomputed.
    pub fn enter(camera: &mut Camera, water_height: f32) -> Self {
        let saved_pitch = camera.pitch;
        let saved_y = camera.position.y;
        let distance = 2.0 * (saved_y - water_height);
        camera.pitch = -saved_pitch;
        camera.position.y = saved_y - distance;
        camera.recompute();
        Self {
            saved_pitch,
            saved_y,
            distance,
        }
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Put pitch and Y back exactly. The view matrix is left stale.
    pub fn restore(self, camera: &mut Camera) {
        camera.pitch = self.saved_pitch;
        camera.position.y = self.saved_y;
    }
}

/// What one orchestrated frame did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub reflection_draws: usize,
    pub main_draws: usize,
    /// Whether a sky was drawn at the end of both passes.
    pub sky: bool,
    pub mirror_distance: f32,
    pub mirrored_camera_y: f32,
    pub mirrored_pitch: f32,
    pub camera_position: Vec3,
    pub pitch: f32,
    pub wave_factor: f32,
}

/// Two-pass planar reflection orchestration.
///
/// Per frame: apply input, advance effects, mirror the camera and draw the
/// scene into the offscreen target, restore the camera and draw the scene
/// again into the default target, then draw the water sampling the
/// reflection. The sky, if any, closes each pass's scene draws. The
/// reflection pass always completes before the water draw that consumes it.
///
/// The camera is restored even when the reflection pass fails.
#[derive(Debug, Clone)]
pub struct ReflectionRenderer {
    target: OffscreenTarget,
}

impl ReflectionRenderer {
    pub fn new(target: OffscreenTarget) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &OffscreenTarget {
        &self.target
    }

    pub fn render_frame(
        &self,
        session: &mut Session,
        renderer: &mut impl Renderer,
        input: InputFrame,
    ) -> Result<FrameReport, ResourceError> {
        let _span = tracing::info_span!("frame", n = session.frame() + 1).entered();

        session.apply_input(&input);
        session.advance_effects();
        session.scene.recompute_all();
        session.water.transform.recompute();

        renderer.begin_frame()?;

        let h = session.water_height();
        let mirror = MirroredView::enter(&mut session.camera, h);
        let mirrored_camera_y = session.camera.position.y;
        let mirrored_pitch = session.camera.pitch;

        let reflection = self.draw_reflection(session, renderer, h);
        mirror.restore(&mut session.camera);
        session.camera.recompute();
        let reflection_draws = reflection?;

        let main_draws = draw_scene(session, renderer, RenderPass::Main, Vec4::ZERO)?;
        draw_sky(session, renderer, RenderPass::Main, Vec4::ZERO)?;
        self.draw_water(session, renderer)?;

        renderer.end_frame()?;

        let report = FrameReport {
            frame: session.frame(),
            reflection_draws,
            main_draws,
            sky: session.sky.is_some(),
            mirror_distance: mirror.distance(),
            mirrored_camera_y,
            mirrored_pitch,
            camera_position: session.camera.position,
            pitch: session.camera.pitch,
            wave_factor: session.wave_factor(),
        };
        tracing::debug!(
            reflection_draws,
            main_draws,
            mirrored_camera_y,
            wave_factor = report.wave_factor,
            "frame rendered"
        );
        Ok(report)
    }

    /// Draw the mirrored scene into the offscreen target. The target is
    /// unbound again on failure.
    fn draw_reflection(
        &self,
        session: &Session,
        renderer: &mut impl Renderer,
        water_height: f32,
    ) -> Result<usize, ResourceError> {
        let clip_plane = Vec4::new(0.0, 1.0, 0.0, -water_height);
        renderer.bind_target(self.target.surface)?;
        let drawn = draw_scene(session, renderer, RenderPass::Reflection, clip_plane).and_then(
            |count| {
                draw_sky(session, renderer, RenderPass::Reflection, clip_plane)?;
                Ok(count)
            },
        );
        let unbound = renderer.unbind_target();
        let count = drawn?;
        unbound?;
        Ok(count)
    }

    fn draw_water(
        &self,
        session: &Session,
        renderer: &mut impl Renderer,
    ) -> Result<(), ResourceError> {
        let water = &session.water;
        let call = DrawCall {
            pass: RenderPass::Main,
            mesh: water.mesh,
            program: water.material.program,
            texture: self.target.texture,
            frame: frame_uniforms(&session.camera, Vec4::ZERO),
            object: ObjectUniforms {
                model: water.transform.matrix(),
                normal_matrix: water.transform.normal_matrix(),
                ambient: water.material.ambient,
                diffuse: water.material.diffuse,
                light_position: Vec3::ZERO,
                light_intensity: 0.0,
            },
            water: Some(WaterUniforms {
                reflection: self.target.texture,
                ripple: water.ripple,
                wave_factor: session.wave_factor(),
                wave_strength: WAVE_STRENGTH,
            }),
        };
        renderer.draw(&call)
    }
}

fn frame_uniforms(camera: &Camera, clip_plane: Vec4) -> FrameUniforms {
    FrameUniforms {
        projection: camera.projection(),
        view: camera.view(),
        camera_position: camera.position,
        clip_plane,
    }
}

/// Draw every scene entry in order with the camera as it currently is.
fn draw_scene(
    session: &Session,
    renderer: &mut impl Renderer,
    pass: RenderPass,
    clip_plane: Vec4,
) -> Result<usize, ResourceError> {
    let frame = frame_uniforms(&session.camera, clip_plane);
    let mut count = 0;
    for entry in session.scene.entries() {
        let light = session.sample_light(entry.light.as_ref());
        renderer.draw(&DrawCall {
            pass,
            mesh: entry.mesh,
            program: entry.material.program,
            texture: entry.material.texture,
            frame,
            object: ObjectUniforms {
                model: entry.transform.matrix(),
                normal_matrix: entry.transform.normal_matrix(),
                ambient: entry.material.ambient,
                diffuse: entry.material.diffuse,
                light_position: light.position,
                light_intensity: light.intensity,
            },
            water: None,
        })?;
        count += 1;
    }
    Ok(count)
}

/// Fullscreen sky at the far plane. Its vertex stage derives view rays from
/// the frame matrices, so the object transform is unused.
fn draw_sky(
    session: &Session,
    renderer: &mut impl Renderer,
    pass: RenderPass,
    clip_plane: Vec4,
) -> Result<(), ResourceError> {
    let Some(sky) = &session.sky else {
        return Ok(());
    };
    renderer.draw(&DrawCall {
        pass,
        mesh: sky.mesh,
        program: sky.material.program,
        texture: sky.material.texture,
        frame: frame_uniforms(&session.camera, clip_plane),
        object: ObjectUniforms {
            model: Mat4::IDENTITY,
            normal_matrix: Mat3::IDENTITY,
            ambient: sky.material.ambient,
            diffuse: sky.material.diffuse,
            light_position: Vec3::ZERO,
            light_intensity: 0.0,
        },
        water: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec2;
    use tidewater_kernel::CameraConfig;

    fn camera_at(position: Vec3, pitch: f32) -> Camera {
        let mut camera = Camera::new(&CameraConfig::default(), UVec2::new(800, 600));
        camera.position = position;
        camera.pitch = pitch;
        camera.recompute();
        camera
    }

    #[test]
    fn mirrors_harbor_camera() {
        let mut camera = camera_at(Vec3::new(0.0, 33.0, -4.0), 0.0);
        let mirror = MirroredView::enter(&mut camera, 13.0);
        assert_eq!(mirror.distance(), 40.0);
        assert_eq!(camera.position.y, -7.0);
        assert_eq!(camera.pitch, -0.0);
        mirror.restore(&mut camera);
        assert_eq!(camera.position, Vec3::new(0.0, 33.0, -4.0));
        assert_eq!(camera.pitch.to_bits(), 0.0_f32.to_bits());
    }

    #[test]
    fn restore_is_bit_exact_for_awkward_values() {
        let cases = [
            (0.1_f32, 13.0_f32, 0.3_f32),
            (1.0e7, -3.3, -1.2),
            (-0.000_123, 7.77, 1.55),
            (33.333_33, 33.333_32, -0.000_01),
            (5.0e-40, 0.0, 0.0),
        ];
        for (y, h, pitch) in cases {
            let mut camera = camera_at(Vec3::new(1.5, y, -2.5), pitch);
            let mirror = MirroredView::enter(&mut camera, h);
            assert_eq!(camera.pitch, -pitch);
            mirror.restore(&mut camera);
            assert_eq!(camera.position.y.to_bits(), y.to_bits(), "y={y} h={h}");
            assert_eq!(camera.pitch.to_bits(), pitch.to_bits());
            assert_eq!(camera.position.x, 1.5);
            assert_eq!(camera.position.z, -2.5);
        }
    }

    #[test]
    fn mirrored_view_sees_the_reflection_of_a_point() {
        let h = 13.0;
        let mut camera = camera_at(Vec3::new(0.0, 33.0, -4.0), -0.3);
        let above = Vec3::new(2.0, 20.0, -30.0);
        let below = Vec3::new(above.x, 2.0 * h - above.y, above.z);
        let true_ndc = camera.view_projection().project_point3(below);

        let _mirror = MirroredView::enter(&mut camera, h);
        let mirrored_ndc = camera.view_projection().project_point3(above);
        assert!((true_ndc.x - mirrored_ndc.x).abs() < 1e-4);
        assert!((true_ndc.y + mirrored_ndc.y).abs() < 1e-4);
    }

    #[test]
    fn mirror_recomputes_view() {
        let mut camera = camera_at(Vec3::new(0.0, 33.0, -4.0), 0.2);
        let before = camera.view();
        let _mirror = MirroredView::enter(&mut camera, 13.0);
        assert_ne!(camera.view(), before);
    }
}
