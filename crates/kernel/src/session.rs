use glam::Vec3;
use tidewater_common::{GpuMeshHandle, TextureHandle, Transform};
use tidewater_input::InputFrame;

use crate::camera::Camera;
use crate::config::SessionConfig;
use crate::effects::{LightRig, WaveFactor};
use crate::scene::{LightIntensity, Material, PointLight, SceneGraph};

/// The reflective water plane, drawn last each frame.
#[derive(Debug, Clone)]
pub struct WaterSurface {
    pub mesh: GpuMeshHandle,
    pub material: Material,
    /// Distortion map sampled with the wave factor.
    pub ripple: TextureHandle,
    pub transform: Transform,
}

/// Sky drawn behind everything at the far plane, once per pass.
///
/// The material's ambient colour is the zenith and its diffuse colour the
/// horizon.
#[derive(Debug, Clone)]
pub struct SkyBackdrop {
    pub mesh: GpuMeshHandle,
    pub material: Material,
}

/// Resolved light for one draw.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LightSample {
    pub position: Vec3,
    pub intensity: f32,
}

/// All mutable state of one viewing session.
///
/// The session exclusively owns the single camera and the scene for its
/// whole lifetime. It is mutated once per frame by input application,
/// effect advancement and the reflection pass, always on one thread.
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    pub camera: Camera,
    pub scene: SceneGraph,
    pub water: WaterSurface,
    pub sky: Option<SkyBackdrop>,
    wave: WaveFactor,
    lights: LightRig,
    frame: u64,
}

impl Session {
    pub fn new(
        config: SessionConfig,
        camera: Camera,
        scene: SceneGraph,
        water: WaterSurface,
        lights: LightRig,
    ) -> Self {
        Self {
            wave: WaveFactor::new(config.wave_speed),
            config,
            camera,
            scene,
            water,
            sky: None,
            lights,
            frame: 0,
        }
    }

    pub fn with_sky(mut self, sky: SkyBackdrop) -> Self {
        self.sky = Some(sky);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// World-space Y of the water plane.
    pub fn water_height(&self) -> f32 {
        self.config.water_height
    }

    pub fn wave_factor(&self) -> f32 {
        self.wave.value()
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    /// Frames advanced so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Apply input accumulated since the previous frame. Does not recompute
    /// the view matrix; the frame orchestration does that before drawing.
    pub fn apply_input(&mut self, input: &InputFrame) {
        self.camera.apply_input(input);
        tracing::trace!(
            position = ?self.camera.position,
            yaw = self.camera.yaw,
            pitch = self.camera.pitch,
            "input applied"
        );
    }

    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        self.camera.set_viewport(width, height)
    }

    /// Step the wave factor and the light flicker by one frame.
    pub fn advance_effects(&mut self) {
        self.frame += 1;
        self.wave.advance();
        self.lights.advance();
    }

    /// Resolve an entry's light. Entries without one get a dark light at the
    /// origin, leaving only ambient contribution.
    pub fn sample_light(&self, light: Option<&PointLight>) -> LightSample {
        match light {
            None => LightSample::default(),
            Some(light) => LightSample {
                position: light.position,
                intensity: match light.intensity {
                    LightIntensity::Fixed(value) => value,
                    LightIntensity::Channel(index) => self.lights.intensity(index),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneEntry;
    use glam::{UVec2, Vec2, Vec4};
    use tidewater_common::ProgramHandle;
    use tidewater_input::MoveIntent;

    fn material() -> Material {
        Material {
            program: ProgramHandle(1),
            texture: TextureHandle(1),
            ambient: Vec4::ONE,
            diffuse: Vec4::ONE,
        }
    }

    fn session() -> Session {
        let config = SessionConfig::default();
        let camera = Camera::new(&config.camera, UVec2::new(640, 480));
        let mut lights = LightRig::new(config.flicker.seed, config.flicker.step);
        let channel = lights.add_channel("boat");
        let mut scene = SceneGraph::new();
        scene.push(SceneEntry {
            name: "candle".into(),
            mesh: GpuMeshHandle(1),
            material: material(),
            transform: Transform::default(),
            light: Some(PointLight {
                position: Vec3::new(12.0, 20.0, 44.0),
                intensity: LightIntensity::Channel(channel),
            }),
        });
        let water = WaterSurface {
            mesh: GpuMeshHandle(2),
            material: material(),
            ripple: TextureHandle(3),
            transform: Transform::default(),
        };
        Session::new(config, camera, scene, water, lights)
    }

    #[test]
    fn advance_effects_moves_wave_and_lights() {
        let mut s = session();
        assert_eq!(s.wave_factor(), 0.0);
        s.advance_effects();
        assert!((s.wave_factor() - 0.0003).abs() < 1e-9);
        assert_eq!(s.frame(), 1);
        let light = s.sample_light(s.scene.entries()[0].light.as_ref());
        assert_eq!(light.position, Vec3::new(12.0, 20.0, 44.0));
        assert!((1.0..=1.5).contains(&light.intensity));
    }

    #[test]
    fn missing_light_is_dark() {
        let s = session();
        assert_eq!(s.sample_light(None), LightSample::default());
        let fixed = PointLight {
            position: Vec3::Y,
            intensity: LightIntensity::Fixed(0.75),
        };
        assert_eq!(s.sample_light(Some(&fixed)).intensity, 0.75);
    }

    #[test]
    fn apply_input_moves_camera_without_touching_view() {
        let mut s = session();
        let view = s.camera.view();
        s.apply_input(&InputFrame {
            intent: MoveIntent {
                forward: true,
                ..MoveIntent::default()
            },
            pointer_delta: Vec2::ZERO,
        });
        assert!((s.camera.position.z - -4.1).abs() < 1e-6);
        assert_eq!(s.camera.view(), view);
    }

    #[test]
    fn sky_is_optional() {
        let s = session();
        assert!(s.sky.is_none());
        let s = s.with_sky(SkyBackdrop {
            mesh: GpuMeshHandle(4),
            material: material(),
        });
        assert_eq!(s.sky.as_ref().map(|sky| sky.mesh), Some(GpuMeshHandle(4)));
    }

    #[test]
    fn resize_forwards_to_camera() {
        let mut s = session();
        assert!(s.resize(1280, 720));
        assert!(!s.resize(1280, 720));
        assert_eq!(s.camera.viewport(), UVec2::new(1280, 720));
    }
}
