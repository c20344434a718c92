//! Session startup: load every asset a manifest names, upload it, and build
//! the scene. Any failure aborts startup; no partial scene is produced.

use glam::UVec2;
use std::collections::BTreeMap;
use std::sync::Arc;
use tidewater_assets::{
    AssetError, AssetId, AssetSource, AssetStore, ImageData, IntensitySpec, MaterialSpec,
    IndexedMesh, ProgramKind, SceneManifest, builtin, ripple_texture,
};
use tidewater_common::{GpuMeshHandle, ProgramHandle, ResourceError, TextureHandle, Transform};
use tidewater_kernel::{
    Camera, ConfigError, LightIntensity, LightRig, Material, PointLight, SceneEntry, SceneGraph,
    Session, SessionConfig, SkyBackdrop, WaterSurface,
};

use crate::programs::program_for;
use crate::reflection::ReflectionRenderer;
use crate::renderer::Renderer;

/// Side length of the generated ripple texture.
pub const RIPPLE_SIZE: u32 = 256;

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// GPU handles for everything uploaded during setup.
struct Uploaded {
    lit: ProgramHandle,
    water: ProgramHandle,
    sky: ProgramHandle,
    meshes: BTreeMap<String, (GpuMeshHandle, bool)>,
    sky_mesh: Option<GpuMeshHandle>,
    textures: BTreeMap<String, TextureHandle>,
    white: TextureHandle,
}

impl Uploaded {
    fn program(&self, kind: ProgramKind) -> ProgramHandle {
        match kind {
            ProgramKind::Lit => self.lit,
            ProgramKind::Water => self.water,
            ProgramKind::Sky => self.sky,
        }
    }

    fn mesh(&self, name: &str) -> Result<(GpuMeshHandle, bool), SetupError> {
        lookup(&self.meshes, name, "mesh").copied()
    }

    fn texture(&self, name: &str) -> Result<TextureHandle, SetupError> {
        lookup(&self.textures, name, "texture").copied()
    }
}

fn lookup<'a, V>(
    map: &'a BTreeMap<String, V>,
    name: &str,
    what: &str,
) -> Result<&'a V, SetupError> {
    map.get(name)
        .ok_or_else(|| AssetError::Manifest(format!("unknown {what} '{name}'")).into())
}

/// Build a ready-to-render session from a manifest.
pub fn build_session(
    manifest: &SceneManifest,
    source: &impl AssetSource,
    renderer: &mut impl Renderer,
    config: SessionConfig,
    viewport: UVec2,
) -> Result<(Session, ReflectionRenderer), SetupError> {
    let _span = tracing::info_span!("build_session").entered();
    config.validate()?;
    manifest.validate()?;

    let uploaded = upload_assets(manifest, source, renderer)?;

    let mut lights = LightRig::new(config.flicker.seed, config.flicker.step);
    let mut scene = SceneGraph::new();
    for placement in &manifest.placements {
        let (mesh, has_texcoords) = uploaded.mesh(&placement.mesh)?;
        let spec = lookup(&manifest.materials, &placement.material, "material")?;
        let material = resolve_material(spec, has_texcoords, &uploaded, &placement.name)?;

        let light = placement.light.as_ref().map(|light| PointLight {
            position: light.position,
            intensity: match &light.intensity {
                IntensitySpec::Fixed(value) => LightIntensity::Fixed(*value),
                IntensitySpec::Flicker(channel) => {
                    LightIntensity::Channel(lights.add_channel(channel))
                }
            },
        });

        scene.push(SceneEntry {
            name: placement.name.clone(),
            mesh,
            material,
            transform: Transform::placed(placement.position, placement.rotation, placement.scale),
            light,
        });
    }

    let water_spec = &manifest.water;
    let (water_mesh, _) = uploaded.mesh(&water_spec.mesh)?;
    let ripple = match &water_spec.ripple {
        Some(name) => uploaded.texture(name)?,
        None => renderer.upload_texture(&ripple_texture(RIPPLE_SIZE))?,
    };
    let mut water_position = water_spec.position;
    if water_position.y != config.water_height {
        tracing::warn!(
            manifest_y = water_position.y,
            water_height = config.water_height,
            "water placement moved to configured height"
        );
        water_position.y = config.water_height;
    }
    let water = WaterSurface {
        mesh: water_mesh,
        material: Material {
            program: uploaded.water,
            texture: uploaded.white,
            ambient: MaterialSpec::default().ambient,
            diffuse: MaterialSpec::default().diffuse,
        },
        ripple,
        transform: Transform::placed(water_position, water_spec.rotation, water_spec.scale),
    };

    let [width, height] = config.reflection_size;
    let target = renderer.create_offscreen_target(width, height)?;
    tracing::info!(width, height, "reflection target created");

    let camera = Camera::new(&config.camera, viewport);
    tracing::info!(
        entries = scene.len(),
        flicker_channels = lights.channels().len(),
        "session ready"
    );
    let mut session = Session::new(config, camera, scene, water, lights);
    if let (Some(spec), Some(mesh)) = (&manifest.sky, uploaded.sky_mesh) {
        session = session.with_sky(SkyBackdrop {
            mesh,
            material: Material {
                program: uploaded.sky,
                texture: uploaded.white,
                ambient: spec.zenith,
                diffuse: spec.horizon,
            },
        });
    }
    Ok((session, ReflectionRenderer::new(target)))
}

fn upload_assets(
    manifest: &SceneManifest,
    source: &impl AssetSource,
    renderer: &mut impl Renderer,
) -> Result<Uploaded, SetupError> {
    let mut compile = |kind: ProgramKind| -> Result<ProgramHandle, SetupError> {
        let program = program_for(kind);
        let handle = renderer.compile(program)?;
        tracing::info!(label = program.label, "program compiled");
        Ok(handle)
    };
    let lit = compile(ProgramKind::Lit)?;
    let water = compile(ProgramKind::Water)?;
    let sky = compile(ProgramKind::Sky)?;

    let mut meshes = MeshUploads::default();
    let mut mesh_handles = BTreeMap::new();
    for (name, path) in &manifest.meshes {
        let text = source.read_text(path)?;
        let (handle, mesh) = meshes.upload(renderer, name, &text)?;
        if mesh.degenerate_vertex_count() > 0 {
            tracing::debug!(
                name,
                degenerate = mesh.degenerate_vertex_count(),
                "mesh has vertices with zero normals"
            );
        }
        tracing::info!(
            name,
            path,
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "mesh loaded"
        );
        mesh_handles.insert(name.clone(), (handle, mesh.has_texcoords()));
    }
    let sky_mesh = match manifest.sky {
        Some(_) => Some(meshes.upload(renderer, "sky", builtin::QUAD_OBJ)?.0),
        None => None,
    };

    let mut textures = BTreeMap::new();
    for (name, path) in &manifest.textures {
        let mut image = source.read_image(path)?;
        if manifest.water.ripple.as_ref() == Some(name) {
            image = image.into_linear();
        }
        tracing::info!(name, path, width = image.width, height = image.height, "texture loaded");
        textures.insert(name.clone(), renderer.upload_texture(&image)?);
    }
    let white = renderer.upload_texture(&ImageData::solid([255; 4]))?;

    Ok(Uploaded {
        lit,
        water,
        sky,
        meshes: mesh_handles,
        sky_mesh,
        textures,
        white,
    })
}

/// Content-addressed mesh uploads: identical sources share one GPU mesh.
#[derive(Default)]
struct MeshUploads {
    store: AssetStore,
    gpu: BTreeMap<AssetId, GpuMeshHandle>,
}

impl MeshUploads {
    fn upload(
        &mut self,
        renderer: &mut impl Renderer,
        name: &str,
        text: &str,
    ) -> Result<(GpuMeshHandle, Arc<IndexedMesh>), SetupError> {
        let (id, mesh) = self.store.mesh_from_source(name, text)?;
        let handle = match self.gpu.get(&id) {
            Some(handle) => *handle,
            None => {
                let handle = renderer.upload_mesh(&mesh)?;
                self.gpu.insert(id, handle);
                handle
            }
        };
        Ok((handle, mesh))
    }
}

/// Meshes without texture coordinates never sample a real texture.
fn resolve_material(
    spec: &MaterialSpec,
    has_texcoords: bool,
    uploaded: &Uploaded,
    entry: &str,
) -> Result<Material, SetupError> {
    let texture = match &spec.texture {
        Some(name) if has_texcoords => uploaded.texture(name)?,
        Some(name) => {
            tracing::warn!(entry, texture = %name, "mesh has no texture coordinates; using white");
            uploaded.white
        }
        None => uploaded.white,
    };
    Ok(Material {
        program: uploaded.program(spec.program),
        texture,
        ambient: spec.ambient,
        diffuse: spec.diffuse,
    })
}
