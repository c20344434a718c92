//! Scene manifest: which meshes and textures to load and where to place them.
//!
//! A manifest is plain JSON. Placements are kept in file order because draw
//! order is reproduced exactly every frame.

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::AssetError;

/// Which GPU program a material binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramKind {
    /// Textured, point-lit geometry.
    Lit,
    /// Reflective water surface.
    Water,
    /// Fullscreen gradient at the far plane.
    Sky,
}

fn default_ambient() -> Vec4 {
    Vec4::new(0.3, 0.3, 0.3, 1.0)
}

fn default_diffuse() -> Vec4 {
    Vec4::new(224.0 / 255.0, 157.0 / 255.0, 55.0 / 255.0, 1.0)
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSpec {
    #[serde(default = "default_program")]
    pub program: ProgramKind,
    /// Key into [`SceneManifest::textures`]. `None` binds plain white.
    #[serde(default)]
    pub texture: Option<String>,
    #[serde(default = "default_ambient")]
    pub ambient: Vec4,
    #[serde(default = "default_diffuse")]
    pub diffuse: Vec4,
}

fn default_program() -> ProgramKind {
    ProgramKind::Lit
}

impl Default for MaterialSpec {
    fn default() -> Self {
        Self {
            program: ProgramKind::Lit,
            texture: None,
            ambient: default_ambient(),
            diffuse: default_diffuse(),
        }
    }
}

/// Intensity source for a point light.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensitySpec {
    Fixed(f32),
    /// Named flicker channel. Lights naming the same channel flicker together.
    Flicker(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightSpec {
    pub position: Vec3,
    pub intensity: IntensitySpec,
}

/// One mesh drawn at one placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementSpec {
    pub name: String,
    pub mesh: String,
    pub material: String,
    #[serde(default)]
    pub position: Vec3,
    /// Degrees per axis, applied X then Y then Z.
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    #[serde(default)]
    pub light: Option<LightSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterSpec {
    pub mesh: String,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    /// Key into [`SceneManifest::textures`] for the distortion map. When
    /// absent a procedural ripple texture is generated.
    #[serde(default)]
    pub ripple: Option<String>,
}

/// Gradient sky drawn behind the scene in both passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkySpec {
    pub zenith: Vec4,
    pub horizon: Vec4,
}

impl Default for SkySpec {
    fn default() -> Self {
        Self {
            zenith: Vec4::new(0.16, 0.33, 0.62, 1.0),
            horizon: Vec4::new(0.74, 0.80, 0.86, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneManifest {
    /// Mesh name to source path.
    pub meshes: BTreeMap<String, String>,
    /// Texture name to image path.
    #[serde(default)]
    pub textures: BTreeMap<String, String>,
    pub materials: BTreeMap<String, MaterialSpec>,
    pub placements: Vec<PlacementSpec>,
    pub water: WaterSpec,
    /// No sky is drawn when absent.
    #[serde(default)]
    pub sky: Option<SkySpec>,
}

impl SceneManifest {
    pub fn from_json(text: &str) -> Result<Self, AssetError> {
        let manifest: Self = serde_json::from_str(text)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String, AssetError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every name referenced by a placement, material or the
    /// water surface is declared.
    pub fn validate(&self) -> Result<(), AssetError> {
        let missing = |what: &str, name: &str, by: &str| -> Result<(), AssetError> {
            Err(AssetError::Manifest(format!(
                "{by} references unknown {what} '{name}'"
            )))
        };

        for (name, material) in &self.materials {
            if let Some(texture) = &material.texture {
                if !self.textures.contains_key(texture) {
                    return missing("texture", texture, &format!("material '{name}'"));
                }
            }
        }

        for placement in &self.placements {
            let by = format!("placement '{}'", placement.name);
            if !self.meshes.contains_key(&placement.mesh) {
                return missing("mesh", &placement.mesh, &by);
            }
            match self.materials.get(&placement.material) {
                None => return missing("material", &placement.material, &by),
                Some(m) if m.program != ProgramKind::Lit => {
                    return Err(AssetError::Manifest(format!(
                        "{by} uses material '{}' which is not a lit material",
                        placement.material
                    )));
                }
                Some(_) => {}
            }
        }

        if !self.meshes.contains_key(&self.water.mesh) {
            return missing("mesh", &self.water.mesh, "water");
        }
        if let Some(ripple) = &self.water.ripple {
            if !self.textures.contains_key(ripple) {
                return missing("texture", ripple, "water");
            }
        }
        Ok(())
    }

    /// Distinct flicker channel names in first-use order.
    pub fn flicker_channels(&self) -> Vec<&str> {
        let mut channels: Vec<&str> = Vec::new();
        for placement in &self.placements {
            if let Some(LightSpec {
                intensity: IntensitySpec::Flicker(channel),
                ..
            }) = &placement.light
            {
                if !channels.contains(&channel.as_str()) {
                    channels.push(channel.as_str());
                }
            }
        }
        channels
    }
}
