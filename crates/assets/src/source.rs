//! Asset loader collaborator.
//!
//! The core never touches the filesystem or network directly. It asks an
//! [`AssetSource`] for decoded mesh text and RGBA pixel buffers.

use std::collections::BTreeMap;
use std::f32::consts::TAU;
use std::path::{Path, PathBuf};

use tidewater_common::ResourceError;

/// How texel values are meant to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpace {
    /// Color imagery, decoded from sRGB when sampled.
    #[default]
    Srgb,
    /// Raw data such as distortion offsets, sampled as stored.
    Linear,
}

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    pub color_space: ColorSpace,
}

impl ImageData {
    /// A 1x1 image of a single color.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: rgba.to_vec(),
            color_space: ColorSpace::Srgb,
        }
    }

    pub fn into_linear(self) -> Self {
        Self {
            color_space: ColorSpace::Linear,
            ..self
        }
    }
}

/// Supplies decoded asset data by path.
pub trait AssetSource {
    fn read_text(&self, path: &str) -> Result<String, ResourceError>;
    fn read_image(&self, path: &str) -> Result<ImageData, ResourceError>;
}

/// Reads assets from a directory on disk.
#[derive(Debug, Clone)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

fn fetch_error(path: &str, reason: impl ToString) -> ResourceError {
    ResourceError::AssetFetch {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

impl AssetSource for FsAssetSource {
    fn read_text(&self, path: &str) -> Result<String, ResourceError> {
        std::fs::read_to_string(self.resolve(path)).map_err(|e| fetch_error(path, e))
    }

    fn read_image(&self, path: &str) -> Result<ImageData, ResourceError> {
        let bytes = std::fs::read(self.resolve(path)).map_err(|e| fetch_error(path, e))?;
        let decoded = image::load_from_memory(&bytes).map_err(|e| fetch_error(path, e))?;
        let rgba = decoded.to_rgba8();
        tracing::debug!(path, width = rgba.width(), height = rgba.height(), "image decoded");
        Ok(ImageData {
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
            color_space: ColorSpace::Srgb,
        })
    }
}

/// In-memory asset source, used for the built-in demo scene and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetSource {
    texts: BTreeMap<String, String>,
    images: BTreeMap<String, ImageData>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_text(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.texts.insert(path.into(), text.into());
    }

    pub fn insert_image(&mut self, path: impl Into<String>, image: ImageData) {
        self.images.insert(path.into(), image);
    }
}

impl AssetSource for MemoryAssetSource {
    fn read_text(&self, path: &str) -> Result<String, ResourceError> {
        self.texts
            .get(path)
            .cloned()
            .ok_or_else(|| fetch_error(path, "not found"))
    }

    fn read_image(&self, path: &str) -> Result<ImageData, ResourceError> {
        self.images
            .get(path)
            .cloned()
            .ok_or_else(|| fetch_error(path, "not found"))
    }
}

/// Procedural two-channel distortion map that tiles seamlessly.
///
/// Red and green hold signed offsets remapped to `0..=255`; the water
/// program turns them back into `-1..1` before scaling.
pub fn ripple_texture(size: u32) -> ImageData {
    let size = size.max(1);
    let mut rgba = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        let v = y as f32 / size as f32;
        for x in 0..size {
            let u = x as f32 / size as f32;
            let r = (TAU * (4.0 * u + 0.25 * (TAU * 3.0 * v).sin())).sin();
            let g = (TAU * (5.0 * v + 0.25 * (TAU * 2.0 * u).sin())).cos();
            rgba.push(to_unorm(r));
            rgba.push(to_unorm(g));
            rgba.push(0);
            rgba.push(255);
        }
    }
    ImageData {
        width: size,
        height: size,
        rgba,
        color_space: ColorSpace::Linear,
    }
}

fn to_unorm(signed: f32) -> u8 {
    ((signed * 0.5 + 0.5).clamp(0.0, 1.0) * 255.0).round() as u8
}
