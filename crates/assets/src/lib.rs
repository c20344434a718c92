//! Asset pipeline: mesh ingestion, content-addressed mesh cache, asset sources.
//!
//! Raw mesh text goes through [`MeshBuilder`] once and comes out as an
//! immutable [`IndexedMesh`]. The [`AssetStore`] keys built meshes by a hash
//! of their source text so the same file is never parsed twice in a session.
//! The core never performs I/O itself; it asks an [`AssetSource`].

pub mod builtin;
pub mod manifest;
pub mod mesh;
pub mod obj;
pub mod source;
mod store;

pub use manifest::{
    IntensitySpec, LightSpec, MaterialSpec, PlacementSpec, ProgramKind, SceneManifest, SkySpec,
    WaterSpec,
};
pub use mesh::{IndexedMesh, Vertex};
pub use obj::{MeshBuilder, MeshFormatError, MeshFormatErrorKind, VertexKey};
pub use source::{
    AssetSource, ColorSpace, FsAssetSource, ImageData, MemoryAssetSource, ripple_texture,
};
pub use store::{AssetId, AssetStore};

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("mesh {name}: {source}")]
    MeshFormat {
        name: String,
        #[source]
        source: MeshFormatError,
    },
    #[error("manifest error: {0}")]
    Manifest(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn crate_info() -> &'static str {
    "tidewater-assets v0.1.0"
}
