use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::AssetError;
use crate::mesh::IndexedMesh;
use crate::obj::MeshBuilder;

/// Content-addressed asset ID computed from the mesh source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u64);

/// Content-addressed mesh registry.
///
/// Meshes are indexed by the hash of their source text, so two names that
/// point at identical files share one parsed mesh. Built meshes are handed
/// out as shared read-only references.
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    meshes: BTreeMap<AssetId, Arc<IndexedMesh>>,
    names: BTreeMap<String, AssetId>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mesh from source text, or return the cached one when the
    /// same text was already ingested.
    pub fn mesh_from_source(
        &mut self,
        name: &str,
        source: &str,
    ) -> Result<(AssetId, Arc<IndexedMesh>), AssetError> {
        let id = content_hash(source);
        self.names.insert(name.to_string(), id);

        if let Some(mesh) = self.meshes.get(&id) {
            tracing::debug!(name, ?id, "mesh cache hit");
            return Ok((id, Arc::clone(mesh)));
        }

        let mesh = MeshBuilder::new()
            .build(source)
            .map_err(|source| AssetError::MeshFormat {
                name: name.to_string(),
                source,
            })?;
        tracing::info!(
            name,
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "mesh ingested"
        );
        let mesh = Arc::new(mesh);
        self.meshes.insert(id, Arc::clone(&mesh));
        Ok((id, mesh))
    }

    pub fn get(&self, id: AssetId) -> Option<&Arc<IndexedMesh>> {
        self.meshes.get(&id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Arc<IndexedMesh>> {
        self.names.get(name).and_then(|id| self.meshes.get(id))
    }

    /// Number of distinct meshes held.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

fn content_hash(source: &str) -> AssetId {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[..8]);
    AssetId(u64::from_le_bytes(bytes))
}
