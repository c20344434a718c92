use glam::{Vec2, Vec3};

/// One unique vertex of an [`IndexedMesh`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    /// Smoothed normal. Unit length, or zero when every contributing
    /// triangle was degenerate (or the vertex belongs to no triangle).
    pub normal: Vec3,
    /// Texture coordinate with V already flipped to `1 - v`.
    pub texcoord: Option<Vec2>,
}

/// Deduplicated, indexed triangle mesh.
///
/// Immutable once built. Every index is `< vertex_count()` and the index
/// buffer length is a multiple of three.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndexedMesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl IndexedMesh {
    pub(crate) fn from_parts(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        debug_assert!(indices.len() % 3 == 0);
        debug_assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
        Self { vertices, indices }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// True when at least one vertex carries a texture coordinate. Meshes
    /// without any must not be drawn with a sampled texture.
    pub fn has_texcoords(&self) -> bool {
        self.vertices.iter().any(|v| v.texcoord.is_some())
    }

    /// Number of vertices whose normal collapsed to zero.
    pub fn degenerate_vertex_count(&self) -> usize {
        self.vertices
            .iter()
            .filter(|v| v.normal == Vec3::ZERO)
            .count()
    }

    /// Axis-aligned bounds of all vertex positions.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = self.vertices.first()?.position;
        Some(self.vertices.iter().fold((first, first), |(lo, hi), v| {
            (lo.min(v.position), hi.max(v.position))
        }))
    }
}
