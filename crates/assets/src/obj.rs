//! Wavefront OBJ ingestion.
//!
//! Only three record types are read: `v` (position), `vt` (texture
//! coordinate) and `f` (face). Everything else, including `vn`, is skipped;
//! normals are always recomputed by smoothing face normals over shared
//! vertices.
//!
//! # Invariants
//! - A face lists exactly 3 or 4 vertex references. Quads are split as a
//!   fan `[0,1,2]`, `[0,2,3]` so both triangles share the `0-2` diagonal.
//! - Two references with the same [`VertexKey`] resolve to the same unique
//!   vertex, wherever they appear in the file.
//! - Any structural error aborts the whole mesh; no partial mesh is returned.

use std::collections::HashMap;

use glam::{Vec2, Vec3};

use crate::mesh::{IndexedMesh, Vertex};

/// Slot order used to fan-triangulate a four-reference face.
const QUAD_FAN: [usize; 6] = [0, 1, 2, 0, 2, 3];

/// A structural problem in mesh source text, with the 1-based line it was found on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("line {line}: {kind}")]
pub struct MeshFormatError {
    pub line: usize,
    pub kind: MeshFormatErrorKind,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshFormatErrorKind {
    #[error("face has {0} vertex references, only 3 or 4 are supported")]
    UnsupportedFaceArity(usize),
    #[error("{table} index {index} is out of range ({len} records defined)")]
    IndexOutOfRange {
        table: &'static str,
        index: i64,
        len: usize,
    },
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
    #[error("expected at least {expected} numeric fields, found {found}")]
    MissingField { expected: usize, found: usize },
    #[error("malformed vertex reference {0:?}")]
    MalformedReference(String),
}

/// Identity of a face vertex reference: zero-based position index plus the
/// optional texcoord and normal sub-indices exactly as they were written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexKey {
    pub position: usize,
    pub texcoord: Option<usize>,
    pub normal: Option<usize>,
}

/// Source records read so far. Dropped once the mesh is built.
#[derive(Debug, Default)]
struct RawVertexTable {
    positions: Vec<Vec3>,
    texcoords: Vec<Vec2>,
}

/// Builds an [`IndexedMesh`] from OBJ text.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    raw: RawVertexTable,
    cache: HashMap<VertexKey, u32>,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `source` and produce the deduplicated, normal-smoothed mesh.
    pub fn build(mut self, source: &str) -> Result<IndexedMesh, MeshFormatError> {
        let _span = tracing::debug_span!("mesh_build").entered();

        for (n, raw_line) in source.lines().enumerate() {
            let line = n + 1;
            let mut fields = raw_line.split_whitespace();
            match fields.next() {
                Some("v") => {
                    let [x, y, z]: [f32; 3] = parse_floats(fields, line)?;
                    self.raw.positions.push(Vec3::new(x, y, z));
                }
                Some("vt") => {
                    let [u, v]: [f32; 2] = parse_floats(fields, line)?;
                    self.raw.texcoords.push(Vec2::new(u, 1.0 - v));
                }
                Some("f") => self.face(fields, line)?,
                _ => {}
            }
        }

        let degenerate = smooth_normals(&mut self.vertices, &self.indices);
        tracing::debug!(
            vertices = self.vertices.len(),
            indices = self.indices.len(),
            positions = self.raw.positions.len(),
            texcoords = self.raw.texcoords.len(),
            degenerate,
            "mesh built"
        );

        Ok(IndexedMesh::from_parts(self.vertices, self.indices))
    }

    fn face<'a>(
        &mut self,
        fields: impl Iterator<Item = &'a str>,
        line: usize,
    ) -> Result<(), MeshFormatError> {
        let keys = fields
            .map(|token| self.parse_reference(token, line))
            .collect::<Result<Vec<_>, _>>()?;

        let slots: &[usize] = match keys.len() {
            3 => &QUAD_FAN[..3],
            4 => &QUAD_FAN,
            n => {
                return Err(MeshFormatError {
                    line,
                    kind: MeshFormatErrorKind::UnsupportedFaceArity(n),
                });
            }
        };

        // Assign unique vertices in listed order before emitting triangles.
        let mut resolved = [0u32; 4];
        for (slot, key) in keys.iter().enumerate() {
            resolved[slot] = self.resolve(*key);
        }
        self.indices.extend(slots.iter().map(|&s| resolved[s]));
        Ok(())
    }

    /// Look up a vertex reference in the cache, appending a new unique
    /// vertex on a miss. The key must already be range-checked.
    fn resolve(&mut self, key: VertexKey) -> u32 {
        if let Some(&index) = self.cache.get(&key) {
            return index;
        }
        let index = self.vertices.len() as u32;
        self.vertices.push(Vertex {
            position: self.raw.positions[key.position],
            normal: Vec3::ZERO,
            texcoord: key.texcoord.map(|t| self.raw.texcoords[t]),
        });
        self.cache.insert(key, index);
        index
    }

    fn parse_reference(&self, token: &str, line: usize) -> Result<VertexKey, MeshFormatError> {
        let malformed = || MeshFormatError {
            line,
            kind: MeshFormatErrorKind::MalformedReference(token.to_string()),
        };

        let mut parts = token.split('/');
        let position = parts.next().filter(|p| !p.is_empty()).ok_or_else(malformed)?;
        let texcoord = parts.next().filter(|p| !p.is_empty());
        let normal = parts.next().filter(|p| !p.is_empty());
        if parts.next().is_some() {
            return Err(malformed());
        }

        let position = parse_index(position, "position", self.raw.positions.len(), line)?;
        let texcoord = texcoord
            .map(|t| parse_index(t, "texcoord", self.raw.texcoords.len(), line))
            .transpose()?;
        // Normal records are never stored, so only the syntax is checked.
        let normal = normal
            .map(|n| parse_index(n, "normal", usize::MAX, line))
            .transpose()?;

        Ok(VertexKey {
            position,
            texcoord,
            normal,
        })
    }
}

/// Parse a 1-based OBJ index and convert it to a zero-based index into a
/// table of `len` records.
fn parse_index(
    text: &str,
    table: &'static str,
    len: usize,
    line: usize,
) -> Result<usize, MeshFormatError> {
    let index: i64 = text.parse().map_err(|_| MeshFormatError {
        line,
        kind: MeshFormatErrorKind::InvalidNumber(text.to_string()),
    })?;
    if index < 1 || (index as u64) > len as u64 {
        return Err(MeshFormatError {
            line,
            kind: MeshFormatErrorKind::IndexOutOfRange { table, index, len },
        });
    }
    Ok((index - 1) as usize)
}

/// Read the first `N` numeric fields. Extra fields are ignored.
fn parse_floats<'a, const N: usize>(
    fields: impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<[f32; N], MeshFormatError> {
    let mut out = [0.0f32; N];
    let mut found = 0;
    for field in fields.take(N) {
        out[found] = field.parse().map_err(|_| MeshFormatError {
            line,
            kind: MeshFormatErrorKind::InvalidNumber(field.to_string()),
        })?;
        found += 1;
    }
    if found < N {
        return Err(MeshFormatError {
            line,
            kind: MeshFormatErrorKind::MissingField { expected: N, found },
        });
    }
    Ok(out)
}

/// Accumulate each triangle's unit face normal `(v1-v0) x (v2-v0)` into its
/// three vertices, then normalize once per vertex. Not area or angle
/// weighted. Zero accumulators stay zero. Returns how many did.
fn smooth_normals(vertices: &mut [Vertex], indices: &[u32]) -> usize {
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let p0 = vertices[a].position;
        let face = (vertices[b].position - p0)
            .cross(vertices[c].position - p0)
            .normalize_or_zero();
        vertices[a].normal += face;
        vertices[b].normal += face;
        vertices[c].normal += face;
    }

    let mut degenerate = 0;
    for v in vertices.iter_mut() {
        let len = v.normal.length();
        if len == 0.0 {
            degenerate += 1;
        } else {
            v.normal /= len;
        }
    }
    degenerate
}
