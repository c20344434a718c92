use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4};
use tidewater_assets::IndexedMesh;
use tidewater_render::{FrameUniforms, ObjectUniforms, WaterUniforms};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct GpuVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl GpuVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Interleave a mesh for upload. Missing texture coordinates become zero.
pub(crate) fn interleave(mesh: &IndexedMesh) -> Vec<GpuVertex> {
    mesh.vertices()
        .iter()
        .map(|v| GpuVertex {
            position: v.position.to_array(),
            normal: v.normal.to_array(),
            uv: v.texcoord.unwrap_or_default().to_array(),
        })
        .collect()
}

/// Matches `struct Frame` in the scene vertex stage.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct FrameRaw {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub clip_plane: [f32; 4],
}

impl From<&FrameUniforms> for FrameRaw {
    fn from(f: &FrameUniforms) -> Self {
        Self {
            projection: f.projection.to_cols_array_2d(),
            view: f.view.to_cols_array_2d(),
            camera_position: f.camera_position.extend(1.0).to_array(),
            clip_plane: f.clip_plane.to_array(),
        }
    }
}

/// Matches `struct Object` in the scene vertex stage.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct ObjectRaw {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub light: [f32; 4],
    pub water: [f32; 4],
}

impl ObjectRaw {
    pub fn new(object: &ObjectUniforms, water: Option<&WaterUniforms>) -> Self {
        let water = water.map_or([0.0; 4], |w| [w.wave_factor, w.wave_strength, 0.0, 0.0]);
        Self {
            model: object.model.to_cols_array_2d(),
            normal_matrix: widen(object.normal_matrix).to_cols_array_2d(),
            ambient: object.ambient.to_array(),
            diffuse: object.diffuse.to_array(),
            light: object.light_position.extend(object.light_intensity).to_array(),
            water,
        }
    }
}

/// A 3x3 matrix as the upper-left block of a 4x4. WGSL `mat3x3` has padded
/// columns, so the shader takes a `mat4x4` instead.
fn widen(m: Mat3) -> Mat4 {
    Mat4::from_mat3(m)
}

pub(crate) fn align_to(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

/// CPU staging for one dynamic-offset uniform buffer.
///
/// Every pushed value occupies one aligned slot; the returned offset is
/// what the draw passes as its dynamic offset.
#[derive(Debug)]
pub(crate) struct UniformArena {
    stride: u64,
    data: Vec<u8>,
}

impl UniformArena {
    pub fn new<T: Pod>(alignment: u64) -> Self {
        Self {
            stride: align_to(std::mem::size_of::<T>() as u64, alignment.max(1)),
            data: Vec::new(),
        }
    }

    pub fn push<T: Pod>(&mut self, value: &T) -> u32 {
        let offset = self.data.len();
        self.data.extend_from_slice(bytemuck::bytes_of(value));
        self.data.resize(offset + self.stride as usize, 0);
        offset as u32
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn slots(&self) -> u64 {
        self.data.len() as u64 / self.stride
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};
    use tidewater_assets::MeshBuilder;

    #[test]
    fn uniform_sizes_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<FrameRaw>(), 160);
        assert_eq!(std::mem::size_of::<ObjectRaw>(), 192);
        assert_eq!(std::mem::size_of::<GpuVertex>(), 32);
    }

    #[test]
    fn arena_slots_are_aligned() {
        let mut arena = UniformArena::new::<FrameRaw>(256);
        let frame = FrameRaw::zeroed();
        assert_eq!(arena.push(&frame), 0);
        assert_eq!(arena.push(&frame), 256);
        assert_eq!(arena.slots(), 2);
        assert_eq!(arena.bytes().len(), 512);
        arena.clear();
        assert_eq!(arena.slots(), 0);
    }

    #[test]
    fn align_to_rounds_up() {
        assert_eq!(align_to(160, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(257, 256), 512);
    }

    #[test]
    fn interleave_zeroes_missing_texcoords() {
        let mesh = MeshBuilder::new()
            .build("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n")
            .unwrap();
        let vertices = interleave(&mesh);
        assert_eq!(vertices.len(), 3);
        assert!(vertices.iter().all(|v| v.uv == [0.0, 0.0]));
        assert_eq!(vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(vertices[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn object_packs_light_and_water() {
        let object = ObjectUniforms {
            model: Mat4::from_translation(Vec3::new(5.0, 13.0, 50.0)),
            normal_matrix: Mat3::IDENTITY,
            ambient: Vec4::splat(0.3),
            diffuse: Vec4::ONE,
            light_position: Vec3::new(14.0, 16.0, 41.0),
            light_intensity: 1.25,
        };
        let raw = ObjectRaw::new(&object, None);
        assert_eq!(raw.light, [14.0, 16.0, 41.0, 1.25]);
        assert_eq!(raw.water, [0.0; 4]);
        assert_eq!(raw.model[3], [5.0, 13.0, 50.0, 1.0]);
        assert_eq!(raw.normal_matrix[3], [0.0, 0.0, 0.0, 1.0]);
    }
}
