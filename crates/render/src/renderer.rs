use glam::{Mat3, Mat4, Vec3, Vec4};
use tidewater_assets::{ImageData, IndexedMesh, ProgramKind};
use tidewater_common::{
    GpuMeshHandle, ProgramHandle, ResourceError, SurfaceHandle, TextureHandle,
};

/// Source of one GPU program. Vertex and fragment stages are linked into a
/// single program; the fragment stage may use declarations from the vertex
/// stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramSource {
    pub label: &'static str,
    pub kind: ProgramKind,
    pub vertex: &'static str,
    pub fragment: &'static str,
}

/// Which pass a draw belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderPass {
    /// Mirrored camera, drawing into the offscreen reflection target.
    Reflection,
    /// True camera, drawing into the default target.
    Main,
}

/// Per-pass uniforms shared by every draw in the pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub projection: Mat4,
    pub view: Mat4,
    pub camera_position: Vec3,
    /// Fragments with `dot(world_pos, plane) < 0` are discarded. The zero
    /// plane disables clipping.
    pub clip_plane: Vec4,
}

/// Per-draw transform and lighting uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectUniforms {
    pub model: Mat4,
    pub normal_matrix: Mat3,
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub light_position: Vec3,
    pub light_intensity: f32,
}

/// Extra inputs of the water program.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterUniforms {
    pub reflection: TextureHandle,
    pub ripple: TextureHandle,
    pub wave_factor: f32,
    pub wave_strength: f32,
}

/// One draw, fully resolved. Draws read matrices by value so later
/// mutation of the scene cannot affect an issued draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub pass: RenderPass,
    pub mesh: GpuMeshHandle,
    pub program: ProgramHandle,
    pub texture: TextureHandle,
    pub frame: FrameUniforms,
    pub object: ObjectUniforms,
    pub water: Option<WaterUniforms>,
}

/// An offscreen color target and the texture its contents resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffscreenTarget {
    pub surface: SurfaceHandle,
    pub texture: TextureHandle,
    pub width: u32,
    pub height: u32,
}

/// Renderer capability. All backends implement this trait.
///
/// The orchestration never touches the graphics API directly: it compiles
/// programs, uploads resources, switches targets and issues draws through
/// this interface. Binding a target clears it and sets the viewport to the
/// target's size; unbinding returns to the default target and viewport.
pub trait Renderer {
    fn compile(&mut self, program: &ProgramSource) -> Result<ProgramHandle, ResourceError>;

    fn upload_mesh(&mut self, mesh: &IndexedMesh) -> Result<GpuMeshHandle, ResourceError>;

    fn upload_texture(&mut self, image: &ImageData) -> Result<TextureHandle, ResourceError>;

    fn create_offscreen_target(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<OffscreenTarget, ResourceError>;

    /// Start a frame. The default target is cleared.
    fn begin_frame(&mut self) -> Result<(), ResourceError> {
        Ok(())
    }

    fn bind_target(&mut self, surface: SurfaceHandle) -> Result<(), ResourceError>;

    fn unbind_target(&mut self) -> Result<(), ResourceError>;

    fn draw(&mut self, call: &DrawCall) -> Result<(), ResourceError>;

    /// Finish the frame and present it.
    fn end_frame(&mut self) -> Result<(), ResourceError> {
        Ok(())
    }
}
