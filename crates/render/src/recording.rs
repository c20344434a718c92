use std::collections::BTreeMap;
use std::fmt::Write;

use tidewater_assets::{ImageData, IndexedMesh};
use tidewater_common::{
    GpuMeshHandle, ProgramHandle, ResourceError, SurfaceHandle, TextureHandle,
};

use crate::renderer::{DrawCall, OffscreenTarget, ProgramSource, RenderPass, Renderer};

/// One command received by a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Compile {
        label: &'static str,
        program: ProgramHandle,
    },
    UploadMesh {
        mesh: GpuMeshHandle,
        vertices: usize,
        triangles: usize,
    },
    UploadTexture {
        texture: TextureHandle,
        width: u32,
        height: u32,
    },
    CreateTarget(OffscreenTarget),
    BeginFrame,
    BindTarget(SurfaceHandle),
    UnbindTarget,
    Draw(DrawCall),
    EndFrame,
}

/// Headless renderer that validates and records every command.
///
/// Used by tests and CLI dry runs. Handles are checked the way a real
/// backend would resolve them, so an unknown handle or sampling the target
/// currently being drawn into fails the same way.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    commands: Vec<Command>,
    programs: BTreeMap<ProgramHandle, &'static str>,
    meshes: BTreeMap<GpuMeshHandle, (usize, usize)>,
    textures: BTreeMap<TextureHandle, (u32, u32)>,
    targets: BTreeMap<SurfaceHandle, OffscreenTarget>,
    bound: Option<SurfaceHandle>,
    next_id: u64,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Drain recorded commands, keeping every created resource alive.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn draws(&self) -> impl Iterator<Item = &DrawCall> + '_ {
        self.commands.iter().filter_map(|c| match c {
            Command::Draw(call) => Some(call),
            _ => None,
        })
    }

    pub fn draws_in(&self, pass: RenderPass) -> impl Iterator<Item = &DrawCall> + '_ {
        self.draws().filter(move |d| d.pass == pass)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Human-readable command log, one line per command.
    pub fn log(&self) -> String {
        let mut out = String::new();
        for command in &self.commands {
            let _ = match command {
                Command::Compile { label, program } => {
                    writeln!(out, "compile {label} -> program#{}", program.0)
                }
                Command::UploadMesh {
                    mesh,
                    vertices,
                    triangles,
                } => writeln!(
                    out,
                    "upload mesh#{} ({vertices} vertices, {triangles} triangles)",
                    mesh.0
                ),
                Command::UploadTexture {
                    texture,
                    width,
                    height,
                } => writeln!(out, "upload texture#{} ({width}x{height})", texture.0),
                Command::CreateTarget(t) => writeln!(
                    out,
                    "create target surface#{} texture#{} ({}x{})",
                    t.surface.0, t.texture.0, t.width, t.height
                ),
                Command::BeginFrame => writeln!(out, "begin frame"),
                Command::BindTarget(surface) => writeln!(out, "bind surface#{}", surface.0),
                Command::UnbindTarget => writeln!(out, "unbind"),
                Command::Draw(call) => {
                    let eye = call.frame.camera_position;
                    let p = call.object.model.w_axis;
                    writeln!(
                        out,
                        "  draw {:?} mesh#{} program#{} eye=({:.2}, {:.2}, {:.2}) at=({:.2}, {:.2}, {:.2}){}",
                        call.pass,
                        call.mesh.0,
                        call.program.0,
                        eye.x,
                        eye.y,
                        eye.z,
                        p.x,
                        p.y,
                        p.z,
                        call.water
                            .map(|w| format!(" wave={:.4}", w.wave_factor))
                            .unwrap_or_default()
                    )
                }
                Command::EndFrame => writeln!(out, "end frame"),
            };
        }
        out
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn check_texture(&self, texture: TextureHandle) -> Result<(), ResourceError> {
        if !self.textures.contains_key(&texture) {
            return Err(ResourceError::UnknownHandle {
                kind: "texture",
                id: texture.0,
            });
        }
        let feedback = self
            .bound
            .and_then(|s| self.targets.get(&s))
            .is_some_and(|t| t.texture == texture);
        if feedback {
            return Err(ResourceError::Gpu(format!(
                "texture#{} sampled while its surface is bound",
                texture.0
            )));
        }
        Ok(())
    }
}

impl Renderer for RecordingRenderer {
    fn compile(&mut self, program: &ProgramSource) -> Result<ProgramHandle, ResourceError> {
        if program.vertex.trim().is_empty() || program.fragment.trim().is_empty() {
            return Err(ResourceError::ProgramCompile {
                label: program.label.to_string(),
                reason: "empty stage source".to_string(),
            });
        }
        let handle = ProgramHandle(self.next_id());
        self.programs.insert(handle, program.label);
        self.commands.push(Command::Compile {
            label: program.label,
            program: handle,
        });
        Ok(handle)
    }

    fn upload_mesh(&mut self, mesh: &IndexedMesh) -> Result<GpuMeshHandle, ResourceError> {
        let handle = GpuMeshHandle(self.next_id());
        let counts = (mesh.vertex_count(), mesh.triangle_count());
        self.meshes.insert(handle, counts);
        self.commands.push(Command::UploadMesh {
            mesh: handle,
            vertices: counts.0,
            triangles: counts.1,
        });
        Ok(handle)
    }

    fn upload_texture(&mut self, image: &ImageData) -> Result<TextureHandle, ResourceError> {
        let expected = image.width as usize * image.height as usize * 4;
        if image.width == 0 || image.height == 0 || image.rgba.len() != expected {
            return Err(ResourceError::Gpu(format!(
                "texture data is {} bytes, expected {expected} for {}x{}",
                image.rgba.len(),
                image.width,
                image.height
            )));
        }
        let handle = TextureHandle(self.next_id());
        self.textures.insert(handle, (image.width, image.height));
        self.commands.push(Command::UploadTexture {
            texture: handle,
            width: image.width,
            height: image.height,
        });
        Ok(handle)
    }

    fn create_offscreen_target(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<OffscreenTarget, ResourceError> {
        if width == 0 || height == 0 {
            return Err(ResourceError::Gpu(format!(
                "offscreen target must be non-empty, got {width}x{height}"
            )));
        }
        let target = OffscreenTarget {
            surface: SurfaceHandle(self.next_id()),
            texture: TextureHandle(self.next_id()),
            width,
            height,
        };
        self.targets.insert(target.surface, target);
        self.textures.insert(target.texture, (width, height));
        self.commands.push(Command::CreateTarget(target));
        Ok(target)
    }

    fn begin_frame(&mut self) -> Result<(), ResourceError> {
        self.bound = None;
        self.commands.push(Command::BeginFrame);
        Ok(())
    }

    fn bind_target(&mut self, surface: SurfaceHandle) -> Result<(), ResourceError> {
        if !self.targets.contains_key(&surface) {
            return Err(ResourceError::UnknownHandle {
                kind: "surface",
                id: surface.0,
            });
        }
        self.bound = Some(surface);
        self.commands.push(Command::BindTarget(surface));
        Ok(())
    }

    fn unbind_target(&mut self) -> Result<(), ResourceError> {
        self.bound = None;
        self.commands.push(Command::UnbindTarget);
        Ok(())
    }

    fn draw(&mut self, call: &DrawCall) -> Result<(), ResourceError> {
        if !self.meshes.contains_key(&call.mesh) {
            return Err(ResourceError::UnknownHandle {
                kind: "mesh",
                id: call.mesh.0,
            });
        }
        if !self.programs.contains_key(&call.program) {
            return Err(ResourceError::UnknownHandle {
                kind: "program",
                id: call.program.0,
            });
        }
        self.check_texture(call.texture)?;
        if let Some(water) = &call.water {
            self.check_texture(water.reflection)?;
            self.check_texture(water.ripple)?;
        }
        self.commands.push(Command::Draw(*call));
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), ResourceError> {
        self.commands.push(Command::EndFrame);
        Ok(())
    }
}
