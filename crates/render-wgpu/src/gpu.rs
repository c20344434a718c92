use crate::layout::{self, FrameRaw, GpuVertex, ObjectRaw, UniformArena};
use std::collections::{BTreeMap, BTreeSet};
use std::num::NonZeroU64;
use tidewater_assets::{ColorSpace, ImageData, IndexedMesh};
use tidewater_common::{
    GpuMeshHandle, ProgramHandle, ResourceError, SurfaceHandle, TextureHandle,
};
use tidewater_render::{DrawCall, FrameUniforms, OffscreenTarget, ProgramSource, Renderer};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const DEPTH_CLEAR: f32 = 1.0;
/// The sky is rasterized at exactly the cleared depth.
const DEPTH_COMPARE: wgpu::CompareFunction = wgpu::CompareFunction::LessEqual;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.05,
    g: 0.08,
    b: 0.12,
    a: 1.0,
};

struct GpuMesh {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

/// Colour lives in `textures` under `texture` so water draws can sample it.
struct GpuTarget {
    depth: wgpu::TextureView,
    texture: TextureHandle,
}

/// A dynamic-offset uniform buffer with its bind group. Grown on demand.
struct UniformSlab {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: u64,
}

impl UniformSlab {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        capacity: u64,
        binding_size: u64,
    ) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(binding_size),
                }),
            }],
        });
        Self {
            buffer,
            bind_group,
            capacity,
        }
    }
}

struct PreparedDraw {
    mesh: GpuMeshHandle,
    program: ProgramHandle,
    frame_offset: u32,
    object_offset: u32,
    textures: (TextureHandle, TextureHandle),
}

/// Draws recorded against one target between binds.
struct Segment {
    target: Option<SurfaceHandle>,
    draws: Vec<PreparedDraw>,
}

/// wgpu implementation of the [`Renderer`] capability.
///
/// `None` as a segment target means the output view set with
/// [`WgpuRenderer::set_output`], normally the swapchain image.
pub struct WgpuRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    frame_layout: wgpu::BindGroupLayout,
    object_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    sampler: wgpu::Sampler,
    frame_slab: UniformSlab,
    object_slab: UniformSlab,
    frame_arena: UniformArena,
    object_arena: UniformArena,
    pipelines: BTreeMap<ProgramHandle, wgpu::RenderPipeline>,
    meshes: BTreeMap<GpuMeshHandle, GpuMesh>,
    textures: BTreeMap<TextureHandle, wgpu::TextureView>,
    targets: BTreeMap<SurfaceHandle, GpuTarget>,
    texture_groups: BTreeMap<(TextureHandle, TextureHandle), wgpu::BindGroup>,
    blank: TextureHandle,
    depth: wgpu::TextureView,
    output: Option<wgpu::TextureView>,
    segments: Vec<Segment>,
    last_frame: Option<(FrameUniforms, u32)>,
    next_id: u64,
}

impl WgpuRenderer {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let frame_size = std::mem::size_of::<FrameRaw>() as u64;
        let object_size = std::mem::size_of::<ObjectRaw>() as u64;

        let frame_layout = uniform_layout(&device, "frame_layout", frame_size);
        let object_layout = uniform_layout(&device, "object_layout", object_size);

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &object_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("repeat_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let frame_arena = UniformArena::new::<FrameRaw>(alignment);
        let object_arena = UniformArena::new::<ObjectRaw>(alignment);
        let frame_slab = UniformSlab::new(
            &device,
            &frame_layout,
            "frame_uniforms",
            frame_arena.stride() * 4,
            frame_size,
        );
        let object_slab = UniformSlab::new(
            &device,
            &object_layout,
            "object_uniforms",
            object_arena.stride() * 64,
            object_size,
        );

        let depth = create_depth_texture(&device, width, height);

        let mut renderer = Self {
            device,
            queue,
            surface_format,
            frame_layout,
            object_layout,
            texture_layout,
            pipeline_layout,
            sampler,
            frame_slab,
            object_slab,
            frame_arena,
            object_arena,
            pipelines: BTreeMap::new(),
            meshes: BTreeMap::new(),
            textures: BTreeMap::new(),
            targets: BTreeMap::new(),
            texture_groups: BTreeMap::new(),
            blank: TextureHandle(0),
            depth,
            output: None,
            segments: Vec::new(),
            last_frame: None,
            next_id: 1,
        };
        // Bound to the secondary slot of draws that sample one texture.
        let blank = renderer.create_texture(1, 1, wgpu::TextureFormat::Rgba8Unorm, &[255; 4]);
        renderer.blank = blank;
        renderer
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Set the view that unbound draws land on for the next frame.
    pub fn set_output(&mut self, view: wgpu::TextureView) {
        self.output = Some(view);
    }

    pub fn output(&self) -> Option<&wgpu::TextureView> {
        self.output.as_ref()
    }

    pub fn take_output(&mut self) -> Option<wgpu::TextureView> {
        self.output.take()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.depth = create_depth_texture(&self.device, width, height);
    }

    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        rgba: &[u8],
    ) -> TextureHandle {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("material_texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let handle = TextureHandle(self.allocate());
        self.textures
            .insert(handle, texture.create_view(&Default::default()));
        handle
    }

    fn current_segment(&mut self) -> Result<&mut Segment, ResourceError> {
        self.segments
            .last_mut()
            .ok_or_else(|| ResourceError::Gpu("draw issued outside begin_frame/end_frame".into()))
    }

    fn frame_offset(&mut self, frame: &FrameUniforms) -> u32 {
        if let Some((last, offset)) = &self.last_frame {
            if last == frame {
                return *offset;
            }
        }
        let offset = self.frame_arena.push(&FrameRaw::from(frame));
        self.last_frame = Some((*frame, offset));
        offset
    }

    fn ensure_capacity(&mut self) {
        let needed = self.frame_arena.bytes().len() as u64;
        if needed > self.frame_slab.capacity {
            self.frame_slab = UniformSlab::new(
                &self.device,
                &self.frame_layout,
                "frame_uniforms",
                needed.next_power_of_two(),
                std::mem::size_of::<FrameRaw>() as u64,
            );
        }
        let needed = self.object_arena.bytes().len() as u64;
        if needed > self.object_slab.capacity {
            tracing::debug!(bytes = needed, "growing object uniform buffer");
            self.object_slab = UniformSlab::new(
                &self.device,
                &self.object_layout,
                "object_uniforms",
                needed.next_power_of_two(),
                std::mem::size_of::<ObjectRaw>() as u64,
            );
        }
    }

    fn ensure_texture_groups(&mut self) -> Result<(), ResourceError> {
        let pairs: BTreeSet<(TextureHandle, TextureHandle)> = self
            .segments
            .iter()
            .flat_map(|s| s.draws.iter().map(|d| d.textures))
            .filter(|pair| !self.texture_groups.contains_key(pair))
            .collect();
        for (primary, secondary) in pairs {
            let primary_view = texture_view(&self.textures, primary)?;
            let secondary_view = texture_view(&self.textures, secondary)?;
            let group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("texture_group"),
                layout: &self.texture_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(primary_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(secondary_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            });
            self.texture_groups.insert((primary, secondary), group);
        }
        Ok(())
    }

    fn reset_frame(&mut self) {
        self.segments.clear();
        self.frame_arena.clear();
        self.object_arena.clear();
        self.last_frame = None;
    }

    fn encode(&self) -> Result<wgpu::CommandBuffer, ResourceError> {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
        let mut cleared = BTreeSet::new();

        for segment in &self.segments {
            let (color, depth) = match segment.target {
                None => {
                    let output = self.output.as_ref().ok_or_else(|| {
                        ResourceError::Gpu("no output view set for the main pass".into())
                    })?;
                    (output, &self.depth)
                }
                Some(surface) => {
                    let target = self.targets.get(&surface).ok_or(ResourceError::UnknownHandle {
                        kind: "surface",
                        id: surface.0,
                    })?;
                    (texture_view(&self.textures, target.texture)?, &target.depth)
                }
            };
            let first_use = cleared.insert(segment.target);
            if !first_use && segment.draws.is_empty() {
                continue;
            }
            let (color_load, depth_load) = if first_use {
                (wgpu::LoadOp::Clear(CLEAR_COLOR), wgpu::LoadOp::Clear(DEPTH_CLEAR))
            } else {
                (wgpu::LoadOp::Load, wgpu::LoadOp::Load)
            };

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(if segment.target.is_some() {
                    "reflection_pass"
                } else {
                    "main_pass"
                }),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            for draw in &segment.draws {
                let (Some(pipeline), Some(mesh), Some(textures)) = (
                    self.pipelines.get(&draw.program),
                    self.meshes.get(&draw.mesh),
                    self.texture_groups.get(&draw.textures),
                ) else {
                    continue;
                };
                if mesh.index_count == 0 {
                    continue;
                }
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &self.frame_slab.bind_group, &[draw.frame_offset]);
                pass.set_bind_group(1, &self.object_slab.bind_group, &[draw.object_offset]);
                pass.set_bind_group(2, textures, &[]);
                pass.set_vertex_buffer(0, mesh.vertices.slice(..));
                pass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        Ok(encoder.finish())
    }
}

impl Renderer for WgpuRenderer {
    fn compile(&mut self, program: &ProgramSource) -> Result<ProgramHandle, ResourceError> {
        // Both stages live in one module; the fragment stage reads the
        // vertex stage's declarations.
        let source = format!("{}\n{}", program.vertex, program.fragment);

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(program.label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(program.label),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[GpuVertex::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: DEPTH_COMPARE,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(ResourceError::ProgramCompile {
                label: program.label.to_string(),
                reason: error.to_string(),
            });
        }

        let handle = ProgramHandle(self.allocate());
        self.pipelines.insert(handle, pipeline);
        tracing::debug!(label = program.label, id = handle.0, "program compiled");
        Ok(handle)
    }

    fn upload_mesh(&mut self, mesh: &IndexedMesh) -> Result<GpuMeshHandle, ResourceError> {
        let vertices = layout::interleave(mesh);
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_indices"),
                contents: bytemuck::cast_slice(mesh.indices()),
                usage: wgpu::BufferUsages::INDEX,
            });
        let index_count = u32::try_from(mesh.indices().len())
            .map_err(|_| ResourceError::Gpu("mesh index count exceeds u32".into()))?;

        let handle = GpuMeshHandle(self.allocate());
        self.meshes.insert(
            handle,
            GpuMesh {
                vertices: vertex_buffer,
                indices: index_buffer,
                index_count,
            },
        );
        Ok(handle)
    }

    fn upload_texture(&mut self, image: &ImageData) -> Result<TextureHandle, ResourceError> {
        let expected = image.width as usize * image.height as usize * 4;
        if image.width == 0 || image.height == 0 || image.rgba.len() != expected {
            return Err(ResourceError::Gpu(format!(
                "texture {}x{} carries {} bytes, expected {expected}",
                image.width,
                image.height,
                image.rgba.len()
            )));
        }
        let format = match image.color_space {
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
        };
        Ok(self.create_texture(image.width, image.height, format, &image.rgba))
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
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("reflection_target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.surface_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let color = texture.create_view(&Default::default());

        let texture_handle = TextureHandle(self.allocate());
        let surface = SurfaceHandle(self.allocate());
        self.textures.insert(texture_handle, color);
        self.targets.insert(
            surface,
            GpuTarget {
                depth: create_depth_texture(&self.device, width, height),
                texture: texture_handle,
            },
        );
        tracing::info!(width, height, surface = surface.0, "offscreen target created");

        Ok(OffscreenTarget {
            surface,
            texture: texture_handle,
            width,
            height,
        })
    }

    fn begin_frame(&mut self) -> Result<(), ResourceError> {
        self.reset_frame();
        self.segments.push(Segment {
            target: None,
            draws: Vec::new(),
        });
        Ok(())
    }

    fn bind_target(&mut self, surface: SurfaceHandle) -> Result<(), ResourceError> {
        if !self.targets.contains_key(&surface) {
            return Err(ResourceError::UnknownHandle {
                kind: "surface",
                id: surface.0,
            });
        }
        self.segments.push(Segment {
            target: Some(surface),
            draws: Vec::new(),
        });
        Ok(())
    }

    fn unbind_target(&mut self) -> Result<(), ResourceError> {
        self.segments.push(Segment {
            target: None,
            draws: Vec::new(),
        });
        Ok(())
    }

    fn draw(&mut self, call: &DrawCall) -> Result<(), ResourceError> {
        if !self.meshes.contains_key(&call.mesh) {
            return Err(ResourceError::UnknownHandle {
                kind: "mesh",
                id: call.mesh.0,
            });
        }
        if !self.pipelines.contains_key(&call.program) {
            return Err(ResourceError::UnknownHandle {
                kind: "program",
                id: call.program.0,
            });
        }
        let textures = match &call.water {
            Some(water) => (water.reflection, water.ripple),
            None => (call.texture, self.blank),
        };
        for texture in [textures.0, textures.1] {
            texture_view(&self.textures, texture)?;
        }

        let bound = self.current_segment()?.target;
        if let Some(target) = bound.and_then(|s| self.targets.get(&s)) {
            if target.texture == textures.0 || target.texture == textures.1 {
                return Err(ResourceError::Gpu(format!(
                    "texture {} sampled while its target is bound",
                    target.texture.0
                )));
            }
        }

        let frame_offset = self.frame_offset(&call.frame);
        let object_offset = self
            .object_arena
            .push(&ObjectRaw::new(&call.object, call.water.as_ref()));
        self.current_segment()?.draws.push(PreparedDraw {
            mesh: call.mesh,
            program: call.program,
            frame_offset,
            object_offset,
            textures,
        });
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), ResourceError> {
        if self.segments.is_empty() {
            return Ok(());
        }
        self.ensure_capacity();
        self.ensure_texture_groups()?;
        self.queue
            .write_buffer(&self.frame_slab.buffer, 0, self.frame_arena.bytes());
        self.queue
            .write_buffer(&self.object_slab.buffer, 0, self.object_arena.bytes());

        let result = self.encode();
        let draws: usize = self.segments.iter().map(|s| s.draws.len()).sum();
        self.reset_frame();
        let commands = result?;
        self.queue.submit(std::iter::once(commands));
        tracing::trace!(draws, "frame submitted");
        Ok(())
    }
}

fn texture_view(
    textures: &BTreeMap<TextureHandle, wgpu::TextureView>,
    handle: TextureHandle,
) -> Result<&wgpu::TextureView, ResourceError> {
    textures.get(&handle).ok_or(ResourceError::UnknownHandle {
        kind: "texture",
        id: handle.0,
    })
}

fn uniform_layout(device: &wgpu::Device, label: &str, binding_size: u64) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: NonZeroU64::new(binding_size),
            },
            count: None,
        }],
    })
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}
