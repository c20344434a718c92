//! WGSL programs for lit geometry, the water surface and the sky.
//!
//! All programs share one resource layout: group 0 holds frame uniforms,
//! group 1 object uniforms, group 2 two textures and a repeating sampler.
//! Lit geometry and water also share one vertex stage.

use tidewater_assets::ProgramKind;

use crate::renderer::ProgramSource;

macro_rules! shared_declarations {
    () => {
        r#"
struct Frame {
    projection: mat4x4<f32>,
    view: mat4x4<f32>,
    camera_position: vec4<f32>,
    clip_plane: vec4<f32>,
};

struct Object {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    // xyz position, w intensity
    light: vec4<f32>,
    // x wave factor, y distortion strength
    water: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: Frame;

@group(1) @binding(0)
var<uniform> object: Object;

@group(2) @binding(0)
var primary_texture: texture_2d<f32>;
@group(2) @binding(1)
var secondary_texture: texture_2d<f32>;
@group(2) @binding(2)
var texture_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};
"#
    };
}

pub const SCENE_VERTEX: &str = concat!(
    shared_declarations!(),
    r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) clip_space: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world = object.model * vec4<f32>(vertex.position, 1.0);
    let clip = frame.projection * frame.view * world;

    var out: VertexOutput;
    out.clip_position = clip;
    out.world_position = world.xyz;
    out.normal = (object.normal_matrix * vec4<f32>(vertex.normal, 0.0)).xyz;
    out.uv = vertex.uv;
    out.clip_space = clip;
    return out;
}
"#
);

/// Expands the unit quad to the whole screen at the far plane and hands
/// the fragment stage a world-space view ray.
pub const SKY_VERTEX: &str = concat!(
    shared_declarations!(),
    r#"
struct SkyOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) eye_direction: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> SkyOutput {
    let ndc = vertex.position.xy * 2.0;
    let view_ray = vec3<f32>(
        ndc.x / frame.projection[0][0],
        ndc.y / frame.projection[1][1],
        -1.0,
    );
    let rotation = mat3x3<f32>(frame.view[0].xyz, frame.view[1].xyz, frame.view[2].xyz);

    var out: SkyOutput;
    out.clip_position = vec4<f32>(ndc, 1.0, 1.0);
    out.eye_direction = transpose(rotation) * view_ray;
    return out;
}
"#
);

pub const SKY_FRAGMENT: &str = r#"
@fragment
fn fs_main(in: SkyOutput) -> @location(0) vec4<f32> {
    let direction = normalize(in.eye_direction);
    let up = sqrt(clamp(direction.y, 0.0, 1.0));
    let down = clamp(-direction.y, 0.0, 1.0);
    let color = mix(object.diffuse, object.ambient, up) * (1.0 - 0.5 * down);
    return vec4<f32>(color.rgb, 1.0);
}
"#;

pub const LIT_FRAGMENT: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let base = textureSample(primary_texture, texture_sampler, in.uv);
    if dot(vec4<f32>(in.world_position, 1.0), frame.clip_plane) < 0.0 {
        discard;
    }

    var normal = in.normal;
    let normal_length = length(normal);
    if normal_length > 0.0 {
        normal = normal / normal_length;
    }
    let to_light = object.light.xyz - in.world_position;
    let distance = max(length(to_light), 0.0001);
    let lambert = max(dot(normal, to_light / distance), 0.0);
    let attenuation = clamp(10.0 / distance, 0.0, 1.0);

    let color = object.ambient * base
        + base * lambert * object.diffuse * attenuation * object.light.w;
    return vec4<f32>(color.rgb, 1.0);
}
"#;

pub const WATER_FRAGMENT: &str = r#"
const RIPPLE_TILING: f32 = 18.0;
const WATER_TINT: vec4<f32> = vec4<f32>(0.0, 0.3, 0.5, 1.0);

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let wave = object.water.x;
    let strength = object.water.y;
    let uv = in.uv * RIPPLE_TILING;

    var distortion = (textureSample(secondary_texture, texture_sampler, vec2<f32>(uv.x + wave, uv.y)).rg * 2.0 - 1.0) * strength;
    distortion += (textureSample(secondary_texture, texture_sampler, vec2<f32>(-uv.x + wave, uv.y + wave)).rg * 2.0 - 1.0) * strength;

    // The mirrored pass rendered the scene upside down relative to this
    // fragment, so screen Y maps straight onto texture V.
    let ndc = in.clip_space.xy / in.clip_space.w;
    let coords = clamp(ndc * 0.5 + 0.5 + distortion, vec2<f32>(0.001), vec2<f32>(0.999));
    let reflection = textureSample(primary_texture, texture_sampler, coords);

    return mix(reflection, WATER_TINT, 0.4);
}
"#;

pub const LIT_PROGRAM: ProgramSource = ProgramSource {
    label: "lit",
    kind: ProgramKind::Lit,
    vertex: SCENE_VERTEX,
    fragment: LIT_FRAGMENT,
};

pub const WATER_PROGRAM: ProgramSource = ProgramSource {
    label: "water",
    kind: ProgramKind::Water,
    vertex: SCENE_VERTEX,
    fragment: WATER_FRAGMENT,
};

pub const SKY_PROGRAM: ProgramSource = ProgramSource {
    label: "sky",
    kind: ProgramKind::Sky,
    vertex: SKY_VERTEX,
    fragment: SKY_FRAGMENT,
};

/// Distortion strength applied to ripple lookups.
pub const WAVE_STRENGTH: f32 = 0.004;

pub fn program_for(kind: ProgramKind) -> &'static ProgramSource {
    match kind {
        ProgramKind::Lit => &LIT_PROGRAM,
        ProgramKind::Water => &WATER_PROGRAM,
        ProgramKind::Sky => &SKY_PROGRAM,
    }
}
