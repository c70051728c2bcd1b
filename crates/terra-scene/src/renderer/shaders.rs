//! WGSL sources. All three share the frame block (group 0) and the node
//! block with its texture slots (group 1).

/// Sphere shader: unlit, lit with bump mapping, or view-dependent rim glow.
///
/// Missing texture slots are bound to a 1×1 white texture, which leaves the
/// base color unchanged, keeps alpha at 1, and yields a flat height field.
pub const MESH_SHADER_SOURCE: &str = r#"
struct Lights {
    point_position_range: vec4<f32>,
    point_color_intensity: vec4<f32>,
    sun_direction_intensity: vec4<f32>,
    sun_color_ambient: vec4<f32>,
};

struct Frame {
    view_proj: mat4x4<f32>,
    view: mat4x4<f32>,
    camera_position: vec4<f32>,
    lights: Lights,
};

struct Node {
    model: mat4x4<f32>,
    color_opacity: vec4<f32>,
    // x = bump scale, y = point size
    params: vec4<f32>,
    // x = shading mode: 0 unlit, 1 lit, 2 rim
    mode: vec4<u32>,
};

@group(0) @binding(0) var<uniform> frame: Frame;

@group(1) @binding(0) var<uniform> node: Node;
@group(1) @binding(1) var map_sampler: sampler;
@group(1) @binding(2) var color_map: texture_2d<f32>;
@group(1) @binding(3) var bump_map: texture_2d<f32>;
@group(1) @binding(4) var alpha_map: texture_2d<f32>;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_mesh(in: VertexInput) -> VertexOutput {
    let world = node.model * vec4<f32>(in.position, 1.0);
    var out: VertexOutput;
    out.clip_position = frame.view_proj * world;
    out.world_position = world.xyz;
    out.normal = (node.model * vec4<f32>(in.normal, 0.0)).xyz;
    out.uv = in.uv;
    return out;
}

// Screen-space derivative bump mapping (Mikkelsen 2010).
fn perturb_normal(position: vec3<f32>, normal: vec3<f32>, uv: vec2<f32>, scale: f32) -> vec3<f32> {
    let duv_dx = dpdx(uv);
    let duv_dy = dpdy(uv);
    let h = textureSample(bump_map, map_sampler, uv).r;
    let db_dx = scale * (textureSample(bump_map, map_sampler, uv + duv_dx).r - h);
    let db_dy = scale * (textureSample(bump_map, map_sampler, uv + duv_dy).r - h);

    let sigma_x = dpdx(position);
    let sigma_y = dpdy(position);
    let r1 = cross(sigma_y, normal);
    let r2 = cross(normal, sigma_x);
    let det = dot(sigma_x, r1);
    let grad = sign(det) * (db_dx * r1 + db_dy * r2);
    let perturbed = abs(det) * normal - grad;
    if (dot(perturbed, perturbed) < 1e-20) {
        return normal;
    }
    return normalize(perturbed);
}

fn point_attenuation(distance: f32, range: f32) -> f32 {
    if (range <= 0.0) {
        return 1.0;
    }
    if (distance >= range) {
        return 0.0;
    }
    let inv_sq = 1.0 / (distance * distance + 1.0);
    let ratio = distance / range;
    let t = max(1.0 - ratio * ratio, 0.0);
    return inv_sq * t * t;
}

fn direct_light(position: vec3<f32>, normal: vec3<f32>) -> vec3<f32> {
    let lights = frame.lights;

    let to_point = lights.point_position_range.xyz - position;
    let point_distance = length(to_point);
    let point_dir = to_point / max(point_distance, 1e-4);
    let point = lights.point_color_intensity.rgb * lights.point_color_intensity.w
        * point_attenuation(point_distance, lights.point_position_range.w)
        * max(dot(normal, point_dir), 0.0);

    let sun = lights.sun_color_ambient.rgb * lights.sun_direction_intensity.w
        * max(dot(normal, lights.sun_direction_intensity.xyz), 0.0);

    return vec3<f32>(lights.sun_color_ambient.w) + point + sun;
}

@fragment
fn fs_mesh(in: VertexOutput) -> @location(0) vec4<f32> {
    let geometric_normal = normalize(in.normal);
    let texel = textureSample(color_map, map_sampler, in.uv);
    let mask = textureSample(alpha_map, map_sampler, in.uv).g;
    let bumped = perturb_normal(in.world_position, geometric_normal, in.uv, node.params.x);

    let base = node.color_opacity.rgb * texel.rgb;
    let alpha = node.color_opacity.a * texel.a * mask;

    switch node.mode.x {
        case 1u: {
            return vec4<f32>(base * direct_light(in.world_position, bumped), alpha);
        }
        case 2u: {
            // Drawn from the inside: the glow peaks where the shell meets the
            // planet's limb and fades to nothing at the shell's silhouette.
            let view_dir = normalize(frame.camera_position.xyz - in.world_position);
            let facing = clamp(-dot(geometric_normal, view_dir), 0.0, 1.0);
            let glow = smoothstep(0.0, 0.4, facing);
            return vec4<f32>(base * glow, alpha * glow);
        }
        default: {
            return vec4<f32>(base, alpha);
        }
    }
}
"#;

/// Star sprites: one camera-facing quad per instance, textured with the sprite map.
pub const POINTS_SHADER_SOURCE: &str = r#"
struct Lights {
    point_position_range: vec4<f32>,
    point_color_intensity: vec4<f32>,
    sun_direction_intensity: vec4<f32>,
    sun_color_ambient: vec4<f32>,
};

struct Frame {
    view_proj: mat4x4<f32>,
    view: mat4x4<f32>,
    camera_position: vec4<f32>,
    lights: Lights,
};

struct Node {
    model: mat4x4<f32>,
    color_opacity: vec4<f32>,
    params: vec4<f32>,
    mode: vec4<u32>,
};

@group(0) @binding(0) var<uniform> frame: Frame;

@group(1) @binding(0) var<uniform> node: Node;
@group(1) @binding(1) var map_sampler: sampler;
@group(1) @binding(2) var color_map: texture_2d<f32>;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_points(@builtin(vertex_index) vertex_index: u32, @location(0) center: vec3<f32>) -> VertexOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, 1.0),
    );
    let corner = corners[vertex_index];

    // Camera basis vectors are the rows of the view matrix.
    let right = vec3<f32>(frame.view[0][0], frame.view[1][0], frame.view[2][0]);
    let up = vec3<f32>(frame.view[0][1], frame.view[1][1], frame.view[2][1]);

    let world_center = (node.model * vec4<f32>(center, 1.0)).xyz;
    let half_size = node.params.y * 0.5;
    let world = world_center + (right * corner.x + up * corner.y) * half_size;

    var out: VertexOutput;
    out.clip_position = frame.view_proj * vec4<f32>(world, 1.0);
    out.uv = vec2<f32>(corner.x * 0.5 + 0.5, 0.5 - corner.y * 0.5);
    return out;
}

@fragment
fn fs_points(in: VertexOutput) -> @location(0) vec4<f32> {
    let texel = textureSample(color_map, map_sampler, in.uv);
    return vec4<f32>(node.color_opacity.rgb * texel.rgb, node.color_opacity.a * texel.a);
}
"#;

/// Solid-color lines, used for the point-light helper.
pub const LINE_SHADER_SOURCE: &str = r#"
struct Lights {
    point_position_range: vec4<f32>,
    point_color_intensity: vec4<f32>,
    sun_direction_intensity: vec4<f32>,
    sun_color_ambient: vec4<f32>,
};

struct Frame {
    view_proj: mat4x4<f32>,
    view: mat4x4<f32>,
    camera_position: vec4<f32>,
    lights: Lights,
};

struct Node {
    model: mat4x4<f32>,
    color_opacity: vec4<f32>,
    params: vec4<f32>,
    mode: vec4<u32>,
};

@group(0) @binding(0) var<uniform> frame: Frame;
@group(1) @binding(0) var<uniform> node: Node;

@vertex
fn vs_line(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return frame.view_proj * node.model * vec4<f32>(position, 1.0);
}

@fragment
fn fs_line() -> @location(0) vec4<f32> {
    return node.color_opacity;
}
"#;
