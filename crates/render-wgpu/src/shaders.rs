/// Shared scene uniforms, bound at group 0 by both pipelines.
const GLOBALS: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    camera_right: vec4<f32>,
    camera_up: vec4<f32>,
    // Unit vector pointing toward the light.
    light_dir: vec4<f32>,
    light_color: vec4<f32>,
    ambient: vec4<f32>,
    fog_color: vec4<f32>,
    // x: near, y: far
    fog_range: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

fn apply_fog(color: vec3<f32>, world_pos: vec3<f32>) -> vec3<f32> {
    let dist = distance(world_pos, globals.camera_pos.xyz);
    let f = clamp(
        (dist - globals.fog_range.x) / (globals.fog_range.y - globals.fog_range.x),
        0.0,
        1.0,
    );
    return mix(color, globals.fog_color.rgb, f);
}
"#;

const MESH: &str = r#"
struct MeshUniforms {
    model: mat4x4<f32>,
    color: vec4<f32>,
};

@group(1) @binding(0)
var<uniform> mesh: MeshUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
};

@vertex
fn vs_mesh(vertex: VertexInput) -> VertexOutput {
    let world = mesh.model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = globals.view_proj * world;
    out.world_pos = world.xyz;
    out.world_normal = (mesh.model * vec4<f32>(vertex.normal, 0.0)).xyz;
    return out;
}

@fragment
fn fs_mesh(in: VertexOutput, @builtin(front_facing) front: bool) -> @location(0) vec4<f32> {
    var n = normalize(in.world_normal);
    if (!front) {
        n = -n;
    }
    let diffuse = max(dot(n, globals.light_dir.xyz), 0.0);
    let lit = mesh.color.rgb * (globals.ambient.rgb + globals.light_color.rgb * diffuse);
    return vec4<f32>(apply_fog(lit, in.world_pos), mesh.color.a);
}
"#;

const POINTS: &str = r#"
struct PointUniforms {
    model: mat4x4<f32>,
    color: vec4<f32>,
    // x: sprite size in world units
    size: vec4<f32>,
};

@group(1) @binding(0)
var<uniform> points: PointUniforms;

struct PointOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
};

@vertex
fn vs_points(@builtin(vertex_index) index: u32, @location(0) center: vec3<f32>) -> PointOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-0.5, -0.5),
        vec2<f32>( 0.5, -0.5),
        vec2<f32>( 0.5,  0.5),
        vec2<f32>(-0.5, -0.5),
        vec2<f32>( 0.5,  0.5),
        vec2<f32>(-0.5,  0.5),
    );
    let corner = corners[index];
    let world_center = (points.model * vec4<f32>(center, 1.0)).xyz;
    let offset = globals.camera_right.xyz * corner.x + globals.camera_up.xyz * corner.y;
    let world = world_center + offset * points.size.x;

    var out: PointOutput;
    out.clip_position = globals.view_proj * vec4<f32>(world, 1.0);
    out.world_pos = world;
    return out;
}

@fragment
fn fs_points(in: PointOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(apply_fog(points.color.rgb, in.world_pos), points.color.a);
}
"#;

pub fn mesh_shader() -> String {
    format!("{GLOBALS}{MESH}")
}

pub fn points_shader() -> String {
    format!("{GLOBALS}{POINTS}")
}
