/// WGSL shader for the instanced sphere grid lit by rectangular area lights.
pub const SCENE_SHADER: &str = r#"
const PI: f32 = 3.14159265;

struct AreaLight {
    // xyz: center, w: intensity
    position: vec4<f32>,
    color: vec4<f32>,
    half_width: vec4<f32>,
    half_height: vec4<f32>,
    normal: vec4<f32>,
};

struct FrameUniforms {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    camera_forward: vec4<f32>,
    fog_color: vec4<f32>,
    // x: near, y: far
    fog_range: vec4<f32>,
    lights: array<AreaLight, 2>,
};

@group(0) @binding(0)
var<uniform> frame: FrameUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
    // x: roughness, y: metalness
    @location(7) material: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
    @location(3) material: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = frame.view_proj * world_pos;
    out.world_position = world_pos.xyz;
    out.world_normal = normalize(world_normal);
    out.color = instance.color;
    out.material = instance.material;
    return out;
}

struct Surface {
    position: vec3<f32>,
    normal: vec3<f32>,
    view_dir: vec3<f32>,
    diffuse: vec3<f32>,
    f0: vec3<f32>,
    alpha: f32,
};

fn d_ggx(alpha: f32, n_dot_h: f32) -> f32 {
    let a2 = alpha * alpha;
    let d = n_dot_h * n_dot_h * (a2 - 1.0) + 1.0;
    return a2 / (PI * d * d);
}

fn v_smith_correlated(alpha: f32, n_dot_l: f32, n_dot_v: f32) -> f32 {
    let a2 = alpha * alpha;
    let gv = n_dot_l * sqrt(a2 + (1.0 - a2) * n_dot_v * n_dot_v);
    let gl = n_dot_v * sqrt(a2 + (1.0 - a2) * n_dot_l * n_dot_l);
    return 0.5 / max(gv + gl, 1e-5);
}

fn f_schlick(f0: vec3<f32>, v_dot_h: f32) -> vec3<f32> {
    return f0 + (vec3<f32>(1.0) - f0) * pow(1.0 - v_dot_h, 5.0);
}

// Representative-point approximation: the closest point on the rectangle
// sets the incident direction, the form factor A*cos_s*cos_l / (pi*d^2 + A)
// stays bounded as d approaches 0. Specular is GGX along the same direction.
fn area_light(light: AreaLight, s: Surface) -> vec3<f32> {
    let hw_len = length(light.half_width.xyz);
    let hh_len = length(light.half_height.xyz);
    if (hw_len <= 0.0 || hh_len <= 0.0) {
        return vec3<f32>(0.0);
    }
    let axis_u = light.half_width.xyz / hw_len;
    let axis_v = light.half_height.xyz / hh_len;
    let center = light.position.xyz;
    let rel = s.position - center;
    let u = clamp(dot(rel, axis_u), -hw_len, hw_len);
    let v = clamp(dot(rel, axis_v), -hh_len, hh_len);
    let closest = center + axis_u * u + axis_v * v;

    let to_light = closest - s.position;
    let d2 = max(dot(to_light, to_light), 1e-4);
    let l = to_light * inverseSqrt(d2);
    let cos_surface = max(dot(s.normal, l), 0.0);
    let cos_light = max(dot(light.normal.xyz, -l), 0.0);
    let area = 4.0 * hw_len * hh_len;
    let form_factor = area * cos_surface * cos_light / (PI * d2 + area);
    let irradiance = light.color.rgb * light.position.w * form_factor;

    let h = normalize(l + s.view_dir);
    let n_dot_v = max(dot(s.normal, s.view_dir), 1e-4);
    let specular = f_schlick(s.f0, max(dot(s.view_dir, h), 0.0))
        * d_ggx(s.alpha, max(dot(s.normal, h), 0.0))
        * v_smith_correlated(s.alpha, cos_surface, n_dot_v);
    return irradiance * (s.diffuse + PI * specular);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let roughness = clamp(in.material.x, 0.0525, 1.0);
    let metalness = clamp(in.material.y, 0.0, 1.0);

    var s: Surface;
    s.position = in.world_position;
    s.normal = normalize(in.world_normal);
    s.view_dir = normalize(frame.camera_position.xyz - in.world_position);
    s.diffuse = in.color.rgb * (1.0 - metalness);
    s.f0 = mix(vec3<f32>(0.04), in.color.rgb, metalness);
    s.alpha = roughness * roughness;

    var lit = vec3<f32>(0.0);
    for (var i = 0u; i < 2u; i = i + 1u) {
        lit = lit + area_light(frame.lights[i], s);
    }

    // View-space depth along the camera axis.
    let depth = dot(in.world_position - frame.camera_position.xyz, frame.camera_forward.xyz);
    let fog = smoothstep(frame.fog_range.x, frame.fog_range.y, depth);
    return vec4<f32>(mix(lit, frame.fog_color.rgb, fog), 1.0);
}
"#;

/// Fullscreen triangle shared by every post-process stage.
pub const FULLSCREEN_VERTEX: &str = r#"
struct FullscreenOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_fullscreen(@builtin(vertex_index) index: u32) -> FullscreenOutput {
    let corner = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    var out: FullscreenOutput;
    out.clip_position = vec4<f32>(corner * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2<f32>(corner.x, 1.0 - corner.y);
    return out;
}
"#;

/// Luminosity high-pass feeding the bloom blur chain.
pub const THRESHOLD_FRAGMENT: &str = r#"
struct ThresholdParams {
    threshold: f32,
    smooth_width: f32,
    _pad0: f32,
    _pad1: f32,
};

@group(0) @binding(0) var source_texture: texture_2d<f32>;
@group(0) @binding(1) var source_sampler: sampler;
@group(0) @binding(2) var<uniform> params: ThresholdParams;

@fragment
fn fs_threshold(in: FullscreenOutput) -> @location(0) vec4<f32> {
    let texel = textureSample(source_texture, source_sampler, in.uv);
    let luma = dot(texel.rgb, vec3<f32>(0.299, 0.587, 0.114));
    let alpha = smoothstep(params.threshold, params.threshold + params.smooth_width, luma);
    return mix(vec4<f32>(0.0), texel, alpha);
}
"#;

/// One direction of the separable Gaussian blur.
pub const BLUR_FRAGMENT: &str = r#"
struct BlurParams {
    direction: vec2<f32>,
    inv_size: vec2<f32>,
    kernel_radius: u32,
    _pad0: u32,
    _pad1: u32,
    _pad2: u32,
    coefficients: array<vec4<f32>, 3>,
};

@group(0) @binding(0) var source_texture: texture_2d<f32>;
@group(0) @binding(1) var source_sampler: sampler;
@group(0) @binding(2) var<uniform> params: BlurParams;

fn coefficient(i: u32) -> f32 {
    return params.coefficients[i / 4u][i % 4u];
}

@fragment
fn fs_blur(in: FullscreenOutput) -> @location(0) vec4<f32> {
    var weight_sum = coefficient(0u);
    var sum = textureSample(source_texture, source_sampler, in.uv).rgb * weight_sum;
    for (var i = 1u; i < params.kernel_radius; i = i + 1u) {
        let w = coefficient(i);
        let offset = params.direction * params.inv_size * f32(i);
        let a = textureSample(source_texture, source_sampler, in.uv + offset).rgb;
        let b = textureSample(source_texture, source_sampler, in.uv - offset).rgb;
        sum = sum + (a + b) * w;
        weight_sum = weight_sum + 2.0 * w;
    }
    return vec4<f32>(sum / weight_sum, 1.0);
}
"#;

/// Adds the weighted blur levels onto the scene and writes the output surface.
pub const COMPOSITE_FRAGMENT: &str = r#"
struct CompositeParams {
    weights: array<vec4<f32>, 2>,
};

@group(0) @binding(0) var scene_texture: texture_2d<f32>;
@group(0) @binding(1) var source_sampler: sampler;
@group(0) @binding(2) var<uniform> params: CompositeParams;
@group(0) @binding(3) var blur_0: texture_2d<f32>;
@group(0) @binding(4) var blur_1: texture_2d<f32>;
@group(0) @binding(5) var blur_2: texture_2d<f32>;
@group(0) @binding(6) var blur_3: texture_2d<f32>;
@group(0) @binding(7) var blur_4: texture_2d<f32>;

@fragment
fn fs_composite(in: FullscreenOutput) -> @location(0) vec4<f32> {
    let w0 = params.weights[0];
    let w1 = params.weights[1];
    let scene = textureSample(scene_texture, source_sampler, in.uv).rgb;
    let bloom = w0.x * textureSample(blur_0, source_sampler, in.uv).rgb
        + w0.y * textureSample(blur_1, source_sampler, in.uv).rgb
        + w0.z * textureSample(blur_2, source_sampler, in.uv).rgb
        + w0.w * textureSample(blur_3, source_sampler, in.uv).rgb
        + w1.x * textureSample(blur_4, source_sampler, in.uv).rgb;
    return vec4<f32>(scene + bloom, 1.0);
}
"#;

/// Join the fullscreen vertex stage with one post-process fragment stage.
pub fn post_shader(fragment: &str) -> String {
    format!("{FULLSCREEN_VERTEX}\n{fragment}")
}
