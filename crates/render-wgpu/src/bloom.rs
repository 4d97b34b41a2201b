use crate::shaders;
use crate::targets::{HDR_FORMAT, create_target};
use bytemuck::{Pod, Zeroable};
use glowgrid_scene::BloomSettings;
use wgpu::util::DeviceExt;

/// Number of blurred mip levels.
pub const BLOOM_MIPS: usize = 5;
const KERNEL_RADII: [u32; BLOOM_MIPS] = [3, 5, 7, 9, 11];
const MIP_FACTORS: [f32; BLOOM_MIPS] = [1.0, 0.8, 0.6, 0.4, 0.2];
const SMOOTH_WIDTH: f32 = 0.01;
const MAX_COEFFICIENTS: usize = 12;

/// Normal distribution density at `x`.
pub fn gaussian_pdf(x: f32, sigma: f32) -> f32 {
    0.39894 * (-0.5 * x * x / (sigma * sigma)).exp() / sigma
}

/// One-sided blur weights for offsets `0..kernel_radius`, with sigma equal
/// to the radius. The shader normalizes by their two-sided sum.
pub fn gaussian_coefficients(kernel_radius: u32) -> Vec<f32> {
    let sigma = kernel_radius as f32;
    (0..kernel_radius)
        .map(|i| gaussian_pdf(i as f32, sigma))
        .collect()
}

/// `mix(factor, 1.2 - factor, radius)`: radius 0 favors the sharp mips,
/// radius 1 the wide ones.
pub fn lerp_bloom_factor(factor: f32, radius: f32) -> f32 {
    factor + (1.2 - factor - factor) * radius
}

/// Final per-mip weights, strength included.
pub fn composite_weights(settings: &BloomSettings) -> [f32; BLOOM_MIPS] {
    MIP_FACTORS.map(|f| settings.strength * lerp_bloom_factor(f, settings.radius))
}

/// Sizes of the blur levels: half the render size, then halving again per
/// level, never below 1x1.
pub fn mip_sizes((width, height): (u32, u32)) -> [(u32, u32); BLOOM_MIPS] {
    let half = |v: u32| ((v as f32 / 2.0).round() as u32).max(1);
    let mut sizes = [(1, 1); BLOOM_MIPS];
    let mut current = (half(width), half(height));
    for size in sizes.iter_mut() {
        *size = current;
        current = (half(current.0), half(current.1));
    }
    sizes
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct ThresholdParams {
    threshold: f32,
    smooth_width: f32,
    _pad: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct BlurParams {
    direction: [f32; 2],
    inv_size: [f32; 2],
    kernel_radius: u32,
    _pad: [u32; 3],
    coefficients: [[f32; 4]; 3],
}

impl BlurParams {
    fn new(direction: [f32; 2], (width, height): (u32, u32), kernel_radius: u32) -> Self {
        let mut coefficients = [[0.0; 4]; 3];
        for (i, c) in gaussian_coefficients(kernel_radius)
            .into_iter()
            .take(MAX_COEFFICIENTS)
            .enumerate()
        {
            coefficients[i / 4][i % 4] = c;
        }
        Self {
            direction,
            inv_size: [1.0 / width as f32, 1.0 / height as f32],
            kernel_radius: kernel_radius.min(MAX_COEFFICIENTS as u32),
            _pad: [0; 3],
            coefficients,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct CompositeParams {
    weights: [[f32; 4]; 2],
}

impl CompositeParams {
    fn new(weights: [f32; BLOOM_MIPS]) -> Self {
        Self {
            weights: [
                [weights[0], weights[1], weights[2], weights[3]],
                [weights[4], 0.0, 0.0, 0.0],
            ],
        }
    }
}

/// Size-dependent textures, uniforms and bind groups.
struct BloomTargets {
    bright: wgpu::TextureView,
    horizontal: Vec<wgpu::TextureView>,
    vertical: Vec<wgpu::TextureView>,
    threshold_bind_group: wgpu::BindGroup,
    /// Per level: horizontal then vertical blur.
    blur_bind_groups: Vec<[wgpu::BindGroup; 2]>,
    composite_bind_group: wgpu::BindGroup,
}

/// Bloom post-process: high-pass, five-level separable blur, additive
/// composite onto the scene.
///
/// The composite stage also writes the output surface, so it runs even when
/// bloom is disabled (with zero weights).
pub struct BloomPass {
    enabled: bool,
    threshold_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    source_layout: wgpu::BindGroupLayout,
    composite_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    threshold_uniform: wgpu::Buffer,
    composite_uniform: wgpu::Buffer,
    targets: BloomTargets,
}

impl BloomPass {
    pub fn new(
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
        scene_view: &wgpu::TextureView,
        size: (u32, u32),
        settings: Option<BloomSettings>,
    ) -> Self {
        let enabled = settings.is_some();
        let settings = settings.unwrap_or(BloomSettings {
            strength: 0.0,
            ..BloomSettings::default()
        });

        let source_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bloom_source_layout"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                uniform_entry(2),
            ],
        });
        let composite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bloom_composite_layout"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                uniform_entry(2),
                texture_entry(3),
                texture_entry(4),
                texture_entry(5),
                texture_entry(6),
                texture_entry(7),
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("bloom_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let threshold_pipeline = post_pipeline(
            device,
            "bloom_threshold",
            &source_layout,
            shaders::THRESHOLD_FRAGMENT,
            "fs_threshold",
            HDR_FORMAT,
        );
        let blur_pipeline = post_pipeline(
            device,
            "bloom_blur",
            &source_layout,
            shaders::BLUR_FRAGMENT,
            "fs_blur",
            HDR_FORMAT,
        );
        let composite_pipeline = post_pipeline(
            device,
            "bloom_composite",
            &composite_layout,
            shaders::COMPOSITE_FRAGMENT,
            "fs_composite",
            output_format,
        );

        let threshold_uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("bloom_threshold_uniform"),
            contents: bytemuck::bytes_of(&ThresholdParams {
                threshold: settings.threshold,
                smooth_width: SMOOTH_WIDTH,
                _pad: [0.0; 2],
            }),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let composite_uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("bloom_composite_uniform"),
            contents: bytemuck::bytes_of(&CompositeParams::new(composite_weights(&settings))),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let targets = BloomTargets::new(
            device,
            &source_layout,
            &composite_layout,
            &sampler,
            &threshold_uniform,
            &composite_uniform,
            scene_view,
            size,
        );

        tracing::debug!(
            enabled,
            strength = settings.strength,
            radius = settings.radius,
            threshold = settings.threshold,
            "bloom pass ready"
        );

        Self {
            enabled,
            threshold_pipeline,
            blur_pipeline,
            composite_pipeline,
            source_layout,
            composite_layout,
            sampler,
            threshold_uniform,
            composite_uniform,
            targets,
        }
    }

    /// Rebuild sized targets after the scene target was re-created.
    pub fn resize(&mut self, device: &wgpu::Device, scene_view: &wgpu::TextureView, size: (u32, u32)) {
        self.targets = BloomTargets::new(
            device,
            &self.source_layout,
            &self.composite_layout,
            &self.sampler,
            &self.threshold_uniform,
            &self.composite_uniform,
            scene_view,
            size,
        );
    }

    /// Encode high-pass, blur chain and composite into `output`.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        let t = &self.targets;
        if self.enabled {
            fullscreen_pass(
                encoder,
                "bloom_threshold_pass",
                &t.bright,
                &self.threshold_pipeline,
                &t.threshold_bind_group,
            );
            for level in 0..BLOOM_MIPS {
                let [horizontal, vertical] = &t.blur_bind_groups[level];
                fullscreen_pass(
                    encoder,
                    "bloom_blur_h_pass",
                    &t.horizontal[level],
                    &self.blur_pipeline,
                    horizontal,
                );
                fullscreen_pass(
                    encoder,
                    "bloom_blur_v_pass",
                    &t.vertical[level],
                    &self.blur_pipeline,
                    vertical,
                );
            }
        }
        fullscreen_pass(
            encoder,
            "bloom_composite_pass",
            output,
            &self.composite_pipeline,
            &t.composite_bind_group,
        );
    }
}

impl BloomTargets {
    #[allow(clippy::too_many_arguments)]
    fn new(
        device: &wgpu::Device,
        source_layout: &wgpu::BindGroupLayout,
        composite_layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        threshold_uniform: &wgpu::Buffer,
        composite_uniform: &wgpu::Buffer,
        scene_view: &wgpu::TextureView,
        size: (u32, u32),
    ) -> Self {
        let usage = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
        let sizes = mip_sizes(size);

        let bright = create_target(device, "bloom_bright", sizes[0], HDR_FORMAT, 1, usage);
        let horizontal: Vec<_> = sizes
            .iter()
            .map(|&s| create_target(device, "bloom_blur_h", s, HDR_FORMAT, 1, usage))
            .collect();
        let vertical: Vec<_> = sizes
            .iter()
            .map(|&s| create_target(device, "bloom_blur_v", s, HDR_FORMAT, 1, usage))
            .collect();

        let source_group = |label: &str, view: &wgpu::TextureView, uniform: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: source_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: uniform.as_entire_binding(),
                    },
                ],
            })
        };

        let threshold_bind_group = source_group("bloom_threshold_bg", scene_view, threshold_uniform);

        let mut blur_bind_groups = Vec::with_capacity(BLOOM_MIPS);
        for level in 0..BLOOM_MIPS {
            let input = if level == 0 {
                &bright
            } else {
                &vertical[level - 1]
            };
            let radius = KERNEL_RADII[level];
            let h_uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("bloom_blur_h_uniform"),
                contents: bytemuck::bytes_of(&BlurParams::new([1.0, 0.0], sizes[level], radius)),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            let v_uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("bloom_blur_v_uniform"),
                contents: bytemuck::bytes_of(&BlurParams::new([0.0, 1.0], sizes[level], radius)),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            blur_bind_groups.push([
                source_group("bloom_blur_h_bg", input, &h_uniform),
                source_group("bloom_blur_v_bg", &horizontal[level], &v_uniform),
            ]);
        }

        let mut composite_entries = vec![
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(scene_view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: composite_uniform.as_entire_binding(),
            },
        ];
        for (level, view) in vertical.iter().enumerate() {
            composite_entries.push(wgpu::BindGroupEntry {
                binding: 3 + level as u32,
                resource: wgpu::BindingResource::TextureView(view),
            });
        }
        let composite_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bloom_composite_bg"),
            layout: composite_layout,
            entries: &composite_entries,
        });

        Self {
            bright,
            horizontal,
            vertical,
            threshold_bind_group,
            blur_bind_groups,
            composite_bind_group,
        }
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn post_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    fragment: &str,
    entry_point: &str,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(shaders::post_shader(fragment).into()),
    });
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_fullscreen"),
            compilation_options: Default::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some(entry_point),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

fn fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        ..Default::default()
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_weights_decrease() {
        let c = gaussian_coefficients(11);
        assert_eq!(c.len(), 11);
        assert!(c.iter().all(|&w| w > 0.0));
        assert!(c.windows(2).all(|w| w[0] > w[1]));
        assert!((c[0] - 0.39894 / 11.0).abs() < 1e-6);
    }

    #[test]
    fn zero_radius_keeps_mip_factors() {
        for f in MIP_FACTORS {
            assert_eq!(lerp_bloom_factor(f, 0.0), f);
            assert!((lerp_bloom_factor(f, 1.0) - (1.2 - f)).abs() < 1e-6);
        }
    }

    #[test]
    fn default_weights_scale_by_strength() {
        let weights = composite_weights(&BloomSettings::default());
        let expected = [1.5, 1.2, 0.9, 0.6, 0.3];
        for (w, e) in weights.iter().zip(expected) {
            assert!((w - e).abs() < 1e-5);
        }
    }

    #[test]
    fn mips_halve_down_to_one() {
        assert_eq!(
            mip_sizes((1920, 1080)),
            [(960, 540), (480, 270), (240, 135), (120, 68), (60, 34)]
        );
        assert_eq!(mip_sizes((3, 1)), [(2, 1), (1, 1), (1, 1), (1, 1), (1, 1)]);
    }

    #[test]
    fn uniform_layouts_match_wgsl() {
        assert_eq!(std::mem::size_of::<ThresholdParams>(), 16);
        assert_eq!(std::mem::size_of::<BlurParams>(), 80);
        assert_eq!(std::mem::size_of::<CompositeParams>(), 32);
    }

    #[test]
    fn blur_params_pack_coefficients() {
        let params = BlurParams::new([1.0, 0.0], (200, 100), 5);
        assert_eq!(params.kernel_radius, 5);
        assert_eq!(params.inv_size, [0.005, 0.01]);
        let expected = gaussian_coefficients(5);
        assert_eq!(params.coefficients[0], [expected[0], expected[1], expected[2], expected[3]]);
        assert_eq!(params.coefficients[1][0], expected[4]);
        assert_eq!(params.coefficients[1][1], 0.0);
    }

    #[test]
    fn composite_params_spill_fifth_weight() {
        let params = CompositeParams::new([1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(params.weights, [[1.0, 2.0, 3.0, 4.0], [5.0, 0.0, 0.0, 0.0]]);
    }
}
