use crate::bloom::BloomPass;
use crate::scene_pass::ScenePass;
use crate::targets::FrameTargets;
use glowgrid_scene::Scene;

/// wgpu-based renderer for a [`Scene`]: direct scene pass into an HDR
/// target, then the post-process chain onto the output surface.
pub struct WgpuRenderer {
    scene_pass: ScenePass,
    bloom: BloomPass,
    targets: FrameTargets,
}

impl WgpuRenderer {
    /// `size` is the drawing-buffer size in physical pixels.
    pub fn new(
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
        scene: &Scene,
        size: (u32, u32),
        sample_count: u32,
    ) -> Self {
        let targets = FrameTargets::new(device, size, sample_count);
        let scene_pass = ScenePass::new(device, scene, sample_count);
        let bloom = BloomPass::new(device, output_format, &targets.hdr, size, scene.bloom());
        tracing::info!(
            width = size.0,
            height = size.1,
            sample_count,
            format = ?output_format,
            "renderer initialized"
        );
        Self {
            scene_pass,
            bloom,
            targets,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, size: (u32, u32)) {
        if size == self.targets.size {
            return;
        }
        self.targets = FrameTargets::new(device, size, self.targets.sample_count);
        self.bloom.resize(device, &self.targets.hdr, size);
        tracing::debug!(width = size.0, height = size.1, "render targets resized");
    }

    /// Render one frame: scene pass, then bloom composite into `view`.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        scene: &Scene,
    ) {
        self.scene_pass.update(queue, scene);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });
        self.scene_pass.encode(&mut encoder, &self.targets);
        self.bloom.encode(&mut encoder, view);

        queue.submit(std::iter::once(encoder.finish()));
    }
}
