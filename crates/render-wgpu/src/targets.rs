/// Format of the intermediate scene and bloom targets.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Create a 2D texture and return its default view. Sizes are clamped to 1.
pub fn create_target(
    device: &wgpu::Device,
    label: &str,
    (width, height): (u32, u32),
    format: wgpu::TextureFormat,
    sample_count: u32,
    usage: wgpu::TextureUsages,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

/// Sized attachments for the scene pass.
///
/// With MSAA, the scene renders into `msaa` and resolves into `hdr`;
/// without it, it renders into `hdr` directly.
pub struct FrameTargets {
    pub hdr: wgpu::TextureView,
    pub msaa: Option<wgpu::TextureView>,
    pub depth: wgpu::TextureView,
    pub size: (u32, u32),
    pub sample_count: u32,
}

impl FrameTargets {
    pub fn new(device: &wgpu::Device, size: (u32, u32), sample_count: u32) -> Self {
        let hdr = create_target(
            device,
            "scene_hdr",
            size,
            HDR_FORMAT,
            1,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        let msaa = (sample_count > 1).then(|| {
            create_target(
                device,
                "scene_msaa",
                size,
                HDR_FORMAT,
                sample_count,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            )
        });
        let depth = create_target(
            device,
            "depth_texture",
            size,
            DEPTH_FORMAT,
            sample_count,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
        Self {
            hdr,
            msaa,
            depth,
            size,
            sample_count,
        }
    }

    /// Color attachment for the scene pass, resolving when multisampled.
    pub fn color_attachment(&self) -> wgpu::RenderPassColorAttachment<'_> {
        let (view, resolve_target) = match &self.msaa {
            Some(msaa) => (msaa, Some(&self.hdr)),
            None => (&self.hdr, None),
        };
        wgpu::RenderPassColorAttachment {
            view,
            resolve_target,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: if self.msaa.is_some() {
                    wgpu::StoreOp::Discard
                } else {
                    wgpu::StoreOp::Store
                },
            },
        }
    }
}
