// Color resolve pass
//
// Samples the indexed raster texture and the 256x1 palette lookup texture,
// writing RGBA into an intermediate target `magnification` times the raster
// size. The presentation pass can then filter that target linearly without
// smearing individual source pixels.

use wgpu::{BindGroup, Buffer, Device, Queue, RenderPipeline, Texture, TextureView};

use super::palette::{PaletteTable, PALETTE_CAPACITY};
use super::resources::{self, QuadParams};
use super::viewport::UvRect;

/// Format of the intermediate target
pub const RESOLVE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Indexed raster -> true-color intermediate target
pub struct ColorResolvePass {
    pipeline: RenderPipeline,
    bind_group: BindGroup,
    _params_buffer: Buffer,
    _palette_texture: Texture,
    target: Texture,
    target_view: TextureView,
}

impl ColorResolvePass {
    /// Build the pass for an indexed raster texture of `raster_w`×`raster_h`
    pub fn new(
        device: &Device,
        queue: &Queue,
        raster_view: &TextureView,
        palette: &PaletteTable,
        raster_w: u32,
        raster_h: u32,
        magnification: u32,
    ) -> Self {
        let magnification = magnification.max(1);

        let (palette_texture, palette_view) = resources::create_texture(
            device,
            "Palette Lookup Texture",
            PALETTE_CAPACITY as u32,
            1,
            wgpu::TextureFormat::Rgba8Unorm,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        );
        resources::write_texture(queue, &palette_texture, &palette.texture_bytes(), 4);

        let (target, target_view) = resources::create_texture(
            device,
            "Resolve Target",
            raster_w * magnification,
            raster_h * magnification,
            RESOLVE_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
        );

        let params_buffer =
            resources::create_params_buffer(device, "Resolve Params", QuadParams::from(UvRect::FULL));

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Resolve Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/resolve.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("resolve_bind_group_layout"),
            entries: &[
                resources::params_layout_entry(),
                // Binding 1: indexed raster
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Uint,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // Binding 2: palette lookup
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("resolve_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(raster_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&palette_view),
                },
            ],
        });

        let pipeline = resources::create_quad_pipeline(
            device,
            "Resolve Pipeline",
            &shader,
            &bind_group_layout,
            RESOLVE_FORMAT,
        );

        Self {
            pipeline,
            bind_group,
            _params_buffer: params_buffer,
            _palette_texture: palette_texture,
            target,
            target_view,
        }
    }

    /// Intermediate target, fully rewritten by every [`encode`](Self::encode)
    pub fn target(&self) -> &Texture {
        &self.target
    }

    pub fn target_view(&self) -> &TextureView {
        &self.target_view
    }

    /// Record the resolve draw
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Resolve Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.target_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..4, 0..1);
    }
}
