use wgpu::{BindGroup, Buffer, Device, Queue, RenderPipeline, TextureFormat, TextureView};

use super::resources::{self, QuadParams};
use super::viewport::{UvRect, Viewport};

/// Draws the resolved image as one quad into the viewport rectangle
pub struct PresentationPass {
    pipeline: RenderPipeline,
    bind_group: BindGroup,
    params_buffer: Buffer,
    clear_color: wgpu::Color,
}

impl PresentationPass {
    /// `source_view` is the resolve target or the raw true-color raster
    pub fn new(
        device: &Device,
        source_view: &TextureView,
        filter: wgpu::FilterMode,
        target_format: TextureFormat,
        clear_color: wgpu::Color,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Present Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/present.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("present_bind_group_layout"),
            entries: &[
                resources::params_layout_entry(),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = resources::create_sampler(device, "Present Sampler", filter);
        let params_buffer =
            resources::create_params_buffer(device, "Present Params", QuadParams::from(UvRect::FULL));

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("present_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(source_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let pipeline = resources::create_quad_pipeline(
            device,
            "Present Pipeline",
            &shader,
            &bind_group_layout,
            target_format,
        );

        Self {
            pipeline,
            bind_group,
            params_buffer,
            clear_color,
        }
    }

    /// Clear `target_view` and draw the source into `viewport`.
    ///
    /// The viewport is clipped to the `window_w`×`window_h` target first; the
    /// hidden part of an overflowing image is dropped through the quad's UVs.
    pub fn encode(
        &self,
        queue: &Queue,
        encoder: &mut wgpu::CommandEncoder,
        target_view: &TextureView,
        window_w: u32,
        window_h: u32,
        viewport: Viewport,
    ) {
        let visible = viewport.clip_to_window(window_w, window_h);
        if let Some((_, uv)) = visible {
            queue.write_buffer(&self.params_buffer, 0, bytemuck::cast_slice(&[QuadParams::from(uv)]));
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Present Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        // Nothing on screen, the clear alone is the frame
        let Some((clipped, _)) = visible else {
            return;
        };

        pass.set_viewport(clipped.x, clipped.y, clipped.width, clipped.height, 0.0, 1.0);
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..4, 0..1);
    }
}
