// One configurable pipeline for every raster mode / scaling policy pair
//
//   Indexed:   raster (R8Uint) -> resolve pass -> intermediate -> present pass
//   TrueColor: raster (Rgba8Unorm) ------------------------------> present pass

use wgpu::{Texture, TextureFormat, TextureView};

use super::color_resolve::ColorResolvePass;
use super::gpu_context::GpuContext;
use super::palette::PaletteTable;
use super::presentation::PresentationPass;
use super::raster::{Raster, RasterMode, RASTER_HEIGHT, RASTER_WIDTH};
use super::resources;
use super::viewport::{compute_viewport, ScalingPolicy, Viewport};
use crate::error::{PresentError, Result};

/// Everything chosen once at construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    pub mode: RasterMode,
    pub policy: ScalingPolicy,
    pub raster_width: u32,
    pub raster_height: u32,
    /// Intermediate target scale (indexed mode only)
    pub magnification: u32,
    /// Linear filtering of the intermediate image
    pub smooth: bool,
    pub clear_color: [f64; 3],
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            mode: RasterMode::Indexed,
            policy: ScalingPolicy::AspectFit,
            raster_width: RASTER_WIDTH,
            raster_height: RASTER_HEIGHT,
            magnification: 2,
            smooth: true,
            clear_color: [0.05, 0.05, 0.05],
        }
    }
}

impl PipelineSettings {
    /// Filter used by the presentation sampler.
    ///
    /// The raw raster is always sampled nearest; only the magnified
    /// intermediate image may be filtered, and only under `AspectFit`.
    /// `IntegerFit` maps the intermediate at ratio `k / magnification`, which
    /// is fractional in general, so it stays nearest to keep pixel edges hard.
    pub fn present_filter(&self) -> wgpu::FilterMode {
        match (self.mode, self.policy) {
            (RasterMode::Indexed, ScalingPolicy::AspectFit) if self.smooth => {
                wgpu::FilterMode::Linear
            }
            _ => wgpu::FilterMode::Nearest,
        }
    }

    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b] = self.clear_color;
        wgpu::Color { r, g, b, a: 1.0 }
    }
}

/// GPU resources for the whole raster-to-screen chain
pub struct PresentPipeline {
    settings: PipelineSettings,
    raster_texture: Texture,
    _raster_view: TextureView,
    resolve: Option<ColorResolvePass>,
    presentation: PresentationPass,
}

impl PresentPipeline {
    /// Create textures, samplers and pipelines; `target_format` is the
    /// format of whatever the presentation pass renders into
    pub fn new(
        gpu: &GpuContext,
        settings: PipelineSettings,
        palette: &PaletteTable,
        target_format: TextureFormat,
    ) -> Self {
        let device = gpu.device();

        let (raster_texture, raster_view) = resources::create_texture(
            device,
            "Raster Texture",
            settings.raster_width,
            settings.raster_height,
            settings.mode.texture_format(),
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        );

        let resolve = match settings.mode {
            RasterMode::Indexed => Some(ColorResolvePass::new(
                device,
                gpu.queue(),
                &raster_view,
                palette,
                settings.raster_width,
                settings.raster_height,
                settings.magnification,
            )),
            RasterMode::TrueColor => None,
        };

        let source_view = resolve
            .as_ref()
            .map_or(&raster_view, |pass| pass.target_view());

        let presentation = PresentationPass::new(
            device,
            source_view,
            settings.present_filter(),
            target_format,
            settings.clear_color(),
        );

        log::info!(
            "Pipeline ready: {:?} {}x{} raster, {:?}, filter {:?}",
            settings.mode,
            settings.raster_width,
            settings.raster_height,
            settings.policy,
            settings.present_filter()
        );

        Self {
            settings,
            raster_texture,
            _raster_view: raster_view,
            resolve,
            presentation,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Intermediate target, present only in indexed mode
    pub fn resolve_target(&self) -> Option<&Texture> {
        self.resolve.as_ref().map(ColorResolvePass::target)
    }

    /// Push the whole raster to its texture
    pub fn upload(&self, queue: &wgpu::Queue, raster: &Raster) -> Result<()> {
        if raster.mode() != self.settings.mode {
            return Err(PresentError::RasterModeMismatch {
                expected: self.settings.mode,
                actual: raster.mode(),
            });
        }

        let expected = (self.settings.raster_width * self.settings.raster_height) as usize;
        if raster.dimensions() != (self.settings.raster_width, self.settings.raster_height) {
            return Err(PresentError::RasterSizeMismatch {
                expected,
                actual: raster.texel_count(),
            });
        }

        resources::write_texture(
            queue,
            &self.raster_texture,
            raster.as_bytes(),
            self.settings.mode.bytes_per_texel(),
        );
        Ok(())
    }

    /// Viewport for the current window size
    pub fn viewport(&self, window_w: u32, window_h: u32) -> Viewport {
        compute_viewport(
            window_w,
            window_h,
            self.settings.raster_width,
            self.settings.raster_height,
            self.settings.policy,
        )
    }

    /// Record resolve (indexed mode) and presentation into `target_view`
    pub fn encode(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target_view: &TextureView,
        window_w: u32,
        window_h: u32,
    ) -> Viewport {
        if let Some(resolve) = &self.resolve {
            resolve.encode(encoder);
        }

        let viewport = self.viewport(window_w, window_h);
        self.presentation
            .encode(queue, encoder, target_view, window_w, window_h, viewport);
        viewport
    }
}
