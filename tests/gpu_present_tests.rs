//! Offscreen checks of the whole GPU chain. Each test returns early when no
//! adapter is available (headless CI).

use emu_present::core::{
    GpuContext, IndexedRaster, PaletteTable, PipelineSettings, PresentPipeline, Raster,
    RasterMode, ScalingPolicy, TrueColorRaster, FALLBACK_COLOR, RASTER_HEIGHT, RASTER_WIDTH,
};
use emu_present::PresentError;

fn gpu_or_skip() -> Option<GpuContext> {
    match pollster::block_on(GpuContext::new_headless()) {
        Ok(gpu) => Some(gpu),
        Err(e) => {
            eprintln!("Skipping GPU test: {}", e);
            None
        }
    }
}

fn offscreen_target(gpu: &GpuContext, width: u32, height: u32) -> wgpu::Texture {
    gpu.device().create_texture(&wgpu::TextureDescriptor {
        label: Some("Offscreen Target"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

fn render_once(
    gpu: &GpuContext,
    pipeline: &PresentPipeline,
    raster: &Raster,
    target: &wgpu::Texture,
) -> Result<(), PresentError> {
    pipeline.upload(gpu.queue(), raster)?;
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());
    let mut encoder = gpu
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Test Encoder"),
        });
    pipeline.encode(gpu.queue(), &mut encoder, &view, target.width(), target.height());
    gpu.queue().submit(Some(encoder.finish()));
    Ok(())
}

fn pixel(bytes: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * width + x) * 4) as usize;
    [bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]
}

#[cfg(test)]
mod gpu_present_tests {
    use super::*;

    #[test]
    fn test_resolve_matches_cpu_lookup() {
        let Some(gpu) = gpu_or_skip() else { return };
        let palette = PaletteTable::default();
        let settings = PipelineSettings::default();
        let pipeline =
            PresentPipeline::new(&gpu, settings, &palette, wgpu::TextureFormat::Rgba8Unorm);

        let mut indexed = IndexedRaster::new(RASTER_WIDTH, RASTER_HEIGHT);
        indexed.index_ramp(0);
        let raster = Raster::Indexed(indexed.clone());

        let target = offscreen_target(&gpu, 640, 480);
        render_once(&gpu, &pipeline, &raster, &target).unwrap();

        let resolve_target = pipeline.resolve_target().unwrap();
        assert_eq!(resolve_target.width(), RASTER_WIDTH * settings.magnification);
        let bytes = gpu.read_texture_sync(resolve_target).unwrap();

        for (x, y) in [(0, 0), (1, 0), (15, 0), (16, 0), (200, 0), (5, 3), (319, 239)] {
            let expected = palette.lookup(indexed.get(x, y)).to_le_bytes();
            let actual = pixel(&bytes, resolve_target.width(), x * 2, y * 2);
            assert_eq!(actual, expected, "raster texel ({}, {})", x, y);
        }

        // Index 16 and above read back as the fallback color
        assert_eq!(pixel(&bytes, resolve_target.width(), 32, 0), FALLBACK_COLOR.to_le_bytes());
    }

    #[test]
    fn test_letterbox_uses_clear_color() {
        let Some(gpu) = gpu_or_skip() else { return };
        let settings = PipelineSettings {
            clear_color: [0.0, 0.0, 1.0],
            ..PipelineSettings::default()
        };
        let pipeline = PresentPipeline::new(
            &gpu,
            settings,
            &PaletteTable::default(),
            wgpu::TextureFormat::Rgba8Unorm,
        );
        let mut raster = Raster::new(RasterMode::Indexed, RASTER_WIDTH, RASTER_HEIGHT);
        raster.test_pattern(0);

        // 1000x600: aspect-fit gives an 800x600 image with 100px side bars
        let target = offscreen_target(&gpu, 1000, 600);
        render_once(&gpu, &pipeline, &raster, &target).unwrap();
        let bytes = gpu.read_texture_sync(&target).unwrap();

        assert_eq!(pixel(&bytes, 1000, 10, 300), [0, 0, 255, 255]);
        assert_eq!(pixel(&bytes, 1000, 990, 300), [0, 0, 255, 255]);
    }

    #[test]
    fn test_true_color_integer_fit() {
        let Some(gpu) = gpu_or_skip() else { return };
        let settings = PipelineSettings {
            mode: RasterMode::TrueColor,
            policy: ScalingPolicy::IntegerFit,
            clear_color: [0.0, 0.0, 0.0],
            ..PipelineSettings::default()
        };
        let pipeline = PresentPipeline::new(
            &gpu,
            settings,
            &PaletteTable::default(),
            wgpu::TextureFormat::Rgba8Unorm,
        );
        assert!(pipeline.resolve_target().is_none());

        let mut true_color = TrueColorRaster::new(RASTER_WIDTH, RASTER_HEIGHT);
        true_color.fill(0xFF00_FF00);
        let raster = Raster::TrueColor(true_color);

        // 700x500: scale 2, image at (30, 10) sized 640x480
        let target = offscreen_target(&gpu, 700, 500);
        render_once(&gpu, &pipeline, &raster, &target).unwrap();
        let bytes = gpu.read_texture_sync(&target).unwrap();

        assert_eq!(pixel(&bytes, 700, 350, 250), [0, 255, 0, 255]);
        assert_eq!(pixel(&bytes, 700, 5, 250), [0, 0, 0, 255]);
        assert_eq!(pixel(&bytes, 700, 350, 5), [0, 0, 0, 255]);
    }

    #[test]
    fn test_upload_rejects_wrong_mode() {
        let Some(gpu) = gpu_or_skip() else { return };
        let pipeline = PresentPipeline::new(
            &gpu,
            PipelineSettings::default(),
            &PaletteTable::default(),
            wgpu::TextureFormat::Rgba8Unorm,
        );
        let raster = Raster::new(RasterMode::TrueColor, RASTER_WIDTH, RASTER_HEIGHT);
        assert!(matches!(
            pipeline.upload(gpu.queue(), &raster),
            Err(PresentError::RasterModeMismatch { .. })
        ));

        let small = Raster::new(RasterMode::Indexed, 16, 16);
        assert!(matches!(
            pipeline.upload(gpu.queue(), &small),
            Err(PresentError::RasterSizeMismatch { .. })
        ));
    }
}
