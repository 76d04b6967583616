// Frame driver - owns every GPU handle and runs the per-frame sequence:
// upload raster -> resolve (indexed) -> viewport -> present -> submit

use wgpu::{Surface, SurfaceConfiguration};

use super::gpu_context::GpuContext;
use super::palette::PaletteTable;
use super::pipeline::{PipelineSettings, PresentPipeline};
use super::raster::Raster;
use super::viewport::Viewport;
use crate::error::{PresentError, Result};

/// Lifecycle of the driver: `Initialized -> Rendering* -> Shutdown`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Resources created, no frame drawn yet
    Initialized,
    /// At least one frame begun
    Rendering,
    /// Resources released; terminal
    Shutdown,
}

impl DriverState {
    /// State after starting a frame
    pub fn begin_frame(self) -> Result<DriverState> {
        match self {
            DriverState::Initialized | DriverState::Rendering => Ok(DriverState::Rendering),
            DriverState::Shutdown => Err(PresentError::ShutDown),
        }
    }
}

/// What happened to a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// Drawn into this viewport and queued for presentation
    Presented(Viewport),
    /// Surface not drawable this tick (minimized, lost, timed out)
    Skipped,
}

/// Reaction to a failed swapchain acquire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfaceRecovery {
    /// Surface no longer matches the window; configure again
    Reconfigure,
    /// Transient; try again next frame
    Skip,
}

/// A zero-sized surface is never configured or drawn
fn is_drawable(width: u32, height: u32) -> bool {
    width > 0 && height > 0
}

/// Classify an acquire failure; only running out of memory is fatal
fn surface_recovery(err: wgpu::SurfaceError) -> Result<SurfaceRecovery> {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => Ok(SurfaceRecovery::Reconfigure),
        wgpu::SurfaceError::OutOfMemory => Err(PresentError::SurfaceTexture(err)),
        other => {
            log::warn!("Skipping frame: {}", other);
            Ok(SurfaceRecovery::Skip)
        }
    }
}

struct DriverResources {
    gpu: GpuContext,
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    pipeline: PresentPipeline,
}

/// Sole owner of the surface and presentation pipeline
pub struct FrameDriver {
    state: DriverState,
    resources: Option<DriverResources>,
}

impl FrameDriver {
    /// Create the surface, device and pipeline for `target`.
    ///
    /// Any failure here is fatal for the caller: there is nothing to draw with.
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        (width, height): (u32, u32),
        settings: PipelineSettings,
        palette: &PaletteTable,
        vsync: bool,
    ) -> Result<Self> {
        let instance = GpuContext::create_instance();
        let surface = instance.create_surface(target)?;
        let gpu = GpuContext::new_with_surface(&instance, &surface).await?;

        let surface_config = Self::create_surface_config(&surface, &gpu, width, height, vsync)?;
        if is_drawable(width, height) {
            surface.configure(gpu.device(), &surface_config);
        }

        let pipeline = PresentPipeline::new(&gpu, settings, palette, surface_config.format);

        log::info!(
            "Surface {}x{} {:?}, present mode {:?}",
            width,
            height,
            surface_config.format,
            surface_config.present_mode
        );

        Ok(Self {
            state: DriverState::Initialized,
            resources: Some(DriverResources {
                gpu,
                surface,
                surface_config,
                pipeline,
            }),
        })
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Backend in use, `None` after shutdown
    pub fn backend(&self) -> Option<wgpu::Backend> {
        self.resources.as_ref().map(|r| r.gpu.backend())
    }

    /// Track a new window size; zero-sized surfaces are never configured
    pub fn resize(&mut self, width: u32, height: u32) {
        let Some(res) = self.resources.as_mut() else {
            return;
        };

        res.surface_config.width = width;
        res.surface_config.height = height;
        if !is_drawable(width, height) {
            log::debug!("Window collapsed to {}x{}, presentation paused", width, height);
            return;
        }

        log::debug!("Reconfiguring surface to {}x{}", width, height);
        res.surface.configure(res.gpu.device(), &res.surface_config);
    }

    /// Run one frame against the current contents of `raster`
    pub fn render(&mut self, raster: &Raster) -> Result<FrameOutcome> {
        self.state = self.state.begin_frame()?;
        let Some(res) = self.resources.as_mut() else {
            return Err(PresentError::ShutDown);
        };

        let (width, height) = (res.surface_config.width, res.surface_config.height);
        if !is_drawable(width, height) {
            return Ok(FrameOutcome::Skipped);
        }

        let queue = res.gpu.queue();
        res.pipeline.upload(queue, raster)?;

        let frame = match res.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(e) => {
                if surface_recovery(e)? == SurfaceRecovery::Reconfigure {
                    log::debug!("Surface lost or outdated, reconfiguring");
                    res.surface.configure(res.gpu.device(), &res.surface_config);
                }
                return Ok(FrameOutcome::Skipped);
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = res
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        let viewport = res.pipeline.encode(queue, &mut encoder, &view, width, height);

        queue.submit(Some(encoder.finish()));
        frame.present();

        Ok(FrameOutcome::Presented(viewport))
    }

    /// Release all GPU resources; later frames fail with [`PresentError::ShutDown`]
    pub fn shutdown(&mut self) {
        if self.state == DriverState::Shutdown {
            return;
        }
        self.resources = None;
        self.state = DriverState::Shutdown;
        log::info!("Frame driver shut down");
    }

    fn create_surface_config(
        surface: &Surface,
        gpu: &GpuContext,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<SurfaceConfiguration> {
        let surface_caps = surface.get_capabilities(gpu.adapter());

        // Palette values are written as-is; an sRGB surface would re-encode them
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(PresentError::UnsupportedSurface)?;

        let present_mode = if vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        Ok(SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        })
    }
}

impl Drop for FrameDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RasterMode;

    #[test]
    fn test_first_frame_enters_rendering() {
        assert_eq!(
            DriverState::Initialized.begin_frame().unwrap(),
            DriverState::Rendering
        );
    }

    #[test]
    fn test_rendering_is_reentered() {
        let mut state = DriverState::Initialized;
        for _ in 0..3 {
            state = state.begin_frame().unwrap();
            assert_eq!(state, DriverState::Rendering);
        }
    }

    #[test]
    fn test_shutdown_is_terminal() {
        let err = DriverState::Shutdown.begin_frame().unwrap_err();
        assert!(matches!(err, PresentError::ShutDown));
    }

    #[test]
    fn test_zero_size_not_drawable() {
        assert!(!is_drawable(0, 0));
        assert!(!is_drawable(0, 480));
        assert!(!is_drawable(640, 0));
        assert!(is_drawable(1, 1));
    }

    #[test]
    fn test_lost_and_outdated_reconfigure() {
        assert_eq!(
            surface_recovery(wgpu::SurfaceError::Lost).unwrap(),
            SurfaceRecovery::Reconfigure
        );
        assert_eq!(
            surface_recovery(wgpu::SurfaceError::Outdated).unwrap(),
            SurfaceRecovery::Reconfigure
        );
    }

    #[test]
    fn test_timeout_skips_frame() {
        assert_eq!(
            surface_recovery(wgpu::SurfaceError::Timeout).unwrap(),
            SurfaceRecovery::Skip
        );
        assert_eq!(
            surface_recovery(wgpu::SurfaceError::Other).unwrap(),
            SurfaceRecovery::Skip
        );
    }

    #[test]
    fn test_out_of_memory_is_fatal() {
        let err = surface_recovery(wgpu::SurfaceError::OutOfMemory).unwrap_err();
        assert!(matches!(
            err,
            PresentError::SurfaceTexture(wgpu::SurfaceError::OutOfMemory)
        ));
    }

    #[test]
    fn test_render_after_shutdown_fails() {
        let mut driver = FrameDriver {
            state: DriverState::Initialized,
            resources: None,
        };
        driver.shutdown();
        assert_eq!(driver.state(), DriverState::Shutdown);
        assert!(driver.backend().is_none());

        // Resizing a shut-down driver is a no-op
        driver.resize(640, 480);

        let raster = Raster::new(RasterMode::Indexed, 320, 240);
        let err = driver.render(&raster).unwrap_err();
        assert!(matches!(err, PresentError::ShutDown));
        assert_eq!(driver.state(), DriverState::Shutdown);
    }
}
