pub mod color_resolve;
pub mod frame_driver;
pub mod gpu_context;
pub mod palette;
pub mod pipeline;
pub mod presentation;
pub mod raster;
pub mod resources;
pub mod viewport;
pub mod window;

pub use color_resolve::ColorResolvePass;
pub use frame_driver::{DriverState, FrameDriver, FrameOutcome};
pub use gpu_context::GpuContext;
pub use palette::{PaletteTable, DEFAULT_PALETTE, FALLBACK_COLOR, PALETTE_CAPACITY};
pub use pipeline::{PipelineSettings, PresentPipeline};
pub use presentation::PresentationPass;
pub use raster::{IndexedRaster, Raster, RasterBuffer, RasterMode, TrueColorRaster, RASTER_HEIGHT, RASTER_WIDTH};
pub use viewport::{compute_viewport, integer_scale, ScalingPolicy, UvRect, Viewport};
pub use window::{window_title, WindowContext, WindowDimensions};
