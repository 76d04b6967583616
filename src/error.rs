use thiserror::Error;

use crate::core::RasterMode;

/// Errors raised while setting up or driving the presentation pipeline
#[derive(Debug, Error)]
pub enum PresentError {
    #[error("surface creation failed: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter found: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),

    #[error("request device failed: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("failed to acquire surface texture: {0}")]
    SurfaceTexture(#[from] wgpu::SurfaceError),

    #[error("surface reports no supported formats")]
    UnsupportedSurface,

    #[error("raster has {actual} texels, expected {expected}")]
    RasterSizeMismatch { expected: usize, actual: usize },

    #[error("pipeline built for {expected:?} raster, got {actual:?}")]
    RasterModeMismatch { expected: RasterMode, actual: RasterMode },

    #[error("palette holds at most {capacity} entries, got {actual}")]
    PaletteOverflow { capacity: usize, actual: usize },

    #[error("frame driver has been shut down")]
    ShutDown,

    #[error("texture readback failed: {0}")]
    Readback(String),
}

pub type Result<T> = std::result::Result<T, PresentError>;
