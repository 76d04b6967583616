// Source raster - the emulated display's per-pixel buffer
//
// The producer writes texels in place before each frame; the pipeline only
// reads the buffer during the upload step.

use serde::Deserialize;

use crate::error::PresentError;

/// Default emulated resolution
pub const RASTER_WIDTH: u32 = 320;
pub const RASTER_HEIGHT: u32 = 240;

/// Texel encoding of the source raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RasterMode {
    /// 8-bit palette codes, resolved on the GPU
    #[default]
    Indexed,
    /// 32-bit RGBA, presented directly
    TrueColor,
}

impl RasterMode {
    /// Texture format the raster is uploaded as
    pub fn texture_format(self) -> wgpu::TextureFormat {
        match self {
            RasterMode::Indexed => wgpu::TextureFormat::R8Uint,
            RasterMode::TrueColor => wgpu::TextureFormat::Rgba8Unorm,
        }
    }

    pub fn bytes_per_texel(self) -> u32 {
        match self {
            RasterMode::Indexed => 1,
            RasterMode::TrueColor => 4,
        }
    }
}

/// Texel types a raster can hold
pub trait Texel: bytemuck::Pod + Default {
    const MODE: RasterMode;
}

impl Texel for u8 {
    const MODE: RasterMode = RasterMode::Indexed;
}

/// Packed 0xAABBGGRR; uploaded byte-for-byte, so hosts are assumed little-endian
impl Texel for u32 {
    const MODE: RasterMode = RasterMode::TrueColor;
}

/// Fixed-size W×H texel grid, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer<T: Texel> {
    width: u32,
    height: u32,
    texels: Vec<T>,
}

pub type IndexedRaster = RasterBuffer<u8>;
pub type TrueColorRaster = RasterBuffer<u32>;

impl<T: Texel> RasterBuffer<T> {
    /// Create a zero-filled raster
    ///
    /// # Panics
    /// Panics if either dimension is zero
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "Raster dimensions must be non-zero");
        Self {
            width,
            height,
            texels: vec![T::default(); (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Encoding implied by the texel type
    pub fn mode(&self) -> RasterMode {
        T::MODE
    }

    pub fn texel_count(&self) -> usize {
        self.texels.len()
    }

    pub fn texels(&self) -> &[T] {
        &self.texels
    }

    pub fn texels_mut(&mut self) -> &mut [T] {
        &mut self.texels
    }

    /// Raw bytes in upload order
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> T {
        assert!(x < self.width && y < self.height, "Texel ({}, {}) out of bounds", x, y);
        self.texels[(y * self.width + x) as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: T) {
        assert!(x < self.width && y < self.height, "Texel ({}, {}) out of bounds", x, y);
        self.texels[(y * self.width + x) as usize] = value;
    }

    pub fn fill(&mut self, value: T) {
        self.texels.fill(value);
    }

    /// Overwrite every texel; the source must hold exactly W·H texels
    pub fn copy_from(&mut self, source: &[T]) -> Result<(), PresentError> {
        if source.len() != self.texels.len() {
            return Err(PresentError::RasterSizeMismatch {
                expected: self.texels.len(),
                actual: source.len(),
            });
        }
        self.texels.copy_from_slice(source);
        Ok(())
    }
}

impl IndexedRaster {
    /// Every texel gets `(i + offset) mod 256`, covering the whole index range
    pub fn index_ramp(&mut self, offset: u32) {
        for (i, texel) in self.texels.iter_mut().enumerate() {
            *texel = ((i as u32).wrapping_add(offset) % 256) as u8;
        }
    }
}

impl TrueColorRaster {
    /// Red across, green down, blue cycling with `offset`
    pub fn gradient(&mut self, offset: u32) {
        let (w, h) = (self.width, self.height);
        let span_x = (w - 1).max(1);
        let span_y = (h - 1).max(1);
        let blue = offset % 256;
        for y in 0..h {
            for x in 0..w {
                let r = x * 255 / span_x;
                let g = y * 255 / span_y;
                self.texels[(y * w + x) as usize] = 0xFF00_0000 | (blue << 16) | (g << 8) | r;
            }
        }
    }
}

/// The raster owned by the application, in one of the two encodings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Raster {
    Indexed(IndexedRaster),
    TrueColor(TrueColorRaster),
}

impl Raster {
    pub fn new(mode: RasterMode, width: u32, height: u32) -> Self {
        match mode {
            RasterMode::Indexed => Raster::Indexed(IndexedRaster::new(width, height)),
            RasterMode::TrueColor => Raster::TrueColor(TrueColorRaster::new(width, height)),
        }
    }

    pub fn mode(&self) -> RasterMode {
        match self {
            Raster::Indexed(r) => r.mode(),
            Raster::TrueColor(r) => r.mode(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Raster::Indexed(r) => (r.width(), r.height()),
            Raster::TrueColor(r) => (r.width(), r.height()),
        }
    }

    pub fn texel_count(&self) -> usize {
        match self {
            Raster::Indexed(r) => r.texel_count(),
            Raster::TrueColor(r) => r.texel_count(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Raster::Indexed(r) => r.as_bytes(),
            Raster::TrueColor(r) => r.as_bytes(),
        }
    }

    /// Demo producer: write the startup pattern shifted by `offset`
    pub fn test_pattern(&mut self, offset: u32) {
        match self {
            Raster::Indexed(r) => r.index_ramp(offset),
            Raster::TrueColor(r) => r.gradient(offset),
        }
    }
}
