// Palette table for indexed rasters
//
// Colors are packed as 0xAABBGGRR so `to_le_bytes()` yields R, G, B, A,
// matching an Rgba8Unorm texel.

use crate::error::PresentError;

/// Storage capacity; one slot per possible 8-bit index
pub const PALETTE_CAPACITY: usize = 256;

/// Color returned for indices past the defined entries (transparent black)
pub const FALLBACK_COLOR: u32 = 0x0000_0000;

/// 16-color palette: eight standard intensities followed by eight bright ones
pub const DEFAULT_PALETTE: [u32; 16] = [
    0xFF000000, // black
    0xFFD70000, // blue
    0xFF0000D7, // red
    0xFFD700D7, // magenta
    0xFF00D700, // green
    0xFFD7D700, // cyan
    0xFF00D7D7, // yellow
    0xFFD7D7D7, // white
    0xFF000000, // bright black
    0xFFFF0000, // bright blue
    0xFF0000FF, // bright red
    0xFFFF00FF, // bright magenta
    0xFF00FF00, // bright green
    0xFFFFFF00, // bright cyan
    0xFF00FFFF, // bright yellow
    0xFFFFFFFF, // bright white
];

/// Fixed-capacity color table with a separate defined length
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteTable {
    entries: [u32; PALETTE_CAPACITY],
    len: usize,
}

impl PaletteTable {
    /// Build a table from up to 256 colors
    pub fn new(colors: &[u32]) -> Result<Self, PresentError> {
        if colors.len() > PALETTE_CAPACITY {
            return Err(PresentError::PaletteOverflow {
                capacity: PALETTE_CAPACITY,
                actual: colors.len(),
            });
        }

        let mut entries = [FALLBACK_COLOR; PALETTE_CAPACITY];
        entries[..colors.len()].copy_from_slice(colors);

        Ok(Self {
            entries,
            len: colors.len(),
        })
    }

    /// Number of defined entries
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        PALETTE_CAPACITY
    }

    /// Defined colors only
    pub fn colors(&self) -> &[u32] {
        &self.entries[..self.len]
    }

    /// Resolve an index, falling back to [`FALLBACK_COLOR`] past the defined length
    #[inline]
    pub fn lookup(&self, index: u8) -> u32 {
        let index = index as usize;
        if index < self.len {
            self.entries[index]
        } else {
            FALLBACK_COLOR
        }
    }

    /// RGBA bytes of the 256×1 lookup texture.
    ///
    /// Every slot goes through [`lookup`](Self::lookup), so the GPU read and
    /// the CPU lookup return the same color for every index.
    pub fn texture_bytes(&self) -> Vec<u8> {
        (0..PALETTE_CAPACITY)
            .flat_map(|i| self.lookup(i as u8).to_le_bytes())
            .collect()
    }

    /// CPU reference conversion of indexed texels into packed colors
    pub fn resolve_into(&self, indices: &[u8], output: &mut [u32]) -> Result<(), PresentError> {
        if indices.len() != output.len() {
            return Err(PresentError::RasterSizeMismatch {
                expected: indices.len(),
                actual: output.len(),
            });
        }

        for (out, &index) in output.iter_mut().zip(indices) {
            *out = self.lookup(index);
        }
        Ok(())
    }
}

impl Default for PaletteTable {
    fn default() -> Self {
        let mut entries = [FALLBACK_COLOR; PALETTE_CAPACITY];
        entries[..DEFAULT_PALETTE.len()].copy_from_slice(&DEFAULT_PALETTE);
        Self {
            entries,
            len: DEFAULT_PALETTE.len(),
        }
    }
}
