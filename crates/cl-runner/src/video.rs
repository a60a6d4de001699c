//! Video buffer ownership

use cl_core::{BridgeError, Result};
use cl_engine::{Pixel, BYTES_PER_PIXEL};

/// Pixel memory an engine renders into, sized once at creation
pub struct VideoBuffer {
    width: u32,
    height: u32,
    pixels: Box<[Pixel]>,
}

impl VideoBuffer {
    /// Allocate a zeroed `width * height` buffer
    pub fn allocate(width: u32, height: u32) -> Result<Self> {
        let failure = || BridgeError::AllocationFailure { width, height };

        let len = (width as usize)
            .checked_mul(height as usize)
            .filter(|&len| len > 0 && len.checked_mul(BYTES_PER_PIXEL).is_some())
            .ok_or_else(failure)?;

        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len).map_err(|_| failure())?;
        pixels.resize(len, 0);

        Ok(Self {
            width,
            height,
            pixels: pixels.into_boxed_slice(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row stride in pixels; rows are packed
    pub fn stride(&self) -> usize {
        self.width as usize
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    /// Raw pointer for handing across the C boundary
    pub fn as_mut_ptr(&mut self) -> *mut Pixel {
        self.pixels.as_mut_ptr()
    }

    pub fn view(&self) -> VideoBufferView<'_> {
        VideoBufferView {
            width: self.width,
            height: self.height,
            pixels: &self.pixels,
        }
    }
}

impl std::fmt::Debug for VideoBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Read-only view of the live buffer. It aliases the memory the next frame
/// overwrites, so the borrow checker keeps it from outliving that call.
#[derive(Debug, Clone, Copy)]
pub struct VideoBufferView<'a> {
    width: u32,
    height: u32,
    pixels: &'a [Pixel],
}

impl<'a> VideoBufferView<'a> {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Pixel {
        assert!(x < self.width, "x must be in range 0 to {}", self.width);
        assert!(y < self.height, "y must be in range 0 to {}", self.height);
        self.pixels[self.index(x, y)]
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Pixel at (x, y) as R, G, B, A bytes
    pub fn rgba(&self, x: u32, y: u32) -> [u8; 4] {
        self.get_pixel(x, y).to_le_bytes()
    }

    pub fn pixels(&self) -> &'a [Pixel] {
        self.pixels
    }

    /// The buffer as `width * height * 4` bytes
    pub fn as_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.pixels)
    }
}
