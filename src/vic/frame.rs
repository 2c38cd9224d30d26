use super::palette::Rgb;

/// Frame represents one rendered frame of pixels.
///
/// Columns are sprite X coordinates and rows are raster lines, so the
/// borders are included.
pub struct Frame {
    pub data: Vec<u8>,
}

impl Frame {
    pub const WIDTH: usize = 384;
    pub const HEIGHT: usize = 272;

    /// Returns a new frame.
    pub fn new() -> Self {
        Frame {
            data: vec![0; (Frame::WIDTH) * (Frame::HEIGHT) * 3],
        }
    }

    /// Sets a pixel in the given position with the given colour.
    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: &Rgb) {
        if x >= Frame::WIDTH || y >= Frame::HEIGHT {
            return;
        }
        let base = y * 3 * Frame::WIDTH + x * 3;
        self.data[base] = rgb.0;
        self.data[base + 1] = rgb.1;
        self.data[base + 2] = rgb.2;
    }

    /// Returns the colour of a pixel, or `None` outside the frame.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= Frame::WIDTH || y >= Frame::HEIGHT {
            return None;
        }
        let base = y * 3 * Frame::WIDTH + x * 3;
        Some(Rgb(self.data[base], self.data[base + 1], self.data[base + 2]))
    }

    /// Paints every pixel with the given colour.
    pub fn fill(&mut self, rgb: &Rgb) {
        for pixel in self.data.chunks_exact_mut(3) {
            pixel[0] = rgb.0;
            pixel[1] = rgb.1;
            pixel[2] = rgb.2;
        }
    }

    /// Returns the current frame contents.
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }
}
