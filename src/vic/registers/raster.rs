/// Represents the raster counter and the raster compare register.
pub struct Raster {
    /// Current raster line.
    line: u16,

    /// Line that latches the raster interrupt. Nine bits, the top bit lives
    /// in control register 1.
    compare: u16,

    lines_per_frame: u16,
}

impl Raster {
    /// Returns a raster counter at the top of the frame.
    pub fn new(lines_per_frame: u16) -> Self {
        Raster {
            line: 0,
            compare: 0,
            lines_per_frame,
        }
    }

    /// Returns the current line.
    pub fn line(&self) -> u16 {
        self.line
    }

    /// Returns the compare line.
    pub fn compare(&self) -> u16 {
        self.compare
    }

    /// Sets the compare line.
    pub fn set_compare(&mut self, line: u16) {
        self.compare = line & 0x1FF;
    }

    /// Returns true if the current line is the compare line.
    pub fn matches(&self) -> bool {
        self.line == self.compare
    }

    /// Moves to the next line. Returns true when the frame wrapped.
    pub fn advance(&mut self) -> bool {
        self.line += 1;
        if self.line >= self.lines_per_frame {
            self.line = 0;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_advance_wraps() {
        let mut raster = Raster::new(3);

        assert!(!raster.advance());
        assert!(!raster.advance());
        assert!(raster.advance());
        assert_eq!(raster.line(), 0);
    }

    #[test]
    fn test_compare_is_nine_bits() {
        let mut raster = Raster::new(312);
        raster.set_compare(0x3FF);

        assert_eq!(raster.compare(), 0x1FF);
    }
}
