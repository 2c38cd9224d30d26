mod frame;
mod palette;
pub mod registers;

use clap::ValueEnum;
use log::trace;

use crate::mux::{CHANNEL_COUNT, CHANNEL_HEIGHT};
use crate::sheet::BLOCK_SIZE;
use registers::interrupt::Interrupt;
use registers::raster::Raster;
use registers::sprites::Sprites;

pub use frame::Frame;
pub use palette::{colour, Rgb};

/// Size of the memory bank the chip fetches sprite images from.
pub const BANK_SIZE: usize = 0x4000;

/// Television standard of the machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TvSystem {
    Pal,
    Ntsc,
}

impl TvSystem {
    /// Returns the number of raster lines in one frame.
    pub fn lines_per_frame(&self) -> u16 {
        match self {
            TvSystem::Pal => 312,
            TvSystem::Ntsc => 263,
        }
    }

    /// Returns the number of frames per second.
    pub fn frame_rate(&self) -> u32 {
        match self {
            TvSystem::Pal => 50,
            TvSystem::Ntsc => 60,
        }
    }
}

/// The shared sprite registers with one bit per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaskRegister {
    Enable,
    HighX,
    ExpandX,
    ExpandY,
    Multicolor,
}

/// The register file the channel scheduler programs.
pub trait Vic {
    fn write_sprite_color(&mut self, channel: usize, value: u8);
    fn write_sprite_pointer(&mut self, channel: usize, value: u8);
    fn write_sprite_x(&mut self, channel: usize, value: u8);
    fn write_sprite_y(&mut self, channel: usize, value: u8);
    fn read_mask(&self, register: MaskRegister) -> u8;
    fn write_mask(&mut self, register: MaskRegister, value: u8);
    fn write_raster_compare(&mut self, line: u16);
    fn read_irq_status(&self) -> u8;
    fn write_irq_status(&mut self, value: u8);
}

/// A channel that began displaying during the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteStart {
    pub line: u16,
    pub channel: usize,
    pub pointer: u8,
    pub x: u16,
    pub color: u8,
}

/// Represents the video chip: sprite channels, raster interrupt and the
/// video bank.
///
/// A channel starts displaying when the raster reaches its Y register while
/// it is enabled, then shows 21 rows (42 when Y expanded). Every row is drawn
/// from the registers current at that line, which is what lets a channel be
/// reused further down the screen.
pub struct VicII {
    tv: TvSystem,
    sprites: Sprites,
    raster: Raster,
    irq: Interrupt,
    background: u8,

    /// Video bank holding the sprite images.
    bank: Vec<u8>,

    /// Row being displayed by each channel.
    display: [Option<u8>; CHANNEL_COUNT],

    /// Display starts of the current frame.
    started: Vec<SpriteStart>,

    /// Number of frames rendered.
    frame_count: u64,

    frame: Frame,
}

impl VicII {
    /// Returns a chip at the top of the frame with every sprite disabled.
    pub fn new(tv: TvSystem) -> Self {
        VicII {
            tv,
            sprites: Sprites::new(),
            raster: Raster::new(tv.lines_per_frame()),
            irq: Interrupt::new(),
            background: 0,
            bank: vec![0; BANK_SIZE],
            display: [None; CHANNEL_COUNT],
            started: Vec::with_capacity(crate::mux::POOL_CAPACITY),
            frame_count: 0,
            frame: Frame::new(),
        }
    }

    /// Copies one image block into the video bank.
    pub fn write_block(&mut self, pointer: u8, block: &[u8; BLOCK_SIZE]) {
        let base = pointer as usize * BLOCK_SIZE;
        self.bank[base..base + BLOCK_SIZE].copy_from_slice(block);
    }

    /// Returns one image block of the video bank.
    pub fn block(&self, pointer: u8) -> &[u8] {
        let base = pointer as usize * BLOCK_SIZE;
        &self.bank[base..base + BLOCK_SIZE]
    }

    pub fn set_sprite_multicolors(&mut self, multicolor_0: u8, multicolor_1: u8) {
        self.sprites.multicolor_0 = multicolor_0;
        self.sprites.multicolor_1 = multicolor_1;
    }

    pub fn sprite_multicolors(&self) -> (u8, u8) {
        (self.sprites.multicolor_0, self.sprites.multicolor_1)
    }

    pub fn set_background(&mut self, color: u8) {
        self.background = color;
    }

    /// Enables or disables the raster interrupt source.
    pub fn enable_raster_irq(&mut self, enabled: bool) {
        self.irq.enable_raster(enabled);
    }

    /// Returns true if the IRQ line is asserted.
    pub fn irq_asserted(&self) -> bool {
        self.irq.asserted()
    }

    pub fn tv(&self) -> TvSystem {
        self.tv
    }

    /// Returns the current raster line.
    pub fn raster_line(&self) -> u16 {
        self.raster.line()
    }

    /// Returns the raster compare line.
    pub fn raster_compare(&self) -> u16 {
        self.raster.compare()
    }

    pub fn sprites(&self) -> &Sprites {
        &self.sprites
    }

    /// Returns the display starts of the current frame so far.
    pub fn started(&self) -> &[SpriteStart] {
        &self.started
    }

    /// Returns the number of frames rendered.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Displays the sprites of the current line and moves the raster to the
    /// next one. Returns true if a frame has been completed.
    pub fn clock_line(&mut self) -> bool {
        let line = self.raster.line();
        if line == 0 {
            self.started.clear();
            self.frame.fill(colour(self.background));
        }

        // Channel 0 has the highest priority, so it is drawn last.
        for channel in (0..CHANNEL_COUNT).rev() {
            self.display_channel(channel, line);
        }

        let wrapped = self.raster.advance();
        if self.raster.matches() {
            self.irq.latch_raster();
        }
        if wrapped {
            self.frame_count = self.frame_count.wrapping_add(1);
        }
        wrapped
    }

    /// Starts, draws and ends the display of one channel on the given line.
    fn display_channel(&mut self, channel: usize, line: u16) {
        let enabled = Sprites::bit(self.sprites.enable, channel);
        if self.display[channel].is_none() && enabled && self.sprites.y[channel] as u16 == line {
            self.display[channel] = Some(0);
            self.started.push(SpriteStart {
                line,
                channel,
                pointer: self.sprites.pointer[channel],
                x: self.sprites.x(channel),
                color: self.sprites.color[channel],
            });
            trace!("line {}: channel {} starts", line, channel);
        }

        let Some(row) = self.display[channel] else {
            return;
        };

        let expand_y = Sprites::bit(self.sprites.expand_y, channel);
        let data_row = if expand_y { row / 2 } else { row };
        if enabled {
            self.draw_row(channel, data_row as usize, line as usize);
        }

        let rows = if expand_y {
            CHANNEL_HEIGHT * 2
        } else {
            CHANNEL_HEIGHT
        };
        self.display[channel] = if row + 1 < rows { Some(row + 1) } else { None };
    }

    /// Draws one row of the image a channel points at.
    fn draw_row(&mut self, channel: usize, data_row: usize, line: usize) {
        let base = self.sprites.pointer[channel] as usize * BLOCK_SIZE + data_row * 3;
        let bits = u32::from_be_bytes([
            0,
            self.bank[base],
            self.bank[base + 1],
            self.bank[base + 2],
        ]);
        let x = self.sprites.x(channel) as usize;
        let scale = if Sprites::bit(self.sprites.expand_x, channel) {
            2
        } else {
            1
        };

        if Sprites::bit(self.sprites.multicolor, channel) {
            // Pixel pairs: 01 multicolour 0, 10 sprite colour, 11 multicolour 1.
            for pair in 0..12 {
                let c = match (bits >> (22 - pair * 2)) & 0b11 {
                    0b00 => continue,
                    0b01 => self.sprites.multicolor_0,
                    0b10 => self.sprites.color[channel],
                    _ => self.sprites.multicolor_1,
                };
                for dx in 0..2 * scale {
                    self.frame.set_pixel(x + pair * 2 * scale + dx, line, colour(c));
                }
            }
        } else {
            let c = self.sprites.color[channel];
            for px in 0..24 {
                if (bits >> (23 - px)) & 1 == 0 {
                    continue;
                }
                for dx in 0..scale {
                    self.frame.set_pixel(x + px * scale + dx, line, colour(c));
                }
            }
        }
    }

    fn mask_mut(&mut self, register: MaskRegister) -> &mut u8 {
        match register {
            MaskRegister::Enable => &mut self.sprites.enable,
            MaskRegister::HighX => &mut self.sprites.high_x,
            MaskRegister::ExpandX => &mut self.sprites.expand_x,
            MaskRegister::ExpandY => &mut self.sprites.expand_y,
            MaskRegister::Multicolor => &mut self.sprites.multicolor,
        }
    }
}

impl Vic for VicII {
    fn write_sprite_color(&mut self, channel: usize, value: u8) {
        self.sprites.color[channel] = value & 0x0F;
    }

    fn write_sprite_pointer(&mut self, channel: usize, value: u8) {
        self.sprites.pointer[channel] = value;
    }

    fn write_sprite_x(&mut self, channel: usize, value: u8) {
        self.sprites.x[channel] = value;
    }

    fn write_sprite_y(&mut self, channel: usize, value: u8) {
        self.sprites.y[channel] = value;
    }

    fn read_mask(&self, register: MaskRegister) -> u8 {
        match register {
            MaskRegister::Enable => self.sprites.enable,
            MaskRegister::HighX => self.sprites.high_x,
            MaskRegister::ExpandX => self.sprites.expand_x,
            MaskRegister::ExpandY => self.sprites.expand_y,
            MaskRegister::Multicolor => self.sprites.multicolor,
        }
    }

    fn write_mask(&mut self, register: MaskRegister, value: u8) {
        *self.mask_mut(register) = value;
    }

    fn write_raster_compare(&mut self, line: u16) {
        self.raster.set_compare(line);
    }

    fn read_irq_status(&self) -> u8 {
        self.irq.snapshot()
    }

    fn write_irq_status(&mut self, value: u8) {
        self.irq.acknowledge(value);
    }
}

#[cfg(test)]
mod test {
    use super::registers::interrupt::{raster_ack, raster_latched};
    use super::*;

    fn run_frame(vic: &mut VicII) {
        while !vic.clock_line() {}
    }

    #[test]
    fn test_raster_irq_latches_on_compare() {
        let mut vic = VicII::new(TvSystem::Pal);
        vic.enable_raster_irq(true);
        vic.write_raster_compare(3);

        vic.clock_line();
        vic.clock_line();
        assert!(!vic.irq_asserted());

        vic.clock_line();
        assert_eq!(vic.raster_line(), 3);
        assert!(vic.irq_asserted());
        assert!(raster_latched(vic.read_irq_status()));

        vic.write_irq_status(raster_ack());
        assert!(!vic.irq_asserted());
    }

    #[test]
    fn test_frame_length_follows_tv_system() {
        for tv in [TvSystem::Pal, TvSystem::Ntsc] {
            let mut vic = VicII::new(tv);
            let mut lines = 0;
            while !vic.clock_line() {
                lines += 1;
            }
            assert_eq!(lines + 1, tv.lines_per_frame());
            assert_eq!(vic.frame_count(), 1);
        }
    }

    #[test]
    fn test_channel_displays_from_its_y() {
        let mut vic = VicII::new(TvSystem::Pal);
        vic.write_block(0x81, &[0xFF; BLOCK_SIZE]);
        vic.write_sprite_pointer(2, 0x81);
        vic.write_sprite_x(2, 40);
        vic.write_sprite_y(2, 60);
        vic.write_sprite_color(2, 1);
        vic.write_mask(MaskRegister::Enable, 0b0000_0100);

        run_frame(&mut vic);

        assert_eq!(
            vic.started(),
            &[SpriteStart {
                line: 60,
                channel: 2,
                pointer: 0x81,
                x: 40,
                color: 1
            }]
        );
        let white = Some(WHITE);
        assert_eq!(vic.frame().pixel(40, 60), white);
        assert_eq!(vic.frame().pixel(63, 80), white);
        assert_ne!(vic.frame().pixel(64, 60), white);
        assert_ne!(vic.frame().pixel(40, 81), white);
    }

    #[test]
    fn test_expanded_channel_is_twice_as_large() {
        let mut vic = VicII::new(TvSystem::Pal);
        vic.write_block(0x81, &[0xFF; BLOCK_SIZE]);
        vic.write_sprite_pointer(0, 0x81);
        vic.write_sprite_x(0, 10);
        vic.write_sprite_y(0, 30);
        vic.write_sprite_color(0, 1);
        vic.write_mask(MaskRegister::Enable, 0b1);
        vic.write_mask(MaskRegister::ExpandX, 0b1);
        vic.write_mask(MaskRegister::ExpandY, 0b1);

        run_frame(&mut vic);

        assert_eq!(vic.frame().pixel(10 + 47, 30 + 41), Some(WHITE));
        assert_ne!(vic.frame().pixel(10 + 48, 30), Some(WHITE));
        assert_ne!(vic.frame().pixel(10, 30 + 42), Some(WHITE));
    }

    #[test]
    fn test_channel_reused_after_display_ends() {
        let mut vic = VicII::new(TvSystem::Pal);
        vic.write_sprite_y(0, 50);
        vic.write_mask(MaskRegister::Enable, 0b1);

        for _ in 0..80 {
            vic.clock_line();
        }
        vic.write_sprite_y(0, 100);
        run_frame(&mut vic);

        let lines: Vec<u16> = vic.started().iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![50, 100]);
    }

    #[test]
    fn test_high_x_bit() {
        let mut vic = VicII::new(TvSystem::Pal);
        vic.write_sprite_x(5, 0x10);
        vic.write_mask(MaskRegister::HighX, 0b0010_0000);

        assert_eq!(vic.sprites().x(5), 0x110);
    }

    const WHITE: Rgb = Rgb(0xFF, 0xFF, 0xFF);
}
