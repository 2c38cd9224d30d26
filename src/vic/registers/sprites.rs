use crate::mux::CHANNEL_COUNT;

/// Represents the sprite registers of the chip.
///
/// The per-channel registers hold the low X byte, Y, colour and the graphic
/// pointer (kept in screen memory on the real machine). The shared registers
/// carry one bit per channel:
///
/// 7  bit  0
/// ---- ----
/// 7 6 5 4 3 2 1 0
/// | | | | | | | |
/// + + + + + + + +- Channel 7..0
pub struct Sprites {
    pub x: [u8; CHANNEL_COUNT],
    pub y: [u8; CHANNEL_COUNT],
    pub color: [u8; CHANNEL_COUNT],
    pub pointer: [u8; CHANNEL_COUNT],

    pub enable: u8,
    pub high_x: u8,
    pub expand_x: u8,
    pub expand_y: u8,
    pub multicolor: u8,

    /// Colours shared by all multicolour sprites.
    pub multicolor_0: u8,
    pub multicolor_1: u8,
}

impl Sprites {
    /// Returns sprite registers with every channel disabled.
    pub fn new() -> Self {
        Sprites {
            x: [0; CHANNEL_COUNT],
            y: [0; CHANNEL_COUNT],
            color: [0; CHANNEL_COUNT],
            pointer: [0; CHANNEL_COUNT],
            enable: 0b00000000,
            high_x: 0b00000000,
            expand_x: 0b00000000,
            expand_y: 0b00000000,
            multicolor: 0b00000000,
            multicolor_0: 0,
            multicolor_1: 0,
        }
    }

    /// Returns the full nine bit X position of a channel.
    pub fn x(&self, channel: usize) -> u16 {
        let high = (self.high_x >> channel) as u16 & 1;
        high << 8 | self.x[channel] as u16
    }

    /// Returns true if the channel bit is set in the given shared register.
    pub fn bit(register: u8, channel: usize) -> bool {
        register & (1 << channel) != 0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_x_uses_high_bit() {
        let mut sprites = Sprites::new();
        sprites.x[3] = 0x20;
        sprites.high_x = 0b00001000;

        assert_eq!(sprites.x(3), 0x120);
        assert_eq!(sprites.x(2), 0x000);
    }
}
