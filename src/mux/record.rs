/// Number of hardware sprite channels.
pub const CHANNEL_COUNT: usize = 8;

/// Height of a hardware sprite in raster lines.
pub const CHANNEL_HEIGHT: u8 = 21;

/// Width of a hardware sprite in pixels.
pub const CHANNEL_WIDTH: u16 = 24;

/// Y position given to records that should not be displayed. It is the
/// largest Y, so a record placed here sorts to the tail of the list.
pub const OFFSCREEN_Y: u8 = 0xFF;
pub const OFFSCREEN_X: u16 = 0;

/// Returns the channel bit for the given active list slot.
pub fn channel_bit(slot: usize) -> u8 {
    1 << (slot % CHANNEL_COUNT)
}

/// The per-record attribute masks.
///
/// Each mask is either zero or the single channel bit of the slot the record
/// currently occupies in the active list, so the scheduler can merge it into
/// the shared hardware registers without shifting.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Affinity {
    pub enabled: u8,
    pub high_x: u8,
    pub double_size: u8,
    pub multicolor: u8,
}

impl Affinity {
    /// Moves every set attribute to the channel bit of `slot`. Clear
    /// attributes stay clear.
    pub fn repin(&mut self, slot: usize) {
        let bit = channel_bit(slot);
        for mask in [
            &mut self.enabled,
            &mut self.high_x,
            &mut self.double_size,
            &mut self.multicolor,
        ] {
            if *mask != 0 {
                *mask = bit;
            }
        }
    }

    /// Returns the four masks in register order.
    pub fn masks(&self) -> [u8; 4] {
        [self.enabled, self.high_x, self.double_size, self.multicolor]
    }
}

/// State of one logical sprite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteRecord {
    pub affinity: Affinity,

    /// X position. Bit 8 is carried by the `high_x` mask.
    pub x: u16,
    pub y: u8,

    /// Graphic pointer, the 64 byte block index inside the video bank.
    pub pointer: u8,
    pub color: u8,
}

impl SpriteRecord {
    /// Returns a fresh record pinned to `slot`.
    pub fn new(slot: usize, double_size: bool) -> Self {
        let bit = channel_bit(slot);
        SpriteRecord {
            affinity: Affinity {
                enabled: bit,
                high_x: 0,
                double_size: if double_size { bit } else { 0 },
                multicolor: 0,
            },
            x: OFFSCREEN_X,
            y: OFFSCREEN_Y,
            pointer: 0,
            color: 0,
        }
    }
}

impl Default for SpriteRecord {
    fn default() -> Self {
        SpriteRecord {
            affinity: Affinity::default(),
            x: OFFSCREEN_X,
            y: OFFSCREEN_Y,
            pointer: 0,
            color: 0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_channel_bit_wraps() {
        assert_eq!(channel_bit(0), 0b0000_0001);
        assert_eq!(channel_bit(7), 0b1000_0000);
        assert_eq!(channel_bit(8), 0b0000_0001);
        assert_eq!(channel_bit(13), 0b0010_0000);
    }

    #[test]
    fn test_repin_moves_set_bits_only() {
        let mut affinity = SpriteRecord::new(2, true).affinity;
        affinity.repin(5);

        assert_eq!(affinity.enabled, 0b0010_0000);
        assert_eq!(affinity.double_size, 0b0010_0000);
        assert_eq!(affinity.high_x, 0);
        assert_eq!(affinity.multicolor, 0);
    }

    #[test]
    fn test_new_record_is_offscreen() {
        let record = SpriteRecord::new(9, false);

        assert_eq!(record.y, OFFSCREEN_Y);
        assert_eq!(record.affinity.enabled, 0b0000_0010);
        assert_eq!(record.affinity.double_size, 0);
    }
}
