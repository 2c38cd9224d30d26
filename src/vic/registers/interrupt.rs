const RASTER: u8 = 0b00000001;
const SPRITE_BACKGROUND: u8 = 0b00000010;
const SPRITE_SPRITE: u8 = 0b00000100;
const LIGHTPEN: u8 = 0b00001000;
const ANY: u8 = 0b10000000;

const SOURCES: u8 = RASTER | SPRITE_BACKGROUND | SPRITE_SPRITE | LIGHTPEN;

/// Represents the interrupt latch and interrupt enable registers.
pub struct Interrupt {
    /// 7  bit  0
    /// ---- ----
    /// I . . . L S B R
    /// |       | | | |
    /// |       | | | +- Raster line reached the compare line
    /// |       | | +--- Sprite to background collision
    /// |       | +----- Sprite to sprite collision
    /// |       +------- Light pen
    /// +--------------- An enabled source is latched (read only)
    latch: u8,

    /// Same layout as the latch without the top bit. Only enabled sources
    /// assert the IRQ line.
    enabled: u8,
}

impl Interrupt {
    /// Returns interrupt registers with nothing latched or enabled.
    pub fn new() -> Self {
        Interrupt {
            latch: 0b00000000,
            enabled: 0b00000000,
        }
    }

    /// Latches the raster source.
    pub fn latch_raster(&mut self) {
        self.latch |= RASTER;
    }

    /// Enables or disables the raster source.
    pub fn enable_raster(&mut self, enabled: bool) {
        if enabled {
            self.enabled |= RASTER
        } else {
            self.enabled &= !RASTER
        }
    }

    /// Clears every latched source written as 1.
    pub fn acknowledge(&mut self, data: u8) {
        self.latch &= !(data & SOURCES);
    }

    /// Returns true if an enabled source is latched.
    pub fn asserted(&self) -> bool {
        self.latch & self.enabled & SOURCES != 0
    }

    /// Returns the latch register as the CPU reads it.
    pub fn snapshot(&self) -> u8 {
        if self.asserted() {
            self.latch | ANY
        } else {
            self.latch
        }
    }
}

/// Returns true if the raster source is set in an interrupt latch value.
pub fn raster_latched(status: u8) -> bool {
    status & RASTER == RASTER
}

/// The value to write to acknowledge the raster source.
pub fn raster_ack() -> u8 {
    RASTER
}
