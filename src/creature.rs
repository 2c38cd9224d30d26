use log::{debug, warn};

use crate::error::MuxError;
use crate::mux::{SpriteHandle, SpriteMux, CHANNEL_HEIGHT, CHANNEL_WIDTH};
use crate::sheet::SpriteSheet;

const COLUMNS: usize = 3;
const ROWS: usize = 3;

/// Number of sprites in a creature.
pub const CREATURE_SPRITES: usize = COLUMNS * ROWS;

/// Grid index of the jaw sprite.
const MOUTH: usize = 7;

/// Row and column pitch of double size sprites.
const ROW_PITCH: u8 = CHANNEL_HEIGHT * 2;
const COLUMN_PITCH: u16 = CHANNEL_WIDTH * 2;

/// First visible sprite coordinates.
pub const BORDER_X: u16 = 24;
pub const BORDER_Y: u8 = 50;

const MIN_MOUTH: i8 = -(CHANNEL_HEIGHT as i8 / 2);
const MAX_MOUTH: i8 = CHANNEL_HEIGHT as i8;
const MOUTH_SPEED: i8 = 5;

const FLOAT_SPEED: i16 = 3;
const FLOAT_TOP: i16 = BORDER_Y as i16;
const FLOAT_BOTTOM: i16 = ROW_PITCH as i16 * ROWS as i16;

/// A 3x3 block of double size sprites that floats up and down and opens
/// and closes its mouth.
pub struct Creature {
    sprites: [SpriteHandle; CREATURE_SPRITES],

    /// Y of the top row.
    y: u8,
    mouth_offset: i8,
    mouth_opening: bool,
    sinking: bool,
}

impl Creature {
    /// Allocates and places the creature's sprites with the top left corner
    /// at the given position inside the visible area. Images `0..9` of the
    /// sheet are used in grid order.
    pub fn spawn(
        mux: &mut SpriteMux,
        sheet: &SpriteSheet,
        x: u16,
        y: u8,
    ) -> Result<Creature, MuxError> {
        let x = x + BORDER_X;
        let y = y.wrapping_add(BORDER_Y);
        let mouth_offset = 0;

        let mut sprites = [SpriteHandle::default(); CREATURE_SPRITES];
        for idx in 0..CREATURE_SPRITES {
            match place_sprite(mux, sheet, idx) {
                Ok(handle) => sprites[idx] = handle,
                Err(e) => {
                    for handle in sprites[..idx].iter().rev() {
                        discard_quietly(mux, *handle);
                    }
                    return Err(e);
                }
            }

            let sprite_x = x + (idx % COLUMNS) as u16 * COLUMN_PITCH;
            let mut sprite_y = y.wrapping_add((idx / COLUMNS) as u8 * ROW_PITCH);
            if idx == MOUTH {
                sprite_y = sprite_y.wrapping_add_signed(mouth_offset);
            }
            mux.set_position(sprites[idx], sprite_x, sprite_y);
        }

        debug!("spawned creature at ({}, {})", x, y);
        Ok(Creature {
            sprites,
            y,
            mouth_offset,
            mouth_opening: true,
            sinking: true,
        })
    }

    /// Advances the animation by one tick.
    pub fn update(&mut self, mux: &mut SpriteMux) {
        if self.mouth_opening {
            self.mouth_offset += MOUTH_SPEED;
            if self.mouth_offset > MAX_MOUTH {
                self.mouth_offset = MAX_MOUTH;
                self.mouth_opening = false;
            }
        } else {
            self.mouth_offset -= MOUTH_SPEED;
            if self.mouth_offset < MIN_MOUTH {
                self.mouth_offset = MIN_MOUTH;
                self.mouth_opening = true;
            }
        }

        let delta = self.float_delta();
        self.y = (self.y as i16 + delta) as u8;

        for (idx, handle) in self.sprites.iter().enumerate() {
            let record = mux.record(*handle);
            let y = if idx == MOUTH {
                // The jaw hangs from the cell above, so it ignores the float.
                let above = mux.record(self.sprites[idx - COLUMNS]).y;
                above
                    .wrapping_add(ROW_PITCH)
                    .wrapping_add_signed(self.mouth_offset)
            } else {
                (record.y as i16 + delta) as u8
            };
            mux.set_position_y(*handle, y);
        }
    }

    /// Returns the float step of this tick, turning around at the limits.
    fn float_delta(&mut self) -> i16 {
        let y = self.y as i16;
        if self.sinking {
            if y + FLOAT_SPEED > FLOAT_BOTTOM {
                self.sinking = false;
                return 0;
            }
            FLOAT_SPEED
        } else {
            if y - FLOAT_SPEED < FLOAT_TOP {
                self.sinking = true;
                return 0;
            }
            -FLOAT_SPEED
        }
    }

    /// Returns the sprites in grid order.
    pub fn sprites(&self) -> &[SpriteHandle; CREATURE_SPRITES] {
        &self.sprites
    }

    /// Returns the Y of the top row.
    pub fn y(&self) -> u8 {
        self.y
    }

    pub fn mouth_offset(&self) -> i8 {
        self.mouth_offset
    }
}

/// Allocates a double size sprite showing image `idx` of the sheet.
fn place_sprite(
    mux: &mut SpriteMux,
    sheet: &SpriteSheet,
    idx: usize,
) -> Result<SpriteHandle, MuxError> {
    let handle = mux.allocate(true)?;
    if let Err(e) = mux.bind_graphic(handle, sheet, idx) {
        discard_quietly(mux, handle);
        return Err(e);
    }
    Ok(handle)
}

fn discard_quietly(mux: &mut SpriteMux, handle: SpriteHandle) {
    if let Err(e) = mux.discard(handle) {
        warn!("could not give back sprite {}: {}", handle, e);
    }
}
