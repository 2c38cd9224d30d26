use log::trace;

use crate::mux::{channel_bit, SpriteMux, SpriteRecord, CHANNEL_COUNT, CHANNEL_HEIGHT};
use crate::vic::registers::interrupt::{raster_ack, raster_latched};
use crate::vic::{MaskRegister, TvSystem, Vic};

/// Raster line of the frame boundary. Nothing visible is displayed below it.
pub const FRAME_TRIGGER_LINE: u16 = 255;

/// Raster line of the first interrupt after startup.
pub const SCREEN_FIRST_RASTER: u16 = 25;

/// Lines after a channel's Y at which it is reprogrammed for the next record.
const BAND_HEIGHT: u16 = CHANNEL_HEIGHT as u16 - 2;

/// On NTSC the clock skips one frame in this many.
const NTSC_SKIP_PERIOD: u8 = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IrqStatus {
    Handled,
    NotHandled,
}

/// The raster interrupt handler that assigns the active list to the
/// hardware channels.
///
/// One pass walks the whole list in order, once per frame. Record `i` goes to
/// channel `i % 8`. After programming a record the handler arms the raster
/// compare for the end of that record's band, unless the next record already
/// starts inside it, in which case it keeps going in the same invocation.
pub struct RasterScheduler {
    /// Next list slot to program. `None` between passes.
    cursor: Option<usize>,
    channel: usize,

    /// Free running tick counter, advanced once per pass.
    clock: u16,

    /// Frames seen in the current NTSC skip period.
    frame_skip: u8,

    tv: TvSystem,
}

impl RasterScheduler {
    pub fn new(tv: TvSystem) -> Self {
        RasterScheduler {
            cursor: None,
            channel: 0,
            clock: 0,
            frame_skip: 0,
            tv,
        }
    }

    /// Returns the tick counter.
    pub fn clock(&self) -> u16 {
        self.clock
    }

    /// Returns true if no pass is in progress.
    pub fn is_idle(&self) -> bool {
        self.cursor.is_none()
    }

    /// Services a raster interrupt.
    pub fn handle_raster_irq<V: Vic>(&mut self, mux: &SpriteMux, vic: &mut V) -> IrqStatus {
        if !raster_latched(vic.read_irq_status()) {
            return IrqStatus::NotHandled;
        }
        vic.write_irq_status(raster_ack());

        let mut cursor = match self.cursor {
            Some(cursor) => cursor,
            None => {
                self.start_pass();
                0
            }
        };

        while let Some(record) = mux.slot(cursor) {
            program_channel(vic, self.channel, record);
            self.channel = (self.channel + 1) % CHANNEL_COUNT;
            cursor += 1;

            let Some(next) = mux.slot(cursor) else {
                break;
            };

            // Past the frame trigger line everything is off-screen, so the
            // rest of the pass is programmed right away.
            let band_end = record.y as u16 + BAND_HEIGHT;
            if band_end < FRAME_TRIGGER_LINE && next.y as u16 > band_end {
                self.cursor = Some(cursor);
                vic.write_raster_compare(band_end);
                return IrqStatus::Handled;
            }
        }

        self.finish_pass(vic, cursor);
        IrqStatus::Handled
    }

    /// Resets the channel and advances the tick counter.
    fn start_pass(&mut self) {
        self.channel = 0;
        match self.tv {
            TvSystem::Pal => self.clock = self.clock.wrapping_add(1),
            TvSystem::Ntsc => {
                self.frame_skip += 1;
                if self.frame_skip < NTSC_SKIP_PERIOD {
                    self.clock = self.clock.wrapping_add(1);
                } else {
                    self.frame_skip = 0;
                }
            }
        }
    }

    fn finish_pass<V: Vic>(&mut self, vic: &mut V, programmed: usize) {
        self.cursor = None;
        vic.write_raster_compare(FRAME_TRIGGER_LINE);
        trace!("pass {} complete: {} sprites", self.clock, programmed);
    }
}

/// Copies a record into a hardware channel. Shared registers are updated
/// at the channel bit only.
fn program_channel<V: Vic>(vic: &mut V, channel: usize, record: &SpriteRecord) {
    let bit = channel_bit(channel);
    let affinity = record.affinity;

    vic.write_sprite_color(channel, record.color);
    vic.write_sprite_pointer(channel, record.pointer);
    vic.write_sprite_x(channel, record.x as u8);
    vic.write_sprite_y(channel, record.y);

    for (register, mask) in [
        (MaskRegister::Enable, affinity.enabled),
        (MaskRegister::HighX, affinity.high_x),
        (MaskRegister::ExpandX, affinity.double_size),
        (MaskRegister::ExpandY, affinity.double_size),
        (MaskRegister::Multicolor, affinity.multicolor),
    ] {
        let value = vic.read_mask(register) & !bit | mask;
        vic.write_mask(register, value);
    }
}
