use log::{debug, warn};

use crate::creature::Creature;
use crate::error::MuxError;
use crate::mux::SpriteMux;
use crate::scheduler::{IrqStatus, RasterScheduler, SCREEN_FIRST_RASTER};
use crate::sheet::SpriteSheet;
use crate::vic::{Frame, TvSystem, Vic, VicII};

/// Machine ties the multiplexer to the emulated video chip.
///
/// The chip runs one raster line at a time. A raised raster interrupt is
/// serviced at the start of the line, before the sprites of that line are
/// displayed. The foreground runs between frames.
pub struct Machine<'a> {
    vic: VicII,
    mux: SpriteMux,
    scheduler: RasterScheduler,
    creatures: Vec<Creature>,

    /// Tick the foreground has caught up to.
    last_updated: u16,

    render_callback: Box<dyn FnMut(&Frame) + 'a>,
}

impl<'a> Machine<'a> {
    /// Returns a machine with the sheet installed and the first raster
    /// interrupt armed.
    pub fn new<F>(tv: TvSystem, sheet: &SpriteSheet, render_callback: F) -> Self
    where
        F: FnMut(&Frame) + 'a,
    {
        let mut vic = VicII::new(tv);
        sheet.install(&mut vic);
        vic.write_raster_compare(SCREEN_FIRST_RASTER);
        vic.enable_raster_irq(true);

        Machine {
            vic,
            mux: SpriteMux::new(),
            scheduler: RasterScheduler::new(tv),
            creatures: Vec::new(),
            last_updated: 0,
            render_callback: Box::from(render_callback),
        }
    }

    /// Adds a creature with its top left corner at the given position.
    pub fn spawn_creature(&mut self, sheet: &SpriteSheet, x: u16, y: u8) -> Result<(), MuxError> {
        let creature = Creature::spawn(&mut self.mux, sheet, x, y)?;
        self.creatures.push(creature);
        Ok(())
    }

    /// Runs the chip until the current frame is complete, then hands the
    /// frame to the render callback.
    pub fn step_frame(&mut self) {
        loop {
            if self.vic.irq_asserted()
                && self.scheduler.handle_raster_irq(&self.mux, &mut self.vic)
                    == IrqStatus::NotHandled
            {
                warn!(
                    "unhandled interrupt at line {}: {:08b}",
                    self.vic.raster_line(),
                    self.vic.read_irq_status()
                );
            }

            if self.vic.clock_line() {
                break;
            }
        }

        (self.render_callback)(self.vic.frame());
    }

    /// Runs one creature update for every tick since the last call. Returns
    /// the number of updates.
    pub fn foreground(&mut self) -> usize {
        let mut updates = 0;
        while self.last_updated != self.scheduler.clock() {
            for creature in self.creatures.iter_mut() {
                creature.update(&mut self.mux);
            }
            self.last_updated = self.last_updated.wrapping_add(1);
            updates += 1;
        }
        updates
    }

    /// Steps `count` frames, running the foreground after each.
    pub fn run_frames(&mut self, count: u64) {
        for _ in 0..count {
            self.step_frame();
            self.foreground();
        }
        debug!(
            "ran {} frames, clock at {}",
            count,
            self.scheduler.clock()
        );
    }

    pub fn vic(&self) -> &VicII {
        &self.vic
    }

    pub fn mux(&self) -> &SpriteMux {
        &self.mux
    }

    pub fn creatures(&self) -> &[Creature] {
        &self.creatures
    }

    /// Returns the scheduler's tick counter.
    pub fn clock(&self) -> u16 {
        self.scheduler.clock()
    }
}
