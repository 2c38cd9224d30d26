pub mod creature;
pub mod error;
pub mod machine;
pub mod mux;
pub mod scheduler;
pub mod sheet;
pub mod timer;
pub mod vic;
#[cfg(feature = "window")]
pub mod window;

use std::cell::Cell;
use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{debug, error, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use creature::CREATURE_SPRITES;
use error::MuxError;
use machine::Machine;
use sheet::SpriteSheet;
use timer::Timer;
use vic::TvSystem;

/// Horizontal distance between creatures.
const CREATURE_STRIDE: u16 = 100;

/// Sprite multiplexer demo: floating creatures built from more sprites than
/// the video chip has channels.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Options {
    /// SpritePad sheet with the creature images. Generated images are used
    /// when omitted.
    #[arg(short, long, value_name = "PATH")]
    sheet: Option<PathBuf>,

    /// Television standard of the emulated machine.
    #[arg(long, value_enum, default_value_t = TvSystem::Pal)]
    tv: TvSystem,

    /// Number of frames to run. 0 runs until quit.
    #[arg(short, long, default_value_t = 0)]
    frames: u64,

    /// Number of creatures.
    #[arg(
        short,
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u8).range(1..=3)
    )]
    creatures: u8,

    /// Seed for creature placement.
    #[arg(long)]
    seed: Option<u64>,

    /// Show the frames in a window.
    #[arg(short, long)]
    window: bool,

    /// Run as fast as possible instead of at the frame rate.
    #[arg(long)]
    unpaced: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let options = Options::parse();

    let level = if options.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let sheet = match &options.sheet {
        Some(path) => SpriteSheet::load(path).unwrap_or_else(|e| fail(e)),
        None => {
            info!("no sheet given, using generated images");
            SpriteSheet::placeholder(CREATURE_SPRITES)
        }
    };

    if options.window {
        run_windowed(&options, &sheet);
    } else {
        let quit = Cell::new(false);
        let mut machine = Machine::new(options.tv, &sheet, |_| {});
        run(&mut machine, &options, &sheet, &quit);
    }
}

/// Logs a startup error and exits.
fn fail(e: impl fmt::Display) -> ! {
    error!("{}", e);
    process::exit(1);
}

#[cfg(feature = "window")]
fn run_windowed(options: &Options, sheet: &SpriteSheet) {
    use window::Screen;

    let mut screen = Screen::open("spritemux").unwrap_or_else(|e| fail(e));
    let creator = screen.texture_creator();
    let mut texture = Screen::frame_texture(&creator).unwrap_or_else(|e| fail(e));

    let quit = Cell::new(false);
    let mut machine = Machine::new(options.tv, sheet, |frame| {
        if !screen.present(&mut texture, frame) {
            quit.set(true);
        }
    });
    run(&mut machine, options, sheet, &quit);
}

#[cfg(not(feature = "window"))]
fn run_windowed(_options: &Options, _sheet: &SpriteSheet) {
    fail("built without the window feature, rebuild with --features window");
}

/// Places the creatures left to right at random heights.
fn spawn_creatures(
    machine: &mut Machine,
    sheet: &SpriteSheet,
    count: u8,
    seed: Option<u64>,
) -> Result<(), MuxError> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    for i in 0..count as u16 {
        let x = i * CREATURE_STRIDE + rng.gen_range(0..=20);
        let y = rng.gen_range(0..=42);
        debug!("creature {} at ({}, {})", i, x, y);
        machine.spawn_creature(sheet, x, y)?;
    }
    Ok(())
}

/// Runs frames until the frame limit is reached or the user quits.
fn run(machine: &mut Machine, options: &Options, sheet: &SpriteSheet, quit: &Cell<bool>) {
    if let Err(e) = spawn_creatures(machine, sheet, options.creatures, options.seed) {
        fail(e);
    }
    info!(
        "running {} creatures ({} sprites) on {:?}",
        options.creatures,
        machine.mux().len(),
        options.tv
    );

    let mut timer = Timer::new(options.tv.frame_rate());
    let mut frames: u64 = 0;
    while !quit.get() && (options.frames == 0 || frames < options.frames) {
        machine.step_frame();
        machine.foreground();
        frames += 1;

        if !options.unpaced {
            timer.wait_frame();
        }
    }

    info!("stopped after {} frames, clock at {}", frames, machine.clock());
}
