//! Host runner: the full frame loop against heap buffers and a simulated
//! panel, with timings on the log.
//!
//! `PRESTO_SCENE` picks `sprites` (default) or `paint`; `PRESTO_CLEAR`
//! picks the clear policy (`none`, `damage`, `fill`, `canvas`).
use std::convert::Infallible;
use std::env;
use std::error::Error;
use std::process;
use std::time::Duration;

use presto_scanout::clock::StdClock;
use presto_scanout::display::sim::{spawn_scanout, CaptureLink};
use presto_scanout::display::SwapChain;
use presto_scanout::input::{NoInput, Sample, ScriptedInput};
use presto_scanout::memory::HeapMemory;
use presto_scanout::scene::{BouncingSprites, TouchPaint, XorShift32};
use presto_scanout::{DemoConfig, DisplayConfig, FrameLoop};

/// Polls between two-finger taps in the synthetic paint session
const CLEAR_EVERY: usize = 1500;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let display = DisplayConfig::presto();
    let mut demo = DemoConfig::default();
    if let Ok(name) = env::var("PRESTO_CLEAR") {
        match name.parse() {
            Ok(policy) => demo.clear_policy = policy,
            Err(e) => {
                log::error!("PRESTO_CLEAR={}: {}", name, e);
                process::exit(2);
            }
        }
    }
    let scene = env::var("PRESTO_SCENE").unwrap_or_else(|_| String::from("sprites"));

    let Err(e) = run(&display, &demo, &scene);
    log::error!("boot failed: {}", e);
    process::exit(1);
}

fn run(display: &DisplayConfig, demo: &DemoConfig, scene: &str) -> Result<Infallible, Box<dyn Error>> {
    display.validate()?;
    demo.validate(display)?;

    let mut memory = HeapMemory::new();
    let (chain, engine) = SwapChain::allocate(&mut memory, display, demo.background, CaptureLink::new(0))?;
    let period = Duration::from_micros(display.frame_period_us());
    let _scanout = spawn_scanout(engine, period)?;

    let mut rng = XorShift32::new(demo.seed);
    let depth = display.pipeline_depth();
    match scene {
        "sprites" => {
            let sprites = BouncingSprites::spawn(
                demo.sprite_count,
                demo.footprint,
                display.width,
                display.height,
                depth,
                &mut rng,
            );
            FrameLoop::new(chain, sprites, NoInput, StdClock::new(), demo.clear_policy, demo.background).run()
        }
        "paint" => {
            let paint = TouchPaint::new(display.width, display.height, depth, rng);
            let input = ScriptedInput::new(finger_path(display.width, display.height));
            FrameLoop::new(chain, paint, input, StdClock::new(), demo.clear_policy, demo.background).run()
        }
        other => Err(format!("unknown scene {:?} (expected sprites or paint)", other).into()),
    }
}

/// A finger circling the panel on a slowly shrinking orbit, with an
/// occasional second finger to wipe the drawing
fn finger_path(width: u32, height: u32) -> Vec<Sample> {
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    (0..CLEAR_EVERY * 4)
        .map(|i| {
            let t = i as f32 * 0.05;
            let r = cx.min(cy) * (0.3 + 0.6 * ((i % CLEAR_EVERY) as f32 / CLEAR_EVERY as f32));
            let finger = ((cx + r * t.cos()) as i16, (cy + r * (1.3 * t).sin()) as i16);
            let second = (i % CLEAR_EVERY == CLEAR_EVERY - 1).then_some((cx as i16, (cy + 40.0) as i16));
            [Some(finger), second]
        })
        .collect()
}
