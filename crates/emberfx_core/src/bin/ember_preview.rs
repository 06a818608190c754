//! # Ember Preview
//!
//! Renders the ember field headlessly and writes the last frame as a PPM.
//!
//! Usage: `ember_preview <out.ppm> [--size WxH] [--dpr N] [--frames N] [--seed N] [--config file.toml]`

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use emberfx_core::{EffectsConfig, EffectsError, EmberRenderer, HostMetrics, Pixmap};

struct Options {
    output: PathBuf,
    width: f32,
    height: f32,
    dpr: f32,
    frames: u32,
    seed: Option<u64>,
    config: Option<PathBuf>,
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_options(args: &[String]) -> Option<Options> {
    let output = args.get(1).filter(|a| !a.starts_with("--"))?;
    let (width, height) = match flag(args, "--size") {
        Some(size) => {
            let (w, h) = size.split_once('x')?;
            (w.parse().ok()?, h.parse().ok()?)
        }
        None => (640.0, 360.0),
    };
    Some(Options {
        output: PathBuf::from(output),
        width,
        height,
        dpr: flag(args, "--dpr").and_then(|s| s.parse().ok()).unwrap_or(1.0),
        frames: flag(args, "--frames").and_then(|s| s.parse().ok()).unwrap_or(120),
        seed: flag(args, "--seed").and_then(|s| s.parse().ok()),
        config: flag(args, "--config").map(PathBuf::from),
    })
}

fn run(options: &Options) -> Result<(), EffectsError> {
    let mut config = match &options.config {
        Some(path) => EffectsConfig::load(path)?,
        None => EffectsConfig::default(),
    };
    if options.seed.is_some() {
        config.embers.seed = options.seed;
    }
    config.validate()?;

    let metrics = HostMetrics::new(options.width, options.height, options.dpr, options.width);
    let mut renderer = EmberRenderer::new(config.embers, false, Pixmap::new())?;
    renderer.initialize(&metrics)?;
    renderer.start();
    for _ in 0..options.frames {
        renderer.frame();
    }

    let pixmap = renderer.surface();
    let stats = renderer.frame_loop().stats();
    let field = renderer.field().stats();
    println!("┌─ PREVIEW ─────────────────────────────────────────────┐");
    println!("│ Surface:        {}x{} px", pixmap.width(), pixmap.height());
    println!("│ Scale:          {}x", pixmap.scale());
    println!("│ Particles:      {}", renderer.field().particle_count());
    println!("│ Frames:         {}", stats.frames);
    println!("│ Respawns:       {}", field.total_respawns);
    println!("│ Worst frame:    {} us", stats.worst_frame_time_us);
    println!("│ Over budget:    {}", stats.frames_over_budget);
    println!("│ Lit texels:     {}", pixmap.lit_texels());
    println!("└───────────────────────────────────────────────────────┘");

    let io_error = |source: std::io::Error| EffectsError::Io {
        path: options.output.clone(),
        source,
    };
    let file = File::create(&options.output).map_err(io_error)?;
    pixmap.write_ppm(BufWriter::new(file)).map_err(io_error)?;
    println!("Wrote {}", options.output.display());
    Ok(())
}

fn main() {
    println!("╔═══════════════════════════════════════════════════════╗");
    println!("║         EMBERFX PREVIEW                               ║");
    println!("╚═══════════════════════════════════════════════════════╝");
    println!();

    let args: Vec<String> = std::env::args().collect();
    let Some(options) = parse_options(&args) else {
        println!("Usage: ember_preview <out.ppm> [options]");
        println!();
        println!("Options:");
        println!("  --size WxH       Container size in CSS px (default 640x360)");
        println!("  --dpr N          Device pixel ratio (default 1)");
        println!("  --frames N       Frames to simulate (default 120)");
        println!("  --seed N         Generator seed");
        println!("  --config FILE    TOML effects configuration");
        std::process::exit(2);
    };

    if let Err(e) = run(&options) {
        println!("Error: {e}");
        std::process::exit(1);
    }
}
