use std::path::PathBuf;

use anyhow::{ Context, Result };
use clap::Parser;
use log::{ info, LevelFilter };

use whitted_tracer::consts::{
    DEFAULT_MAX_DEPTH, SCENE_MAX_LUMINANCE, DISPLAY_MAX_LUMINANCE, OUT_FILE,
};
use whitted_tracer::scene::Scene;
use whitted_tracer::tracer::Raytracer;
use whitted_tracer::tone::{ ToneOperator, ToneReproducer };

#[derive(Debug, Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// JSON scene description to render
    #[clap(value_parser)]
    scene: PathBuf,

    /// Maximum recursion depth; rays traced at this depth see the background
    #[clap(short, long, value_parser = clap::value_parser!(u32).range(1..),
        default_value_t = DEFAULT_MAX_DEPTH as u32)]
    depth: u32,

    /// Tone reproduction operator (ward or reinhard); none if omitted
    #[clap(short = 'a', long, value_parser)]
    tone: Option<ToneOperator>,

    /// Scene maximum luminance, used to scale the rendered image
    #[clap(short, long, value_parser, default_value_t = SCENE_MAX_LUMINANCE)]
    lmax: f64,

    /// Display maximum luminance
    #[clap(long, value_parser, default_value_t = DISPLAY_MAX_LUMINANCE)]
    ldmax: f64,

    /// Output PPM image
    #[clap(short, long, value_parser, default_value = OUT_FILE)]
    output: PathBuf,

    /// Also write the loaded scene, with every default filled in, as JSON
    #[clap(long, value_parser)]
    write_scene: Option<PathBuf>,

    /// Only log warnings and errors
    #[clap(short, long)]
    quiet: bool,
}

/// Initialize the logger; `RUST_LOG` takes precedence over `level`.
fn init_logger(level: LevelFilter) {
    let mut builder = env_logger::Builder::from_default_env();

    if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(level);
    }

    builder.init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logger(if args.quiet { LevelFilter::Warn } else { LevelFilter::Info });

    let scene = Scene::load(&args.scene)
        .with_context(|| format!("failed to load scene {}", args.scene.display()))?;

    if let Some(path) = &args.write_scene {
        scene.save(path)
            .with_context(|| format!("failed to write scene {}", path.display()))?;
    }

    let tracer = Raytracer::new(args.depth as usize);
    let mut canvas = tracer.trace_scene(&scene);

    if let Some(operator) = args.tone {
        ToneReproducer::new(args.lmax, args.ldmax).apply(&mut canvas, operator);
    }

    canvas.save(&args.output)
        .with_context(|| format!("failed to write image {}", args.output.display()))?;

    info!("Wrote {}", args.output.display());

    Ok(())
}
