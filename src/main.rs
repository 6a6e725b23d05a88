use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use hexworld::error::HexworldError;
use hexworld::{ascii, export, GenerationConfig, HexWorld};

#[derive(Parser, Debug)]
#[command(name = "hexworld")]
#[command(about = "Generate procedural hex terrain maps")]
struct Args {
    /// Number of rings around the center tile
    #[arg(short, long)]
    radius: Option<u32>,

    /// World-space size of one hex
    #[arg(long)]
    hex_size: Option<f64>,

    /// Vertical scale of the terrain
    #[arg(long)]
    grid_height: Option<f64>,

    /// Feature size; larger values give broader landmasses
    #[arg(long)]
    noise_scale: Option<f64>,

    /// Frequency multiplier of the detail octave
    #[arg(long)]
    noise_detail: Option<f64>,

    /// Blend weight of the detail octave
    #[arg(long)]
    noise_fuzziness: Option<f64>,

    /// Submerged fraction of the height range, 0 to 1
    #[arg(short, long)]
    water_level: Option<f64>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long, allow_negative_numbers = true)]
    seed: Option<f64>,

    /// JSON config file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write tiles as JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write a PNG map to this path
    #[arg(long)]
    png: Option<PathBuf>,

    /// PNG pixels per world unit
    #[arg(long, default_value = "16")]
    png_scale: f64,

    /// Print the map as ASCII
    #[arg(long)]
    ascii: bool,

    /// Disable cliff detection
    #[arg(long)]
    no_cliffs: bool,

    /// Disable plateau smoothing
    #[arg(long)]
    no_plateaus: bool,
}

impl Args {
    /// Base config (file or defaults) with command line overrides applied
    fn build_config(&self) -> Result<GenerationConfig, HexworldError> {
        let mut config = match &self.config {
            Some(path) => GenerationConfig::load_json(path)?,
            None => GenerationConfig::default(),
        };

        if let Some(v) = self.radius {
            config.radius = v;
        }
        if let Some(v) = self.hex_size {
            config.hex_size = v;
        }
        if let Some(v) = self.grid_height {
            config.grid_height = v;
        }
        if let Some(v) = self.noise_scale {
            config.noise_scale = v;
        }
        if let Some(v) = self.noise_detail {
            config.noise_detail = v;
        }
        if let Some(v) = self.noise_fuzziness {
            config.noise_fuzziness = v;
        }
        if let Some(v) = self.water_level {
            config.water_level = v;
        }
        if self.no_cliffs {
            config.classifier.cliffs = false;
        }
        if self.no_plateaus {
            config.classifier.plateaus = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn run(args: &Args) -> Result<(), HexworldError> {
    let config = args.build_config()?;
    let seed = args.seed.unwrap_or_else(|| rand::random::<u32>() as f64);

    log::info!(
        "Generating hex world: radius {}, water level {}, seed {}",
        config.radius,
        config.water_level,
        seed
    );
    let world = HexWorld::generate(&config, seed)?;

    if args.ascii {
        print!("{}", ascii::render(&world));
        println!();
        print!("{}", ascii::legend());
    }
    print!("{}", ascii::summary(&world));

    if let Some(path) = &args.json {
        export::write_json(&world, path)?;
    }
    if let Some(path) = &args.png {
        export::write_png(&world, path, args.png_scale)?;
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
