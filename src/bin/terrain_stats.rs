//! Seed sweep: prints the terrain-type distribution over many seeds, for
//! tuning bands and shaping parameters.

use std::collections::BTreeMap;

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use hexworld::{GenerationConfig, HexWorld, TerrainType};

#[derive(Parser, Debug)]
#[command(name = "terrain_stats")]
#[command(about = "Sweep seeds and report terrain distributions")]
struct Args {
    /// Number of worlds to generate
    #[arg(short = 'n', long, default_value = "32")]
    count: usize,

    /// Seed of the sweep itself
    #[arg(long, default_value = "12345")]
    sweep_seed: u64,

    /// Grid radius of every world
    #[arg(short, long, default_value = "20")]
    radius: u32,

    /// Submerged fraction of the height range
    #[arg(short, long, default_value = "0.3")]
    water_level: f64,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let config = GenerationConfig {
        radius: args.radius,
        water_level: args.water_level,
        ..Default::default()
    };
    if let Err(e) = config.validate() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(args.sweep_seed);
    let mut totals: BTreeMap<TerrainType, usize> = BTreeMap::new();
    let mut tile_total = 0usize;
    let mut worlds_with_snow = 0usize;
    let mut anomalies = 0u64;

    println!("=== TERRAIN SWEEP ({} worlds, radius {}, water {}) ===",
        args.count, args.radius, args.water_level);
    println!("{:>12}  {:>6}  {}", "seed", "water%", "distribution");

    for _ in 0..args.count {
        let seed = rng.gen_range(0.0..1_000_000.0f64).floor();
        let world = match HexWorld::generate(&config, seed) {
            Ok(world) => world,
            Err(e) => {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        };

        let counts = world.terrain_counts();
        if counts.contains_key(&TerrainType::Snow) {
            worlds_with_snow += 1;
        }
        anomalies += world.anomalies.total();
        tile_total += world.tiles.len();

        let line: Vec<String> = counts
            .iter()
            .map(|(terrain, count)| format!("{}{}", terrain.symbol(), count))
            .collect();
        println!("{:>12}  {:>5.1}%  {}", seed, world.water_fraction() * 100.0, line.join(" "));

        for (terrain, count) in counts {
            *totals.entry(terrain).or_insert(0) += count;
        }
    }

    println!();
    println!("TOTALS:");
    for terrain in TerrainType::ALL {
        let count = totals.get(&terrain).copied().unwrap_or(0);
        let pct = 100.0 * count as f64 / tile_total.max(1) as f64;
        println!("  {} {:<7} {:>9} ({:.1}%)", terrain.symbol(), terrain.name(), count, pct);
    }
    println!("Worlds with snow: {}/{}", worlds_with_snow, args.count);
    if anomalies > 0 {
        println!("Numeric anomalies: {}", anomalies);
    }
}
