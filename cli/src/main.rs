mod args;
mod device;

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use args::Args;
use clap::Parser;
use namegen_core::{
    generator::{GenerationRequest, NameGenerator},
    run::load_run,
};
use rand::{SeedableRng, rngs::StdRng};

fn main() -> Result<()> {
    let args = Args::parse();
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let seed = args.seed.unwrap_or(timestamp);
    let mut rng = StdRng::seed_from_u64(seed);
    let device = args.device.to_candle_device()?;
    println!("Using {} for inference.", args.device);

    let run = load_run(&args.meta, &args.weights, &device)
        .with_context(|| format!("loading run from {} and {}", args.meta, args.weights))?;
    println!(
        "Loaded run with {} symbols and {} countries.",
        run.vocab.len(),
        run.countries.len()
    );

    let generator = NameGenerator::new(&run.model, &run.vocab, &run.countries);
    let request = GenerationRequest {
        country_code: args.country.clone(),
        gender: args.gender.clone(),
        seed: args.start_with.clone(),
        max_len: args.max_len,
    };

    for _ in 0..args.count {
        let name = generator.generate(&request, &mut rng)?;
        println!("{name}");
    }

    Ok(())
}
