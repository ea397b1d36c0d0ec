//! Two-detector coincidence experiment
//!
//! Splits a Poisson or anti-bunched pulse train between two detectors and
//! histograms the delays between their detections to estimate g²(τ).

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use fringe_sim::io::save_correlation_csv;
use fringe_sim::sims::coincidence::{run_coincidence, CoincidenceConfig, CoincidenceSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    Poisson,
    Antibunched,
}

/// Command line arguments for the coincidence experiment
#[derive(Parser, Debug)]
#[command(
    name = "Coincidence",
    about = "Estimates g2(tau) from two detectors behind a beamsplitter",
    long_about = None
)]
struct Args {
    /// Light source statistics
    #[arg(long, value_enum, default_value_t = SourceKind::Poisson)]
    source: SourceKind,

    /// Number of source pulses
    #[arg(long, default_value_t = 1000)]
    num_pulses: usize,

    /// Poisson pulse rate in Hz
    #[arg(long, default_value_t = 20.0)]
    rate: f64,

    /// Minimum pulse spacing of the anti-bunched source in seconds
    #[arg(long, default_value_t = 0.1)]
    min_separation: f64,

    /// Extra anti-bunched spacing jitter range in seconds (format: "lo,hi")
    #[arg(long, default_value = "0.05,0.15", value_parser = parse_pair)]
    jitter: (f64, f64),

    /// Detection probability of each detector
    #[arg(long, default_value_t = 0.7)]
    efficiency: f64,

    /// Dead time of each detector in seconds
    #[arg(long, default_value_t = 0.05)]
    dead_time: f64,

    /// Largest delay histogrammed in seconds
    #[arg(long, default_value_t = 1.0)]
    window: f64,

    /// Delay bin width in seconds
    #[arg(long, default_value_t = 0.01)]
    bin_width: f64,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Output CSV file path
    #[arg(long, default_value = "g2.csv")]
    output_csv: PathBuf,
}

fn parse_pair(s: &str) -> Result<(f64, f64), String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        return Err("Expected two values in format 'lo,hi'".to_string());
    }
    let lo = parts[0]
        .trim()
        .parse::<f64>()
        .map_err(|_| "Invalid lower value".to_string())?;
    let hi = parts[1]
        .trim()
        .parse::<f64>()
        .map_err(|_| "Invalid upper value".to_string())?;
    Ok((lo, hi))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let source = match args.source {
        SourceKind::Poisson => CoincidenceSource::Poisson { rate: args.rate },
        SourceKind::Antibunched => CoincidenceSource::Antibunched {
            min_separation: args.min_separation,
            jitter_lo: args.jitter.0,
            jitter_hi: args.jitter.1,
        },
    };
    let config = CoincidenceConfig {
        num_pulses: args.num_pulses,
        source,
        efficiency: args.efficiency,
        dead_time: args.dead_time,
        jitter_std: 0.0,
        window: args.window,
        bin_width: args.bin_width,
        seed: args.seed,
    };

    let outcome = run_coincidence(&config)?;
    println!("Pulses:        {}", outcome.emitted);
    println!("Detector A:    {}", outcome.detector_a.len());
    println!("Detector B:    {}", outcome.detector_b.len());
    println!("Coincidences:  {}", outcome.correlation.total());
    match outcome.correlation.g2_at_zero() {
        Some(g2) => println!("g2(0):         {g2:.3}"),
        None => println!("g2(0):         undefined (no coincidences)"),
    }

    save_correlation_csv(&args.output_csv, &outcome.correlation)
        .with_context(|| format!("writing {}", args.output_csv.display()))?;
    println!("Results written to {}", args.output_csv.display());

    Ok(())
}
