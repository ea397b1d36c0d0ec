//! Single double-slit run
//!
//! Simulates one configuration pulse by pulse, optionally logging the
//! histogram build-up in frames, then prints run statistics and the fringe
//! visibility and writes the final histogram to CSV.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use fringe_sim::io::save_histogram_csv;
use fringe_sim::shared_args::SimulationArgs;
use fringe_sim::{SimulationConfig, SimulationRun, VisibilityAnalyzer};
use log::info;

/// Command line arguments for a single run
#[derive(Parser, Debug)]
#[command(
    name = "Double Slit",
    about = "Builds a double-slit detection pattern one photon pulse at a time",
    long_about = None
)]
struct Args {
    #[command(flatten)]
    sim: SimulationArgs,

    /// Split the run into this many frames and log the build-up
    #[arg(long)]
    frames: Option<usize>,

    /// Output CSV of the final histogram
    #[arg(long)]
    output_csv: Option<PathBuf>,

    /// Write the resolved configuration as JSON
    #[arg(long)]
    save_config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = args.sim.to_config(SimulationConfig::default())?;
    if let Some(path) = &args.save_config {
        config
            .to_json_file(path)
            .with_context(|| format!("writing config to {}", path.display()))?;
    }

    println!(
        "Model: {}, {} pulses at {:.0} Hz, seed {}",
        config.model, config.source.num_pulses, config.source.pulse_rate, config.seed
    );

    let analyzer = VisibilityAnalyzer::new(config.analysis.clone())?;
    let mut run = SimulationRun::from_config(&config)?;

    if let Some(frames) = args.frames.filter(|&f| f > 0) {
        let per_frame = config.source.num_pulses.div_ceil(frames);
        for frame in 0..frames {
            let total = run.advance_emitted(per_frame).total();
            info!(
                "Frame {}/{}: {} detections after {} pulses",
                frame + 1,
                frames,
                total,
                run.stats().emitted
            );
            if run.is_exhausted() {
                break;
            }
        }
    }

    let outcome = run.finish()?;
    let report = analyzer.analyze(&outcome.histogram);
    let stats = &outcome.stats;

    println!("Emitted:   {}", stats.emitted);
    println!("Accepted:  {}", stats.accepted);
    println!("Dropped:   {} (dead time)", stats.dropped);
    println!("Missed:    {} (efficiency)", stats.missed);
    println!("Blocked:   {}", stats.blocked);
    println!("Dark:      {}", outcome.dark_counts);
    println!("Duration:  {:.6} s", outcome.total_duration);
    if outcome.degenerate {
        println!("Detection distribution was degenerate; histogram holds dark counts only");
    }
    println!("Peaks:     {}", report.peaks.len());
    println!("Valleys:   {}", report.valleys.len());
    match report.visibility {
        Some(v) => println!("Visibility: {v:.4}"),
        None => println!("Visibility: undefined"),
    }

    if let Some(path) = &args.output_csv {
        save_histogram_csv(path, &outcome.histogram, &report.smoothed)
            .with_context(|| format!("writing histogram to {}", path.display()))?;
        println!("Histogram written to {}", path.display());
    }

    Ok(())
}
