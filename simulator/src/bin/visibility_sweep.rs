//! Visibility sweep over source spread, slit separation and dead time
//!
//! Runs the aperture model over the Cartesian product of the three axes and
//! writes one CSV row per grid point.

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;
use fringe_sim::io::save_sweep_csv;
use fringe_sim::shared_args::SimulationArgs;
use fringe_sim::{CancellationToken, SimulationConfig, SweepAxis, SweepController, SweepParameter};
use indicatif::{ProgressBar, ProgressStyle};
use shared::range_arg::GridArg;
use shared::units::{Interval, IntervalExt, Length, LengthExt, PlaneAngle, PlaneAngleExt};

/// Command line arguments for the visibility sweep
#[derive(Parser, Debug)]
#[command(
    name = "Visibility Sweep",
    about = "Maps fringe visibility over source spread, slit separation and dead time",
    long_about = None
)]
struct Args {
    #[command(flatten)]
    sim: SimulationArgs,

    /// Angular spreads in milliradians (list "a,b,c" or range "start:stop:step")
    #[arg(long, default_value = "0.5,1,2")]
    angular_spreads: GridArg,

    /// Slit separations in millimeters
    #[arg(long, default_value = "0.5,1,2")]
    slit_separations: GridArg,

    /// Detector dead times in microseconds
    #[arg(long, default_value = "0,5,10,20")]
    dead_times: GridArg,

    /// Output CSV file path
    #[arg(long, default_value = "visibility_sweep.csv")]
    output_csv: PathBuf,

    /// Run sweep points serially instead of in parallel
    #[arg(long, default_value_t = false)]
    serial: bool,
}

fn axis_values(arg: &GridArg, to_si: impl Fn(f64) -> f64) -> anyhow::Result<Vec<f64>> {
    let values = arg.values().map_err(|e| anyhow!("invalid grid '{arg}': {e}"))?;
    Ok(values.into_iter().map(to_si).collect())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let base = args.sim.to_config(SimulationConfig::aperture_preset())?;

    let axes = vec![
        SweepAxis::new(
            SweepParameter::AngularSpread,
            axis_values(&args.angular_spreads, |mrad| {
                PlaneAngle::from_milliradians(mrad).as_radians()
            })?,
        ),
        SweepAxis::new(
            SweepParameter::SlitSeparation,
            axis_values(&args.slit_separations, |mm| {
                Length::from_millimeters(mm).as_meters()
            })?,
        ),
        SweepAxis::new(
            SweepParameter::DeadTime,
            axis_values(&args.dead_times, |us| {
                Interval::from_microseconds(us).as_seconds()
            })?,
        ),
    ];

    let controller = SweepController::new(base.clone(), axes)?
        .with_seed(base.seed)
        .with_parallel(!args.serial);

    println!(
        "Sweeping {} points ({} pulses each, seed {})",
        controller.num_points(),
        base.source.num_pulses,
        base.seed
    );

    let progress_style = ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .context("building progress style")?
        .progress_chars("█▉▊▋▌▍▎▏ ");
    let pb = ProgressBar::new(controller.num_points() as u64);
    pb.set_style(progress_style);
    pb.set_message("Sweep");

    let cancel = CancellationToken::new();
    let outcome = controller.run_with_progress(&cancel, |_| pb.inc(1))?;
    pb.finish_with_message("Sweep complete!");

    let undefined = outcome
        .points
        .iter()
        .filter(|p| p.visibility.is_none())
        .count();
    if undefined > 0 {
        println!("{undefined} points have undefined visibility (empty CSV cells)");
    }

    save_sweep_csv(&args.output_csv, &outcome)
        .with_context(|| format!("writing {}", args.output_csv.display()))?;
    println!("Results written to {}", args.output_csv.display());

    Ok(())
}
