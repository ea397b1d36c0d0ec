//! End-to-end checks of runs, sweeps and CSV export through the public API

use fringe_sim::io::save_sweep_csv;
use fringe_sim::sims::sweep::PointStatus;
use fringe_sim::{
    run_simulation, CancellationToken, SimulationConfig, SimulationRun, SweepAxis,
    SweepController, SweepParameter, VisibilityAnalyzer,
};
use std::fs;
use tempfile::tempdir;

fn quick_aperture() -> SimulationConfig {
    let mut config = SimulationConfig::aperture_preset();
    config.source.num_pulses = 5_000;
    config
}

fn standard_axes() -> Vec<SweepAxis> {
    vec![
        SweepAxis::new(SweepParameter::AngularSpread, vec![0.5e-3, 1e-3, 2e-3]),
        SweepAxis::new(SweepParameter::SlitSeparation, vec![0.5e-3, 1e-3, 2e-3]),
        SweepAxis::new(SweepParameter::DeadTime, vec![0.0, 5e-6, 10e-6, 20e-6]),
    ]
}

#[test]
fn test_standard_sweep_writes_every_point() {
    let controller = SweepController::new(quick_aperture(), standard_axes()).unwrap();
    assert_eq!(controller.num_points(), 36);

    let outcome = controller.run(&CancellationToken::new()).unwrap();
    assert!(outcome.is_complete());
    let indices: Vec<usize> = outcome.points.iter().map(|p| p.index).collect();
    assert_eq!(indices, (0..36).collect::<Vec<_>>());

    for point in &outcome.points {
        if point.status == PointStatus::Completed {
            assert!(point.visibility.is_some());
        } else {
            assert_eq!(point.visibility, None);
        }
        if let Some(v) = point.visibility {
            assert!((0.0..=1.0).contains(&v), "visibility {v} out of range");
        }
    }

    let dir = tempdir().unwrap();
    let path = dir.path().join("sweep.csv");
    save_sweep_csv(&path, &outcome).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "angular_spread_mrad,slit_separation_mm,dark_time_us,visibility"
    );
    assert_eq!(lines.len(), 37);
    assert!(lines[1].starts_with("0.5,0.5,0,"));
    assert!(lines[36].starts_with("2,2,20,"));
    assert!(lines[1..].iter().all(|l| l.split(',').count() == 4));
}

#[test]
fn test_sweep_is_reproducible() {
    let axes = vec![SweepAxis::new(SweepParameter::DeadTime, vec![0.0, 10e-6])];
    let token = CancellationToken::new();
    let a = SweepController::new(quick_aperture(), axes.clone())
        .unwrap()
        .run(&token)
        .unwrap();
    let b = SweepController::new(quick_aperture(), axes)
        .unwrap()
        .with_parallel(false)
        .run(&token)
        .unwrap();
    assert_eq!(a.points, b.points);
}

#[test]
fn test_cancelled_before_start_returns_nothing() {
    let controller = SweepController::new(quick_aperture(), standard_axes()).unwrap();
    let token = CancellationToken::new();
    token.cancel();
    let outcome = controller.run(&token).unwrap();
    assert!(outcome.points.is_empty());
    assert!(outcome.cancelled);
    assert_eq!(outcome.total_points, 36);
}

#[test]
fn test_incremental_snapshots_match_single_run() {
    let mut config = SimulationConfig::default();
    config.source.num_pulses = 8_000;

    let mut run = SimulationRun::from_config(&config).unwrap();
    let mut snapshots = Vec::new();
    while !run.is_exhausted() {
        snapshots.push(run.advance_accepted(500).total());
    }
    assert!(snapshots.windows(2).all(|w| w[0] <= w[1]));

    let incremental = run.finish().unwrap();
    let single = run_simulation(&config).unwrap();
    assert_eq!(incremental.histogram, single.histogram);
    assert_eq!(incremental.stats, single.stats);
}

#[test]
fn test_interference_run_has_measurable_fringes() {
    let mut config = SimulationConfig::default();
    config.source.num_pulses = 60_000;
    config.detector.dark_rate = 0.0;
    // 4 mm fringes, about ten across the screen
    config.geometry.slit_separation = 200e-6;
    config.analysis.window_lo = -0.02;
    config.analysis.window_hi = 0.02;

    let outcome = run_simulation(&config).unwrap();
    let report = VisibilityAnalyzer::new(config.analysis.clone())
        .unwrap()
        .analyze(&outcome.histogram);

    assert!(!report.peaks.is_empty());
    let visibility = report.visibility.unwrap();
    assert!(visibility > 0.5 && visibility <= 1.0);
}
