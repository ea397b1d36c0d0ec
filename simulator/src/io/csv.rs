//! CSV export of sweep results, histograms and correlation curves.
//!
//! Missing values (undefined visibility, g² without coincidences) are
//! written as empty cells.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::analysis::correlation::CorrelationHistogram;
use crate::hardware::screen::Histogram;
use crate::sims::sweep::SweepOutcome;

/// Format a value without float noise from unit scaling, e.g. `0.5`
/// rather than `0.5000000000000001`.
pub fn format_value(value: f64) -> String {
    let text = format!("{value:.9}");
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn optional_cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.6}")).unwrap_or_default()
}

/// One row per sweep point: swept values in display units, then visibility.
pub fn write_sweep_csv<W: Write>(mut writer: W, outcome: &SweepOutcome) -> io::Result<()> {
    let mut header: Vec<&str> = outcome.axes.iter().map(|p| p.column_name()).collect();
    header.push("visibility");
    writeln!(writer, "{}", header.join(","))?;

    for point in &outcome.points {
        let mut cells: Vec<String> = point
            .parameters
            .iter()
            .map(|(parameter, value)| format_value(value * parameter.display_scale()))
            .collect();
        cells.push(optional_cell(point.visibility));
        writeln!(writer, "{}", cells.join(","))?;
    }
    writer.flush()
}

/// Bin positions in mm with raw and smoothed counts.
///
/// `smoothed` must have one value per bin.
pub fn write_histogram_csv<W: Write>(
    mut writer: W,
    histogram: &Histogram,
    smoothed: &[f64],
) -> io::Result<()> {
    if smoothed.len() != histogram.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "smoothed profile has {} values for {} bins",
                smoothed.len(),
                histogram.len()
            ),
        ));
    }

    writeln!(writer, "position_mm,counts,smoothed_counts")?;
    let positions = histogram.grid().positions();
    for ((position, count), smooth) in positions.iter().zip(histogram.counts()).zip(smoothed) {
        writeln!(
            writer,
            "{},{},{:.6}",
            format_value(position * 1e3),
            count,
            smooth
        )?;
    }
    writer.flush()
}

/// Delay bins with coincidence counts and g².
pub fn write_correlation_csv<W: Write>(
    mut writer: W,
    correlation: &CorrelationHistogram,
) -> io::Result<()> {
    writeln!(writer, "tau_s,counts,g2")?;
    for (i, (tau, count)) in correlation.tau.iter().zip(&correlation.counts).enumerate() {
        let g2 = correlation.g2.as_ref().map(|g| g[i]);
        writeln!(writer, "{},{},{}", format_value(*tau), count, optional_cell(g2))?;
    }
    writer.flush()
}

/// Create `path` and write the sweep CSV to it.
pub fn save_sweep_csv(path: &Path, outcome: &SweepOutcome) -> io::Result<()> {
    write_sweep_csv(BufWriter::new(File::create(path)?), outcome)
}

/// Create `path` and write the histogram CSV to it.
pub fn save_histogram_csv(path: &Path, histogram: &Histogram, smoothed: &[f64]) -> io::Result<()> {
    write_histogram_csv(BufWriter::new(File::create(path)?), histogram, smoothed)
}

/// Create `path` and write the correlation CSV to it.
pub fn save_correlation_csv(path: &Path, correlation: &CorrelationHistogram) -> io::Result<()> {
    write_correlation_csv(BufWriter::new(File::create(path)?), correlation)
}
