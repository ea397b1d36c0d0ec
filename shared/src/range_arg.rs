//! Type-safe grid arguments for parameter sweeps.
//!
//! Provides clap-compatible types for command-line sweep axes. An axis can be
//! given either as an inclusive range (`start:stop:step`) or as an explicit
//! comma-separated list of values (`0.5,1.0,2.0`).

use std::fmt;
use std::str::FromStr;

/// Parse a parameter sweep range specification.
///
/// Converts a colon-separated range string into a validated
/// (start, stop, step) tuple.
///
/// # Format
/// `"start:stop:step"`, stop inclusive, step non-zero and pointing from
/// start towards stop.
///
/// # Examples
/// Valid: `"0.0:10.0:1.0"`, `"10.0:0.0:-1.0"`
///
/// Invalid: `"1.0:2.0"` (missing step), `"1.0:2.0:0.0"` (zero step),
/// `"5.0:1.0:1.0"` (wrong direction)
pub fn parse_range(s: &str) -> Result<(f64, f64, f64), String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 {
        return Err("Range must be in format 'start:stop:step'".to_string());
    }

    let start = parts[0]
        .trim()
        .parse::<f64>()
        .map_err(|_| "Invalid start value".to_string())?;
    let stop = parts[1]
        .trim()
        .parse::<f64>()
        .map_err(|_| "Invalid stop value".to_string())?;
    let step = parts[2]
        .trim()
        .parse::<f64>()
        .map_err(|_| "Invalid step value".to_string())?;

    if step == 0.0 {
        return Err("Step cannot be zero".to_string());
    }

    if step > 0.0 && start > stop {
        return Err("For positive step, start must not exceed stop".to_string());
    }

    if step < 0.0 && start < stop {
        return Err("For negative step, start must not be below stop".to_string());
    }

    Ok((start, stop, step))
}

/// Parse a comma-separated list of values, e.g. `"0, 5e-6, 10e-6"`.
pub fn parse_list(s: &str) -> Result<Vec<f64>, String> {
    let values = s
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| format!("Invalid list value '{}'", part.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if values.is_empty() {
        return Err("List must contain at least one value".to_string());
    }
    Ok(values)
}

/// Expand an inclusive (start, stop, step) range into its values.
///
/// Values are computed as `start + i * step` rather than by repeated
/// addition so long ranges do not accumulate rounding drift. A small
/// tolerance keeps the stop value when it is hit up to rounding.
pub fn expand_range(start: f64, stop: f64, step: f64) -> Result<Vec<f64>, String> {
    if step == 0.0 {
        return Err("Step size cannot be zero".to_string());
    }

    if stop > start && step < 0.0 {
        return Err(format!(
            "Invalid range: stop ({stop}) > start ({start}) but step ({step}) is not positive"
        ));
    }

    if stop < start && step > 0.0 {
        return Err(format!(
            "Invalid range: stop ({stop}) < start ({start}) but step ({step}) is not negative"
        ));
    }

    let span = (stop - start) / step;
    let count = (span + 1e-9).floor() as usize + 1;
    Ok((0..count).map(|i| start + i as f64 * step).collect())
}

/// One axis of a parameter sweep.
///
/// Parses from either `start:stop:step` or `a,b,c`. A bare number is a
/// one-element list.
#[derive(Debug, Clone, PartialEq)]
pub enum GridArg {
    /// Inclusive range
    Range { start: f64, stop: f64, step: f64 },
    /// Explicit values in the given order
    List(Vec<f64>),
}

impl FromStr for GridArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains(':') {
            let (start, stop, step) = parse_range(s)?;
            Ok(GridArg::Range { start, stop, step })
        } else {
            Ok(GridArg::List(parse_list(s)?))
        }
    }
}

impl fmt::Display for GridArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridArg::Range { start, stop, step } => write!(f, "{start}:{stop}:{step}"),
            GridArg::List(values) => {
                let joined: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", joined.join(","))
            }
        }
    }
}

impl GridArg {
    /// All values of the axis, in sweep order.
    pub fn values(&self) -> Result<Vec<f64>, String> {
        match self {
            GridArg::Range { start, stop, step } => expand_range(*start, *stop, *step),
            GridArg::List(values) => Ok(values.clone()),
        }
    }

    /// The same axis with every value multiplied by `factor`.
    ///
    /// Used to turn display units (mm, µs, ...) into SI at the CLI boundary.
    pub fn scaled(&self, factor: f64) -> GridArg {
        match self {
            GridArg::Range { start, stop, step } => GridArg::Range {
                start: start * factor,
                stop: stop * factor,
                step: step * factor,
            },
            GridArg::List(values) => GridArg::List(values.iter().map(|v| v * factor).collect()),
        }
    }
}
