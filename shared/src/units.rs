//! Type-safe physical units for the CLI and configuration boundary
//!
//! This module wraps the `uom` crate so user-facing values given in
//! convenient units (nm, µm, mm, ns, µs) are converted to the SI floats the
//! simulation core works with, without hand-written scale factors scattered
//! through the binaries.

use uom::si::angle::radian;
use uom::si::f64::*;
use uom::si::length::{meter, micrometer, millimeter, nanometer};
use uom::si::time::{microsecond, nanosecond, second};

/// Type alias for length measurements
pub type Length = uom::si::f64::Length;

/// Type alias for time intervals
pub type Interval = Time;

/// Type alias for plane angles
pub type PlaneAngle = Angle;

/// Extension trait for length conversions commonly used in optics
pub trait LengthExt {
    /// Create length from nanometers (wavelengths)
    fn from_nanometers(nm: f64) -> Self;

    /// Get length in nanometers
    fn as_nanometers(&self) -> f64;

    /// Create length from micrometers (slit widths)
    fn from_micrometers(um: f64) -> Self;

    /// Get length in micrometers
    fn as_micrometers(&self) -> f64;

    /// Create length from millimeters
    fn from_millimeters(mm: f64) -> Self;

    /// Get length in millimeters
    fn as_millimeters(&self) -> f64;

    /// Create length from meters
    fn from_meters(m: f64) -> Self;

    /// Get length in meters
    fn as_meters(&self) -> f64;
}

/// Extension trait for detector timing conversions
pub trait IntervalExt {
    /// Create interval from nanoseconds (jitter, dead time)
    fn from_nanoseconds(ns: f64) -> Self;

    /// Get interval in nanoseconds
    fn as_nanoseconds(&self) -> f64;

    /// Create interval from microseconds
    fn from_microseconds(us: f64) -> Self;

    /// Get interval in microseconds
    fn as_microseconds(&self) -> f64;

    /// Create interval from seconds
    fn from_seconds(s: f64) -> Self;

    /// Get interval in seconds
    fn as_seconds(&self) -> f64;
}

/// Extension trait for small emission angles
pub trait PlaneAngleExt {
    /// Create angle from milliradians
    fn from_milliradians(mrad: f64) -> Self;

    /// Get angle in milliradians
    fn as_milliradians(&self) -> f64;

    /// Get angle in radians
    fn as_radians(&self) -> f64;
}

impl LengthExt for Length {
    fn from_nanometers(nm: f64) -> Self {
        Length::new::<nanometer>(nm)
    }

    fn as_nanometers(&self) -> f64 {
        self.get::<nanometer>()
    }

    fn from_micrometers(um: f64) -> Self {
        Length::new::<micrometer>(um)
    }

    fn as_micrometers(&self) -> f64 {
        self.get::<micrometer>()
    }

    fn from_millimeters(mm: f64) -> Self {
        Length::new::<millimeter>(mm)
    }

    fn as_millimeters(&self) -> f64 {
        self.get::<millimeter>()
    }

    fn from_meters(m: f64) -> Self {
        Length::new::<meter>(m)
    }

    fn as_meters(&self) -> f64 {
        self.get::<meter>()
    }
}

impl IntervalExt for Interval {
    fn from_nanoseconds(ns: f64) -> Self {
        Interval::new::<nanosecond>(ns)
    }

    fn as_nanoseconds(&self) -> f64 {
        self.get::<nanosecond>()
    }

    fn from_microseconds(us: f64) -> Self {
        Interval::new::<microsecond>(us)
    }

    fn as_microseconds(&self) -> f64 {
        self.get::<microsecond>()
    }

    fn from_seconds(s: f64) -> Self {
        Interval::new::<second>(s)
    }

    fn as_seconds(&self) -> f64 {
        self.get::<second>()
    }
}

impl PlaneAngleExt for PlaneAngle {
    fn from_milliradians(mrad: f64) -> Self {
        PlaneAngle::new::<radian>(mrad * 1e-3)
    }

    fn as_milliradians(&self) -> f64 {
        self.get::<radian>() * 1e3
    }

    fn as_radians(&self) -> f64 {
        self.get::<radian>()
    }
}
