//! Degree/minute/second to decimal-degree conversion.
//!
//! EXIF stores GPS positions as three rationals (degrees, minutes, seconds)
//! plus a separate hemisphere reference tag (`N`/`S` for latitude, `E`/`W`
//! for longitude). Each rational is divided on its own before the terms are
//! summed:
//!
//! ```text
//! decimal = deg.num/deg.den + (min.num/min.den * 60 + sec.num/sec.den) / 3600
//! ```
//!
//! The hemisphere reference is the only source of sign. Some writers emit
//! signed rationals (SRATIONAL) with a negative degree component *and* a
//! `W`/`S` reference; component magnitudes are used so that both spellings
//! land on the same coordinate.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinateError {
    #[error("zero denominator in {0} component")]
    ZeroDenominator(&'static str),
    #[error("{axis} value {value} is out of range")]
    OutOfRange { axis: Axis, value: f64 },
    #[error("hemisphere {hemisphere} does not apply to {axis}")]
    WrongHemisphere { axis: Axis, hemisphere: Hemisphere },
    #[error("unrecognized hemisphere reference {0:?}")]
    UnknownHemisphere(String),
    #[error("expected 3 rationals for degrees/minutes/seconds, got {0}")]
    IncompleteTriple(usize),
}

/// A numerator/denominator pair as stored in EXIF RATIONAL / SRATIONAL fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    pub num: i64,
    pub den: i64,
}

impl Rational {
    pub const fn new(num: i64, den: i64) -> Self {
        Self { num, den }
    }

    /// Divide out the ratio. `component` names the term in the error.
    fn magnitude(self, component: &'static str) -> Result<f64, CoordinateError> {
        if self.den == 0 {
            return Err(CoordinateError::ZeroDenominator(component));
        }
        Ok((self.num as f64 / self.den as f64).abs())
    }
}

impl From<(i64, i64)> for Rational {
    fn from((num, den): (i64, i64)) -> Self {
        Self { num, den }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn limit(self) -> f64 {
        match self {
            Axis::Latitude => 90.0,
            Axis::Longitude => 180.0,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Latitude => f.write_str("latitude"),
            Axis::Longitude => f.write_str("longitude"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    /// The positive hemisphere for an axis, used when the reference tag is missing.
    pub fn positive(axis: Axis) -> Self {
        match axis {
            Axis::Latitude => Hemisphere::North,
            Axis::Longitude => Hemisphere::East,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Hemisphere::North | Hemisphere::South => Axis::Latitude,
            Hemisphere::East | Hemisphere::West => Axis::Longitude,
        }
    }

    pub fn is_negative(self) -> bool {
        matches!(self, Hemisphere::South | Hemisphere::West)
    }
}

impl FromStr for Hemisphere {
    type Err = CoordinateError;

    /// Parses reference tag text. EXIF ASCII values carry a trailing NUL.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_matches(|c: char| c == '\0' || c.is_whitespace()) {
            "N" | "n" => Ok(Hemisphere::North),
            "S" | "s" => Ok(Hemisphere::South),
            "E" | "e" => Ok(Hemisphere::East),
            "W" | "w" => Ok(Hemisphere::West),
            other => Err(CoordinateError::UnknownHemisphere(other.to_string())),
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Hemisphere::North => "N",
            Hemisphere::South => "S",
            Hemisphere::East => "E",
            Hemisphere::West => "W",
        };
        f.write_str(c)
    }
}

/// Signed decimal degrees on one axis. Always within the axis range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoCoordinate {
    axis: Axis,
    degrees: f64,
}

impl GeoCoordinate {
    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn degrees(&self) -> f64 {
        self.degrees
    }
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.degrees)
    }
}

/// Convert a DMS triple and hemisphere reference into decimal degrees.
pub fn to_decimal_degrees(
    degrees: Rational,
    minutes: Rational,
    seconds: Rational,
    hemisphere: Hemisphere,
) -> Result<GeoCoordinate, CoordinateError> {
    let deg = degrees.magnitude("degrees")?;
    let min = minutes.magnitude("minutes")?;
    let sec = seconds.magnitude("seconds")?;

    let magnitude = deg + (min * 60.0 + sec) / 3600.0;
    let axis = hemisphere.axis();
    if !magnitude.is_finite() || magnitude > axis.limit() {
        return Err(CoordinateError::OutOfRange {
            axis,
            value: magnitude,
        });
    }

    let value = if hemisphere.is_negative() {
        -magnitude
    } else {
        magnitude
    };
    Ok(GeoCoordinate {
        axis,
        degrees: value,
    })
}

/// Convert a rational slice for a known axis, checking the hemisphere matches.
///
/// Used by the metadata extractor, which reads the DMS value and its
/// reference from separate tags.
pub fn convert_axis(
    axis: Axis,
    dms: &[Rational],
    hemisphere: Hemisphere,
) -> Result<GeoCoordinate, CoordinateError> {
    if hemisphere.axis() != axis {
        return Err(CoordinateError::WrongHemisphere { axis, hemisphere });
    }
    match dms {
        [d, m, s, ..] => to_decimal_degrees(*d, *m, *s, hemisphere),
        _ => Err(CoordinateError::IncompleteTriple(dms.len())),
    }
}
