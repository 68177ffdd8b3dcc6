//! Display units for section lengths and bearings.
//!
//! Sections always store meters and degrees; these conversions only exist
//! for presentation.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Meters in one statute mile (as used by the table view).
pub const METERS_PER_MILE: f64 = 1609.34;

/// Meters in one kilometer.
pub const METERS_PER_KILOMETER: f64 = 1000.0;

/// Convert meters to kilometers.
pub fn meters_to_km(meters: f64) -> f64 {
    meters / METERS_PER_KILOMETER
}

/// Convert meters to miles.
pub fn meters_to_miles(meters: f64) -> f64 {
    meters / METERS_PER_MILE
}

/// Convert degrees to radians.
pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

/// Unit a length is displayed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Meters,
    #[default]
    #[serde(alias = "km")]
    Kilometers,
    Miles,
}

impl LengthUnit {
    /// Convert a length in meters into this unit.
    pub fn from_meters(&self, meters: f64) -> f64 {
        match self {
            LengthUnit::Meters => meters,
            LengthUnit::Kilometers => meters_to_km(meters),
            LengthUnit::Miles => meters_to_miles(meters),
        }
    }

    /// Short label used in table headers.
    pub fn label(&self) -> &'static str {
        match self {
            LengthUnit::Meters => "m",
            LengthUnit::Kilometers => "km",
            LengthUnit::Miles => "miles",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LengthUnit::Meters => "meters",
            LengthUnit::Kilometers => "kilometers",
            LengthUnit::Miles => "miles",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "m" | "meters" => Some(LengthUnit::Meters),
            "km" | "kilometers" => Some(LengthUnit::Kilometers),
            "miles" | "mi" => Some(LengthUnit::Miles),
            _ => None,
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit a bearing is displayed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    #[default]
    Degrees,
    Radians,
}

impl AngleUnit {
    /// Convert a bearing in degrees into this unit.
    pub fn from_degrees(&self, degrees: f64) -> f64 {
        match self {
            AngleUnit::Degrees => degrees,
            AngleUnit::Radians => degrees_to_radians(degrees),
        }
    }

    /// Short label used in table headers.
    pub fn label(&self) -> &'static str {
        match self {
            AngleUnit::Degrees => "°",
            AngleUnit::Radians => "radians",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AngleUnit::Degrees => "degrees",
            AngleUnit::Radians => "radians",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "degrees" | "deg" => Some(AngleUnit::Degrees),
            "radians" | "rad" => Some(AngleUnit::Radians),
            _ => None,
        }
    }
}

impl fmt::Display for AngleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
