//! Manual coordinate entry.
//!
//! Users can type a section instead of drawing it. Each vertex is a pair of
//! text fields, `x` (longitude) and `y` (latitude), in degrees.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SectionError};
use crate::section::MIN_VERTICES;
use crate::GpsPoint;

/// Raw text of one coordinate pair as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateFields {
    pub x: String,
    pub y: String,
}

impl CoordinateFields {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }

    fn is_blank(&self) -> bool {
        self.x.trim().is_empty() && self.y.trim().is_empty()
    }
}

/// A manual section submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualEntry {
    pub pairs: Vec<CoordinateFields>,
}

impl ManualEntry {
    pub fn new(pairs: Vec<CoordinateFields>) -> Self {
        Self { pairs }
    }

    /// The classic four-field form: start `(x1, y1)`, end `(x2, y2)`.
    pub fn segment(
        x1: impl Into<String>,
        y1: impl Into<String>,
        x2: impl Into<String>,
        y2: impl Into<String>,
    ) -> Self {
        Self::new(vec![CoordinateFields::new(x1, y1), CoordinateFields::new(x2, y2)])
    }

    /// Validate the fields and convert them into geographic points.
    ///
    /// Fully blank pairs are skipped. A pair with only one side filled,
    /// an unparseable number, or a coordinate off the globe is rejected.
    /// Fewer than two populated pairs is `InvalidGeometry`.
    pub fn parse(&self) -> Result<Vec<GpsPoint>> {
        let mut points = Vec::with_capacity(self.pairs.len());

        for (i, pair) in self.pairs.iter().enumerate() {
            if pair.is_blank() {
                continue;
            }
            let n = i + 1;
            let lon = parse_field(&format!("x{n}"), &pair.x, 180.0)?;
            let lat = parse_field(&format!("y{n}"), &pair.y, 90.0)?;
            points.push(GpsPoint::from_lon_lat(lon, lat));
        }

        if points.len() < MIN_VERTICES {
            return Err(SectionError::InvalidGeometry {
                point_count: points.len(),
                minimum_required: MIN_VERTICES,
            });
        }
        Ok(points)
    }
}

fn parse_field(field: &str, raw: &str, limit: f64) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SectionError::MissingCoordinate {
            field: field.to_string(),
        });
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value.abs() <= limit => Ok(value),
        _ => Err(SectionError::InvalidCoordinate {
            field: field.to_string(),
            value: raw.to_string(),
        }),
    }
}
