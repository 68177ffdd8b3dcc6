//! Section types and derived metrics.
//!
//! A section is one user-drawn or user-entered line: two points (a segment,
//! with a bearing) or more (a polyline, length only). Length and bearing are
//! always derived from the vertices and recomputed whenever they change.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{OptionExt, Result, SectionError};
use crate::geo_utils::{bearing_degrees, polyline_length};
use crate::GpsPoint;

/// Minimum vertex count of any section.
pub const MIN_VERTICES: usize = 2;

/// Stable section identifier, assigned at creation and never reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(Uuid);

impl SectionId {
    /// Generate a fresh random (v4) identifier.
    pub fn new() -> Self {
        SectionId(Uuid::new_v4())
    }

    /// Parse an identifier from its hyphenated string form.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(SectionId)
    }
}

impl Default for SectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Section shape, derived from the vertex count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    /// Exactly two vertices; has a bearing.
    Segment,
    /// Three or more vertices; length only.
    Polyline,
}

impl SectionKind {
    pub fn for_vertex_count(count: usize) -> Self {
        if count == MIN_VERTICES {
            SectionKind::Segment
        } else {
            SectionKind::Polyline
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Segment => "segment",
            SectionKind::Polyline => "polyline",
        }
    }
}

/// Metrics derived from a vertex sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionMetrics {
    /// Geodesic length in meters
    pub length: f64,
    /// Degrees clockwise from north, only for two-vertex sections
    pub bearing: Option<f64>,
}

impl SectionMetrics {
    /// Compute length and bearing for `vertices`.
    ///
    /// Fails with `InvalidGeometry` when there are fewer than two vertices
    /// and with `InvalidCoordinate` when a vertex is off the globe.
    pub fn from_vertices(vertices: &[GpsPoint]) -> Result<Self> {
        let (first, last) = match vertices {
            [first, .., last] => Some((first, last)),
            _ => None,
        }
        .ok_or_insufficient_points(vertices.len(), MIN_VERTICES)?;
        check_coordinates(vertices)?;

        let bearing = (vertices.len() == MIN_VERTICES).then(|| bearing_degrees(first, last));

        Ok(Self {
            length: polyline_length(vertices),
            bearing,
        })
    }
}

/// Reject the first vertex that is not a finite lon/lat on the globe.
pub fn check_coordinates(vertices: &[GpsPoint]) -> Result<()> {
    match vertices.iter().position(|p| !p.is_valid()) {
        Some(i) => Err(SectionError::InvalidCoordinate {
            field: format!("vertex {}", i + 1),
            value: format!("[{}, {}]", vertices[i].longitude, vertices[i].latitude),
        }),
        None => Ok(()),
    }
}

/// A drawn or entered section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: SectionId,
    pub kind: SectionKind,
    /// Geographic vertices, at least two
    pub vertices: Vec<GpsPoint>,
    /// Geodesic length in meters
    pub length: f64,
    /// Degrees clockwise from north (segments only)
    pub bearing: Option<f64>,
    /// Display color, fixed for the section's lifetime
    pub color: String,
}

impl Section {
    /// Build a section with a fresh id, computing its metrics.
    pub fn new(vertices: Vec<GpsPoint>, color: String) -> Result<Self> {
        Self::with_id(SectionId::new(), vertices, color)
    }

    /// Build a section with a known id, computing its metrics.
    pub fn with_id(id: SectionId, vertices: Vec<GpsPoint>, color: String) -> Result<Self> {
        let metrics = SectionMetrics::from_vertices(&vertices)?;
        Ok(Self {
            id,
            kind: SectionKind::for_vertex_count(vertices.len()),
            vertices,
            length: metrics.length,
            bearing: metrics.bearing,
            color,
        })
    }

    /// Replace the vertices and recompute derived metrics. Id and color are
    /// kept. On error the section is left untouched.
    pub fn set_vertices(&mut self, vertices: Vec<GpsPoint>) -> Result<()> {
        let metrics = SectionMetrics::from_vertices(&vertices)?;
        self.kind = SectionKind::for_vertex_count(vertices.len());
        self.vertices = vertices;
        self.length = metrics.length;
        self.bearing = metrics.bearing;
        Ok(())
    }

    /// Current metrics as stored on the section.
    pub fn metrics(&self) -> SectionMetrics {
        SectionMetrics {
            length: self.length,
            bearing: self.bearing,
        }
    }

    /// Whether the stored metrics match a fresh computation from the vertices.
    pub fn is_consistent(&self) -> bool {
        SectionMetrics::from_vertices(&self.vertices)
            .map(|m| m == self.metrics())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brno_segment() -> Vec<GpsPoint> {
        vec![
            GpsPoint::from_lon_lat(16.5978, 49.2121),
            GpsPoint::from_lon_lat(16.6978, 49.2121),
        ]
    }

    #[test]
    fn test_segment_metrics() {
        let section = Section::new(brno_segment(), "blue".to_string()).unwrap();
        assert_eq!(section.kind, SectionKind::Segment);
        assert!((section.length - 7_263.9).abs() < 5.0);
        // Due east
        assert!((section.bearing.unwrap() - 90.0).abs() < 1e-9);
        assert!(section.is_consistent());
    }

    #[test]
    fn test_polyline_has_no_bearing() {
        let mut vertices = brno_segment();
        vertices.push(GpsPoint::from_lon_lat(16.6978, 49.3121));
        let section = Section::new(vertices, "blue".to_string()).unwrap();

        assert_eq!(section.kind, SectionKind::Polyline);
        assert!(section.bearing.is_none());
        assert!(section.length > 7_263.0);
    }

    #[test]
    fn test_rejects_single_vertex() {
        let result = Section::new(vec![GpsPoint::new(0.0, 0.0)], "blue".to_string());
        assert_eq!(
            result,
            Err(SectionError::InvalidGeometry {
                point_count: 1,
                minimum_required: 2
            })
        );
        assert!(SectionMetrics::from_vertices(&[]).is_err());
    }

    #[test]
    fn test_rejects_non_finite_and_off_globe_vertices() {
        let nan = vec![GpsPoint::from_lon_lat(f64::NAN, 0.0), GpsPoint::from_lon_lat(0.0, 1.0)];
        assert!(matches!(
            Section::new(nan, "blue".to_string()),
            Err(SectionError::InvalidCoordinate { ref field, .. }) if field == "vertex 1"
        ));

        let off_globe = vec![
            GpsPoint::from_lon_lat(500.0, 0.0),
            GpsPoint::from_lon_lat(0.0, 100.0),
        ];
        assert!(SectionMetrics::from_vertices(&off_globe).is_err());

        let mut section = Section::new(brno_segment(), "blue".to_string()).unwrap();
        let before = section.clone();
        assert!(section.set_vertices(off_globe).is_err());
        assert_eq!(section, before);
    }

    #[test]
    fn test_set_vertices_recomputes_and_keeps_identity() {
        let mut section = Section::new(brno_segment(), "#A1B2C3".to_string()).unwrap();
        let id = section.id;

        section
            .set_vertices(vec![
                GpsPoint::from_lon_lat(0.0, 0.0),
                GpsPoint::from_lon_lat(0.0, 1.0),
            ])
            .unwrap();

        assert_eq!(section.id, id);
        assert_eq!(section.color, "#A1B2C3");
        assert_eq!(section.bearing, Some(0.0));
        assert!((section.length - 111_195.0).abs() < 10.0);
        assert!(section.is_consistent());
    }

    #[test]
    fn test_set_vertices_failure_leaves_section_untouched() {
        let mut section = Section::new(brno_segment(), "blue".to_string()).unwrap();
        let before = section.clone();

        assert!(section.set_vertices(vec![]).is_err());
        assert_eq!(section, before);
    }

    #[test]
    fn test_section_id_round_trip_through_string() {
        let id = SectionId::new();
        assert_eq!(SectionId::parse(&id.to_string()), Some(id));
        assert_eq!(SectionId::parse("not-a-uuid"), None);
        assert_ne!(SectionId::new(), SectionId::new());
    }

    #[test]
    fn test_section_json_shape() {
        let section = Section::new(brno_segment(), "blue".to_string()).unwrap();
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["kind"], "segment");
        assert_eq!(json["color"], "blue");
        assert_eq!(json["id"], section.id.to_string());
        assert_eq!(json["vertices"].as_array().unwrap().len(), 2);
    }
}
