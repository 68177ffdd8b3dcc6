//! Table rows for the "Current Sections" view.
//!
//! Rows are keyed by section id so a display layer keeps row identity
//! across edits; the row number is just the list position plus one.

use serde::Serialize;

use crate::config::{DisplayPreferences, RegistryConfig};
use crate::section::{Section, SectionId, SectionKind};
use crate::GpsPoint;

/// Placeholder shown when there are no sections.
pub const EMPTY_MESSAGE: &str = "No sections available.";

/// Decimal places for coordinates in the table.
const COORDINATE_DECIMALS: usize = 4;

/// One display row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRow {
    /// 1-based position in the list
    pub number: usize,
    pub id: SectionId,
    pub kind: SectionKind,
    pub color: String,
    /// `[x, y] → [x, y]`
    pub coordinates: String,
    /// Length in the preferred unit
    pub length: f64,
    pub length_text: String,
    /// Bearing in the preferred unit (segments only)
    pub bearing: Option<f64>,
    pub bearing_text: Option<String>,
}

/// All rows plus the column headers for the active units.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionTable {
    pub headers: Vec<String>,
    pub rows: Vec<SectionRow>,
}

impl SectionTable {
    /// Build rows for `sections` in list order.
    pub fn build(
        sections: &[Section],
        preferences: &DisplayPreferences,
        config: &RegistryConfig,
    ) -> Self {
        let headers = vec![
            "Section".to_string(),
            "Coordinates [x, y] → [x, y]".to_string(),
            format!("Length [{}]", preferences.length_unit.label()),
            format!("Azimuth [{}]", preferences.angle_unit.label()),
        ];

        let rows = sections
            .iter()
            .enumerate()
            .map(|(i, section)| SectionRow::build(i + 1, section, preferences, config))
            .collect();

        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for a section id.
    pub fn row(&self, id: &SectionId) -> Option<&SectionRow> {
        self.rows.iter().find(|r| &r.id == id)
    }

    /// Plain-text rendering: headers and rows separated by ` | `, or the
    /// placeholder message when empty.
    pub fn to_text(&self) -> String {
        if self.rows.is_empty() {
            return EMPTY_MESSAGE.to_string();
        }

        let mut lines = vec![self.headers.join(" | ")];
        lines.extend(self.rows.iter().map(|row| {
            [
                row.number.to_string(),
                row.coordinates.clone(),
                row.length_text.clone(),
                row.bearing_text.clone().unwrap_or_else(|| "-".to_string()),
            ]
            .join(" | ")
        }));
        lines.join("\n")
    }
}

impl SectionRow {
    fn build(
        number: usize,
        section: &Section,
        preferences: &DisplayPreferences,
        config: &RegistryConfig,
    ) -> Self {
        let length = preferences.length_unit.from_meters(section.length);
        let bearing = section
            .bearing
            .map(|deg| preferences.angle_unit.from_degrees(deg));

        Self {
            number,
            id: section.id,
            kind: section.kind,
            color: section.color.clone(),
            coordinates: format_vertices(&section.vertices),
            length,
            length_text: format!("{:.*}", config.length_precision, length),
            bearing,
            bearing_text: bearing.map(|b| format!("{:.*}", config.bearing_precision, b)),
        }
    }
}

/// `[x, y] → [x, y] → ...` with four decimals.
pub fn format_vertices(vertices: &[GpsPoint]) -> String {
    vertices
        .iter()
        .map(|p| {
            format!(
                "[{:.prec$}, {:.prec$}]",
                p.longitude,
                p.latitude,
                prec = COORDINATE_DECIMALS
            )
        })
        .collect::<Vec<_>>()
        .join(" → ")
}
