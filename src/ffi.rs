//! FFI bindings over the global [`REGISTRY`](crate::REGISTRY).
//!
//! Coordinates cross the boundary as flat `[lon1, lat1, lon2, lat2, ...]`
//! buffers and results as JSON, so hosts never hold Rust-side state.
//! Functions that can fail return an empty string on error and log why.

use log::{info, warn};
use serde_json::json;

use crate::config::DisplayPreferences;
use crate::registry::{with_registry, RegistryStats};
use crate::section::SectionId;
use crate::table::SectionTable;
use crate::units::{AngleUnit, LengthUnit};
use crate::GpsPoint;

fn points_from_flat(flat_coords: &[f64]) -> Vec<GpsPoint> {
    flat_coords
        .chunks_exact(2)
        .map(|chunk| GpsPoint::from_lon_lat(chunk[0], chunk[1]))
        .collect()
}

/// Initialize the registry (call once at app startup).
#[uniffi::export]
pub fn registry_init() {
    crate::init_logging();
    info!("[SectionRegistry] Initialized");
}

/// Remove every section.
#[uniffi::export]
pub fn registry_clear() {
    with_registry(|r| r.clear());
}

/// Create a section from a flat `[lon, lat, ...]` buffer.
///
/// # Returns
/// The created section as JSON, or empty string on error
#[uniffi::export]
pub fn registry_create_section(flat_coords: Vec<f64>) -> String {
    let vertices = points_from_flat(&flat_coords);

    let created = with_registry(|r| r.create(vertices));
    match created.and_then(|s| Ok(serde_json::to_string(&s)?)) {
        Ok(json) => json,
        Err(e) => {
            warn!("[SectionRegistry] FFI create failed: {}", e);
            String::new()
        }
    }
}

/// Apply a batch of edits.
///
/// `offsets[i]` is the vertex index in `all_coords` where edit `i` starts.
///
/// # Returns
/// JSON `{ "updated": [section, ...], "failed": [{ "id", "error" }, ...], "revision" }`
#[uniffi::export]
pub fn registry_update_sections(
    section_ids: Vec<String>,
    all_coords: Vec<f64>,
    offsets: Vec<u32>,
) -> String {
    let mut failed = Vec::new();
    let mut edits = Vec::with_capacity(section_ids.len());
    let vertex_count = all_coords.len() / 2;

    for (i, raw_id) in section_ids.iter().enumerate() {
        let start = offsets.get(i).map(|&o| o as usize).unwrap_or(vertex_count);
        let end = offsets
            .get(i + 1)
            .map(|&o| o as usize)
            .unwrap_or(vertex_count)
            .min(vertex_count);
        let coords = all_coords.get(start * 2..end * 2).unwrap_or(&[]);

        match SectionId::parse(raw_id) {
            Some(id) => edits.push((id, points_from_flat(coords))),
            None => failed.push(json!({ "id": raw_id, "error": "invalid section id" })),
        }
    }

    let result = with_registry(|r| r.update_batch(edits));
    failed.extend(
        result
            .failed
            .iter()
            .map(|(id, e)| json!({ "id": id, "error": e.to_string() })),
    );

    json!({
        "updated": result.updated,
        "failed": failed,
        "revision": result.revision,
    })
    .to_string()
}

/// Get all sections as JSON, in list order.
#[uniffi::export]
pub fn registry_get_sections_json() -> String {
    with_registry(|r| r.list_json()).unwrap_or_else(|e| {
        warn!("[SectionRegistry] FFI list failed: {}", e);
        "[]".to_string()
    })
}

/// Get table rows as JSON for the given units ("km" / "miles",
/// "degrees" / "radians"). Unknown units fall back to defaults.
#[uniffi::export]
pub fn registry_get_table_json(length_unit: String, angle_unit: String) -> String {
    let preferences = DisplayPreferences {
        length_unit: LengthUnit::from_str(&length_unit).unwrap_or_default(),
        angle_unit: AngleUnit::from_str(&angle_unit).unwrap_or_default(),
        ..DisplayPreferences::default()
    };

    let table = with_registry(|r| SectionTable::build(r.sections(), &preferences, r.config()));
    serde_json::to_string(&table).unwrap_or_else(|_| "{}".to_string())
}

/// Get registry statistics.
#[uniffi::export]
pub fn registry_get_stats() -> RegistryStats {
    with_registry(|r| r.stats())
}
