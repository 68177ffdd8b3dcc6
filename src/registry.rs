//! # Section Registry
//!
//! Stateful owner of every section in a drawing session. The registry
//! assigns identities, computes derived metrics, and reconciles edits back
//! into the section records.
//!
//! ## Guarantees
//!
//! - Ids are unique and never reassigned.
//! - Length and bearing always match the current vertices.
//! - Insertion order is stable; updates never move a section.
//! - A batch of edits lands in one revision, so `list()` never sees half
//!   of a batch.
//!
//! Mutation happens on one control flow (the host's event loop). The
//! process-wide [`REGISTRY`] exists for FFI callers that cannot hold a
//! registry themselves.

use std::collections::HashMap;
use std::sync::Mutex;

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::color::ColorPolicy;
use crate::config::RegistryConfig;
use crate::error::{OptionExt, Result, SectionError};
use crate::geo_utils::compute_bounds;
use crate::section::{check_coordinates, Section, SectionId, SectionKind, MIN_VERTICES};
use crate::{Bounds, GpsPoint};

// ============================================================================
// Result Types
// ============================================================================

/// Outcome of applying a batch of edits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchUpdate {
    /// Sections after their edit, in batch order
    pub updated: Vec<Section>,
    /// Edits that were rejected, in batch order
    pub failed: Vec<(SectionId, SectionError)>,
    /// Registry revision after the batch
    pub revision: u64,
}

impl BatchUpdate {
    /// True when every edit in the batch applied.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Ids of edits rejected because the section does not exist.
    pub fn not_found(&self) -> Vec<SectionId> {
        self.failed
            .iter()
            .filter(|(_, e)| matches!(e, SectionError::NotFound { .. }))
            .map(|(id, _)| *id)
            .collect()
    }
}

/// Registry statistics for monitoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct RegistryStats {
    pub section_count: u32,
    pub segment_count: u32,
    pub polyline_count: u32,
    pub total_length_meters: f64,
    pub revision: u64,
}

// ============================================================================
// Section Registry
// ============================================================================

/// Ordered collection of sections with derived metrics kept current.
pub struct SectionRegistry {
    // Sections in insertion order
    sections: Vec<Section>,
    // id -> position in `sections`
    index: HashMap<SectionId, usize>,

    color_policy: Box<dyn ColorPolicy>,
    config: RegistryConfig,

    // Bumped once per completed mutation
    revision: u64,
}

impl SectionRegistry {
    /// Create an empty registry with default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry; the color policy comes from `config`.
    pub fn with_config(config: RegistryConfig) -> Self {
        let color_policy = config.color.build();
        Self::with_color_policy(config, color_policy)
    }

    /// Create an empty registry with an explicit color policy.
    pub fn with_color_policy(config: RegistryConfig, color_policy: Box<dyn ColorPolicy>) -> Self {
        Self {
            sections: Vec::new(),
            index: HashMap::new(),
            color_policy,
            config,
            revision: 0,
        }
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Create a section from geographic vertices using the registry's color
    /// policy, append it, and return a copy.
    pub fn create(&mut self, vertices: Vec<GpsPoint>) -> Result<Section> {
        // Validate before consuming a color from the policy
        self.check_vertices(&vertices)?;
        let color = self.color_policy.next_color();
        self.insert(vertices, color)
    }

    /// Create a section, drawing its color from `color_policy` instead of the
    /// registry's own.
    pub fn create_with(
        &mut self,
        vertices: Vec<GpsPoint>,
        color_policy: &mut dyn ColorPolicy,
    ) -> Result<Section> {
        self.check_vertices(&vertices)?;
        let color = color_policy.next_color();
        self.insert(vertices, color)
    }

    fn insert(&mut self, vertices: Vec<GpsPoint>, color: String) -> Result<Section> {
        let mut section = Section::new(vertices, color)?;
        // v4 collisions are practically impossible, but the index must stay unique
        while self.index.contains_key(&section.id) {
            section.id = SectionId::new();
        }

        info!(
            "[SectionRegistry] Created {} {} ({} vertices, {:.1}m)",
            section.kind.as_str(),
            section.id,
            section.vertices.len(),
            section.length
        );

        self.index.insert(section.id, self.sections.len());
        self.sections.push(section.clone());
        self.revision += 1;
        Ok(section)
    }

    /// Replace the vertices of an existing section and recompute its metrics.
    ///
    /// Id, color and list position are preserved. On error the registry is
    /// unchanged.
    pub fn update(&mut self, id: &SectionId, vertices: Vec<GpsPoint>) -> Result<Section> {
        let updated = self.apply_edit(id, vertices)?;
        self.revision += 1;
        Ok(updated)
    }

    /// Apply several edits as one revision.
    ///
    /// Each edit is applied independently: a missing id or bad vertex list
    /// is recorded in `failed` and the remaining edits still apply. When the
    /// same id appears twice, the later edit wins.
    pub fn update_batch<I>(&mut self, edits: I) -> BatchUpdate
    where
        I: IntoIterator<Item = (SectionId, Vec<GpsPoint>)>,
    {
        let edits: Vec<(SectionId, Vec<GpsPoint>)> = edits.into_iter().collect();
        let ids: Vec<SectionId> = edits.iter().map(|(id, _)| *id).collect();

        let mut result = BatchUpdate::default();
        for (id, outcome) in ids.into_iter().zip(self.update_each(edits)) {
            match outcome {
                Ok(section) => result.updated.push(section),
                Err(e) => result.failed.push((id, e)),
            }
        }

        result.revision = self.revision;
        result
    }

    /// Apply several edits as one revision, returning one result per edit
    /// in input order.
    ///
    /// Same semantics as [`update_batch`](Self::update_batch), for callers
    /// that track their own handle for each edit.
    pub fn update_each<I>(&mut self, edits: I) -> Vec<Result<Section>>
    where
        I: IntoIterator<Item = (SectionId, Vec<GpsPoint>)>,
    {
        let results: Vec<Result<Section>> = edits
            .into_iter()
            .map(|(id, vertices)| self.apply_edit(&id, vertices))
            .collect();

        let applied = results.iter().filter(|r| r.is_ok()).count();
        if applied > 0 {
            self.revision += 1;
        }
        if applied < results.len() {
            warn!(
                "[SectionRegistry] Batch update: {} applied, {} rejected",
                applied,
                results.len() - applied
            );
        }

        results
    }

    fn apply_edit(&mut self, id: &SectionId, vertices: Vec<GpsPoint>) -> Result<Section> {
        let position = *self.index.get(id).ok_or_not_found(id)?;
        self.check_vertices(&vertices)?;

        let section = &mut self.sections[position];
        section.set_vertices(vertices)?;

        debug!(
            "[SectionRegistry] Updated {} ({} vertices, {:.1}m)",
            section.id,
            section.vertices.len(),
            section.length
        );
        Ok(section.clone())
    }

    fn check_vertices(&self, vertices: &[GpsPoint]) -> Result<()> {
        if vertices.len() < MIN_VERTICES {
            warn!(
                "[SectionRegistry] Rejected geometry with {} vertices (minimum {})",
                vertices.len(),
                MIN_VERTICES
            );
            return Err(SectionError::InvalidGeometry {
                point_count: vertices.len(),
                minimum_required: MIN_VERTICES,
            });
        }
        check_coordinates(vertices).map_err(|e| {
            warn!("[SectionRegistry] Rejected geometry: {}", e);
            e
        })
    }

    /// Remove every section.
    pub fn clear(&mut self) {
        info!("[SectionRegistry] Cleared {} sections", self.sections.len());
        self.sections.clear();
        self.index.clear();
        self.revision += 1;
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Snapshot of all sections in insertion order.
    pub fn list(&self) -> Vec<Section> {
        self.sections.clone()
    }

    /// Borrow all sections in insertion order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Get a section by id.
    pub fn get(&self, id: &SectionId) -> Option<&Section> {
        self.index.get(id).map(|&i| &self.sections[i])
    }

    /// Check if a section exists.
    pub fn contains(&self, id: &SectionId) -> bool {
        self.index.contains_key(id)
    }

    /// Zero-based list position of a section.
    pub fn position(&self, id: &SectionId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Revision counter, bumped once per completed mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Bounding box of every vertex, for fitting the map view.
    pub fn bounds(&self) -> Option<Bounds> {
        compute_bounds(self.sections.iter().map(|s| s.vertices.as_slice()))
    }

    /// Get sections as JSON string (for efficient FFI).
    pub fn list_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.sections)?)
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Replace the configuration. Applies to sections captured afterwards.
    pub fn set_config(&mut self, config: RegistryConfig) {
        self.config = config;
    }

    pub fn set_color_policy(&mut self, color_policy: Box<dyn ColorPolicy>) {
        self.color_policy = color_policy;
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Get registry statistics.
    pub fn stats(&self) -> RegistryStats {
        let segment_count = self
            .sections
            .iter()
            .filter(|s| s.kind == SectionKind::Segment)
            .count();

        RegistryStats {
            section_count: self.sections.len() as u32,
            segment_count: segment_count as u32,
            polyline_count: (self.sections.len() - segment_count) as u32,
            total_length_meters: self.sections.iter().map(|s| s.length).sum(),
            revision: self.revision,
        }
    }
}

impl Default for SectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Global Singleton
// ============================================================================

/// Global registry instance.
///
/// This singleton allows FFI calls to share one registry without passing
/// state back and forth across the FFI boundary.
pub static REGISTRY: Lazy<Mutex<SectionRegistry>> =
    Lazy::new(|| Mutex::new(SectionRegistry::new()));

/// Get a lock on the global registry.
///
/// A panic while holding the lock cannot leave a section half-updated
/// (`Section::set_vertices` validates before writing), so a poisoned lock
/// is recovered rather than propagated.
pub fn with_registry<F, R>(f: F) -> R
where
    F: FnOnce(&mut SectionRegistry) -> R,
{
    let mut registry = REGISTRY.lock().unwrap_or_else(|e| e.into_inner());
    f(&mut registry)
}

// ============================================================================
// Tests
// ============================================================================
