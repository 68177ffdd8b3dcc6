//! # Drawing Session
//!
//! Event adapter between a map widget and the [`SectionRegistry`].
//!
//! The widget reports discrete events: a drawing finished, some rendered
//! lines were edited, the user typed coordinates, or asked to clear
//! everything. Each event carries widget-side [`FeatureToken`]s, and the
//! session keeps the token -> section id binding so later edits reach the
//! right section. Outcomes tell the widget which color and id to put on the
//! rendered feature.

use std::collections::HashMap;
use std::fmt;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::{DisplayPreferences, DrawingMode, RegistryConfig};
use crate::error::{Result, SectionError};
use crate::manual::ManualEntry;
use crate::projection::{Geographic, ProjectedCoord, Projection};
use crate::registry::SectionRegistry;
use crate::section::{Section, SectionId};
use crate::table::SectionTable;
use crate::GpsPoint;

/// Widget-side handle of a rendered feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureToken(pub String);

impl FeatureToken {
    pub fn new(token: impl Into<String>) -> Self {
        FeatureToken(token.into())
    }
}

impl fmt::Display for FeatureToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Event reported by the widget or the surrounding form.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A freehand drawing completed.
    DrawCompleted {
        token: FeatureToken,
        coords: Vec<ProjectedCoord>,
    },
    /// One or more rendered features were modified in a single gesture.
    EditCompleted {
        edits: Vec<(FeatureToken, Vec<ProjectedCoord>)>,
    },
    /// The user submitted the manual coordinate form.
    ManualSubmitted { entry: ManualEntry },
    /// The user asked to delete every section.
    ClearRequested,
}

/// What the widget should do after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// A section was created. `token` is `None` for manual entries; the host
    /// draws `geometry` itself and calls [`DrawingSession::bind`].
    Created {
        token: Option<FeatureToken>,
        section: Section,
        geometry: Vec<ProjectedCoord>,
    },
    /// Edits were reconciled; failed edits leave their sections unchanged.
    Updated {
        updated: Vec<(FeatureToken, Section)>,
        failed: Vec<(FeatureToken, SectionError)>,
        revision: u64,
    },
    /// The event was rejected and nothing changed. A rejected drawing should
    /// be removed from the widget.
    Rejected {
        token: Option<FeatureToken>,
        error: SectionError,
    },
    /// Every section was removed.
    Cleared,
}

/// One drawing session: a registry plus the widget bindings around it.
pub struct DrawingSession {
    registry: SectionRegistry,
    projection: Box<dyn Projection>,
    preferences: DisplayPreferences,
    tokens: HashMap<FeatureToken, SectionId>,
}

impl DrawingSession {
    /// Session over a fresh default registry, for widgets that report
    /// `[lon, lat]` degrees.
    pub fn new() -> Self {
        Self::with_registry(
            SectionRegistry::new(),
            Box::new(Geographic),
            DisplayPreferences::default(),
        )
    }

    /// Session over an existing registry with the host's projection.
    pub fn with_registry(
        registry: SectionRegistry,
        projection: Box<dyn Projection>,
        preferences: DisplayPreferences,
    ) -> Self {
        Self {
            registry,
            projection,
            preferences,
            tokens: HashMap::new(),
        }
    }

    /// Session built from a config and stored preferences.
    pub fn from_config(
        config: RegistryConfig,
        projection: Box<dyn Projection>,
        preferences: DisplayPreferences,
    ) -> Self {
        Self::with_registry(SectionRegistry::with_config(config), projection, preferences)
    }

    // ========================================================================
    // Event Handling
    // ========================================================================

    /// Apply one event to the registry.
    pub fn handle(&mut self, event: SessionEvent) -> SessionOutcome {
        match event {
            SessionEvent::DrawCompleted { token, coords } => self.on_draw(token, coords),
            SessionEvent::EditCompleted { edits } => self.on_edit(edits),
            SessionEvent::ManualSubmitted { entry } => self.on_manual(&entry),
            SessionEvent::ClearRequested => {
                self.clear();
                SessionOutcome::Cleared
            }
        }
    }

    fn on_draw(&mut self, token: FeatureToken, coords: Vec<ProjectedCoord>) -> SessionOutcome {
        let mode = self.preferences.mode;
        if !mode.accepts(coords.len()) {
            warn!(
                "[DrawingSession] {} mode rejected drawing {} with {} points",
                mode,
                token,
                coords.len()
            );
            return SessionOutcome::Rejected {
                token: Some(token),
                error: SectionError::ModeMismatch {
                    mode,
                    point_count: coords.len(),
                },
            };
        }

        let vertices = self.captured_vertices(&coords);
        match self.registry.create(vertices) {
            Ok(section) => {
                if let Some(previous) = self.tokens.insert(token.clone(), section.id) {
                    warn!(
                        "[DrawingSession] Token {} rebound from {} to {}",
                        token, previous, section.id
                    );
                } else {
                    debug!("[DrawingSession] Bound {} -> {}", token, section.id);
                }
                SessionOutcome::Created {
                    token: Some(token),
                    section,
                    geometry: coords,
                }
            }
            Err(error) => SessionOutcome::Rejected {
                token: Some(token),
                error,
            },
        }
    }

    fn on_edit(&mut self, edits: Vec<(FeatureToken, Vec<ProjectedCoord>)>) -> SessionOutcome {
        let mut failed = Vec::new();
        let mut batch = Vec::with_capacity(edits.len());
        // Token of each batch entry, by position
        let mut batch_tokens = Vec::with_capacity(edits.len());

        for (token, coords) in edits {
            match self.tokens.get(&token) {
                Some(&id) => {
                    batch.push((id, self.captured_vertices(&coords)));
                    batch_tokens.push(token);
                }
                None => {
                    let error = SectionError::UnknownToken {
                        token: token.0.clone(),
                    };
                    failed.push((token, error));
                }
            }
        }

        let mut updated = Vec::new();
        for (token, result) in batch_tokens.into_iter().zip(self.registry.update_each(batch)) {
            match result {
                Ok(section) => updated.push((token, section)),
                Err(e) => failed.push((token, e)),
            }
        }

        SessionOutcome::Updated {
            updated,
            failed,
            revision: self.registry.revision(),
        }
    }

    fn on_manual(&mut self, entry: &ManualEntry) -> SessionOutcome {
        let mode = self.preferences.mode;
        let created = entry.parse().and_then(|vertices| {
            if !mode.accepts(vertices.len()) {
                return Err(SectionError::ModeMismatch {
                    mode,
                    point_count: vertices.len(),
                });
            }
            self.registry.create(vertices)
        });

        match created {
            Ok(section) => {
                let geometry = self.projection.project(&section.vertices);
                SessionOutcome::Created {
                    token: None,
                    section,
                    geometry,
                }
            }
            Err(error) => {
                warn!("[DrawingSession] Manual entry rejected: {}", error);
                SessionOutcome::Rejected { token: None, error }
            }
        }
    }

    /// Unproject widget coordinates and round them to the configured
    /// precision. The registry rejects points that end up off the globe.
    fn captured_vertices(&self, coords: &[ProjectedCoord]) -> Vec<GpsPoint> {
        let precision = self.registry.config().coordinate_precision;

        self.projection
            .unproject(coords)
            .into_iter()
            .map(|p| p.rounded(precision))
            .collect()
    }

    // ========================================================================
    // Bindings
    // ========================================================================

    /// Bind a widget feature to an existing section (e.g. after drawing a
    /// manually entered section).
    pub fn bind(&mut self, token: FeatureToken, id: SectionId) -> Result<()> {
        if !self.registry.contains(&id) {
            return Err(SectionError::NotFound { id });
        }
        self.tokens.insert(token, id);
        Ok(())
    }

    /// Section id bound to a widget feature.
    pub fn section_for(&self, token: &FeatureToken) -> Option<SectionId> {
        self.tokens.get(token).copied()
    }

    // ========================================================================
    // Session Control
    // ========================================================================

    /// Delete every section and forget all widget bindings.
    pub fn clear(&mut self) {
        self.registry.clear();
        self.tokens.clear();
    }

    /// Start over: clear sections and restore default display units. The
    /// drawing mode is kept, like a page reload that rereads the stored mode.
    pub fn reset(&mut self) {
        info!("[DrawingSession] Reset");
        self.clear();
        self.preferences = DisplayPreferences {
            mode: self.preferences.mode,
            ..DisplayPreferences::default()
        };
    }

    pub fn mode(&self) -> DrawingMode {
        self.preferences.mode
    }

    /// Switch drawing mode. Existing sections stay.
    pub fn set_mode(&mut self, mode: DrawingMode) {
        info!("[DrawingSession] Mode {} -> {}", self.preferences.mode, mode);
        self.preferences.mode = mode;
    }

    pub fn preferences(&self) -> &DisplayPreferences {
        &self.preferences
    }

    pub fn set_preferences(&mut self, preferences: DisplayPreferences) {
        self.preferences = preferences;
    }

    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SectionRegistry {
        &mut self.registry
    }

    pub fn into_registry(self) -> SectionRegistry {
        self.registry
    }

    /// Table rows for the current sections in the preferred units.
    pub fn table(&self) -> SectionTable {
        SectionTable::build(
            self.registry.sections(),
            &self.preferences,
            self.registry.config(),
        )
    }
}

impl Default for DrawingSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::FixedColor;
    use crate::manual::CoordinateFields;
    use crate::units::LengthUnit;

    /// Widget space with coordinates scaled by 1000, to prove the session
    /// converts at the boundary.
    struct Scaled;

    impl Projection for Scaled {
        fn to_geographic(&self, coord: ProjectedCoord) -> GpsPoint {
            GpsPoint::from_lon_lat(coord[0] / 1000.0, coord[1] / 1000.0)
        }

        fn from_geographic(&self, point: &GpsPoint) -> ProjectedCoord {
            [point.longitude * 1000.0, point.latitude * 1000.0]
        }
    }

    fn session() -> DrawingSession {
        let registry = SectionRegistry::with_color_policy(
            RegistryConfig::default(),
            Box::new(FixedColor::default()),
        );
        DrawingSession::with_registry(registry, Box::new(Geographic), DisplayPreferences::default())
    }

    fn draw(token: &str, coords: Vec<ProjectedCoord>) -> SessionEvent {
        SessionEvent::DrawCompleted {
            token: FeatureToken::new(token),
            coords,
        }
    }

    #[test]
    fn test_draw_creates_and_binds() {
        let mut session = session();
        let outcome = session.handle(draw("f1", vec![[0.0, 0.0], [0.0, 1.0]]));

        let SessionOutcome::Created { token, section, .. } = outcome else {
            panic!("expected Created");
        };
        assert_eq!(token, Some(FeatureToken::new("f1")));
        assert_eq!(section.bearing, Some(0.0));
        assert_eq!(session.section_for(&FeatureToken::new("f1")), Some(section.id));
    }

    #[test]
    fn test_segment_mode_rejects_polyline_drawing() {
        let mut session = session();
        let outcome = session.handle(draw("f1", vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0]]));

        assert_eq!(
            outcome,
            SessionOutcome::Rejected {
                token: Some(FeatureToken::new("f1")),
                error: SectionError::ModeMismatch {
                    mode: DrawingMode::Segment,
                    point_count: 3
                },
            }
        );
        assert!(session.registry().is_empty());
    }

    #[test]
    fn test_polyline_mode_accepts_many_points() {
        let mut session = session();
        session.set_mode(DrawingMode::Polyline);
        let outcome = session.handle(draw("f1", vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0]]));

        assert!(matches!(outcome, SessionOutcome::Created { .. }));
        assert!(session.registry().sections()[0].bearing.is_none());
    }

    #[test]
    fn test_draw_rounds_captured_vertices() {
        let mut session = session();
        session.handle(draw("f1", vec![[16.597_849, 49.212_151], [16.6978, 49.2121]]));

        let section = &session.registry().sections()[0];
        assert!((section.vertices[0].longitude - 16.5978).abs() < 1e-9);
        assert!((section.vertices[0].latitude - 49.2122).abs() < 1e-9);
        assert!(section.is_consistent());
    }

    #[test]
    fn test_draw_off_globe_rejected() {
        let mut session = session();
        let outcome = session.handle(draw("f1", vec![[0.0, 0.0], [0.0, 95.0]]));
        assert!(matches!(
            outcome,
            SessionOutcome::Rejected {
                error: SectionError::InvalidCoordinate { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_edit_reconciles_through_tokens() {
        let mut session = session();
        session.handle(draw("f1", vec![[0.0, 0.0], [0.0, 1.0]]));
        session.handle(draw("f2", vec![[1.0, 0.0], [1.0, 1.0]]));

        let outcome = session.handle(SessionEvent::EditCompleted {
            edits: vec![
                (FeatureToken::new("f2"), vec![[1.0, 0.0], [0.0, 0.0]]),
                (FeatureToken::new("ghost"), vec![[0.0, 0.0], [1.0, 1.0]]),
            ],
        });

        let SessionOutcome::Updated { updated, failed, .. } = outcome else {
            panic!("expected Updated");
        };
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].0, FeatureToken::new("f2"));
        assert!((updated[0].1.bearing.unwrap() - 270.0).abs() < 1e-9);
        assert_eq!(
            failed,
            vec![(
                FeatureToken::new("ghost"),
                SectionError::UnknownToken {
                    token: "ghost".to_string()
                }
            )]
        );

        // Order and first section untouched
        let sections = session.registry().sections();
        assert_eq!(sections[0].bearing, Some(0.0));
        assert_eq!(sections[1].id, updated[0].1.id);
    }

    #[test]
    fn test_edit_with_too_few_vertices_fails_that_pair_only() {
        let mut session = session();
        session.handle(draw("f1", vec![[0.0, 0.0], [0.0, 1.0]]));
        session.handle(draw("f2", vec![[1.0, 0.0], [1.0, 1.0]]));

        let outcome = session.handle(SessionEvent::EditCompleted {
            edits: vec![
                (FeatureToken::new("f1"), vec![[0.0, 0.0]]),
                (FeatureToken::new("f2"), vec![[1.0, 0.0], [2.0, 0.0]]),
            ],
        });

        let SessionOutcome::Updated { updated, failed, .. } = outcome else {
            panic!("expected Updated");
        };
        assert_eq!(updated.len(), 1);
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, FeatureToken::new("f1"));
        assert!(matches!(failed[0].1, SectionError::InvalidGeometry { .. }));
    }

    #[test]
    fn test_edit_reports_each_token_bound_to_one_section() {
        let mut session = session();
        let SessionOutcome::Created { section, .. } =
            session.handle(draw("f1", vec![[0.0, 0.0], [0.0, 1.0]]))
        else {
            panic!("expected Created");
        };
        session.bind(FeatureToken::new("f2"), section.id).unwrap();

        let outcome = session.handle(SessionEvent::EditCompleted {
            edits: vec![
                (FeatureToken::new("f1"), vec![[0.0, 0.0], [1.0, 0.0]]),
                (FeatureToken::new("f2"), vec![[0.0, 0.0]]),
            ],
        });

        let SessionOutcome::Updated { updated, failed, .. } = outcome else {
            panic!("expected Updated");
        };
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].0, FeatureToken::new("f1"));
        assert_eq!(updated[0].1.id, section.id);
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, FeatureToken::new("f2"));
        assert!(matches!(failed[0].1, SectionError::InvalidGeometry { .. }));
    }

    #[test]
    fn test_redraw_with_same_token_rebinds() {
        let mut session = session();
        session.handle(draw("f1", vec![[0.0, 0.0], [0.0, 1.0]]));
        let first = session.section_for(&FeatureToken::new("f1")).unwrap();

        session.handle(draw("f1", vec![[1.0, 0.0], [1.0, 1.0]]));
        let second = session.section_for(&FeatureToken::new("f1")).unwrap();

        assert_ne!(first, second);
        assert_eq!(session.registry().len(), 2);
        assert!(session.registry().contains(&first));
    }

    #[test]
    fn test_manual_entry_follows_drawing_mode() {
        let mut session = session();
        let entry = ManualEntry::new(vec![
            CoordinateFields::new("0", "0"),
            CoordinateFields::new("0", "1"),
            CoordinateFields::new("1", "1"),
        ]);

        let outcome = session.handle(SessionEvent::ManualSubmitted {
            entry: entry.clone(),
        });
        assert_eq!(
            outcome,
            SessionOutcome::Rejected {
                token: None,
                error: SectionError::ModeMismatch {
                    mode: DrawingMode::Segment,
                    point_count: 3
                },
            }
        );
        assert!(session.registry().is_empty());

        session.set_mode(DrawingMode::Polyline);
        let outcome = session.handle(SessionEvent::ManualSubmitted { entry });
        assert!(matches!(outcome, SessionOutcome::Created { .. }));
    }

    #[test]
    fn test_manual_entry_creates_unbound_section() {
        let mut session = DrawingSession::with_registry(
            SectionRegistry::new(),
            Box::new(Scaled),
            DisplayPreferences::default(),
        );
        let outcome = session.handle(SessionEvent::ManualSubmitted {
            entry: ManualEntry::segment("1", "2", "3", "4"),
        });

        let SessionOutcome::Created {
            token,
            section,
            geometry,
        } = outcome
        else {
            panic!("expected Created");
        };
        assert!(token.is_none());
        assert_eq!(geometry, vec![[1000.0, 2000.0], [3000.0, 4000.0]]);
        assert_eq!(section.vertices[0], GpsPoint::from_lon_lat(1.0, 2.0));

        // Host binds its rendered feature afterwards
        session.bind(FeatureToken::new("m1"), section.id).unwrap();
        assert_eq!(session.section_for(&FeatureToken::new("m1")), Some(section.id));
        assert!(session
            .bind(FeatureToken::new("m2"), SectionId::new())
            .is_err());
    }

    #[test]
    fn test_manual_entry_rejected() {
        let mut session = session();
        let outcome = session.handle(SessionEvent::ManualSubmitted {
            entry: ManualEntry::segment("1", "", "", ""),
        });
        assert!(matches!(
            outcome,
            SessionOutcome::Rejected {
                token: None,
                error: SectionError::MissingCoordinate { .. }
            }
        ));
        assert!(session.registry().is_empty());
    }

    #[test]
    fn test_clear_forgets_bindings() {
        let mut session = session();
        session.handle(draw("f1", vec![[0.0, 0.0], [0.0, 1.0]]));

        assert_eq!(session.handle(SessionEvent::ClearRequested), SessionOutcome::Cleared);
        assert!(session.registry().is_empty());
        assert!(session.section_for(&FeatureToken::new("f1")).is_none());

        // Stale edit after clear
        let outcome = session.handle(SessionEvent::EditCompleted {
            edits: vec![(FeatureToken::new("f1"), vec![[0.0, 0.0], [1.0, 0.0]])],
        });
        let SessionOutcome::Updated { updated, failed, .. } = outcome else {
            panic!("expected Updated");
        };
        assert!(updated.is_empty());
        assert_eq!(failed.len(), 1);
    }

    #[test]
    fn test_reset_keeps_mode_restores_units() {
        let mut session = session();
        session.set_preferences(DisplayPreferences {
            mode: DrawingMode::Polyline,
            length_unit: LengthUnit::Miles,
            ..DisplayPreferences::default()
        });
        session.handle(draw("f1", vec![[0.0, 0.0], [0.0, 1.0]]));

        session.reset();

        assert!(session.registry().is_empty());
        assert_eq!(session.mode(), DrawingMode::Polyline);
        assert_eq!(session.preferences().length_unit, LengthUnit::Kilometers);
    }

    #[test]
    fn test_mode_switch_keeps_sections() {
        let mut session = session();
        session.handle(draw("f1", vec![[0.0, 0.0], [0.0, 1.0]]));
        session.set_mode(DrawingMode::Polyline);
        assert_eq!(session.registry().len(), 1);
        assert_eq!(session.table().rows.len(), 1);
    }
}
