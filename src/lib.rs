//! # Section Registry
//!
//! Core model for a map annotation tool where users draw line "sections"
//! on a map (or type their coordinates) and read back each section's
//! length and bearing.
//!
//! This library provides:
//! - A registry of sections with stable identities and derived metrics
//! - Great-circle length and planar-delta bearing computation
//! - Reconciliation of edits (single or batched) back into section records
//! - Unit conversion and table rows for display layers
//!
//! Rendering, hit testing and projection math stay with the host's map
//! widget; the crate only sees geographic (longitude, latitude) vertices
//! plus whatever [`Projection`] the host plugs into a [`DrawingSession`].
//!
//! ## Features
//!
//! - **`ffi`** - Enable FFI bindings over a process-wide registry
//!
//! ## Quick Start
//!
//! ```rust
//! use section_registry::{GpsPoint, SectionRegistry};
//!
//! let mut registry = SectionRegistry::new();
//! let section = registry
//!     .create(vec![
//!         GpsPoint::from_lon_lat(16.5978, 49.2121),
//!         GpsPoint::from_lon_lat(16.6978, 49.2121),
//!     ])
//!     .unwrap();
//!
//! println!("{}: {:.0} m at {:?}°", section.id, section.length, section.bearing);
//! assert_eq!(registry.list().len(), 1);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, SectionError};

// Geographic utilities (distance, bearing, bounds)
pub mod geo_utils;
pub use geo_utils::{bearing_degrees, haversine_distance, polyline_length};

// Length / angle units for display
pub mod units;
pub use units::{AngleUnit, LengthUnit};

// Display color strategies
pub mod color;
pub use color::{ColorPolicy, FixedColor, RandomHexColor};

// Section record and derived metrics
pub mod section;
pub use section::{Section, SectionId, SectionKind, SectionMetrics};

// Configuration and the persisted display preference
pub mod config;
pub use config::{ColorChoice, DisplayPreferences, DrawingMode, RegistryConfig};

// Stateful section registry
pub mod registry;
pub use registry::{with_registry, BatchUpdate, RegistryStats, SectionRegistry, REGISTRY};

// Manual coordinate entry
pub mod manual;
pub use manual::{CoordinateFields, ManualEntry};

// Rendering-layer coordinate seam
pub mod projection;
pub use projection::{Geographic, Projection};

// Event-driven session over the registry
pub mod session;
pub use session::{DrawingSession, FeatureToken, SessionEvent, SessionOutcome};

// Table rows for display
pub mod table;
pub use table::{SectionRow, SectionTable};

// FFI bindings for host platforms
#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
pub(crate) fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("SectionRegistry"),
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
pub(crate) fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate with latitude and longitude in degrees.
///
/// Map widgets usually hand out `[lon, lat]` pairs, so prefer
/// [`GpsPoint::from_lon_lat`] when converting from them.
///
/// # Example
/// ```
/// use section_registry::GpsPoint;
/// let point = GpsPoint::from_lon_lat(16.5978, 49.2121); // Brno
/// assert_eq!(point.latitude, 49.2121);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Create a point from a `[lon, lat]` ordered pair.
    pub fn from_lon_lat(longitude: f64, latitude: f64) -> Self {
        Self::new(latitude, longitude)
    }

    /// The point as a `[lon, lat]` pair.
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// Round both coordinates to `decimals` places.
    pub fn rounded(&self, decimals: u32) -> Self {
        let factor = 10f64.powi(decimals as i32);
        Self::new(
            (self.latitude * factor).round() / factor,
            (self.longitude * factor).round() / factor,
        )
    }
}

/// Bounding box over a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from GPS points.
    pub fn from_points(points: &[GpsPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Grow these bounds to also cover `other`.
    pub fn union(&self, other: &Bounds) -> Self {
        Self {
            min_lat: self.min_lat.min(other.min_lat),
            max_lat: self.max_lat.max(other.max_lat),
            min_lng: self.min_lng.min(other.min_lng),
            max_lng: self.max_lng.max(other.max_lng),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
