//! Registry configuration and display preferences.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::{ColorPolicy, FixedColor, RandomHexColor};
use crate::error::Result;
use crate::section::MIN_VERTICES;
use crate::units::{AngleUnit, LengthUnit};

/// How new drawings are captured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawingMode {
    /// Two-point sections with a bearing
    #[default]
    Segment,
    /// Multi-point lines, length only
    Polyline,
}

impl DrawingMode {
    /// Largest vertex count a drawing may have in this mode.
    pub fn max_vertices(&self) -> Option<usize> {
        match self {
            DrawingMode::Segment => Some(MIN_VERTICES),
            DrawingMode::Polyline => None,
        }
    }

    /// Whether a freshly drawn line with `count` vertices fits this mode.
    pub fn accepts(&self, count: usize) -> bool {
        match self.max_vertices() {
            Some(max) => count == max,
            None => count >= MIN_VERTICES,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DrawingMode::Segment => "segment",
            DrawingMode::Polyline => "polyline",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "segment" | "section" => Some(DrawingMode::Segment),
            "polyline" | "polygon" => Some(DrawingMode::Polyline),
            _ => None,
        }
    }
}

impl fmt::Display for DrawingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which color policy a registry starts with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "policy", content = "value")]
pub enum ColorChoice {
    #[default]
    Random,
    Fixed(String),
}

impl ColorChoice {
    /// Build the policy this choice names.
    pub fn build(&self) -> Box<dyn ColorPolicy> {
        match self {
            ColorChoice::Random => Box::new(RandomHexColor),
            ColorChoice::Fixed(color) => Box::new(FixedColor(color.clone())),
        }
    }
}

/// Configuration for a section registry and its views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistryConfig {
    /// Color policy for new sections.
    /// Default: random hex color
    pub color: ColorChoice,

    /// Decimal places kept for vertices captured from the map.
    /// Default: 4 (~11 meters)
    pub coordinate_precision: u32,

    /// Decimal places shown for lengths in table rows.
    /// Default: 2
    pub length_precision: usize,

    /// Decimal places shown for bearings in table rows.
    /// Default: 2
    pub bearing_precision: usize,
}

impl RegistryConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            color: ColorChoice::Random,
            coordinate_precision: 4,
            length_precision: 2,
            bearing_precision: 2,
        }
    }
}

/// The one UI preference that survives reloads: drawing mode and units.
///
/// The crate does no I/O; hosts store the JSON form wherever they like.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayPreferences {
    pub mode: DrawingMode,
    pub length_unit: LengthUnit,
    pub angle_unit: AngleUnit,
}

impl DisplayPreferences {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse stored preferences. Missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse stored preferences, falling back to defaults when the stored
    /// value is absent or unreadable.
    pub fn load_or_default(stored: Option<&str>) -> Self {
        match stored.map(Self::from_json) {
            Some(Ok(prefs)) => prefs,
            Some(Err(e)) => {
                log::warn!("[Preferences] Ignoring stored preferences: {}", e);
                Self::default()
            }
            None => Self::default(),
        }
    }
}
