//! Unified error handling for the section registry.
//!
//! Every failure is a rejected operation with an explicit result. Nothing in
//! this crate performs I/O, so there are no fatal errors: callers surface
//! these as inline validation messages and carry on.

use crate::config::DrawingMode;
use crate::section::SectionId;

/// Unified error type for section operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SectionError {
    /// Fewer vertices than a section needs
    #[error("section has {point_count} points, minimum {minimum_required} required")]
    InvalidGeometry {
        point_count: usize,
        minimum_required: usize,
    },
    /// Update referenced an id the registry does not hold
    #[error("section not found: {id}")]
    NotFound { id: SectionId },
    /// Draw event shape not accepted by the active drawing mode
    #[error("{mode} mode does not accept a drawing with {point_count} points")]
    ModeMismatch {
        mode: DrawingMode,
        point_count: usize,
    },
    /// Manual entry field left empty while its partner is filled
    #[error("coordinate field '{field}' is empty")]
    MissingCoordinate { field: String },
    /// Manual entry field that is not a usable coordinate
    #[error("coordinate field '{field}' has invalid value '{value}'")]
    InvalidCoordinate { field: String, value: String },
    /// Edit event for a rendered feature the session never bound
    #[error("unknown feature token: {token}")]
    UnknownToken { token: String },
    /// JSON encode/decode failure
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

impl From<serde_json::Error> for SectionError {
    fn from(e: serde_json::Error) -> Self {
        SectionError::Serialization {
            message: e.to_string(),
        }
    }
}

/// Result type alias for section operations.
pub type Result<T> = std::result::Result<T, SectionError>;

/// Extension trait for converting Option to SectionError.
pub trait OptionExt<T> {
    /// Convert Option to Result with a not-found error for `id`.
    fn ok_or_not_found(self, id: &SectionId) -> Result<T>;

    /// Convert Option to Result with an invalid geometry error.
    fn ok_or_insufficient_points(self, point_count: usize, minimum: usize) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, id: &SectionId) -> Result<T> {
        self.ok_or_else(|| SectionError::NotFound { id: id.clone() })
    }

    fn ok_or_insufficient_points(self, point_count: usize, minimum: usize) -> Result<T> {
        self.ok_or(SectionError::InvalidGeometry {
            point_count,
            minimum_required: minimum,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SectionError::InvalidGeometry {
            point_count: 1,
            minimum_required: 2,
        };
        assert_eq!(
            err.to_string(),
            "section has 1 points, minimum 2 required"
        );

        let err = SectionError::ModeMismatch {
            mode: DrawingMode::Segment,
            point_count: 3,
        };
        assert!(err.to_string().contains("segment"));
    }

    #[test]
    fn test_option_ext() {
        let none: Option<i32> = None;
        let result = none.ok_or_insufficient_points(0, 2);
        assert!(matches!(
            result,
            Err(SectionError::InvalidGeometry { point_count: 0, .. })
        ));

        let id = SectionId::new();
        let result = None::<i32>.ok_or_not_found(&id);
        assert_eq!(result, Err(SectionError::NotFound { id }));
    }

    #[test]
    fn test_from_json_error() {
        let err: SectionError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, SectionError::Serialization { .. }));
    }
}
