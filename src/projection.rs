//! Coordinate seam between the map widget and the registry.
//!
//! Map widgets report geometry in their own display space (often Web
//! Mercator meters). The registry only stores geographic degrees, so the
//! host plugs its widget's projection in here and the session converts at
//! the boundary. The math itself belongs to the host's mapping library.

use crate::GpsPoint;

/// A point in the widget's display coordinate space, `[x, y]`.
pub type ProjectedCoord = [f64; 2];

/// Conversion between display coordinates and geographic points.
pub trait Projection: Send {
    /// Display coordinate to geographic point.
    fn to_geographic(&self, coord: ProjectedCoord) -> GpsPoint;

    /// Geographic point to display coordinate.
    fn from_geographic(&self, point: &GpsPoint) -> ProjectedCoord;

    /// Convert a whole vertex sequence to geographic points.
    fn unproject(&self, coords: &[ProjectedCoord]) -> Vec<GpsPoint> {
        coords.iter().map(|&c| self.to_geographic(c)).collect()
    }

    /// Convert a whole vertex sequence to display coordinates.
    fn project(&self, points: &[GpsPoint]) -> Vec<ProjectedCoord> {
        points.iter().map(|p| self.from_geographic(p)).collect()
    }
}

/// Identity projection for widgets that already speak `[lon, lat]` degrees.
#[derive(Debug, Clone, Copy, Default)]
pub struct Geographic;

impl Projection for Geographic {
    fn to_geographic(&self, coord: ProjectedCoord) -> GpsPoint {
        GpsPoint::from_lon_lat(coord[0], coord[1])
    }

    fn from_geographic(&self, point: &GpsPoint) -> ProjectedCoord {
        point.lon_lat()
    }
}
