//! Defines the data structures representing GHCN-Daily weather stations as they
//! appear in the persisted station catalog. Also includes implementations
//! necessary for spatial indexing using the `rstar` crate.

use crate::types::aggregates::Hemisphere;
use crate::types::year_span::YearSpan;
use rstar::{PointDistance, RTreeObject, AABB};
use serde::{Deserialize, Serialize};

/// Represents a single GHCN-Daily weather station with temperature coverage.
///
/// `first_year` and `last_year` bound the years in which *both* TMAX and TMIN
/// are reported by the station inventory: the latest of the two first years
/// and the earliest of the two last years. Stations without any TMAX/TMIN
/// inventory carry `0` for both.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Station {
    /// The GHCN station identifier (e.g., "GME00102380"), always 11 characters.
    pub id: String,
    /// Human readable station name, as listed in the station list.
    pub name: String,
    /// Latitude in decimal degrees (positive for North, negative for South).
    pub latitude: f64,
    /// Longitude in decimal degrees (positive for East, negative for West).
    pub longitude: f64,
    /// First year with both TMAX and TMIN available, `0` if unknown.
    pub first_year: i32,
    /// Last year with both TMAX and TMIN available, `0` if unknown.
    pub last_year: i32,
}

impl Station {
    /// The hemisphere used for seasonal grouping. The equator counts as north.
    pub fn hemisphere(&self) -> Hemisphere {
        Hemisphere::from_latitude(self.latitude)
    }

    /// Returns `true` if the station's temperature coverage overlaps `years`.
    pub fn overlaps(&self, years: YearSpan) -> bool {
        self.first_year <= years.to() && self.last_year >= years.from()
    }
}

/// Implementation required by `rstar` to treat a `Station` as an object within an R-Tree.
impl RTreeObject for Station {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.latitude, self.longitude])
    }
}

/// Squared Euclidean distance in degree space. Only used by the R-tree for
/// candidate selection; real distances are computed with haversine.
impl PointDistance for Station {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.latitude - point[0];
        let dy = self.longitude - point[1];
        dx * dx + dy * dy
    }
}
