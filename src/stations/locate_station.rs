use crate::explorer::LatLon;
use crate::stations::catalog::StationCatalog;
use crate::types::station::Station;
use crate::types::year_span::YearSpan;
use haversine::{distance, Location as HaversineLocation, Units};
use ordered_float::OrderedFloat;

/// Lower bound of the length of one degree of latitude, in km.
const KM_PER_DEGREE: f64 = 110.0;

/// Great-circle distance between two points in km, on a sphere of radius 6371 km.
pub fn haversine_km(a: LatLon, b: LatLon) -> f64 {
    distance(
        HaversineLocation {
            latitude: a.0,
            longitude: a.1,
        },
        HaversineLocation {
            latitude: b.0,
            longitude: b.1,
        },
        Units::Kilometers,
    )
}

/// Degree-space query points and squared radius that together cover every
/// point within `radius_km` of `center`.
///
/// The R-tree knows nothing about wrapping longitudes, so searches reaching
/// past the antimeridian are repeated from a center shifted by 360 degrees.
/// Returns `None` when the search reaches a pole, where every longitude is in
/// range and no circle in degree space covers the cap.
fn search_circles(center: LatLon, radius_km: f64) -> Option<(Vec<[f64; 2]>, f64)> {
    let LatLon(lat, lon) = center;
    let lat_margin = radius_km / KM_PER_DEGREE;
    if lat.abs() + lat_margin >= 90.0 {
        return None;
    }
    let widest_lat = lat.abs() + lat_margin;
    let lon_margin = (radius_km / (KM_PER_DEGREE * widest_lat.to_radians().cos())).min(179.9);

    let mut centers = vec![[lat, lon]];
    if lon - lon_margin < -180.0 {
        centers.push([lat, lon + 360.0]);
    }
    if lon + lon_margin > 180.0 {
        centers.push([lat, lon - 360.0]);
    }
    Some((centers, lat_margin * lat_margin + lon_margin * lon_margin))
}

impl StationCatalog {
    /// Up to `limit` stations within `max_distance_km` of `location` whose
    /// temperature coverage overlaps `years`, nearest first.
    ///
    /// Stations at equal distance are ordered by ID.
    pub fn nearest(
        &self,
        location: LatLon,
        max_distance_km: f64,
        limit: usize,
        years: YearSpan,
    ) -> Vec<(Station, f64)> {
        if limit == 0 || max_distance_km < 0.0 {
            return vec![];
        }

        let pool: Vec<&Station> = match search_circles(location, max_distance_km) {
            Some((centers, squared_radius)) => centers
                .into_iter()
                .flat_map(|center| self.rtree.locate_within_distance(center, squared_radius))
                .collect(),
            None => self.rtree.iter().collect(),
        };
        let mut candidates: Vec<(OrderedFloat<f64>, &Station)> = pool
            .into_iter()
            .filter(|station| station.overlaps(years))
            .filter_map(|station| {
                let dist_km = haversine_km(location, LatLon(station.latitude, station.longitude));
                (dist_km <= max_distance_km).then_some((OrderedFloat(dist_km), station))
            })
            .collect();

        candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id)));
        candidates.dedup_by(|a, b| a.1.id == b.1.id);
        candidates.truncate(limit);
        candidates
            .into_iter()
            .map(|(dist, station)| (station.clone(), dist.into_inner()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(
        id: &str,
        latitude: f64,
        longitude: f64,
        first_year: i32,
        last_year: i32,
    ) -> Station {
        Station {
            id: id.to_string(),
            name: id.to_string(),
            latitude,
            longitude,
            first_year,
            last_year,
        }
    }

    fn black_forest() -> StationCatalog {
        StationCatalog::from_stations(vec![
            // Roughly 11 km, 30 km, 45 km and 80 km from the default center.
            station("GM000000001", 48.1458, 8.4617, 1950, 2024),
            station("GM000000002", 48.3158, 8.4617, 1950, 2024),
            station("GM000000003", 48.0458, 9.0670, 1950, 2024),
            station("GM000000004", 48.7658, 8.4617, 1950, 2024),
            // Close, but no coverage in the queried years.
            station("GM000000005", 48.0558, 8.4617, 1900, 1940),
            station("GM000000006", 48.0358, 8.4617, 0, 0),
        ])
    }

    const CENTER: LatLon = LatLon(48.0458, 8.4617);

    #[test]
    fn haversine_matches_known_distance() {
        // One degree of latitude on a 6371 km sphere.
        let d = haversine_km(LatLon(0.0, 0.0), LatLon(1.0, 0.0));
        assert!((d - 111.19).abs() < 0.01, "got {d}");
        assert_eq!(haversine_km(CENTER, CENTER), 0.0);
    }

    #[test]
    fn results_are_sorted_and_within_radius() {
        let catalog = black_forest();
        let found = catalog.nearest(CENTER, 50.0, 10, YearSpan::new(2000, 2024));
        let ids: Vec<&str> = found.iter().map(|(s, _)| s.id.as_str()).collect();
        assert_eq!(ids, vec!["GM000000001", "GM000000002", "GM000000003"]);
        assert!(found.windows(2).all(|w| w[0].1 <= w[1].1));
        assert!(found.iter().all(|(_, d)| *d <= 50.0));
    }

    #[test]
    fn limit_truncates_to_nearest() {
        let catalog = black_forest();
        let found = catalog.nearest(CENTER, 100.0, 2, YearSpan::new(2000, 2024));
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0.id, "GM000000001");
    }

    #[test]
    fn coverage_filter_excludes_stations() {
        let catalog = black_forest();
        let found = catalog.nearest(CENTER, 5.0, 5, YearSpan::new(2000, 2024));
        assert!(found.is_empty());

        let found = catalog.nearest(CENTER, 5.0, 5, YearSpan::new(1930, 1935));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0.id, "GM000000005");
    }

    #[test]
    fn search_crosses_the_antimeridian() {
        let catalog = StationCatalog::from_stations(vec![
            station("FJ000000001", -17.0, 179.9, 1950, 2024),
            station("FJ000000002", -17.0, -179.9, 1950, 2024),
        ]);
        let found = catalog.nearest(LatLon(-17.0, 179.95), 50.0, 5, YearSpan::new(2000, 2024));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn search_reaches_across_the_pole() {
        let catalog = StationCatalog::from_stations(vec![
            station("GL000000001", 89.8, 180.0, 1950, 2024),
            station("GL000000002", 80.0, 180.0, 1950, 2024),
        ]);
        let found = catalog.nearest(LatLon(89.8, 0.0), 50.0, 5, YearSpan::new(2000, 2024));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0.id, "GL000000001");
        assert!((found[0].1 - 44.48).abs() < 0.1, "got {}", found[0].1);

        let south =
            StationCatalog::from_stations(vec![station("AY000000001", -89.9, -90.0, 1950, 2024)]);
        let found = south.nearest(LatLon(-89.9, 90.0), 30.0, 5, YearSpan::new(2000, 2024));
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn zero_limit_returns_nothing() {
        let catalog = black_forest();
        assert!(catalog.nearest(CENTER, 100.0, 0, YearSpan::default()).is_empty());
    }
}
