use std::collections::BTreeMap;

use foundation::math::distance_meters;

use crate::PanoPoint;

/// Radius (meters) used when listing neighbors without a tighter filter.
pub const DEFAULT_NEIGHBOR_RADIUS_M: f64 = 80.0;

/// Panorama name to the names of every other panorama within a fixed radius.
///
/// Every input point appears as a key; isolated points map to an empty list.
/// Ordering of both keys and neighbor lists is deterministic.
pub type AdjacencyMap = BTreeMap<String, Vec<String>>;

/// Computes the threshold adjacency graph over `points`.
///
/// Full O(n^2) pairwise scan; fine at the tens-to-hundreds scale these
/// catalogs have. A spatial index is the upgrade path if that ever changes.
pub fn compute_neighbors(points: &[PanoPoint], radius_m: f64) -> AdjacencyMap {
    let mut neighbors = AdjacencyMap::new();

    for a in points {
        let entry = neighbors.entry(a.name.clone()).or_default();
        for b in points {
            if a.name == b.name {
                continue;
            }
            let dist = distance_meters(a.lat_deg, a.lon_deg, b.lat_deg, b.lon_deg);
            if dist <= radius_m {
                entry.push(b.name.clone());
            }
        }
    }

    neighbors
}
