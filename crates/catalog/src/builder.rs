use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::PI;

use foundation::math::bearing_radians;

use crate::adjacency::compute_neighbors;
use crate::{Catalog, Hotspot, PanoPoint, Panorama};

/// Tunables for catalog construction.
///
/// The yaw offset and pitch encode viewer calibration (where the viewer's
/// zero yaw points, flat-terrain assumption). They are configuration, not
/// derived from data.
#[derive(Debug, Clone, PartialEq)]
pub struct TourConfig {
    /// Max distance (meters) between two panoramas for a navigation link.
    pub link_radius_m: f64,
    /// Added to the geodesic bearing to produce the viewer yaw.
    pub yaw_offset_rad: f64,
    /// Pitch assigned to every hotspot.
    pub hotspot_pitch_rad: f64,
    /// Prefix of the tile URL template, without trailing slash.
    pub asset_url_prefix: String,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            link_radius_m: 30.0,
            yaw_offset_rad: -PI,
            hotspot_pitch_rad: 0.0,
            asset_url_prefix: "./assets".to_string(),
        }
    }
}

impl TourConfig {
    pub fn with_link_radius(mut self, radius_m: f64) -> Self {
        self.link_radius_m = radius_m;
        self
    }

    fn tile_url(&self, name: &str) -> String {
        format!("{}/{name}/{{z}}/{{f}}/{{y}}_{{x}}.jpg", self.asset_url_prefix)
    }
}

/// Builds the panorama catalog from coordinate records and the set of
/// available asset directories.
///
/// A panorama is created only for directories with matching coordinates;
/// directories without coordinates are skipped, not errored. Adjacency runs
/// over the full coordinate set, but hotspots are only emitted toward
/// neighbors that made it into the catalog, so every hotspot target is a
/// catalog key. Deterministic and idempotent for identical inputs.
pub fn build_catalog(points: &[PanoPoint], assets: &BTreeSet<String>, config: &TourConfig) -> Catalog {
    let mut coords: BTreeMap<&str, &PanoPoint> = BTreeMap::new();
    for point in points {
        coords.insert(point.name.as_str(), point);
    }

    let mut panoramas = BTreeMap::new();
    for name in assets {
        let Some(point) = coords.get(name.as_str()) else {
            continue;
        };
        panoramas.insert(
            name.clone(),
            Panorama {
                url: config.tile_url(name),
                lat: point.lat_deg,
                lng: point.lon_deg,
                hotspots: Vec::new(),
            },
        );
    }

    let neighbors = compute_neighbors(points, config.link_radius_m);

    let names: Vec<String> = panoramas.keys().cloned().collect();
    for name in &names {
        let Some(nbrs) = neighbors.get(name) else {
            continue;
        };
        let here = &panoramas[name];
        let (lat, lng) = (here.lat, here.lng);

        let mut hotspots = Vec::new();
        for nbr in nbrs {
            // Neighbor exists as a point but has no asset directory: no link.
            let Some(there) = panoramas.get(nbr) else {
                continue;
            };
            let bearing = bearing_radians(lat, lng, there.lat, there.lng);
            hotspots.push(Hotspot {
                yaw: bearing + config.yaw_offset_rad,
                pitch: config.hotspot_pitch_rad,
                target: nbr.clone(),
            });
        }

        if let Some(pano) = panoramas.get_mut(name) {
            pano.hotspots = hotspots;
        }
    }

    Catalog { panoramas }
}

/// Names present in `assets` that did not make it into the catalog
/// (no matching coordinate record). For operator logging.
pub fn dirs_without_coords(catalog: &Catalog, assets: &BTreeSet<String>) -> Vec<String> {
    assets
        .iter()
        .filter(|name| !catalog.contains(name))
        .cloned()
        .collect()
}
