use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod adjacency;
pub mod builder;

pub use adjacency::{AdjacencyMap, DEFAULT_NEIGHBOR_RADIUS_M, compute_neighbors};
pub use builder::{TourConfig, build_catalog, dirs_without_coords};

/// A geotagged panorama location, prior to catalog construction.
///
/// Coordinates are WGS84 degrees. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct PanoPoint {
    pub name: String,
    pub lat_deg: f64,
    pub lon_deg: f64,
}

impl PanoPoint {
    pub fn new(name: impl Into<String>, lat_deg: f64, lon_deg: f64) -> Self {
        Self {
            name: name.into(),
            lat_deg,
            lon_deg,
        }
    }
}

/// A clickable navigation marker toward a neighboring panorama.
///
/// Angles are radians in the viewer's convention. `target` is guaranteed by
/// construction to be a key of the catalog the hotspot belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub yaw: f64,
    pub pitch: f64,
    pub target: String,
}

/// One panorama scene as served to the viewer client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panorama {
    /// Tile URL template handed opaquely to the viewer
    /// (`{z}`/`{f}`/`{y}`/`{x}` placeholders).
    pub url: String,
    pub lat: f64,
    pub lng: f64,
    pub hotspots: Vec<Hotspot>,
}

/// The complete panorama catalog, keyed by panorama identifier.
///
/// Serializes as a bare JSON object mapping identifier to panorama. Built
/// once per load and read-only thereafter.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub panoramas: BTreeMap<String, Panorama>,
}

impl Catalog {
    pub fn get(&self, name: &str) -> Option<&Panorama> {
        self.panoramas.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.panoramas.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.panoramas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panoramas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Panorama)> {
        self.panoramas.iter()
    }
}
