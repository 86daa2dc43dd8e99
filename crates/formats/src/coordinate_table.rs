use std::path::{Path, PathBuf};

use catalog::PanoPoint;
use serde::Deserialize;
use tracing::debug;

/// A row of the survey export. Header names come from the capture pipeline
/// and are matched verbatim; coordinates arrive as strings and may be blank.
#[derive(Debug, Deserialize)]
struct CoordinateRow {
    #[serde(rename = "name image", default)]
    name: String,
    #[serde(rename = "coordinates Lat", default)]
    lat: String,
    #[serde(rename = "coordinates Long", default)]
    lon: String,
}

#[derive(Debug)]
pub enum CoordinateTableError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Csv {
        path: PathBuf,
        source: csv::Error,
    },
}

impl std::fmt::Display for CoordinateTableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordinateTableError::Io { path, source } => {
                write!(f, "failed to read coordinate table {}: {source}", path.display())
            }
            CoordinateTableError::Csv { path, source } => {
                write!(f, "failed to parse coordinate table {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for CoordinateTableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CoordinateTableError::Io { source, .. } => Some(source),
            CoordinateTableError::Csv { source, .. } => Some(source),
        }
    }
}

/// Parsed coordinate records plus how many rows were dropped on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateTable {
    pub points: Vec<PanoPoint>,
    pub dropped_rows: usize,
}

/// Loads the coordinate CSV and keeps every row with a non-empty identifier
/// and numeric latitude/longitude. Malformed rows are dropped and counted,
/// not errored; a missing or unreadable file is an error (callers treat it
/// as fatal at startup).
pub fn load_coordinate_table(path: impl AsRef<Path>) -> Result<CoordinateTable, CoordinateTableError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| CoordinateTableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    // A file that cannot even yield a header row is unreadable, not a
    // malformed-row situation.
    reader.headers().map_err(|source| CoordinateTableError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    let mut points = Vec::new();
    let mut dropped_rows = 0usize;

    for result in reader.deserialize::<CoordinateRow>() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                // Structurally broken row (e.g. field count mismatch): drop
                // it like any other malformed row.
                debug!("dropping unparseable coordinate row: {e}");
                dropped_rows += 1;
                continue;
            }
        };

        let name = row.name.trim();
        if name.is_empty() {
            dropped_rows += 1;
            continue;
        }
        let (Ok(lat), Ok(lon)) = (row.lat.trim().parse::<f64>(), row.lon.trim().parse::<f64>())
        else {
            debug!("dropping row {name}: non-numeric coordinates");
            dropped_rows += 1;
            continue;
        };
        if !lat.is_finite() || !lon.is_finite() {
            dropped_rows += 1;
            continue;
        }

        points.push(PanoPoint::new(name, lat, lon));
    }

    Ok(CoordinateTable {
        points,
        dropped_rows,
    })
}
