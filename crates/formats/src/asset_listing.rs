use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

#[derive(Debug)]
pub struct AssetListingError {
    pub path: PathBuf,
    pub source: std::io::Error,
}

impl std::fmt::Display for AssetListingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to list asset root {}: {}", self.path.display(), self.source)
    }
}

impl std::error::Error for AssetListingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Lists the panorama asset directories under `root`.
///
/// Each immediate subdirectory name is one panorama identifier. Plain files
/// at the top level are ignored. An unreadable root is an error (fatal at
/// startup: no partial catalog is served).
pub fn list_asset_dirs(root: impl AsRef<Path>) -> Result<BTreeSet<String>, AssetListingError> {
    let root = root.as_ref();
    let entries = fs::read_dir(root).map_err(|source| AssetListingError {
        path: root.to_path_buf(),
        source,
    })?;

    let mut dirs = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|source| AssetListingError {
            path: root.to_path_buf(),
            source,
        })?;
        let file_type = entry.file_type().map_err(|source| AssetListingError {
            path: entry.path(),
            source,
        })?;
        if !file_type.is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => {
                dirs.insert(name);
            }
            Err(raw) => {
                debug!("skipping non-UTF-8 asset directory {raw:?}");
            }
        }
    }

    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::list_asset_dirs;

    #[test]
    fn lists_only_subdirectories() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("V2001528")).unwrap();
        fs::create_dir(root.path().join("V2001533")).unwrap();
        fs::write(root.path().join("index.html"), "<html>").unwrap();

        let dirs = list_asset_dirs(root.path()).unwrap();
        let names: Vec<&str> = dirs.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["V2001528", "V2001533"]);
    }

    #[test]
    fn empty_root_yields_empty_set() {
        let root = tempfile::tempdir().unwrap();
        assert!(list_asset_dirs(root.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let err = list_asset_dirs("/nonexistent/assets").unwrap_err();
        assert_eq!(err.path.to_str(), Some("/nonexistent/assets"));
    }
}
