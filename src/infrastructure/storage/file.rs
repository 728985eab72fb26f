//! JSON file snapshot store
//!
//! The snapshot is written to a sibling temp file and renamed over the
//! target, so readers see either the old or the new snapshot, never a
//! partial write.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::{ParkingSpot, SpotStore, StoreError};

/// Device-local store keeping the spot collection in one JSON file
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "spots.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SpotStore for JsonFileStore {
    fn save(&self, spots: &[ParkingSpot]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let encoded = serde_json::to_vec_pretty(spots)?;
        let temp = self.temp_path();
        {
            let mut file = fs::File::create(&temp)?;
            file.write_all(&encoded)?;
            file.sync_all()?;
        }
        fs::rename(&temp, &self.path)?;

        debug!(path = %self.path.display(), count = spots.len(), "Spot snapshot saved");
        Ok(())
    }

    fn read(&self) -> Result<Option<Vec<ParkingSpot>>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spot(id: i64, address: Option<&str>) -> ParkingSpot {
        ParkingSpot {
            id,
            latitude: 48.8566,
            longitude: 2.3522,
            available: true,
            address: address.map(String::from),
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("spots.json"));

        assert!(store.read().unwrap().is_none());
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_then_load_in_new_instance() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("spots.json");
        let spots = vec![spot(1, Some("8 Rue Mouffetard, 75005 Paris, France")), spot(2, None)];

        JsonFileStore::new(&path).save(&spots).unwrap();

        assert_eq!(JsonFileStore::new(&path).load(), spots);
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("spots.json"));
        store.save(&[spot(1, None)]).unwrap();

        assert!(!store.temp_path().exists());
        assert!(store.path().exists());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("spots.json");
        fs::write(&path, b"\x00\x01 definitely not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.read(), Err(StoreError::Corrupt(_))));
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_overwrites_corrupt_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("spots.json");
        fs::write(&path, "[{").unwrap();

        let store = JsonFileStore::new(&path);
        store.save(&[spot(4, None)]).unwrap();
        assert_eq!(store.load(), vec![spot(4, None)]);
    }
}
