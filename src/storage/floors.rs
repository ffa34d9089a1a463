//! Floor repository for JSON storage
//!
//! Caches every floor with its reading history in floors.json. This is the
//! local copy of the remote floors and readings lists, or the only copy when
//! no remote is configured.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::MeterbookError;
use crate::models::{Floor, FloorId, ReadingId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable floor data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub(crate) struct FloorData {
    pub(crate) floors: Vec<Floor>,
}

/// Repository for floor persistence
pub struct FloorRepository {
    path: PathBuf,
    data: RwLock<BTreeMap<FloorId, Floor>>,
}

impl FloorRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(BTreeMap::new()),
        }
    }

    /// Load floors from disk, normalizing each history
    pub fn load(&self) -> Result<(), MeterbookError> {
        let file_data: FloorData = read_json(&self.path)?;
        self.replace_all(file_data.floors)
    }

    /// Save floors to disk
    pub fn save(&self) -> Result<(), MeterbookError> {
        let data = self.data.read().map_err(|e| {
            MeterbookError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let file_data = FloorData {
            floors: data.values().cloned().collect(),
        };

        write_json_atomic(&self.path, &file_data)
    }

    /// Get a floor by ID
    pub fn get(&self, id: FloorId) -> Result<Option<Floor>, MeterbookError> {
        let data = self.data.read().map_err(|e| {
            MeterbookError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.get(&id).cloned())
    }

    /// Get all floors ordered by ID
    pub fn get_all(&self) -> Result<Vec<Floor>, MeterbookError> {
        let data = self.data.read().map_err(|e| {
            MeterbookError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.values().cloned().collect())
    }

    /// Get a floor by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Result<Option<Floor>, MeterbookError> {
        let data = self.data.read().map_err(|e| {
            MeterbookError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let name_lower = name.trim().to_lowercase();
        Ok(data
            .values()
            .find(|f| f.name.to_lowercase() == name_lower)
            .cloned())
    }

    /// Insert or update a floor
    pub fn upsert(&self, floor: Floor) -> Result<(), MeterbookError> {
        let mut data = self.data.write().map_err(|e| {
            MeterbookError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.insert(floor.id, floor);
        Ok(())
    }

    /// Replace the whole collection, e.g. after a remote refresh
    pub fn replace_all(&self, floors: Vec<Floor>) -> Result<(), MeterbookError> {
        let mut data = self.data.write().map_err(|e| {
            MeterbookError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.clear();
        for mut floor in floors {
            floor.normalize();
            data.insert(floor.id, floor);
        }
        Ok(())
    }

    /// Check if a floor name is already taken
    pub fn name_exists(&self, name: &str) -> Result<bool, MeterbookError> {
        Ok(self.get_by_name(name)?.is_some())
    }

    pub fn count(&self) -> Result<usize, MeterbookError> {
        let data = self.data.read().map_err(|e| {
            MeterbookError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.len())
    }

    /// Next free floor id
    pub fn next_floor_id(&self) -> Result<FloorId, MeterbookError> {
        let data = self.data.read().map_err(|e| {
            MeterbookError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(FloorId::next_after(data.keys().copied()))
    }

    /// Next free reading id across every floor
    pub fn next_reading_id(&self) -> Result<ReadingId, MeterbookError> {
        let data = self.data.read().map_err(|e| {
            MeterbookError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(ReadingId::next_after(
            data.values().flat_map(|f| f.readings.iter().map(|r| r.id)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Reading;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, FloorRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("floors.json");
        let repo = FloorRepository::new(path);
        (temp_dir, repo)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn lift() -> Floor {
        Floor::with_readings(
            FloorId::new(7),
            "Lift",
            vec![
                Reading::new(ReadingId::new(701), date(2024, 6, 15), 150000.0, 0.0),
                Reading::new(ReadingId::new(702), date(2024, 6, 30), 150145.0, 0.0),
            ],
        )
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
        assert_eq!(repo.next_floor_id().unwrap(), FloorId::new(1));
        assert_eq!(repo.next_reading_id().unwrap(), ReadingId::new(1));
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.upsert(lift()).unwrap();
        repo.upsert(Floor::new(FloorId::new(2), "Ground Floor")).unwrap();
        repo.save().unwrap();

        let repo2 = FloorRepository::new(temp_dir.path().join("floors.json"));
        repo2.load().unwrap();

        let floors = repo2.get_all().unwrap();
        assert_eq!(floors.len(), 2);
        assert_eq!(floors[0].name, "Ground Floor");
        assert_eq!(floors[1].readings[1].units_consumed, 145.0);
    }

    #[test]
    fn test_get_by_name_case_insensitive() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(lift()).unwrap();

        assert!(repo.get_by_name("  LIFT ").unwrap().is_some());
        assert!(repo.name_exists("lift").unwrap());
        assert!(!repo.name_exists("Pump Room").unwrap());
    }

    #[test]
    fn test_next_ids() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(lift()).unwrap();
        repo.upsert(Floor::new(FloorId::new(3), "1st Floor")).unwrap();

        assert_eq!(repo.next_floor_id().unwrap(), FloorId::new(8));
        assert_eq!(repo.next_reading_id().unwrap(), ReadingId::new(703));
    }

    #[test]
    fn test_replace_all_normalizes() {
        let (_temp_dir, repo) = create_test_repo();
        let unsorted = Floor {
            id: FloorId::new(8),
            name: "Pump Room".into(),
            readings: vec![
                Reading::new(ReadingId::new(802), date(2024, 6, 29), 55200.0, 0.0),
                Reading::new(ReadingId::new(801), date(2024, 6, 15), 55000.0, 99.0),
            ],
        };
        repo.replace_all(vec![unsorted]).unwrap();

        let floor = repo.get(FloorId::new(8)).unwrap().unwrap();
        assert_eq!(floor.readings[0].id, ReadingId::new(801));
        assert_eq!(floor.readings[0].units_consumed, 0.0);
        assert_eq!(floor.readings[1].units_consumed, 200.0);
    }
}
