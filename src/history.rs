//! Per-drone move history.
//!
//! Every registration and every successful move appends one [`HistoryEntry`].
//! [`JsonFileHistory`] keeps one `<drone id>.json` document per drone inside a
//! configured directory; [`MemoryHistory`] keeps the same data in process.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::DroneError;
use crate::types::{Direction, DroneState};

/// One recorded state of a drone, plus the trace that led to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "droneId")]
    pub drone_id: Uuid,
    #[serde(rename = "xCoordinate")]
    pub x: i32,
    #[serde(rename = "yCoordinate")]
    pub y: i32,
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl HistoryEntry {
    pub fn new(drone_id: Uuid, state: DroneState, details: Vec<String>) -> Self {
        Self {
            drone_id,
            x: state.position.x,
            y: state.position.y,
            direction: state.facing,
            details,
        }
    }
}

/// On-disk document for a single drone.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DroneHistory {
    #[serde(rename = "droneId")]
    pub drone_id: Uuid,
    pub states: Vec<HistoryEntry>,
}

/// Where move histories are kept.
pub trait HistorySink {
    /// Creates the history of a freshly registered drone.
    fn start(&mut self, id: Uuid, entry: HistoryEntry) -> Result<(), DroneError>;

    /// Appends to an existing history; fails with `HistoryNotFound` otherwise.
    fn append(&mut self, id: Uuid, entry: HistoryEntry) -> Result<(), DroneError>;

    fn load(&self, id: Uuid) -> Result<Vec<HistoryEntry>, DroneError>;
}

pub struct JsonFileHistory {
    dir: PathBuf,
}

impl JsonFileHistory {
    /// Opens `dir`, creating it if missing.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn read(&self, id: Uuid) -> Result<DroneHistory, DroneError> {
        let path = self.path(id);
        if !path.exists() {
            return Err(DroneError::HistoryNotFound(id));
        }
        let contents =
            fs::read_to_string(&path).map_err(|source| DroneError::HistoryRead { id, source })?;
        serde_json::from_str(&contents).map_err(|e| DroneError::HistoryRead {
            id,
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })
    }

    fn write(&self, history: &DroneHistory) -> Result<(), DroneError> {
        let id = history.drone_id;
        let path = self.path(id);
        let tmp = path.with_extension("json.tmp");
        let write = || -> io::Result<()> {
            let json = serde_json::to_string_pretty(history)?;
            fs::write(&tmp, json)?;
            fs::rename(&tmp, &path)
        };
        write().map_err(|source| DroneError::HistoryWrite { id, source })?;
        debug!(drone = %id, states = history.states.len(), path = %path.display(), "history saved");
        Ok(())
    }
}

impl HistorySink for JsonFileHistory {
    fn start(&mut self, id: Uuid, entry: HistoryEntry) -> Result<(), DroneError> {
        self.write(&DroneHistory {
            drone_id: id,
            states: vec![entry],
        })
    }

    fn append(&mut self, id: Uuid, entry: HistoryEntry) -> Result<(), DroneError> {
        let mut history = self.read(id)?;
        history.states.push(entry);
        self.write(&history)
    }

    fn load(&self, id: Uuid) -> Result<Vec<HistoryEntry>, DroneError> {
        Ok(self.read(id)?.states)
    }
}

#[derive(Default)]
pub struct MemoryHistory {
    histories: HashMap<Uuid, Vec<HistoryEntry>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistorySink for MemoryHistory {
    fn start(&mut self, id: Uuid, entry: HistoryEntry) -> Result<(), DroneError> {
        self.histories.insert(id, vec![entry]);
        Ok(())
    }

    fn append(&mut self, id: Uuid, entry: HistoryEntry) -> Result<(), DroneError> {
        self.histories
            .get_mut(&id)
            .ok_or(DroneError::HistoryNotFound(id))?
            .push(entry);
        Ok(())
    }

    fn load(&self, id: Uuid) -> Result<Vec<HistoryEntry>, DroneError> {
        self.histories
            .get(&id)
            .cloned()
            .ok_or(DroneError::HistoryNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: Uuid, x: i32, y: i32, details: &[&str]) -> HistoryEntry {
        HistoryEntry::new(
            id,
            DroneState::new(x, y, Direction::North),
            details.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn file_history_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonFileHistory::open(dir.path().join("drone-history")).unwrap();
        let id = Uuid::new_v4();

        sink.start(id, entry(id, 1, 1, &[])).unwrap();
        sink.append(id, entry(id, 1, 3, &["Moved to (1, 3)"]))
            .unwrap();

        // A fresh handle on the same directory sees the same data.
        let reopened = JsonFileHistory::open(sink.dir()).unwrap();
        let states = reopened.load(id).unwrap();
        assert_eq!(states.len(), 2);
        assert!(states[0].details.is_empty());
        assert_eq!(states[1].y, 3);
        assert!(sink.dir().join(format!("{id}.json")).exists());
    }

    #[test]
    fn file_layout_uses_camel_case_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonFileHistory::open(dir.path()).unwrap();
        let id = Uuid::new_v4();
        sink.start(id, entry(id, 2, 5, &[])).unwrap();

        let raw = fs::read_to_string(dir.path().join(format!("{id}.json"))).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["droneId"], id.to_string());
        assert_eq!(json["states"][0]["xCoordinate"], 2);
        assert_eq!(json["states"][0]["direction"], "NORTH");
        assert!(json["states"][0].get("details").is_none());
    }

    #[test]
    fn missing_history_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonFileHistory::open(dir.path()).unwrap();
        let id = Uuid::new_v4();

        assert!(matches!(sink.load(id), Err(DroneError::HistoryNotFound(_))));
        assert!(matches!(
            sink.append(id, entry(id, 0, 0, &[])),
            Err(DroneError::HistoryNotFound(_))
        ));
    }

    #[test]
    fn corrupt_history_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileHistory::open(dir.path()).unwrap();
        let id = Uuid::new_v4();
        fs::write(dir.path().join(format!("{id}.json")), "{ not json").unwrap();

        let err = sink.load(id).unwrap_err();
        assert!(matches!(err, DroneError::HistoryRead { .. }));
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn memory_history_appends_in_order() {
        let mut sink = MemoryHistory::new();
        let id = Uuid::new_v4();
        sink.start(id, entry(id, 0, 0, &[])).unwrap();
        sink.append(id, entry(id, 0, 1, &["a"])).unwrap();
        sink.append(id, entry(id, 0, 2, &["b"])).unwrap();

        let ys: Vec<i32> = sink.load(id).unwrap().iter().map(|e| e.y).collect();
        assert_eq!(ys, vec![0, 1, 2]);
    }
}
