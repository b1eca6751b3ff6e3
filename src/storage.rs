use crate::dlog;
use crate::error::{Result, TrackerError};
use crate::types::Workout;
use crate::workout;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Key under which the snapshot lives.
pub const SNAPSHOT_KEY: &str = "workouts";

/// A string key/value slot store (the browser `localStorage` contract).
pub trait Storage {
    /// `Ok(None)` when the key was never written.
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&mut self, key: &str) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for &mut S {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
    read_only: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes all fail.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        if self.read_only {
            return Err(TrackerError::StorageUnavailable(format!(
                "store is read-only (writing {key})"
            )));
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        if self.read_only {
            return Err(TrackerError::StorageUnavailable(format!(
                "store is read-only (removing {key})"
            )));
        }
        self.items.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under `dir`.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn write_atomic(&self, path: &Path, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

fn unavailable(what: &str, path: &Path, e: &io::Error) -> TrackerError {
    TrackerError::StorageUnavailable(format!("{what} {}: {e}", path.display()))
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(unavailable("reading", &path, &e)),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        self.write_atomic(&path, value)
            .map_err(|e| unavailable("writing", &path, &e))?;
        dlog!("stored key={key} bytes={} path={}", value.len(), path.display());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(unavailable("removing", &path, &e)),
        }
    }
}

/// Serializes the whole collection as the snapshot JSON array.
pub fn encode_snapshot(workouts: &[Workout]) -> Result<String> {
    serde_json::to_string(workouts)
        .map_err(|e| TrackerError::StorageUnavailable(format!("serializing snapshot: {e}")))
}

/// Parses a snapshot. Anything that is not a JSON array yields `None`;
/// callers treat that as an empty collection.
///
/// Each element is read on its own: records that do not parse, break the
/// entry rules or repeat an id are dropped and the rest are kept. Derived
/// fields are recomputed.
pub fn decode_snapshot(raw: &str) -> Option<Vec<Workout>> {
    let parsed: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(err = %e, "ignoring malformed workout snapshot");
            return None;
        }
    };

    let mut out: Vec<Workout> = Vec::with_capacity(parsed.len());
    for (pos, value) in parsed.into_iter().enumerate() {
        let mut w: Workout = match serde_json::from_value(value) {
            Ok(w) => w,
            Err(e) => {
                tracing::warn!(pos, err = %e, "dropping unreadable stored workout");
                continue;
            }
        };
        if !workout::is_consistent(&w) {
            tracing::warn!(id = %w.id, "dropping stored workout with invalid fields");
            continue;
        }
        if out.iter().any(|o| o.id == w.id) {
            tracing::warn!(id = %w.id, "dropping stored workout with duplicate id");
            continue;
        }
        workout::refresh_derived(&mut w);
        out.push(w);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coords, WorkoutDetails, WorkoutKind};

    // Snapshot as written by the browser version of the app.
    const LEGACY: &str = r#"[
      {"date":"2022-03-06T08:09:54.860Z","id":"6554194860","clicks":0,
       "coords":[-18.85,47.53],"distance":2,"duration":12,
       "type":"running","cadence":32,"pace":6,"description":"Running on March 6"},
      {"date":"2022-03-06T08:10:09.539Z","id":"6554209539","clicks":0,
       "coords":[-18.87,47.54],"distance":5,"duration":30,
       "type":"cycling","elevationGain":32,"speed":10,"description":"Cycling on March 6"}
    ]"#;

    #[test]
    fn decodes_legacy_snapshot_and_recomputes_derived() {
        let ws = decode_snapshot(LEGACY).unwrap();
        assert_eq!(ws.len(), 2);

        assert_eq!(ws[0].id, "6554194860");
        assert_eq!(ws[0].kind(), WorkoutKind::Running);
        assert_eq!(ws[0].coords, Coords::new(-18.85, 47.53));
        assert_eq!(
            ws[0].details,
            WorkoutDetails::Running {
                cadence: 32,
                pace: 6.0
            }
        );

        assert_eq!(
            ws[1].details,
            WorkoutDetails::Cycling {
                elevation_gain: 32.0,
                speed: 10.0
            }
        );
        assert_eq!(ws[1].description, "Cycling on March 6");
    }

    #[test]
    fn stale_speed_is_replaced() {
        let raw = LEGACY.replace(r#""speed":10"#, r#""speed":99"#);
        let ws = decode_snapshot(&raw).unwrap();
        assert_eq!(
            ws[1].details,
            WorkoutDetails::Cycling {
                elevation_gain: 32.0,
                speed: 10.0
            }
        );
    }

    #[test]
    fn malformed_snapshot_is_none() {
        assert!(decode_snapshot("").is_none());
        assert!(decode_snapshot("null").is_none());
        assert!(decode_snapshot("{\"id\":1}").is_none());
        assert_eq!(decode_snapshot("[{\"type\":\"swimming\"}]"), Some(vec![]));
    }

    #[test]
    fn unreadable_record_does_not_take_the_others_with_it() {
        let raw = r#"[
          {"date":"2022-03-06T08:09:54.860Z","id":"1","coords":[0,0],"distance":2,"duration":12,
           "type":"running","cadence":32},
          {"date":"2022-03-06T08:09:55.000Z","id":"2","coords":[0,0],"distance":3,"duration":15,
           "type":"running","cadence":170.5},
          "not a record"
        ]"#;
        let ws = decode_snapshot(raw).unwrap();
        assert_eq!(ws.len(), 1);
        assert_eq!(ws[0].id, "1");
    }

    #[test]
    fn invalid_and_duplicate_records_are_dropped() {
        let raw = r#"[
          {"date":"2022-03-06T08:09:54.860Z","id":"1","coords":[0,0],"distance":0,"duration":12,
           "type":"running","cadence":32},
          {"date":"2022-03-06T08:09:54.860Z","id":"2","coords":[0,0],"distance":3,"duration":12,
           "type":"running","cadence":32},
          {"date":"2022-03-06T08:09:54.860Z","id":"2","coords":[0,0],"distance":4,"duration":12,
           "type":"running","cadence":32}
        ]"#;
        let ws = decode_snapshot(raw).unwrap();
        assert_eq!(ws.len(), 1);
        assert_eq!(ws[0].id, "2");
        assert!((ws[0].distance - 3.0).abs() < f64::EPSILON);
        assert_eq!(ws[0].description, "Running on March 6");
    }

    #[test]
    fn encoded_snapshot_uses_browser_field_names() {
        let ws = decode_snapshot(LEGACY).unwrap();
        let json: serde_json::Value = serde_json::from_str(&encode_snapshot(&ws).unwrap()).unwrap();
        let first = &json[0];
        assert_eq!(first["type"], "running");
        assert_eq!(first["cadence"], 32);
        assert_eq!(first["coords"][1], 47.53);
        assert_eq!(first["clicks"], 0);
        assert_eq!(json[1]["elevationGain"], 32.0);
        assert!(json[1].get("elevation_gain").is_none());
    }

    #[test]
    fn file_storage_roundtrip_and_remove() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileStorage::new(tmp.path().join("data"));

        assert_eq!(store.get_item(SNAPSHOT_KEY).unwrap(), None);
        store.set_item(SNAPSHOT_KEY, "[]").unwrap();
        assert!(store.path_for(SNAPSHOT_KEY).is_file());
        assert_eq!(store.get_item(SNAPSHOT_KEY).unwrap().as_deref(), Some("[]"));

        store.remove_item(SNAPSHOT_KEY).unwrap();
        assert_eq!(store.get_item(SNAPSHOT_KEY).unwrap(), None);
        // removing twice is fine
        store.remove_item(SNAPSHOT_KEY).unwrap();
    }

    #[test]
    fn read_only_memory_storage_reports_unavailable() {
        let mut store = MemoryStorage::read_only();
        let err = store.set_item(SNAPSHOT_KEY, "[]").unwrap_err();
        assert!(matches!(err, TrackerError::StorageUnavailable(_)));
        assert!(!store.contains(SNAPSHOT_KEY));
    }
}
