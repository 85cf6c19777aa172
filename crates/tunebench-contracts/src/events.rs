use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context};
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

pub type EventPayload = Map<String, Value>;

/// Lifecycle events recorded for a comparison run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEvent {
    RunStarted,
    BackendStarted,
    BackendFinished,
    RunFinished,
}

impl RunEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RunStarted => "run_started",
            Self::BackendStarted => "backend_started",
            Self::BackendFinished => "backend_finished",
            Self::RunFinished => "run_finished",
        }
    }
}

/// Keys the writer owns; payload entries with these names are dropped.
const RESERVED_KEYS: [&str; 2] = ["type", "run_id"];

/// Appends one compact JSON object per event to a `.jsonl` file.
///
/// Every row carries `type`, `run_id` and `ts`. Clones share the same file lock.
#[derive(Debug, Clone)]
pub struct EventWriter {
    path: PathBuf,
    run_id: String,
    lock: Arc<Mutex<()>>,
}

impl EventWriter {
    pub fn new(path: impl Into<PathBuf>, run_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            run_id: run_id.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn emit(&self, event: RunEvent, payload: EventPayload) -> anyhow::Result<Value> {
        let mut row = Map::new();
        row.insert("type".to_string(), Value::from(event.as_str()));
        row.insert("run_id".to_string(), Value::from(self.run_id.as_str()));
        row.insert(
            "ts".to_string(),
            Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)),
        );
        row.extend(
            payload
                .into_iter()
                .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str())),
        );
        let mut line = serde_json::to_string(&row)?;
        line.push('\n');

        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow!("event log lock poisoned"))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()))
            .with_context(|| format!("failed appending to {}", self.path.display()))?;

        Ok(Value::Object(row))
    }
}

/// Reads an event log back, one value per non-blank line.
pub fn read_events(path: &Path) -> anyhow::Result<Vec<Value>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading {}", path.display()))?;
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str::<Value>(line)
                .with_context(|| format!("{} line {} is not JSON", path.display(), idx + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use serde_json::json;

    use super::*;

    #[test]
    fn rows_carry_type_run_id_and_timestamp() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let writer = EventWriter::new(temp.path().join("events.jsonl"), "run-123");

        let mut payload = EventPayload::new();
        payload.insert("backend".to_string(), json!("suno"));
        let emitted = writer.emit(RunEvent::BackendStarted, payload)?;

        let rows = read_events(writer.path())?;
        assert_eq!(rows, vec![emitted]);
        assert_eq!(rows[0]["type"], json!("backend_started"));
        assert_eq!(rows[0]["run_id"], json!("run-123"));
        assert_eq!(rows[0]["backend"], json!("suno"));
        DateTime::parse_from_rfc3339(rows[0]["ts"].as_str().unwrap_or(""))?;
        Ok(())
    }

    #[test]
    fn payload_cannot_replace_reserved_keys() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let writer = EventWriter::new(temp.path().join("events.jsonl"), "run-123");

        let mut payload = EventPayload::new();
        payload.insert("type".to_string(), json!("spoofed"));
        payload.insert("run_id".to_string(), json!("other-run"));
        payload.insert("ts".to_string(), json!("2024-01-01T00:00:00Z"));
        let emitted = writer.emit(RunEvent::RunStarted, payload)?;

        assert_eq!(emitted["type"], json!("run_started"));
        assert_eq!(emitted["run_id"], json!("run-123"));
        assert_eq!(emitted["ts"], json!("2024-01-01T00:00:00Z"));
        Ok(())
    }

    #[test]
    fn clones_append_to_one_file_in_nested_dir() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let writer = EventWriter::new(temp.path().join("runs").join("events.jsonl"), "run-1");
        let clone = writer.clone();

        writer.emit(RunEvent::RunStarted, EventPayload::new())?;
        clone.emit(RunEvent::RunFinished, EventPayload::new())?;

        let types: Vec<Value> = read_events(writer.path())?
            .into_iter()
            .map(|row| row["type"].clone())
            .collect();
        assert_eq!(types, vec![json!("run_started"), json!("run_finished")]);
        Ok(())
    }

    #[test]
    fn unreadable_line_is_reported_with_its_number() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("events.jsonl");
        fs::write(&path, "{\"type\":\"run_started\"}\n\nnot json\n")?;
        let err = read_events(&path).unwrap_err();
        assert!(format!("{err:#}").contains("line 3 is not JSON"));
        Ok(())
    }
}
