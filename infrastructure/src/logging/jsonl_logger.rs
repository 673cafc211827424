//! JSONL transcript writer.
//!
//! Every event becomes one line: the payload fields plus `type` and an
//! RFC-3339 `timestamp`. The file is opened in append mode so several runs
//! can share a log.

use polyllm_application::{ConversationEvent, ConversationLogger};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Append-only JSONL conversation logger.
pub struct JsonlConversationLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlConversationLogger {
    /// Open (or create) the log at `path`, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Merge the payload with `type` and `timestamp`, which take precedence.
fn render_record(event: ConversationEvent, timestamp: String) -> Value {
    let mut record = match event.payload {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    record.insert("type".to_string(), Value::from(event.event_type));
    record.insert("timestamp".to_string(), Value::from(timestamp));
    Value::Object(record)
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let line = match serde_json::to_string(&render_record(event, timestamp)) {
            Ok(line) => line,
            Err(e) => {
                warn!("Dropping unserializable conversation event: {}", e);
                return;
            }
        };

        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            warn!("Failed to write {}: {}", self.path.display(), e);
        }
    }
}

impl Drop for JsonlConversationLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_object_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("run.jsonl");
        let logger = JsonlConversationLogger::open(&path).unwrap();

        logger.log(ConversationEvent::new(
            "model_response",
            json!({"model": "openai/gpt-4.1", "success": true, "bytes": 12}),
        ));
        logger.log(ConversationEvent::new(
            "consensus_turn",
            json!({"section": "SYNTHESIS", "turn": 6}),
        ));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["type"], "model_response");
        assert_eq!(records[0]["model"], "openai/gpt-4.1");
        assert_eq!(records[1]["type"], "consensus_turn");
        assert_eq!(records[1]["turn"], 6);
        for record in &records {
            let ts = record["timestamp"].as_str().unwrap();
            assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
        }
    }

    #[test]
    fn test_appends_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.jsonl");

        for turn in 0..2 {
            let logger = JsonlConversationLogger::open(&path).unwrap();
            logger.log(ConversationEvent::new("consensus_turn", json!({"turn": turn})));
        }

        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["turn"], 1);
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let record = render_record(
            ConversationEvent::new("extraction_result", json!("raw text")),
            "2025-01-01T00:00:00.000Z".to_string(),
        );
        assert_eq!(record["type"], "extraction_result");
        assert_eq!(record["data"], "raw text");
    }

    #[test]
    fn test_reserved_fields_override_payload() {
        let record = render_record(
            ConversationEvent::new("model_response", json!({"type": "spoofed"})),
            "t".to_string(),
        );
        assert_eq!(record["type"], "model_response");
        assert_eq!(record["timestamp"], "t");
    }

    #[test]
    fn test_open_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        assert!(JsonlConversationLogger::open(blocker.join("log.jsonl")).is_err());
    }
}
