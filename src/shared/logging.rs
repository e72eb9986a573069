use super::time::now_secs;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// JSON-lines log sink. A sink without a path drops every record.
#[derive(Debug, Clone, Default)]
pub struct EngineLog {
    path: Option<PathBuf>,
}

impl EngineLog {
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn append(&self, level: &str, event: &str, message: &str) {
        let Some(path) = self.path.as_ref() else {
            return;
        };
        append_log_line(path, level, event, message);
    }
}

fn append_log_line(path: &Path, level: &str, event: &str, message: &str) {
    let payload = serde_json::json!({
        "timestamp": now_secs(),
        "level": level,
        "event": event,
        "message": message,
    });

    let Ok(line) = serde_json::to_string(&payload) else {
        return;
    };

    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let _ = writeln!(file, "{line}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn records_are_appended_as_json_lines() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("logs/engine.log");
        let log = EngineLog::to_file(&path);

        log.append("info", "pipeline.started", "ctx-1");
        log.append("debug", "step.halted", "split: missing input");

        let raw = fs::read_to_string(&path).expect("read log");
        let lines: Vec<serde_json::Value> = raw
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "pipeline.started");
        assert_eq!(lines[1]["level"], "debug");
        assert!(lines[1]["timestamp"].as_i64().is_some());
    }

    #[test]
    fn disabled_sink_writes_nothing() {
        let log = EngineLog::disabled();
        assert!(log.path().is_none());
        log.append("error", "noop", "dropped");
    }
}
