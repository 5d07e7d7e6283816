use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use tracing::warn;

pub const JOURNAL_FILE: &str = "progress.jsonl";

/// One line of a run's `progress.jsonl`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub timestamp: DateTime<Utc>,
    pub run_id: String,
    pub module: String,
    pub target: String,
    pub event_type: EventType,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventType {
    RunStarted,
    ToolStarted { tool_name: String },
    ToolCompleted { tool_name: String, results: usize, elapsed_ms: u64 },
    ToolFailed { tool_name: String, error: String },
    ToolTimedOut { tool_name: String, limit_secs: u64 },
    ToolSkipped { tool_name: String, reason: String },
    DataFound { data_type: String, count: usize },
    RunCompleted,
}

/// Append-only event log kept next to a run's artifacts.
/// Write failures are logged and never interrupt the run.
#[derive(Debug, Clone)]
pub struct RunJournal {
    run_id: String,
    module: String,
    target: String,
    output_dir: PathBuf,
}

impl RunJournal {
    pub fn new(module: &str, target: &str, output_dir: &Path) -> Self {
        let run_id = output_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| Utc::now().format("%Y%m%d%H%M%S").to_string());

        Self {
            run_id,
            module: module.to_string(),
            target: target.to_string(),
            output_dir: output_dir.to_path_buf(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.output_dir.join(JOURNAL_FILE)
    }

    pub fn record(&self, event_type: EventType, message: String) {
        let event = ProgressEvent {
            timestamp: Utc::now(),
            run_id: self.run_id.clone(),
            module: self.module.clone(),
            target: self.target.clone(),
            event_type,
            message,
        };

        let line = match serde_json::to_string(&event) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "could not serialize progress event");
                return;
            }
        };

        let written = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path())
            .and_then(|mut file| writeln!(file, "{}", line));
        if let Err(e) = written {
            warn!(path = %self.path().display(), error = %e, "could not append progress event");
        }
    }

    pub fn run_started(&self) {
        self.record(
            EventType::RunStarted,
            format!("{} started against {}", self.module, self.target),
        );
    }

    pub fn tool_started(&self, tool_name: &str) {
        self.record(
            EventType::ToolStarted { tool_name: tool_name.to_string() },
            format!("running {}", tool_name),
        );
    }

    pub fn tool_completed(&self, tool_name: &str, results: usize, elapsed_ms: u64) {
        self.record(
            EventType::ToolCompleted {
                tool_name: tool_name.to_string(),
                results,
                elapsed_ms,
            },
            format!("{} completed with {} results", tool_name, results),
        );
    }

    pub fn tool_failed(&self, tool_name: &str, error: &str) {
        self.record(
            EventType::ToolFailed {
                tool_name: tool_name.to_string(),
                error: error.to_string(),
            },
            format!("{} failed: {}", tool_name, error),
        );
    }

    pub fn tool_timed_out(&self, tool_name: &str, limit_secs: u64) {
        self.record(
            EventType::ToolTimedOut {
                tool_name: tool_name.to_string(),
                limit_secs,
            },
            format!("{} killed after {}s", tool_name, limit_secs),
        );
    }

    pub fn tool_skipped(&self, tool_name: &str, reason: &str) {
        self.record(
            EventType::ToolSkipped {
                tool_name: tool_name.to_string(),
                reason: reason.to_string(),
            },
            format!("{} skipped: {}", tool_name, reason),
        );
    }

    pub fn data_found(&self, data_type: &str, count: usize) {
        self.record(
            EventType::DataFound {
                data_type: data_type.to_string(),
                count,
            },
            format!("found {} {}", count, data_type),
        );
    }

    pub fn run_completed(&self) {
        self.record(EventType::RunCompleted, format!("{} finished", self.module));
    }

    /// Lines that fail to parse are ignored
    pub fn read_events_from_file(progress_file: &Path) -> Vec<ProgressEvent> {
        let mut events = Vec::new();

        if let Ok(content) = fs::read_to_string(progress_file) {
            for line in content.lines() {
                if let Ok(event) = serde_json::from_str::<ProgressEvent>(line) {
                    events.push(event);
                }
            }
        }

        events
    }
}
