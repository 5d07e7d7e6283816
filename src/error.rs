// error.rs - Error kinds shared by every module
// Each operation returns one of these explicitly; the menu loop decides how to recover.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReconError>;

/// Maximum number of stderr characters carried inside an `ExecFailed`
pub const DIAGNOSTIC_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum ReconError {
    /// Malformed domain, URL, IP, or wordlist path. Recovered by re-prompting.
    #[error("invalid {kind}: {value:?}")]
    InvalidInput { kind: &'static str, value: String },

    /// The external binary could not be located or spawned.
    #[error("{tool} is not installed")]
    NotFound { tool: String },

    /// The subprocess ran past its allotted time and was killed.
    #[error("{tool} timed out after {}s", .limit.as_secs())]
    Timeout { tool: String, limit: Duration },

    /// Non-zero exit with no usable output.
    #[error("{tool} failed (exit {}): {diagnostic}", exit_label(.code))]
    ExecFailed {
        tool: String,
        code: Option<i32>,
        diagnostic: String,
    },

    /// A single result file could not be read during aggregation.
    #[error("could not read {}: {source}", .path.display())]
    PartialReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ReconError {
    pub fn invalid(kind: &'static str, value: impl Into<String>) -> Self {
        ReconError::InvalidInput {
            kind,
            value: value.into(),
        }
    }

    /// Builds an `ExecFailed`, truncating the diagnostic text to a bounded preview.
    pub fn exec_failed(tool: impl Into<String>, code: Option<i32>, stderr: &str) -> Self {
        ReconError::ExecFailed {
            tool: tool.into(),
            code,
            diagnostic: truncate_chars(stderr.trim(), DIAGNOSTIC_PREVIEW_CHARS),
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "signal".to_string(),
    }
}

/// Truncate on a char boundary
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_failed_truncates_diagnostic() {
        let long = "x".repeat(500);
        match ReconError::exec_failed("ffuf", Some(1), &long) {
            ReconError::ExecFailed { diagnostic, code, .. } => {
                assert_eq!(diagnostic.len(), DIAGNOSTIC_PREVIEW_CHARS);
                assert_eq!(code, Some(1));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("ééé", 2), "éé");
        assert_eq!(truncate_chars("ab", 10), "ab");
    }

    #[test]
    fn test_timeout_and_failure_render_differently() {
        let timeout = ReconError::Timeout {
            tool: "nmap".into(),
            limit: Duration::from_secs(3600),
        };
        let failed = ReconError::exec_failed("nmap", None, "killed");
        assert_eq!(timeout.to_string(), "nmap timed out after 3600s");
        assert!(failed.to_string().contains("exit signal"));
    }
}
