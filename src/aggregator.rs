// aggregator.rs - Merge per-tool subdomain results into one sorted file

use crate::error::{ReconError, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const RESULTS_SUFFIX: &str = "_results.txt";
pub const COMBINED_FILE: &str = "all_subdomains.txt";

/// Deduplicated, lexicographically ordered subdomain candidates
pub type SubdomainSet = BTreeSet<String>;

#[derive(Debug)]
pub enum Aggregation {
    /// No relevant line in any result file; nothing was written
    Empty { skipped: Vec<ReconError> },
    Written {
        path: PathBuf,
        subdomains: SubdomainSet,
        skipped: Vec<ReconError>,
    },
}

impl Aggregation {
    pub fn count(&self) -> usize {
        match self {
            Aggregation::Empty { .. } => 0,
            Aggregation::Written { subdomains, .. } => subdomains.len(),
        }
    }

    /// Result files that could not be read
    pub fn skipped(&self) -> &[ReconError] {
        match self {
            Aggregation::Empty { skipped } | Aggregation::Written { skipped, .. } => skipped,
        }
    }
}

/// Read every `*_results.txt` in `dir`, keep trimmed lines containing `domain`,
/// and write the sorted set to `all_subdomains.txt`.
///
/// The substring test is a coarse relevance filter; lines are not checked to be
/// well-formed hostnames. Unreadable files are skipped and reported in the
/// outcome. Only a failure to list `dir` or to write the combined file is an error.
pub fn aggregate(dir: &Path, domain: &str) -> Result<Aggregation> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with(RESULTS_SUFFIX))
                .unwrap_or(false)
        })
        .collect();
    files.sort();

    let mut subdomains = SubdomainSet::new();
    let mut skipped = Vec::new();

    for path in files {
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(source) => {
                warn!(path = %path.display(), error = %source, "skipping unreadable result file");
                skipped.push(ReconError::PartialReadFailure { path, source });
                continue;
            }
        };

        for line in decode_lenient(&bytes).lines() {
            let candidate = line.trim();
            if !candidate.is_empty() && candidate.contains(domain) {
                subdomains.insert(candidate.to_string());
            }
        }
    }

    if subdomains.is_empty() {
        info!(domain, "no subdomains to combine");
        return Ok(Aggregation::Empty { skipped });
    }

    let combined = dir.join(COMBINED_FILE);
    let mut content = String::new();
    for subdomain in &subdomains {
        content.push_str(subdomain);
        content.push('\n');
    }
    fs::write(&combined, content)?;
    info!(domain, count = subdomains.len(), path = %combined.display(), "combined subdomains");

    Ok(Aggregation::Written {
        path: combined,
        subdomains,
        skipped,
    })
}

// Undecodable bytes are dropped rather than replaced.
fn decode_lenient(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .filter(|c| *c != char::REPLACEMENT_CHARACTER)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seed(dir: &Path) {
        fs::write(
            dir.join("subfinder_results.txt"),
            "www.example.com\napi.example.com\n\nunrelated.org\n",
        )
        .unwrap();
        fs::write(
            dir.join("assetfinder_results.txt"),
            "  api.example.com  \nmail.example.com\nexample.org\n",
        )
        .unwrap();
        fs::write(dir.join("notes.txt"), "ignored.example.com\n").unwrap();
    }

    #[test]
    fn test_substring_filter_and_dedup() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());

        let outcome = aggregate(dir.path(), "example.com").unwrap();
        match &outcome {
            Aggregation::Written { subdomains, path, skipped } => {
                assert!(subdomains.contains("www.example.com"));
                assert!(!subdomains.contains("unrelated.org"));
                assert!(!subdomains.contains("ignored.example.com"));
                assert_eq!(subdomains.len(), 3);
                assert!(skipped.is_empty());
                assert_eq!(
                    fs::read_to_string(path).unwrap(),
                    "api.example.com\nmail.example.com\nwww.example.com\n"
                );
            }
            other => panic!("expected Written, got {:?}", other),
        }
        assert_eq!(outcome.count(), 3);
    }

    #[test]
    fn test_idempotent_over_unchanged_inputs() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());

        aggregate(dir.path(), "example.com").unwrap();
        let first = fs::read_to_string(dir.path().join(COMBINED_FILE)).unwrap();
        aggregate(dir.path(), "example.com").unwrap();
        let second = fs::read_to_string(dir.path().join(COMBINED_FILE)).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_set_writes_nothing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("httpx_results.txt"), "other.net\n").unwrap();

        let outcome = aggregate(dir.path(), "example.com").unwrap();
        assert!(matches!(outcome, Aggregation::Empty { .. }));
        assert!(!dir.path().join(COMBINED_FILE).exists());
    }

    #[test]
    fn test_undecodable_bytes_are_dropped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("crt.sh_results.txt"), b"dev.exa\xffmple.com\nok.example.com\n").unwrap();

        let outcome = aggregate(dir.path(), "example.com").unwrap();
        assert_eq!(outcome.count(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());
        // A directory with the results suffix cannot be read as a file.
        fs::create_dir(dir.path().join("broken_results.txt")).unwrap();

        let outcome = aggregate(dir.path(), "example.com").unwrap();
        assert_eq!(outcome.count(), 3);
        assert_eq!(outcome.skipped().len(), 1);
        assert!(matches!(outcome.skipped()[0], ReconError::PartialReadFailure { .. }));
    }
}
