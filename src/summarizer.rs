// summarizer.rs - Content-agnostic result summaries
// Tool output formats are heterogeneous (csv, nmap text, masscan lists), so
// results are only counted and previewed, never parsed.

use crate::progress::JOURNAL_FILE;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub count: usize,
    pub preview: Vec<String>,
}

impl Summary {
    /// Lines not shown in the preview
    pub fn remaining(&self) -> usize {
        self.count.saturating_sub(self.preview.len())
    }
}

/// Count non-blank lines and keep the first `preview_limit` of them.
/// A missing or unreadable file summarizes to zero results.
pub fn summarize(path: &Path, preview_limit: usize) -> Summary {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(_) => return Summary::default(),
    };
    let content = String::from_utf8_lossy(&bytes);

    let mut summary = Summary::default();
    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        summary.count += 1;
        if summary.preview.len() < preview_limit {
            summary.preview.push(line.to_string());
        }
    }
    summary
}

/// Summary for tools that write a directory of artifacts (screenshots):
/// count regular files recursively, preview their relative paths. The run
/// journal is not an artifact and is skipped.
pub fn summarize_dir(dir: &Path, preview_limit: usize) -> Summary {
    let mut files = Vec::new();
    collect_files(dir, dir, &mut files);
    files.sort();

    Summary {
        count: files.len(),
        preview: files.into_iter().take(preview_limit).collect(),
    }
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(root, &path, out);
        } else if path.is_file() && entry.file_name() != JOURNAL_FILE {
            let rel = path.strip_prefix(root).unwrap_or(&path);
            out.push(rel.display().to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_counts_non_blank_lines_and_previews_in_order() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("nmap_results.txt");
        fs::write(&file, "22/tcp open ssh\n\n  \n80/tcp open http\n443/tcp open https\n").unwrap();

        let summary = summarize(&file, 2);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.preview, vec!["22/tcp open ssh", "80/tcp open http"]);
        assert_eq!(summary.remaining(), 1);
    }

    #[test]
    fn test_missing_file_is_zero() {
        let dir = TempDir::new().unwrap();
        assert_eq!(summarize(&dir.path().join("absent.txt"), 5), Summary::default());
    }

    #[test]
    fn test_invalid_utf8_does_not_fail() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("ffuf_results.txt");
        fs::write(&file, b"/admin\n\xff\xfe/login\n").unwrap();

        assert_eq!(summarize(&file, 10).count, 2);
    }

    #[test]
    fn test_directory_summary_counts_nested_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("screenshots")).unwrap();
        fs::write(dir.path().join("screenshots/b.png"), b"png").unwrap();
        fs::write(dir.path().join("a.html"), b"<html>").unwrap();
        fs::write(dir.path().join(JOURNAL_FILE), b"{}").unwrap();

        let summary = summarize_dir(dir.path(), 1);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.preview, vec!["a.html"]);
    }
}
