// output.rs - Timestamped per-run output directories

use crate::error::Result;
use chrono::{DateTime, Local};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Create `<root>/<label>_<YYYYMMDD_HHMMSS>` for a new run.
pub fn create_output_dir(root: &Path, label: &str) -> Result<PathBuf> {
    create_output_dir_at(root, label, Local::now())
}

/// Same as [`create_output_dir`] with a fixed clock. A second run inside the
/// same second gets a `_2`, `_3`, ... suffix instead of sharing a directory.
pub fn create_output_dir_at(root: &Path, label: &str, now: DateTime<Local>) -> Result<PathBuf> {
    fs::create_dir_all(root)?;
    let base = format!("{}_{}", sanitize_label(label), now.format(TIMESTAMP_FORMAT));

    let mut attempt = 1;
    loop {
        let name = if attempt == 1 {
            base.clone()
        } else {
            format!("{}_{}", base, attempt)
        };
        let path = root.join(name);
        match fs::create_dir(&path) {
            Ok(()) => return Ok(path),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Keep labels to a single safe path component
pub fn sanitize_label(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "target".to_string()
    } else {
        cleaned
    }
}

/// Startup layout: output root, log directory, local wordlists
pub fn ensure_workspace(dirs: &[&Path]) -> Result<()> {
    for dir in dirs {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}
