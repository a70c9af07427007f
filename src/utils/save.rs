//! Output folder helpers: time-stamped run folders and finding the newest one.

use crate::utils::error::{RetError, Result};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

/// Format used for time-stamped run folders.
pub const DATETIME_STAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S-%6f";

/// Append a local-time stamp folder to `dir`. Nothing is created on disk.
pub fn add_datetime_stamp<P: AsRef<Path>>(dir: P) -> PathBuf {
    let stamp = Local::now().format(DATETIME_STAMP_FORMAT).to_string();
    dir.as_ref().join(stamp)
}

/// Name of the most recently modified sub-directory of `dir`.
pub fn get_latest_subfolder<P: AsRef<Path>>(dir: P) -> Result<String> {
    let dir = dir.as_ref();
    let mut latest: Option<(std::time::SystemTime, String)> = None;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_dir() {
            continue;
        }
        let modified = metadata.modified()?;
        let name = entry.file_name().to_string_lossy().into_owned();

        // 同時間以名稱排序 (時間戳記名稱可比較)
        let newer = match &latest {
            None => true,
            Some((time, current)) => modified > *time || (modified == *time && name > *current),
        };
        if newer {
            latest = Some((modified, name));
        }
    }

    latest
        .map(|(_, name)| name)
        .ok_or_else(|| RetError::ProcessingError {
            message: format!("No sub-folders found in {}", dir.display()),
        })
}
