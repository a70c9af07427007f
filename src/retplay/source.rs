//! Where a playback file comes from: a local file, a run folder, or an http(s) URL.

use crate::playback::{JsonResults, PLAYBACK_FILE_NAME};
use crate::utils::error::{Result, RetError};
use crate::utils::save::get_latest_subfolder;
use crate::utils::validation::validate_url;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use url::Url;

#[async_trait]
pub trait PlaybackSource: Send + Sync {
    async fn load(&self) -> Result<JsonResults>;
    fn describe(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct LocalPlayback {
    path: PathBuf,
}

impl LocalPlayback {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A file is used as is. A folder is used if it holds a playback file, otherwise
    /// its newest sub-folder is.
    pub fn resolve(&self) -> Result<PathBuf> {
        resolve_playback_file(&self.path)
    }
}

fn resolve_playback_file(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }
    if !path.is_dir() {
        return Err(RetError::playback(format!("{} does not exist", path.display())));
    }

    let direct = path.join(PLAYBACK_FILE_NAME);
    if direct.is_file() {
        return Ok(direct);
    }
    let latest = path.join(get_latest_subfolder(path)?);
    let nested = latest.join(PLAYBACK_FILE_NAME);
    if nested.is_file() {
        Ok(nested)
    } else {
        Err(RetError::playback(format!(
            "No {} in {} or its latest run {}",
            PLAYBACK_FILE_NAME,
            path.display(),
            latest.display()
        )))
    }
}

#[async_trait]
impl PlaybackSource for LocalPlayback {
    async fn load(&self) -> Result<JsonResults> {
        let file = self.resolve()?;
        tracing::info!("📂 Loading playback from {}", file.display());
        let content = tokio::fs::read_to_string(&file).await?;
        JsonResults::from_json(&content)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[derive(Debug, Clone)]
pub struct RemotePlayback {
    url: Url,
    client: reqwest::Client,
}

impl RemotePlayback {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PlaybackSource for RemotePlayback {
    async fn load(&self) -> Result<JsonResults> {
        tracing::info!("🌐 Fetching playback from {}", self.url);
        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RetError::playback(format!("{} returned HTTP {}", self.url, status)));
        }
        let content = response.text().await?;
        JsonResults::from_json(&content)
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

/// Pick a source from a command-line argument.
pub fn playback_source(arg: &str) -> Result<Box<dyn PlaybackSource>> {
    if arg.starts_with("http://") || arg.starts_with("https://") {
        Ok(Box::new(RemotePlayback::new(validate_url("playback", arg)?)))
    } else {
        Ok(Box::new(LocalPlayback::new(arg)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_playback(dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(PLAYBACK_FILE_NAME), JsonResults::default().json().unwrap()).unwrap();
    }

    #[test]
    fn test_resolve_file_and_folder() {
        let temp_dir = TempDir::new().unwrap();
        write_playback(temp_dir.path());

        let file = temp_dir.path().join(PLAYBACK_FILE_NAME);
        assert_eq!(LocalPlayback::new(&file).resolve().unwrap(), file);
        assert_eq!(LocalPlayback::new(temp_dir.path()).resolve().unwrap(), file);
    }

    #[test]
    fn test_resolve_latest_run_folder() {
        let temp_dir = TempDir::new().unwrap();
        write_playback(&temp_dir.path().join("2020-01-01_00-00-00-000000"));
        std::thread::sleep(std::time::Duration::from_millis(20));
        let newest = temp_dir.path().join("2021-01-01_00-00-00-000000");
        write_playback(&newest);

        assert_eq!(
            LocalPlayback::new(temp_dir.path()).resolve().unwrap(),
            newest.join(PLAYBACK_FILE_NAME)
        );
    }

    #[test]
    fn test_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        assert!(LocalPlayback::new(temp_dir.path().join("nope")).resolve().is_err());
    }

    #[test]
    fn test_source_selection() {
        assert_eq!(
            playback_source("https://example.com/playback.json").unwrap().describe(),
            "https://example.com/playback.json"
        );
        assert_eq!(playback_source("runs/latest").unwrap().describe(), "runs/latest");
    }
}
