//! XDG desktop entries that launch RetPlay from the application menu or the desktop.

use crate::utils::error::{Result, RetError};
use std::fs;
use std::path::{Path, PathBuf};

pub const DESKTOP_FILE_NAME: &str = "retplay.desktop";

/// Where the shortcut goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ShortcutLocation {
    Menu,
    Desktop,
    Both,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DesktopEntry {
    pub name: String,
    pub comment: String,
    pub exec: String,
    pub icon: Option<String>,
    pub terminal: bool,
    pub categories: Vec<String>,
}

impl DesktopEntry {
    /// Entry running `retplay` at `executable`, optionally on a fixed playback source.
    pub fn retplay(executable: &Path, playback: Option<&str>, icon: Option<&Path>) -> Self {
        let mut exec = quote_arg(&executable.to_string_lossy());
        if let Some(source) = playback {
            exec.push(' ');
            exec.push_str(&quote_arg(source));
        }
        Self {
            name: "RetPlay".to_string(),
            comment: "Play back RET model runs".to_string(),
            exec,
            icon: icon.map(|p| p.to_string_lossy().into_owned()),
            terminal: true,
            categories: vec!["Science".to_string(), "Education".to_string()],
        }
    }

    pub fn render(&self) -> String {
        let mut content = String::from("[Desktop Entry]\n");
        content.push_str("Type=Application\n");
        content.push_str(&format!("Name={}\n", self.name));
        content.push_str(&format!("Comment={}\n", self.comment));
        content.push_str(&format!("Exec={}\n", self.exec));
        if let Some(icon) = &self.icon {
            content.push_str(&format!("Icon={}\n", icon));
        }
        content.push_str(&format!("Terminal={}\n", self.terminal));
        if !self.categories.is_empty() {
            content.push_str(&format!("Categories={};\n", self.categories.join(";")));
        }
        content
    }

    /// Write the entry into `dir` and mark it executable so desktops trust it.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(DESKTOP_FILE_NAME);
        fs::write(&path, self.render())?;
        set_executable(&path)?;
        tracing::debug!("Wrote desktop entry to {}", path.display());
        Ok(path)
    }
}

fn quote_arg(arg: &str) -> String {
    if arg.contains(' ') {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        arg.to_string()
    }
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions)?;
    Ok(())
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Menu and desktop folders to install into.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortcutTargets {
    pub menu_dir: PathBuf,
    pub desktop_dir: PathBuf,
}

impl ShortcutTargets {
    /// The current user's XDG folders. Only Linux desktops are supported.
    pub fn for_current_user() -> Result<Self> {
        ensure_supported()?;
        let data_dir = dirs::data_dir().ok_or_else(|| RetError::ShortcutError {
            message: "Could not find the user data directory".to_string(),
        })?;
        let desktop_dir = dirs::desktop_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Desktop")))
            .ok_or_else(|| RetError::ShortcutError {
                message: "Could not find the desktop directory".to_string(),
            })?;
        Ok(Self {
            menu_dir: data_dir.join("applications"),
            desktop_dir,
        })
    }

    fn dirs_for(&self, location: ShortcutLocation) -> Vec<&Path> {
        match location {
            ShortcutLocation::Menu => vec![&self.menu_dir],
            ShortcutLocation::Desktop => vec![&self.desktop_dir],
            ShortcutLocation::Both => vec![&self.menu_dir, &self.desktop_dir],
        }
    }
}

fn ensure_supported() -> Result<()> {
    if cfg!(target_os = "linux") {
        Ok(())
    } else {
        Err(RetError::ShortcutError {
            message: format!(
                "Shortcuts are only supported on Linux, not {}",
                std::env::consts::OS
            ),
        })
    }
}

/// Install `entry` at `location`. Returns the files written.
pub fn create_shortcut(entry: &DesktopEntry, location: ShortcutLocation, targets: &ShortcutTargets) -> Result<Vec<PathBuf>> {
    ensure_supported()?;
    let mut written = Vec::new();
    for dir in targets.dirs_for(location) {
        let path = entry.write_to_dir(dir)?;
        tracing::info!("🔗 Shortcut created: {}", path.display());
        written.push(path);
    }
    Ok(written)
}
