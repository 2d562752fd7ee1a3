// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Application entry management.
//!
//! All `.desktop` file manipulation happens inside the user applications
//! directory, normally `~/.local/share/applications`. System application
//! directories are never touched: user entries shadow system entries with
//! the same file name, which gets the same effect without breaking upstream
//! upgrades.
//!
//! Default browser registration and the desktop database refresh go through
//! the xdg command line utilities. When those utilities are missing the
//! operations degrade to warnings, matching the rest of the maintenance
//! flow where an absent tool is never fatal.

use crate::proc::{call_quiet, in_path};

use std::{
    fs::{remove_file, write},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

/// User applications directory handle.
///
/// Every operation stays inside the wrapped directory.
#[derive(Clone, Debug)]
pub struct Applications {
    dir: PathBuf,
}

impl Applications {
    /// Construct handle over target applications directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Remove listed entry files if present.
    ///
    /// Missing entries are skipped silently, and removal failures are
    /// logged and skipped. Returns the number of entries removed.
    #[instrument(skip(self, names), level = "debug")]
    pub fn remove_entries(&self, names: impl IntoIterator<Item = impl AsRef<str>>) -> usize {
        let mut removed = 0;
        for name in names {
            let path = self.dir.join(name.as_ref());
            if !path.exists() {
                debug!("no entry {:?} to remove", name.as_ref());
                continue;
            }

            match remove_file(&path) {
                Ok(()) => {
                    info!("removed {:?}", name.as_ref());
                    removed += 1;
                }
                Err(error) => warn!("failed to remove {:?}: {error}", name.as_ref()),
            }
        }

        removed
    }

    /// Write an entry file, creating the applications directory if needed.
    ///
    /// Overwrites an existing entry of the same name, which is how user
    /// entries shadow their system counterparts.
    ///
    /// # Errors
    ///
    /// - Return [`DesktopError::CreateDir`] if the applications directory
    ///   cannot be created.
    /// - Return [`DesktopError::WriteEntry`] if the entry cannot be written.
    #[instrument(skip(self, content), level = "debug")]
    pub fn write_entry(
        &self,
        file: impl AsRef<str> + std::fmt::Debug,
        content: impl AsRef<str>,
    ) -> Result<()> {
        mkdirp::mkdirp(&self.dir).map_err(|source| DesktopError::CreateDir {
            source,
            path: self.dir.clone(),
        })?;

        let path = self.dir.join(file.as_ref());
        write(&path, content.as_ref()).map_err(|source| DesktopError::WriteEntry {
            source,
            path: path.clone(),
        })?;
        info!("wrote {:?}", file.as_ref());

        Ok(())
    }

    /// Refresh the desktop database for this directory.
    ///
    /// Skipped with a warning when `update-desktop-database` is not
    /// installed.
    pub fn update_database(&self) {
        if !in_path("update-desktop-database") {
            warn!("update-desktop-database not found, skipping");
            return;
        }

        match call_quiet("update-desktop-database", [self.dir.as_os_str()]) {
            Ok(_) => info!("desktop database updated"),
            Err(error) => warn!("failed to update desktop database: {error}"),
        }
    }

    /// Applications directory being managed.
    pub fn dir(&self) -> &Path {
        self.dir.as_path()
    }
}

/// Remove web app shortcuts through `web2app-remove`.
///
/// A shortcut that is already gone makes the helper exit non-zero, which is
/// the normal case on re-runs, so per-name failures are only logged.
#[instrument(skip(names), level = "debug")]
pub fn remove_webapps(names: impl IntoIterator<Item = impl AsRef<str>>) {
    if !in_path("web2app-remove") {
        warn!("web2app-remove not found, skipping web app removal");
        return;
    }

    for name in names {
        match call_quiet("web2app-remove", [name.as_ref()]) {
            Ok(_) => info!("removed web app {:?}", name.as_ref()),
            Err(_) => debug!("web app {:?} not found, or already removed", name.as_ref()),
        }
    }
}

/// Register an entry as the default web browser.
///
/// Runs `xdg-settings set default-web-browser`, then one `xdg-mime default`
/// per scheme. Skipped entirely when `xdg-settings` is missing; individual
/// failures are logged and do not stop the remaining registrations.
#[instrument(skip(schemes), level = "debug")]
pub fn set_default_browser(
    desktop_file: impl AsRef<str> + std::fmt::Debug,
    schemes: impl IntoIterator<Item = impl AsRef<str>>,
) {
    if !in_path("xdg-settings") {
        warn!("xdg-settings not found, skipping default browser setup");
        return;
    }

    match call_quiet(
        "xdg-settings",
        ["set", "default-web-browser", desktop_file.as_ref()],
    ) {
        Ok(_) => info!("default browser set to {:?}", desktop_file.as_ref()),
        Err(error) => warn!("failed to set default browser: {error}"),
    }

    for scheme in schemes {
        match call_quiet(
            "xdg-mime",
            ["default", desktop_file.as_ref(), scheme.as_ref()],
        ) {
            Ok(_) => info!("registered {:?} for {:?}", desktop_file.as_ref(), scheme.as_ref()),
            Err(error) => warn!("failed to register {:?}: {error}", scheme.as_ref()),
        }
    }
}

/// Application entry error types.
#[derive(Debug, thiserror::Error)]
pub enum DesktopError {
    /// Applications directory cannot be created.
    #[error("failed to create applications directory {:?}", path.display())]
    CreateDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Entry file cannot be written.
    #[error("failed to write entry {:?}", path.display())]
    WriteEntry {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = DesktopError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::fs::{read_to_string, write as write_file};

    #[sealed_test]
    fn write_entry_creates_directory_and_file() -> anyhow::Result<()> {
        let apps = Applications::new("applications");
        let content = indoc! {r#"
            [Desktop Entry]
            Name=Google Chrome
            Exec=/usr/bin/google-chrome-stable %U
        "#};

        apps.write_entry("google-chrome.desktop", content)?;
        assert_eq!(
            read_to_string("applications/google-chrome.desktop")?,
            content
        );

        Ok(())
    }

    #[sealed_test]
    fn write_entry_overwrites_existing_entry() -> anyhow::Result<()> {
        let apps = Applications::new("applications");
        apps.write_entry("chromium.desktop", "old")?;
        apps.write_entry("chromium.desktop", "new")?;
        assert_eq!(read_to_string("applications/chromium.desktop")?, "new");
        Ok(())
    }

    #[sealed_test]
    fn remove_entries_only_touches_listed_files() -> anyhow::Result<()> {
        std::fs::create_dir_all("applications")?;
        write_file("applications/nvim.desktop", "")?;
        write_file("applications/Zoom.desktop", "")?;
        write_file("applications/keep.desktop", "")?;

        let removed = Applications::new("applications").remove_entries([
            "nvim.desktop",
            "Zoom.desktop",
            "not-there.desktop",
        ]);

        assert_eq!(removed, 2);
        assert!(PathBuf::from("applications/keep.desktop").exists());
        assert!(!PathBuf::from("applications/nvim.desktop").exists());

        Ok(())
    }
}
