// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout for the __profile__, the configuration file that
//! declares every customization oxarchy should apply to the desktop, to
//! simplify the process of serialization and deserialization. File I/O is
//! left to the caller to figure out.
//!
//! # General Layout
//!
//! A profile is composed of independent optional sections. Each section
//! feeds exactly one maintenance operation: packages to add or remove,
//! lines to ensure in configuration files, application entries to manage,
//! web app shortcuts to drop, the default browser registration, symlinks to
//! place, and global git-config keys to unset. A missing section simply
//! means that operation has nothing to do.

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    path::PathBuf,
    str::FromStr,
};

/// Profile layout.
///
/// Declares the full customization a desktop should converge to. Parsing
/// performs shell expansion on every path field, so profiles can say
/// `~/.bashrc` or `$XDG_CONFIG_HOME/hypr/hyprland.conf` and mean it.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Packages to remove and install through the AUR helper.
    pub packages: Option<PackageSet>,

    /// Files that must contain given lines, appended when missing.
    #[serde(rename = "append", default, skip_serializing_if = "Vec::is_empty")]
    pub appends: Vec<Append>,

    /// Application entry management in the user applications directory.
    pub desktop: Option<DesktopSet>,

    /// Web app shortcuts to remove.
    pub webapps: Option<WebAppSet>,

    /// Default browser registration.
    pub browser: Option<Browser>,

    /// Symlinks to place.
    #[serde(rename = "symlink", default, skip_serializing_if = "Vec::is_empty")]
    pub symlinks: Vec<Symlink>,

    /// Global git-config keys to unset.
    pub git: Option<GitSet>,

    /// Configuration directories to delete recursively.
    pub cleanup: Option<Cleanup>,
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut profile: Profile = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on every path field.
        for append in &mut profile.appends {
            append.path = expand_path(&append.path)?;
        }
        for symlink in &mut profile.symlinks {
            symlink.target = expand_path(&symlink.target)?;
            symlink.link = expand_path(&symlink.link)?;
        }
        if let Some(cleanup) = &mut profile.cleanup {
            for dir in &mut cleanup.dirs {
                *dir = expand_path(dir)?;
            }
            for file in &mut cleanup.files {
                *file = expand_path(file)?;
            }
        }

        Ok(profile)
    }
}

impl Display for Profile {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

fn expand_path(path: &PathBuf) -> Result<PathBuf, ConfigError> {
    Ok(PathBuf::from(
        shellexpand::full(path.to_string_lossy().as_ref())
            .map_err(ConfigError::ShellExpansion)?
            .into_owned(),
    ))
}

/// Packages to remove and install through the AUR helper.
///
/// Removal happens before installation, so swapping one package for another
/// just means listing it in both fields of the same profile.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct PackageSet {
    /// Packages to remove, with unneeded dependencies.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remove: Vec<String>,

    /// Packages to install if not already present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub install: Vec<String>,
}

/// A file that must contain given lines.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Append {
    /// File to append missing lines to.
    pub path: PathBuf,

    /// Lines the file must contain verbatim.
    pub lines: Vec<String>,

    /// Back the file up before its first modification.
    #[serde(default = "enabled")]
    pub backup: bool,

    /// Create the file when missing instead of skipping it.
    #[serde(default)]
    pub create: bool,
}

/// Application entry management.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct DesktopSet {
    /// Entry file names to delete from the user applications directory.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remove: Vec<String>,

    /// Entries to write into the user applications directory.
    #[serde(rename = "entry", default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<DesktopEntry>,
}

/// One `.desktop` entry to write.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct DesktopEntry {
    /// Entry file name, e.g., `google-chrome.desktop`.
    pub file: String,

    /// Full entry content.
    pub content: String,
}

/// Web app shortcuts to remove through `web2app-remove`.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct WebAppSet {
    /// Web app names to remove.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remove: Vec<String>,
}

/// Default browser registration through xdg utilities.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Browser {
    /// Entry file name to register as default web browser.
    pub desktop_file: String,

    /// MIME schemes to hand to the registered entry.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,
}

/// One symlink to place.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Symlink {
    /// Path the symlink points at.
    pub target: PathBuf,

    /// Path of the symlink itself.
    pub link: PathBuf,

    /// Place the symlink through sudo.
    #[serde(default)]
    pub elevate: bool,
}

/// Global git-config keys to unset.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct GitSet {
    /// Keys to pass to `git config --global --unset`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unset: Vec<String>,
}

/// Configuration directories and stray files to delete.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Cleanup {
    /// Directories to remove, contents included.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dirs: Vec<PathBuf>,

    /// Plain files to remove, e.g., leftover helper binaries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<PathBuf>,

    /// Remove the files through sudo.
    #[serde(default)]
    pub elevate: bool,
}

fn enabled() -> bool {
    true
}

/// Configuration error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
