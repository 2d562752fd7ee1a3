// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Backup and restore of modified configuration files.
//!
//! Every file oxarchy rewrites gets a sibling copy with `.original` appended
//! to its file name before the first modification. The backup is written
//! once and never clobbered, so however many times a profile gets applied,
//! the pristine copy survives and `oxarchy restore` can always walk the
//! desktop back to its pre-customization state.

use glob::glob;
use std::{
    collections::BTreeSet,
    ffi::OsString,
    fs::copy,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Sibling backup path for a file.
///
/// Appends `.original` to the file name: `~/.bashrc` becomes
/// `~/.bashrc.original`.
pub fn backup_path(path: impl AsRef<Path>) -> PathBuf {
    let mut name = path
        .as_ref()
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".original");
    path.as_ref().with_file_name(name)
}

/// Back a file up before modification.
///
/// Copies the file to its backup path only when no backup exists yet. The
/// first backup wins; re-applying a profile never overwrites the pristine
/// copy. Returns whether a new backup was written.
///
/// # Errors
///
/// - Return [`BackupError::CreateBackup`] if the copy fails.
pub fn backup_file(path: impl AsRef<Path>) -> Result<bool> {
    let backup = backup_path(path.as_ref());
    if backup.exists() {
        debug!("backup already exists for {:?}", path.as_ref().display());
        return Ok(false);
    }

    copy(path.as_ref(), &backup).map_err(|source| BackupError::CreateBackup {
        source,
        path: path.as_ref().to_path_buf(),
    })?;
    info!("backed up {:?}", path.as_ref().display());

    Ok(true)
}

/// Restore a file from its backup.
///
/// Copies the backup over the file when a backup exists. Returns whether a
/// restore happened.
///
/// # Errors
///
/// - Return [`BackupError::Restore`] if the copy fails.
pub fn restore_file(path: impl AsRef<Path>) -> Result<bool> {
    let backup = backup_path(path.as_ref());
    if !backup.exists() {
        debug!("no backup found for {:?}", path.as_ref().display());
        return Ok(false);
    }

    copy(&backup, path.as_ref()).map_err(|source| BackupError::Restore {
        source,
        path: path.as_ref().to_path_buf(),
    })?;
    info!("restored {:?} from backup", path.as_ref().display());

    Ok(true)
}

/// Find every backup file under the given roots.
///
/// Recursive `*.original` scan. Roots that do not exist contribute nothing,
/// and the result is deduplicated and sorted.
pub fn find_backups(roots: impl IntoIterator<Item = impl AsRef<Path>>) -> Vec<PathBuf> {
    let mut found = BTreeSet::new();
    for root in roots {
        let pattern = root.as_ref().join("**").join("*.original");
        let walker = match glob(pattern.to_string_lossy().as_ref()) {
            Ok(walker) => walker,
            Err(error) => {
                warn!("bad scan pattern for {:?}: {error}", root.as_ref().display());
                continue;
            }
        };

        found.extend(walker.filter_map(|entry| entry.ok()));
    }

    found.into_iter().collect()
}

/// Restore every backup found under the given roots.
///
/// Failures are logged and skipped so one unreadable backup never blocks
/// the rest. Returns the number of files restored.
pub fn restore_all(roots: impl IntoIterator<Item = impl AsRef<Path>>) -> usize {
    let mut restored = 0;
    for backup in find_backups(roots) {
        let Some(original) = original_path(&backup) else {
            continue;
        };

        match copy(&backup, &original) {
            Ok(_) => {
                info!("restored {:?} from {:?}", original.display(), backup.display());
                restored += 1;
            }
            Err(error) => warn!("failed to restore {:?}: {error}", original.display()),
        }
    }

    if restored == 0 {
        info!("no backup files found to restore");
    }

    restored
}

/// Path a backup restores to, stripping the `.original` suffix.
fn original_path(backup: &Path) -> Option<PathBuf> {
    let name = backup.file_name()?.to_string_lossy();
    let stripped = name.strip_suffix(".original")?;
    if stripped.is_empty() {
        return None;
    }

    Some(backup.with_file_name(stripped))
}

/// Backup error types.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    /// Backup copy cannot be created.
    #[error("failed to back up {:?}", path.display())]
    CreateBackup {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Backup cannot be copied back over its original.
    #[error("failed to restore {:?}", path.display())]
    Restore {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = BackupError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::fs::{create_dir_all, read_to_string, write};

    #[test]
    fn backup_path_appends_original_suffix() {
        assert_eq!(
            backup_path("/home/blah/.bashrc"),
            PathBuf::from("/home/blah/.bashrc.original")
        );
    }

    #[sealed_test]
    fn first_backup_wins() -> anyhow::Result<()> {
        write(".bashrc", "pristine")?;
        assert!(backup_file(".bashrc")?);

        write(".bashrc", "modified")?;
        assert!(!backup_file(".bashrc")?);
        assert_eq!(read_to_string(".bashrc.original")?, "pristine");

        Ok(())
    }

    #[sealed_test]
    fn restore_copies_backup_over_original() -> anyhow::Result<()> {
        write(".bashrc", "pristine")?;
        backup_file(".bashrc")?;
        write(".bashrc", "modified")?;

        assert!(restore_file(".bashrc")?);
        assert_eq!(read_to_string(".bashrc")?, "pristine");

        Ok(())
    }

    #[sealed_test]
    fn restore_without_backup_is_a_noop() -> anyhow::Result<()> {
        write(".bashrc", "whatever")?;
        assert!(!restore_file(".bashrc")?);
        Ok(())
    }

    #[sealed_test]
    fn find_backups_scans_recursively() -> anyhow::Result<()> {
        create_dir_all("config/hypr")?;
        create_dir_all("share")?;
        write("config/hypr/hyprland.conf.original", "a")?;
        write("config/style.css.original", "b")?;
        write("share/untouched.conf", "c")?;

        let result = find_backups(["config", "share", "missing"]);
        let expect = vec![
            PathBuf::from("config/hypr/hyprland.conf.original"),
            PathBuf::from("config/style.css.original"),
        ];
        assert_eq!(result, expect);

        Ok(())
    }

    #[sealed_test]
    fn restore_all_walks_every_backup_back() -> anyhow::Result<()> {
        create_dir_all("config/hypr")?;
        write("config/hypr/hyprland.conf", "modified")?;
        write("config/hypr/hyprland.conf.original", "pristine")?;
        write("config/config", "modified")?;
        write("config/config.original", "pristine")?;

        assert_eq!(restore_all(["config"]), 2);
        assert_eq!(read_to_string("config/hypr/hyprland.conf")?, "pristine");
        assert_eq!(read_to_string("config/config")?, "pristine");

        Ok(())
    }
}
