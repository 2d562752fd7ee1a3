// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Idempotent configuration tweaks.
//!
//! The customization profile mostly describes a desired end state: this
//! file contains these lines, this symlink points there, these directories
//! and git-config keys are gone. Every operation here converges toward that
//! state and is safe to re-run, so applying the same profile twice changes
//! nothing the second time.
//!
//! Line appends use substring presence checks, not exact line matches. A
//! profile line `alias e='nano'` is considered present if that text occurs
//! anywhere in the file, commented or not. That is deliberately simple and
//! matches how the upstream customization behaves.

use crate::{
    backup::{backup_file, BackupError},
    config::{Append, Symlink},
    proc::{call_interactive, call_quiet, in_path},
};

use std::{
    ffi::OsStr,
    fs::{read_to_string, remove_dir_all, remove_file, write},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

/// Ensure a file contains every line of an append declaration.
///
/// Missing lines are appended in declaration order, each on its own line,
/// leaving existing content untouched. When the target file does not exist
/// it is either created empty first (`create`) or skipped with a warning.
/// A `.original` backup is written before the first modification of an
/// existing file when `backup` is set.
///
/// Returns the lines actually added, which is empty on re-runs.
///
/// # Errors
///
/// - Return [`TweakError::ReadFile`] if the target cannot be read.
/// - Return [`TweakError::WriteFile`] if the target cannot be written.
/// - Return [`TweakError::Backup`] if the backup copy fails.
#[instrument(skip(append), fields(path = ?append.path.display()), level = "debug")]
pub fn ensure_lines(append: &Append) -> Result<Vec<String>> {
    let exists = append.path.exists();
    if !exists && !append.create {
        warn!("{:?} not found, skipping", append.path.display());
        return Ok(Vec::new());
    }

    let content = if exists {
        read_to_string(&append.path).map_err(|source| TweakError::ReadFile {
            source,
            path: append.path.clone(),
        })?
    } else {
        String::new()
    };

    let missing: Vec<String> = append
        .lines
        .iter()
        .filter(|line| !content.contains(line.as_str()))
        .cloned()
        .collect();

    if missing.is_empty() {
        debug!("all lines already present in {:?}", append.path.display());
        return Ok(missing);
    }

    if exists && append.backup {
        backup_file(&append.path)?;
    }

    let mut updated = content;
    for line in &missing {
        updated.push('\n');
        updated.push_str(line);
        info!("added to {:?}: {line}", append.path.display());
    }

    write(&append.path, updated).map_err(|source| TweakError::WriteFile {
        source,
        path: append.path.clone(),
    })?;

    Ok(missing)
}

/// Ensure a symlink points at its target.
///
/// Any existing file at the link path is force-removed first, then the
/// link is placed with `ln -sf`, through `sudo` when the declaration asks
/// for elevation. Skipped with a warning when the target does not exist,
/// since a dangling link helps nobody.
///
/// # Errors
///
/// - Return [`TweakError::Proc`] if removal or linking fails.
#[instrument(skip(symlink), fields(link = ?symlink.link.display()), level = "debug")]
pub fn ensure_symlink(symlink: &Symlink) -> Result<()> {
    if !symlink.target.exists() {
        warn!(
            "symlink target {:?} not found, skipping",
            symlink.target.display()
        );
        return Ok(());
    }

    let link = symlink.link.as_os_str();
    let target = symlink.target.as_os_str();
    if symlink.elevate {
        // Interactive so sudo can still ask for a password.
        call_interactive("sudo", [OsStr::new("rm"), OsStr::new("-f"), link])?;
        call_interactive("sudo", [OsStr::new("ln"), OsStr::new("-sf"), target, link])?;
    } else {
        call_quiet("rm", [OsStr::new("-f"), link])?;
        call_quiet("ln", [OsStr::new("-sf"), target, link])?;
    }
    info!(
        "linked {:?} -> {:?}",
        symlink.link.display(),
        symlink.target.display()
    );

    Ok(())
}

/// Remove configuration directories recursively.
///
/// Missing directories are skipped silently, failures are logged and
/// skipped. Returns the number of directories removed.
#[instrument(skip(dirs), level = "debug")]
pub fn remove_dirs(dirs: impl IntoIterator<Item = impl AsRef<Path>>) -> usize {
    let mut removed = 0;
    for dir in dirs {
        if !dir.as_ref().exists() {
            debug!("no directory {:?} to remove", dir.as_ref().display());
            continue;
        }

        match remove_dir_all(dir.as_ref()) {
            Ok(()) => {
                info!("removed {:?}", dir.as_ref().display());
                removed += 1;
            }
            Err(error) => warn!("failed to remove {:?}: {error}", dir.as_ref().display()),
        }
    }

    removed
}

/// Remove stray files.
///
/// Missing files are skipped silently, failures are logged and skipped.
/// Removal goes through `sudo rm -f` when elevated, which covers system
/// files like leftover helper binaries and their sudoers entries. Returns
/// the number of files removed.
#[instrument(skip(files), level = "debug")]
pub fn remove_files(files: impl IntoIterator<Item = impl AsRef<Path>>, elevate: bool) -> usize {
    let mut removed = 0;
    for file in files {
        if !file.as_ref().exists() {
            debug!("no file {:?} to remove", file.as_ref().display());
            continue;
        }

        let outcome: Result<()> = if elevate {
            // Interactive so sudo can still ask for a password.
            call_interactive(
                "sudo",
                [OsStr::new("rm"), OsStr::new("-f"), file.as_ref().as_os_str()],
            )
            .map_err(TweakError::from)
        } else {
            remove_file(file.as_ref()).map_err(|source| TweakError::RemoveFile {
                source,
                path: file.as_ref().to_path_buf(),
            })
        };

        match outcome {
            Ok(()) => {
                info!("removed {:?}", file.as_ref().display());
                removed += 1;
            }
            Err(error) => warn!("failed to remove {:?}: {error}", file.as_ref().display()),
        }
    }

    removed
}

/// Unset global git-config keys.
///
/// A key that was never set makes git exit non-zero, which is fine; only
/// the attempt is logged. Skipped entirely when git is not installed.
#[instrument(skip(keys), level = "debug")]
pub fn unset_git_configs(keys: impl IntoIterator<Item = impl AsRef<str>>) {
    if !in_path("git") {
        warn!("git not found, skipping git-config resets");
        return;
    }

    for key in keys {
        match call_quiet("git", ["config", "--global", "--unset", key.as_ref()]) {
            Ok(_) => info!("unset git config {:?}", key.as_ref()),
            Err(_) => debug!("git config {:?} was not set", key.as_ref()),
        }
    }
}

/// Configuration tweak error types.
#[derive(Debug, thiserror::Error)]
pub enum TweakError {
    /// Target file cannot be read.
    #[error("failed to read {:?}", path.display())]
    ReadFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Target file cannot be written.
    #[error("failed to write {:?}", path.display())]
    WriteFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Stray file cannot be removed.
    #[error("failed to remove {:?}", path.display())]
    RemoveFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Backup before modification fails.
    #[error(transparent)]
    Backup(#[from] BackupError),

    /// External command fails.
    #[error(transparent)]
    Proc(#[from] crate::proc::ProcError),
}

/// Friendly result alias :3
pub type Result<T, E = TweakError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::fs::{create_dir_all, read_to_string, write as write_file};

    fn bashrc_append() -> Append {
        Append {
            path: ".bashrc".into(),
            lines: vec![
                "export EDITOR=\"vi\"".into(),
                "alias e='nano'".into(),
            ],
            backup: true,
            create: true,
        }
    }

    #[sealed_test]
    fn ensure_lines_appends_only_missing_lines() -> anyhow::Result<()> {
        write_file(".bashrc", "# mine\nalias e='nano'")?;

        let added = ensure_lines(&bashrc_append())?;
        assert_eq!(added, vec!["export EDITOR=\"vi\"".to_string()]);

        let expect = indoc! {r#"
            # mine
            alias e='nano'
            export EDITOR="vi""#};
        assert_eq!(read_to_string(".bashrc")?, expect);

        Ok(())
    }

    #[sealed_test]
    fn ensure_lines_is_idempotent() -> anyhow::Result<()> {
        write_file(".bashrc", "")?;

        ensure_lines(&bashrc_append())?;
        let first = read_to_string(".bashrc")?;

        let added = ensure_lines(&bashrc_append())?;
        assert_eq!(added, Vec::<String>::new());
        assert_eq!(read_to_string(".bashrc")?, first);

        Ok(())
    }

    #[sealed_test]
    fn ensure_lines_backs_up_before_first_modification() -> anyhow::Result<()> {
        write_file(".bashrc", "original content")?;

        ensure_lines(&bashrc_append())?;
        assert_eq!(read_to_string(".bashrc.original")?, "original content");

        Ok(())
    }

    #[sealed_test]
    fn ensure_lines_skips_missing_file_without_create() -> anyhow::Result<()> {
        let append = Append {
            path: "hyprland.conf".into(),
            lines: vec!["unbind = SUPER, O".into()],
            backup: true,
            create: false,
        };

        let added = ensure_lines(&append)?;
        assert_eq!(added, Vec::<String>::new());
        assert!(!append.path.exists());

        Ok(())
    }

    #[sealed_test]
    fn ensure_lines_creates_missing_file_with_create() -> anyhow::Result<()> {
        ensure_lines(&bashrc_append())?;
        assert!(read_to_string(".bashrc")?.contains("alias e='nano'"));
        // Nothing existed to back up.
        assert!(!PathBuf::from(".bashrc.original").exists());
        Ok(())
    }

    #[sealed_test]
    fn ensure_symlink_places_link() -> anyhow::Result<()> {
        write_file("google-chrome-stable", "#!/bin/sh")?;

        let symlink = Symlink {
            target: "google-chrome-stable".into(),
            link: "chromium".into(),
            elevate: false,
        };
        ensure_symlink(&symlink)?;

        assert_eq!(
            std::fs::read_link("chromium")?,
            PathBuf::from("google-chrome-stable")
        );

        Ok(())
    }

    #[sealed_test]
    fn ensure_symlink_skips_missing_target() -> anyhow::Result<()> {
        let symlink = Symlink {
            target: "not-there".into(),
            link: "chromium".into(),
            elevate: false,
        };
        ensure_symlink(&symlink)?;
        assert!(!PathBuf::from("chromium").exists());
        Ok(())
    }

    #[sealed_test]
    fn remove_files_deletes_existing_and_skips_missing() -> anyhow::Result<()> {
        write_file("asdcontrol", "#!/bin/sh")?;

        let removed = remove_files(["asdcontrol", "not-there"], false);
        assert_eq!(removed, 1);
        assert!(!PathBuf::from("asdcontrol").exists());

        Ok(())
    }

    #[sealed_test]
    fn remove_dirs_skips_missing_directories() -> anyhow::Result<()> {
        create_dir_all("nvim/lua")?;
        write_file("nvim/lua/init.lua", "")?;

        let removed = remove_dirs(["nvim", "not-there"]);
        assert_eq!(removed, 1);
        assert!(!PathBuf::from("nvim").exists());

        Ok(())
    }
}
