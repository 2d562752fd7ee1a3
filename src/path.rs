// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for external files that need to be
//! interacted with, or managed in some way. Nothing in here touches the
//! file system; existence checks are left to the caller.

use std::path::PathBuf;

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(NoWayHome)
}

/// Determine absolute path to user's application entry directory.
///
/// All `.desktop` file management happens here, and only here. System
/// application directories are off limits so upstream upgrades keep working.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn user_applications_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|path| path.join("applications"))
        .ok_or(NoWayHome)
}

/// Determine default absolute path to the oxarchy profile.
///
/// Uses XDG Base Directory path `$XDG_CONFIG_HOME/oxarchy/profile.toml`.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
///
/// # See Also
///
/// - [XDG Base Directory](https://wiki.archlinux.org/title/XDG_Base_Directory)
pub fn default_profile_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|path| path.join("oxarchy").join("profile.toml"))
        .ok_or(NoWayHome)
}

/// Determine default absolute path for the cloned dotfiles repository.
///
/// Uses XDG Base Directory path `$XDG_DATA_HOME/oxarchy/dotfiles`.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn default_dotfiles_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|path| path.join("oxarchy").join("dotfiles"))
        .ok_or(NoWayHome)
}

/// Default window manager configuration files to scan for keybindings.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn default_keybind_paths() -> Result<Vec<PathBuf>> {
    let hypr = dirs::config_dir()
        .map(|path| path.join("hypr"))
        .ok_or(NoWayHome)?;

    Ok(vec![hypr.join("hyprland.conf"), hypr.join("bindings.conf")])
}

/// No way to determine user's home directory.
///
/// # See Also
///
/// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to user's home directory")]
pub struct NoWayHome;

/// Friendly result alias :3
pub type Result<T, E = NoWayHome> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use sealed_test::prelude::*;

    #[sealed_test(env = [("HOME", "/home/blah"), ("XDG_CONFIG_HOME", "/home/blah/.config")])]
    fn default_profile_path_uses_xdg_config_home() -> anyhow::Result<()> {
        let result = default_profile_path()?;
        assert_eq!(
            result,
            PathBuf::from("/home/blah/.config/oxarchy/profile.toml")
        );
        Ok(())
    }

    #[sealed_test(env = [("HOME", "/home/blah"), ("XDG_CONFIG_HOME", "/home/blah/.config")])]
    fn default_keybind_paths_point_at_hypr() -> anyhow::Result<()> {
        let result = default_keybind_paths()?;
        assert_eq!(
            result,
            vec![
                PathBuf::from("/home/blah/.config/hypr/hyprland.conf"),
                PathBuf::from("/home/blah/.config/hypr/bindings.conf"),
            ]
        );
        Ok(())
    }
}
