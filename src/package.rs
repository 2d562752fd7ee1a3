// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Package management front-end.
//!
//! Package changes go through the system AUR helper rather than any direct
//! library binding, because the helper already knows how to resolve AUR
//! builds, keyrings, and dependency cleanup. Oxarchy only ever shells out
//! with non-interactive flags.
//!
//! Removal is deliberately forgiving: asking to remove a package that was
//! never installed is the normal case when converging a fresh system, so a
//! failed removal logs a warning instead of failing the run.

use crate::proc::{call_quiet, in_path, ProcError};

use tracing::{info, instrument, warn};

/// Layer of indirection for package manager access.
pub trait PackageManager {
    /// Check if the package manager binary is reachable.
    fn is_available(&self) -> bool;

    /// Install packages, skipping ones already present.
    fn install(&self, packages: &[String]) -> Result<()>;

    /// Remove packages along with their unneeded dependencies.
    ///
    /// Packages that are already absent are not an error.
    fn remove(&self, packages: &[String]) -> Result<()>;
}

/// Package management through the yay AUR helper.
#[derive(Debug, Default)]
pub struct Yay;

impl Yay {
    /// Construct new yay front-end.
    pub fn new() -> Self {
        Self
    }

    fn install_args(packages: &[String]) -> Vec<String> {
        let mut args = vec![
            "-S".to_owned(),
            "--noconfirm".to_owned(),
            "--needed".to_owned(),
        ];
        args.extend(packages.iter().cloned());
        args
    }

    fn remove_args(packages: &[String]) -> Vec<String> {
        let mut args = vec!["-Rns".to_owned(), "--noconfirm".to_owned()];
        args.extend(packages.iter().cloned());
        args
    }
}

impl PackageManager for Yay {
    fn is_available(&self) -> bool {
        in_path("yay")
    }

    /// Install packages through `yay -S --noconfirm --needed`.
    ///
    /// # Errors
    ///
    /// - Return [`ProcError`] if yay cannot be spawned or exits non-zero.
    #[instrument(skip(self), level = "debug")]
    fn install(&self, packages: &[String]) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }

        info!("installing {} package(s)", packages.len());
        call_quiet("yay", Self::install_args(packages))?;

        Ok(())
    }

    /// Remove packages through `yay -Rns --noconfirm`.
    ///
    /// # Errors
    ///
    /// - Return [`ProcError::Spawn`] if yay cannot be spawned. A non-zero
    ///   exit is downgraded to a warning, since it usually means the
    ///   packages were already removed.
    #[instrument(skip(self), level = "debug")]
    fn remove(&self, packages: &[String]) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }

        info!("removing {} package(s)", packages.len());
        match call_quiet("yay", Self::remove_args(packages)) {
            Ok(_) => Ok(()),
            Err(ProcError::Failed { .. }) => {
                warn!("package removal failed, or packages were already removed");
                Ok(())
            }
            Err(error) => Err(error),
        }
    }
}

/// Friendly result alias :3
pub type Result<T, E = ProcError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[test]
    fn install_args_carry_noninteractive_flags() {
        let result = Yay::install_args(&["google-chrome".into(), "vi".into()]);
        let expect = vec![
            "-S".to_owned(),
            "--noconfirm".to_owned(),
            "--needed".to_owned(),
            "google-chrome".to_owned(),
            "vi".to_owned(),
        ];
        assert_eq!(result, expect);
    }

    #[test]
    fn remove_args_cascade_unneeded_dependencies() {
        let result = Yay::remove_args(&["chromium".into()]);
        let expect = vec![
            "-Rns".to_owned(),
            "--noconfirm".to_owned(),
            "chromium".to_owned(),
        ];
        assert_eq!(result, expect);
    }

    #[sealed_test(env = [("PATH", "/nonexistent")])]
    fn yay_unavailable_outside_path() {
        assert!(!Yay::new().is_available());
    }

    #[test]
    fn empty_listings_are_noops() -> anyhow::Result<()> {
        // Never spawns yay, so this passes on systems without it.
        Yay::new().install(&[])?;
        Yay::new().remove(&[])?;
        Ok(())
    }
}
