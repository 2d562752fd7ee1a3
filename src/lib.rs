// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Bootstrap and maintain an Omarchy-style Linux desktop configuration.
//!
//! Oxarchy converges a desktop toward a declared end state: a dotfiles
//! repository cloned locally, the right packages installed and the wrong
//! ones gone, user application entries cleaned up, shell and window manager
//! configuration carrying the lines they should, and every file oxarchy
//! touches backed up first so the whole thing can be walked back.
//!
//! The crate is organized around small independent modules, one per
//! concern:
//!
//! - [`config`] — profile layout, the declaration of the desired end state
//! - [`dotfiles`] — dotfiles repository bootstrap
//! - [`package`] — package management through the AUR helper
//! - [`desktop`] — application entry management
//! - [`tweak`] — idempotent configuration tweaks
//! - [`backup`] — backup and restore of modified files
//! - [`keybind`] — keybinding extraction and menu presentation
//!
//! Everything destructive is either backed by a `.original` copy or was
//! asked for explicitly in the profile. Missing external tools downgrade
//! operations to warnings, because half a customization is more useful
//! than none on a machine that does not have every helper installed.

pub mod backup;
pub mod config;
pub mod desktop;
pub mod dotfiles;
pub mod keybind;
pub mod package;
pub mod path;
pub mod proc;
pub mod tweak;

pub use config::Profile;
pub use keybind::{Binding, Menu};
