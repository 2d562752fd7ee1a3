// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Dotfiles repository bootstrap.
//!
//! Bootstrapping a desktop starts from a dotfiles repository. This module
//! clones that repository to a local path, showing clone progress through a
//! progress bar, and prompting for credentials when the remote demands
//! them. The prompt suspends the progress bar so the two never fight over
//! the terminal.
//!
//! Cloning is blocking work from libgit2's point of view, so the public
//! operation moves it off the async runtime with [`tokio::task::spawn_blocking`].

use auth_git2::{GitAuthenticator, Prompter};
use git2::{build::RepoBuilder, Config, FetchOptions, RemoteCallbacks};
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{Password, Text};
use std::{path::{Path, PathBuf}, time};
use tracing::{info, instrument};

/// Clone the dotfiles repository from a remote.
///
/// Clones to target path, non-bare, reporting transfer progress through
/// the given progress bar. Credential prompts block the bar until answered.
///
/// # Errors
///
/// - Return [`DotfilesError::Git2`] if libgit2 operations fail.
/// - Return [`DotfilesError::IndicatifStyleTemplate`] if the progress bar
///   style cannot be set.
/// - Return [`DotfilesError::Join`] if the blocking clone task dies.
pub async fn clone_dotfiles(
    url: impl Into<String>,
    path: impl Into<PathBuf>,
    bar: ProgressBar,
) -> Result<PathBuf> {
    let url = url.into();
    let path = path.into();
    tokio::task::spawn_blocking(move || clone_blocking(&url, &path, bar).map(|_| path)).await?
}

#[instrument(skip(bar), level = "debug")]
fn clone_blocking(url: &str, path: &Path, bar: ProgressBar) -> Result<()> {
    let style = ProgressStyle::with_template(
        "{elapsed_precise:.green}  {msg:<50}  [{wide_bar:.yellow/blue}]",
    )?
    .progress_chars("-Cco.");
    bar.set_style(style);
    bar.set_message(url.to_string());
    bar.enable_steady_tick(time::Duration::from_millis(100));

    let prompter = BarPrompter::new(bar);
    let authenticator = GitAuthenticator::default().set_prompter(prompter.clone());
    let config = Config::open_default()?;

    let mut throttle = time::Instant::now();
    let mut rc = RemoteCallbacks::new();
    rc.credentials(authenticator.credentials(&config));
    rc.transfer_progress(|progress| {
        let stats = progress.to_owned();
        let bar_size = stats.total_objects() as u64;
        let bar_pos = stats.received_objects() as u64;
        if throttle.elapsed() > time::Duration::from_millis(10) {
            throttle = time::Instant::now();
            prompter.bar.set_length(bar_size);
            prompter.bar.set_position(bar_pos);
        }
        true
    });

    let mut fo = FetchOptions::new();
    fo.remote_callbacks(rc);
    RepoBuilder::new().fetch_options(fo).clone(url, path)?;
    info!("cloned dotfiles from {url} to {:?}", path.display());

    Ok(())
}

/// Git2 authentication prompter for progress bar.
#[derive(Debug, Clone)]
struct BarPrompter {
    bar: ProgressBar,
}

impl BarPrompter {
    fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

impl Prompter for BarPrompter {
    fn prompt_username_password(
        &mut self,
        url: &str,
        _config: &git2::Config,
    ) -> Option<(String, String)> {
        info!("authentication required at {url}");
        self.bar.suspend(|| {
            let username = Text::new("username").prompt().ok()?;
            let password = Password::new("password")
                .without_confirmation()
                .prompt()
                .ok()?;
            Some((username, password))
        })
    }

    fn prompt_password(
        &mut self,
        username: &str,
        url: &str,
        _config: &git2::Config,
    ) -> Option<String> {
        info!("authentication required at {url} for user {username}");
        self.bar
            .suspend(|| Password::new("password").without_confirmation().prompt().ok())
    }

    fn prompt_ssh_key_passphrase(
        &mut self,
        ssh_key_path: &Path,
        _config: &git2::Config,
    ) -> Option<String> {
        info!(
            "authentication required with ssh key at {}",
            ssh_key_path.display()
        );
        self.bar
            .suspend(|| Password::new("passphrase").without_confirmation().prompt().ok())
    }
}

/// Dotfiles bootstrap error types.
#[derive(Debug, thiserror::Error)]
pub enum DotfilesError {
    /// Operations from libgit2 fail.
    #[error(transparent)]
    Git2(#[from] git2::Error),

    /// Style template cannot be set for progress bars.
    #[error(transparent)]
    IndicatifStyleTemplate(#[from] indicatif::style::TemplateError),

    /// Blocking clone task cannot be joined.
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
}

/// Friendly result alias :3
pub type Result<T, E = DotfilesError> = std::result::Result<T, E>;
