// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use oxarchy::{
    backup::restore_all,
    config::{Append, PackageSet, Profile},
    desktop::{remove_webapps, set_default_browser, Applications},
    dotfiles::clone_dotfiles,
    keybind::{extract, Menu},
    package::{PackageManager, Yay},
    path::{
        default_dotfiles_dir, default_keybind_paths, default_profile_path, home_dir,
        user_applications_dir,
    },
    tweak::{ensure_lines, ensure_symlink, remove_dirs, remove_files, unset_git_configs},
};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use std::{fs, path::PathBuf, process::exit};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "\n  oxarchy [options] <oxarchy-command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    async fn run(self) -> Result<()> {
        match self.command {
            Command::Init(opts) => run_init(opts),
            Command::Clone(opts) => run_clone(opts).await,
            Command::Apply(opts) => run_apply(opts),
            Command::Restore(opts) => run_restore(opts),
            Command::Keybindings(opts) => run_keybindings(opts),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Write a starter profile to customize.
    #[command(override_usage = "oxarchy init [options]")]
    Init(InitOptions),

    /// Clone the dotfiles repository.
    #[command(override_usage = "oxarchy clone [options] <url>")]
    Clone(CloneOptions),

    /// Apply the customization profile to this desktop.
    #[command(override_usage = "oxarchy apply [options]")]
    Apply(ApplyOptions),

    /// Restore files from their .original backups.
    #[command(override_usage = "oxarchy restore [options] [<root>]...")]
    Restore(RestoreOptions),

    /// Present window manager keybindings through a fuzzy selector.
    #[command(override_usage = "oxarchy keybindings [options] [<file>]...")]
    Keybindings(KeybindingsOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct InitOptions {
    /// Path to write the starter profile to.
    #[arg(short, long, value_name = "path")]
    pub profile: Option<PathBuf>,

    /// Overwrite an existing profile.
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct CloneOptions {
    /// URL of dotfiles repository to clone from.
    #[arg(required = true, value_name = "url")]
    pub url: String,

    /// Path to clone into.
    #[arg(short, long, value_name = "path")]
    pub path: Option<PathBuf>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ApplyOptions {
    /// Path of profile to apply.
    #[arg(short, long, value_name = "path")]
    pub profile: Option<PathBuf>,

    /// Skip package removal and installation.
    #[arg(short, long)]
    pub skip_packages: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct RestoreOptions {
    /// Directories to scan for backups.
    #[arg(value_name = "root")]
    pub roots: Vec<PathBuf>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct KeybindingsOptions {
    /// Configuration files to extract keybindings from.
    #[arg(value_name = "file")]
    pub files: Vec<PathBuf>,

    /// Print the formatted listing instead of launching the selector.
    #[arg(short, long)]
    pub list: bool,

    /// Selector program to launch.
    #[arg(short, long, value_name = "program", default_value = "walker")]
    pub menu: String,

    /// Selector theme name.
    #[arg(short, long, value_name = "theme", default_value = "keybindings")]
    pub theme: String,

    /// Selector prompt string.
    #[arg(short, long, value_name = "prompt", default_value = "Keybindings")]
    pub prompt: String,
}

#[tokio::main]
async fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_timer(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run().await {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

async fn run() -> Result<()> {
    Cli::parse().run().await
}

fn run_init(opts: InitOptions) -> Result<()> {
    let path = match opts.profile {
        Some(path) => path,
        None => default_profile_path()?,
    };

    if path.exists() && !opts.force {
        return Err(anyhow!(
            "profile already exists at {:?}, pass --force to overwrite",
            path.display()
        ));
    }

    if let Some(parent) = path.parent() {
        mkdirp::mkdirp(parent)?;
    }

    let starter = Profile {
        packages: Some(PackageSet {
            remove: vec!["<package to remove>".into()],
            install: vec!["<package to install>".into()],
        }),
        appends: vec![Append {
            path: "~/.bashrc".into(),
            lines: vec!["<line the file must contain>".into()],
            backup: true,
            create: true,
        }],
        ..Default::default()
    };
    fs::write(&path, starter.to_string())?;
    info!("wrote starter profile to {:?}", path.display());

    Ok(())
}

async fn run_clone(opts: CloneOptions) -> Result<()> {
    let path = match opts.path {
        Some(path) => path,
        None => default_dotfiles_dir()?,
    };

    if let Some(parent) = path.parent() {
        mkdirp::mkdirp(parent)?;
    }

    let bar = ProgressBar::no_length();
    clone_dotfiles(opts.url, path, bar.clone()).await?;
    bar.finish();

    Ok(())
}

fn run_apply(opts: ApplyOptions) -> Result<()> {
    let path = match opts.profile {
        Some(path) => path,
        None => default_profile_path()?,
    };
    let profile: Profile = fs::read_to_string(&path)
        .map_err(|error| anyhow!("cannot read profile at {:?}: {error}", path.display()))?
        .parse()?;

    if let Some(packages) = &profile.packages {
        if opts.skip_packages {
            info!("skipping package changes");
        } else {
            apply_packages(&Yay::new(), packages);
        }
    }

    for symlink in &profile.symlinks {
        if let Err(error) = ensure_symlink(symlink) {
            warn!("{error}");
        }
    }

    if let Some(cleanup) = &profile.cleanup {
        remove_dirs(&cleanup.dirs);
        remove_files(&cleanup.files, cleanup.elevate);
    }

    if let Some(desktop) = &profile.desktop {
        let apps = Applications::new(user_applications_dir()?);
        apps.remove_entries(&desktop.remove);
        for entry in &desktop.entries {
            if let Err(error) = apps.write_entry(&entry.file, &entry.content) {
                warn!("{error}");
            }
        }
    }

    if let Some(webapps) = &profile.webapps {
        remove_webapps(&webapps.remove);
    }

    for append in &profile.appends {
        if let Err(error) = ensure_lines(append) {
            warn!("{error}");
        }
    }

    if let Some(git) = &profile.git {
        unset_git_configs(&git.unset);
    }

    if let Some(browser) = &profile.browser {
        set_default_browser(&browser.desktop_file, &browser.schemes);
    }

    // Refresh entry metadata last so every change above is picked up.
    if profile.desktop.is_some() || profile.browser.is_some() {
        Applications::new(user_applications_dir()?).update_database();
    }

    info!("profile applied");

    Ok(())
}

fn apply_packages(manager: &impl PackageManager, packages: &PackageSet) {
    if !manager.is_available() {
        warn!("package manager not found, skipping package changes");
        return;
    }

    if let Err(error) = manager.remove(&packages.remove) {
        warn!("{error}");
    }

    if let Err(error) = manager.install(&packages.install) {
        warn!("{error}");
    }
}

fn run_restore(opts: RestoreOptions) -> Result<()> {
    let roots = if opts.roots.is_empty() {
        let home = home_dir()?;
        vec![home.join(".config"), home.join(".local").join("share")]
    } else {
        opts.roots
    };

    let restored = restore_all(&roots);
    info!("restored {restored} file(s) from backups");

    Ok(())
}

fn run_keybindings(opts: KeybindingsOptions) -> Result<()> {
    let paths = if opts.files.is_empty() {
        default_keybind_paths()?
    } else {
        opts.files
    };

    let bindings = extract(&paths);
    if opts.list {
        for binding in &bindings {
            println!("{binding}");
        }
        return Ok(());
    }

    let status = Menu::new(opts.menu, opts.theme, opts.prompt).show(&bindings)?;
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }

    Ok(())
}
