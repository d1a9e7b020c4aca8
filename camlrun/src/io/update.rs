//! Self-update adapter: download the new version, then move it into place.
//!
//! Both steps shell out to external utilities (`wget` and `mv` by default).
//! Their argument vectors are minijinja templates so the utilities can be
//! swapped in `camlrun.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, anyhow};
use minijinja::{Environment, UndefinedBehavior, Value, context};
use tempfile::TempDir;
use tracing::{debug, info, instrument};

use crate::config::UpdateConfig;
use crate::io::process::run_command;

/// File name used when the URL does not end in one.
const FALLBACK_FILE_NAME: &str = "camlrun-update";

/// A downloaded file, kept alive together with its temporary directory.
#[derive(Debug)]
pub struct Download {
    path: PathBuf,
    _dir: Option<TempDir>,
}

impl Download {
    /// A download living inside `dir`; the directory is removed on drop.
    pub fn in_dir(dir: TempDir, path: PathBuf) -> Self {
        Self {
            path,
            _dir: Some(dir),
        }
    }

    /// A download at a path this value does not own.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _dir: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The two independent steps of a self-update.
pub trait Updater {
    /// Fetch the new version into a temporary location.
    fn download(&self) -> Result<Download>;

    /// Replace `target` with the downloaded file.
    fn replace(&self, download: &Download, target: &Path) -> Result<()>;
}

/// Updater that runs the configured download and move commands.
#[derive(Debug, Clone)]
pub struct ShellUpdater {
    cfg: UpdateConfig,
}

impl ShellUpdater {
    pub fn new(cfg: UpdateConfig) -> Self {
        Self { cfg }
    }

    fn temp_dir(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("camlrun-update-");
        match &self.cfg.temp_dir {
            Some(parent) => builder
                .tempdir_in(parent)
                .with_context(|| format!("create temp dir in {}", parent.display())),
            None => builder.tempdir().context("create temp dir"),
        }
    }
}

impl Updater for ShellUpdater {
    #[instrument(skip_all, fields(url = %self.cfg.url))]
    fn download(&self) -> Result<Download> {
        let dir = self.temp_dir()?;
        let dest = dir.path().join(file_name_from_url(&self.cfg.url));
        let args = render_args(
            &self.cfg.download_command,
            context! { url => &self.cfg.url, dest => dest.display().to_string() },
        )?;
        info!(dest = %dest.display(), "downloading new version");

        run_args(&args)?;
        if !dest.is_file() {
            return Err(anyhow!(
                "download finished but {} was not created",
                dest.display()
            ));
        }
        debug!("download complete");
        Ok(Download::in_dir(dir, dest))
    }

    #[instrument(skip_all, fields(target = %target.display()))]
    fn replace(&self, download: &Download, target: &Path) -> Result<()> {
        let args = render_args(
            &self.cfg.move_command,
            context! {
                src => download.path().display().to_string(),
                dest => target.display().to_string(),
            },
        )?;
        info!("moving new version into place");

        run_args(&args)?;
        make_executable(target)?;
        debug!("replace complete");
        Ok(())
    }
}

/// Check that every argument of a command template parses.
pub fn check_templates(args: &[String]) -> Result<()> {
    let env = template_env();
    for arg in args {
        env.template_from_str(arg)
            .with_context(|| format!("invalid template '{arg}'"))?;
    }
    Ok(())
}

/// Render each argument template against `ctx`. Unknown variables are errors.
pub fn render_args(args: &[String], ctx: Value) -> Result<Vec<String>> {
    let env = template_env();
    args.iter()
        .map(|arg| {
            env.render_str(arg, &ctx)
                .with_context(|| format!("render template '{arg}'"))
        })
        .collect()
}

fn template_env<'source>() -> Environment<'source> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env
}

fn run_args(args: &[String]) -> Result<()> {
    let (program, rest) = args
        .split_first()
        .ok_or_else(|| anyhow!("command is empty"))?;
    let mut cmd = Command::new(program);
    cmd.args(rest);
    run_command(cmd, None, None)?.ensure_success(program)?;
    Ok(())
}

/// Last path segment of `url`, ignoring any query string or fragment.
fn file_name_from_url(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() && path.contains('/') => name,
        _ => FALLBACK_FILE_NAME,
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)
        .with_context(|| format!("stat {}", path.display()))?
        .permissions();
    perms.set_mode(perms.mode() | 0o755);
    fs::set_permissions(path, perms)
        .with_context(|| format!("set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(path: &Path) -> Result<()> {
    fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
    Ok(())
}
