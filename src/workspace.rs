//! Per-project scratch directory layout and environment preparation.
//! Every build runs inside `<scratch>/<project>/`: the source checkout in
//! `source/`, generated pages in `build/output/`, and an isolated runtime
//! environment at the root.

use crate::build::{BuildConfig, Mode};
use crate::error::{BuildError, BuildResult};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Directory layout of one build.
pub struct Workspace {
    /// Per-project root, also the runtime environment directory.
    pub root: PathBuf,
    /// Source repository checkout.
    pub source: PathBuf,
    /// Where the generator writes pages.
    pub build_output: PathBuf,
}

impl Workspace {
    /// Creates a fresh workspace for `project`, clearing any prior one.
    pub fn prepare(scratch_dir: &Path, project: &str) -> BuildResult<Self> {
        let root = scratch_dir.join(project);
        info!("Setting up build environment in {}", root.display());
        if root.exists() {
            fs::remove_dir_all(&root).map_err(BuildError::IoError)?;
        }
        fs::create_dir_all(&root).map_err(BuildError::IoError)?;
        Ok(Workspace {
            source: root.join("source"),
            build_output: root.join("build").join("output"),
            root,
        })
    }

    /// Creates the isolated runtime environment at the workspace root.
    /// Always created; only dependency installation is production-gated.
    pub fn create_env(&self, config: &BuildConfig) -> BuildResult<()> {
        run_checked(
            Command::new(&config.python)
                .arg("-m")
                .arg("venv")
                .arg("--symlinks")
                .arg("--without-pip")
                .arg(&self.root),
            "venv creation",
        )
    }

    /// Installs the dependencies the source declares, production only.
    /// Development builds assume requirements are available system-wide,
    /// so a missing requirements.txt cannot be masked during testing.
    pub fn install_requirements(&self, config: &BuildConfig) -> BuildResult<()> {
        let requirements = self.source.join("requirements.txt");
        if config.mode != Mode::Production || !requirements.exists() {
            info!("No requirements.txt found or not production, skipping pip");
            return Ok(());
        }

        info!("Installing pips");
        run_checked(
            Command::new(&config.bash)
                .arg("-c")
                .arg("source bin/activate; pip3 install -r source/requirements.txt")
                .current_dir(&self.root),
            "pip3 install -r source/requirements.txt",
        )
    }

    /// Makes sure the generator's output directory exists.
    pub fn ensure_output_dir(&self) -> BuildResult<()> {
        fs::create_dir_all(&self.build_output).map_err(BuildError::IoError)
    }

    /// The environment's bin directory, put on PATH for generator runs.
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }
}

fn run_checked(cmd: &mut Command, what: &str) -> BuildResult<()> {
    let status = cmd.status().map_err(|e| BuildError::CommandError {
        command: what.to_string(),
        reason: e.to_string(),
    })?;
    if !status.success() {
        return Err(BuildError::CommandError {
            command: what.to_string(),
            reason: format!("exit status {}", status),
        });
    }
    Ok(())
}
