//! External generator invocation.
//! The static-site generator is a black box: it takes a content directory,
//! a settings file and an output directory, and signals failure through a
//! non-zero exit code. There is no timeout on the invocation; a hung
//! generator hangs the build.

use crate::build::BuildConfig;
use crate::constants::CMARK_VERSION;
use crate::error::{BuildError, BuildResult};
use log::info;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use walkdir::WalkDir;

/// Resolves the cmark-gfm rendering library the generator depends on:
/// the fixed versioned install location, else the `LIBCMARKDIR`
/// environment variable. Fatal if neither resolves.
pub fn resolve_cmark_lib() -> BuildResult<PathBuf> {
    let fixed = PathBuf::from(format!(
        "/usr/local/asfpackages/cmark-gfm/cmark-gfm-{}/lib",
        CMARK_VERSION
    ));
    if fixed.exists() {
        return Ok(fixed);
    }
    match env::var_os("LIBCMARKDIR") {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => Err(BuildError::ConfigError(
            "no cmark-gfm library found and LIBCMARKDIR is not set".to_string(),
        )),
    }
}

/// Runs the generator synchronously for one build.
///
/// # Arguments
/// * `workdir` - directory the generator runs in (the source checkout)
/// * `content` - content directory, relative to `workdir`
/// * `settings_path` - the translated settings artifact
/// * `output_dir` - where generated pages land
/// * `listen` - also serve the site and regenerate on change
/// * `env_bin` - optional runtime-environment bin directory put on PATH
pub fn generate(
    config: &BuildConfig,
    workdir: &Path,
    content: &Path,
    settings_path: &Path,
    output_dir: &Path,
    listen: bool,
    env_bin: Option<&Path>,
) -> BuildResult<()> {
    let mut cmd = Command::new(&config.pelican);
    cmd.arg(content)
        .arg("--settings")
        .arg(settings_path)
        .arg("-o")
        .arg(output_dir)
        .current_dir(workdir)
        .env("LIBCMARKDIR", &config.cmark_lib);
    if listen {
        cmd.arg("-r").arg("-b").arg("0.0.0.0").arg("-l");
    }
    if let Some(bin) = env_bin {
        let mut path = OsString::from(bin);
        if let Some(existing) = env::var_os("PATH") {
            path.push(":");
            path.push(existing);
        }
        cmd.env("PATH", path);
    }

    info!("Building web site with: {:?}", cmd);
    let status = cmd.status().map_err(|e| BuildError::CommandError {
        command: config.pelican.display().to_string(),
        reason: e.to_string(),
    })?;
    if !status.success() {
        // In listen mode the generator runs until interrupted; its exit
        // status reflects the interrupt, not a build failure.
        if listen {
            return Ok(());
        }
        return Err(BuildError::CommandError {
            command: config.pelican.display().to_string(),
            reason: format!("exit status {}", status),
        });
    }
    Ok(())
}

/// Counts generated pages (`*.html`) recursively under `output_dir`.
pub fn count_pages(output_dir: &Path) -> usize {
    WalkDir::new(output_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().map(|x| x == "html").unwrap_or(false))
        .count()
}

/// Enforces the configured minimum page count. A shortfall is a distinct
/// failure from a generator crash: the result is plausible but
/// suspiciously small and must not be published.
pub fn check_minimum(count: usize, minimum: usize) -> BuildResult<()> {
    if minimum > 0 && count < minimum {
        return Err(BuildError::InsufficientOutputError {
            minimum,
            found: count,
        });
    }
    Ok(())
}
