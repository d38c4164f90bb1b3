//! Build orchestration.
//! One build is a linear sequence under a per-project lock: prepare the
//! environment, clone the source branch, translate settings, run the
//! pipeline hooks around the generator invocation, validate the output
//! size, and publish the generated tree to the output branch.

use crate::config::SiteConfig;
use crate::constants::{
    AUTO_SETTINGS, AUTO_SETTINGS_YAML, BASH, COMMIT_MESSAGE, GIT, LEGACY_SETTINGS,
    LOCK_POLL_SECS, LOCK_TIMEOUT_SECS, PELICANFILES, SCRATCH_DIR,
};
use crate::error::{BuildError, BuildResult};
use crate::generator;
use crate::git::{self, GitRepo};
use crate::lock::BuildLock;
use crate::pipeline::{BuildContext, Pipeline, SignalTrace};
use crate::reader::{MarkdownReader, MARKDOWN_EXTENSIONS};
use crate::runner::{PostRun, RunScripts};
use crate::settings::{self, Settings};
use crate::workspace::Workspace;
use log::info;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Execution mode. Dependency installation and publishing side effects
/// are enabled only in production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Production,
    Development,
}

/// Explicit orchestrator configuration: tool paths, scratch directory and
/// lock intervals, passed in at construction instead of read from process
/// globals.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub git: PathBuf,
    pub bash: PathBuf,
    pub python: PathBuf,
    pub pelican: PathBuf,
    pub scratch_dir: PathBuf,
    /// Where the builtin plugins live, next to the build tooling.
    pub tool_dir: PathBuf,
    pub cmark_lib: PathBuf,
    pub mode: Mode,
    pub lock_timeout: Duration,
    pub lock_poll: Duration,
}

impl BuildConfig {
    /// Detects the host configuration: production is marked by the
    /// presence of the fixed tooling path.
    pub fn detect() -> BuildResult<Self> {
        let production = Path::new(PELICANFILES).exists();
        let tool_dir = if production {
            PathBuf::from(PELICANFILES)
        } else {
            env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(Path::to_path_buf))
                .unwrap_or_else(|| PathBuf::from("."))
        };
        info!("TOOLS: {}", tool_dir.display());

        Ok(BuildConfig {
            git: PathBuf::from(GIT),
            bash: PathBuf::from(BASH),
            python: PathBuf::from("python3"),
            pelican: PathBuf::from("pelican"),
            scratch_dir: PathBuf::from(SCRATCH_DIR),
            tool_dir,
            cmark_lib: generator::resolve_cmark_lib()?,
            mode: if production {
                Mode::Production
            } else {
                Mode::Development
            },
            lock_timeout: Duration::from_secs(LOCK_TIMEOUT_SECS),
            lock_poll: Duration::from_secs(LOCK_POLL_SECS),
        })
    }

    /// Plugin search roots shipped with the build tooling.
    pub fn builtin_plugin_paths(&self) -> Vec<PathBuf> {
        vec![self.tool_dir.join("..").join("plugins")]
    }
}

/// One requested build of a remote repository.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub source: String,
    pub project: String,
    pub sourcebranch: String,
    pub outputbranch: String,
    pub minimum_page_count: usize,
    pub listen: bool,
}

/// Builds a project under its lock. The lock is released on every exit
/// path, success or failure.
pub fn build(config: &BuildConfig, request: &BuildRequest) -> BuildResult<()> {
    let _lock = BuildLock::acquire(
        &config.scratch_dir,
        &request.project,
        config.lock_timeout,
        config.lock_poll,
    )?;
    start_build(config, request)
}

/// The actual build steps.
fn start_build(config: &BuildConfig, request: &BuildRequest) -> BuildResult<()> {
    let ws = Workspace::prepare(&config.scratch_dir, &request.project)?;
    ws.create_env(config)?;

    git::clone(&config.git, &request.source, &request.sourcebranch, &ws.source)?;
    ws.install_requirements(config)?;

    let (settings_path, settings) = translate_settings(config, &ws.source, &ws.root)?;

    if let Some(settings) = &settings {
        let pipeline = assemble_pipeline(settings)?;
        let ctx = BuildContext::new(settings, &ws.source);

        pipeline.run_init(&ctx)?;
        let checked = pipeline.preflight(&ws.source.join("content"))?;
        info!("{} content files checked.", checked);

        ws.ensure_output_dir()?;
        run_generator(config, &ws, &settings_path, request.listen)?;
        pipeline.run_finalize(&ctx)?;
    } else {
        ws.ensure_output_dir()?;
        run_generator(config, &ws, &settings_path, request.listen)?;
    }

    let count = generator::count_pages(&ws.build_output);
    let mut message = String::new();
    if config.mode != Mode::Production {
        message = format!(" To test output: cd {}/build; pelican -l", ws.root.display());
    }
    println!("{} html files.{}", count, message);
    generator::check_minimum(count, request.minimum_page_count)?;

    println!("Web site successfully generated!");

    if config.mode != Mode::Production {
        // We do NOT want to perform commits in a dev/test environment.
        return Ok(());
    }

    publish(config, request, &ws)?;
    Ok(())
}

/// Translates the declarative configuration when present; otherwise falls
/// back to the repository's legacy settings file with a fixed plugin list
/// appended.
fn translate_settings(
    config: &BuildConfig,
    source: &Path,
    workdir: &Path,
) -> BuildResult<(PathBuf, Option<Settings>)> {
    let yaml_path = source.join(AUTO_SETTINGS_YAML);
    if yaml_path.exists() {
        info!("Reading {}", yaml_path.display());
        let site_config = SiteConfig::load(&yaml_path)?;
        let settings = settings::translate(
            site_config,
            &config.builtin_plugin_paths(),
            source,
        )?;
        let settings_path = workdir.join(AUTO_SETTINGS);
        settings.write(&settings_path)?;
        Ok((settings_path, Some(settings)))
    } else {
        let settings_path = source.join(LEGACY_SETTINGS);
        if !settings_path.exists() {
            return Err(BuildError::ConfigError(format!(
                "neither {} nor {} found in the source repository",
                AUTO_SETTINGS_YAML, LEGACY_SETTINGS
            )));
        }
        info!("No {} found, using legacy {}", AUTO_SETTINGS_YAML, LEGACY_SETTINGS);
        settings::append_legacy_plugins(&settings_path)?;
        Ok((settings_path, None))
    }
}

/// Wires up the hooks the translated settings call for.
fn assemble_pipeline(settings: &Settings) -> BuildResult<Pipeline> {
    let mut pipeline = Pipeline::new();
    if settings.debug {
        pipeline.add_init_hook(Box::new(SignalTrace));
        pipeline.add_finalize_hook(Box::new(SignalTrace));
    }
    if settings.run.is_some() {
        pipeline.add_init_hook(Box::new(RunScripts));
    }
    if settings.postrun.is_some() {
        pipeline.add_finalize_hook(Box::new(PostRun));
    }
    for ext in MARKDOWN_EXTENSIONS {
        pipeline.register_reader(ext, Box::new(MarkdownReader::gfm()))?;
    }
    Ok(pipeline)
}

fn run_generator(
    config: &BuildConfig,
    ws: &Workspace,
    settings_path: &Path,
    listen: bool,
) -> BuildResult<()> {
    let env_bin = if config.mode == Mode::Production {
        Some(ws.bin_dir())
    } else {
        None
    };
    generator::generate(
        config,
        &ws.source,
        Path::new("content"),
        settings_path,
        &ws.build_output,
        listen,
        env_bin.as_deref(),
    )
}

/// Copies the generated tree to the output branch and pushes it.
fn publish(config: &BuildConfig, request: &BuildRequest, ws: &Workspace) -> BuildResult<()> {
    println!("Copying web site to branch: {}", request.outputbranch);
    let repo = GitRepo::new(&config.git, &ws.source);

    if repo.remote_branch_exists(&request.outputbranch)? {
        println!("- Doing fresh checkout of branch {}", request.outputbranch);
        repo.checkout_force(&request.outputbranch)?;
        repo.pull()?;
    } else {
        println!(
            "- Branch {} does not exist (yet), creating it...",
            request.outputbranch
        );
        // Carry .asf.yaml, which should exist, across the orphan reset.
        let asf_yaml = ws.source.join(".asf.yaml");
        let preserved = fs::read_to_string(&asf_yaml).ok();
        repo.checkout_orphan(&request.outputbranch)?;
        if let Some(content) = preserved {
            fs::write(&asf_yaml, content).map_err(BuildError::IoError)?;
            repo.add(".asf.yaml")?;
        }
    }

    println!("- Adding new content to branch");
    let output_dir = ws.source.join("output");
    if output_dir.is_dir() {
        info!("Removing existing output dir {}", output_dir.display());
        fs::remove_dir_all(&output_dir).map_err(BuildError::IoError)?;
    }
    move_dir(&ws.build_output, &output_dir)?;
    repo.add("output/")?;

    if !repo.has_staged_changes()? {
        println!("Generated output is identical to the published site; nothing to commit.");
        return Ok(());
    }

    println!("- Committing and pushing to {}", request.source);
    repo.commit(COMMIT_MESSAGE)?;
    repo.push(&request.source, &request.outputbranch)?;

    println!("Web site generated and published successfully!");
    Ok(())
}

/// Moves a directory, falling back to a recursive copy when the rename
/// crosses filesystems.
fn move_dir(from: &Path, to: &Path) -> BuildResult<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            copy_tree(from, to)?;
            fs::remove_dir_all(from).map_err(BuildError::IoError)
        }
    }
}

fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Builds a site from a local directory: translate the settings in place
/// and run the generator, optionally serving the result. Used inside
/// containers and for local testing; no lock, no publish.
pub fn build_dir(
    config: &BuildConfig,
    yaml_dir: &Path,
    content_dir: &Path,
    output: &Path,
    listen: bool,
) -> BuildResult<()> {
    let yaml_path = yaml_dir.join(AUTO_SETTINGS_YAML);
    if !yaml_path.exists() {
        return Err(BuildError::MissingConfiguration(yaml_path.display().to_string()));
    }
    let site_config = SiteConfig::load(&yaml_path)?;
    let settings = settings::translate(site_config, &config.builtin_plugin_paths(), yaml_dir)?;
    let settings_path = yaml_dir.join(AUTO_SETTINGS);
    settings.write(&settings_path)?;

    let pipeline = assemble_pipeline(&settings)?;
    let ctx = BuildContext::new(&settings, yaml_dir);
    pipeline.run_init(&ctx)?;
    pipeline.preflight(&yaml_dir.join(content_dir))?;

    generator::generate(
        config,
        yaml_dir,
        content_dir,
        &settings_path,
        output,
        listen,
        None,
    )?;
    pipeline.run_finalize(&ctx)
}
