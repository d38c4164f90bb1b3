//! Pre-run and post-run script hooks.
//! Configured commands run as synchronous child processes, in list order,
//! with their combined output streamed to the build log. A failing
//! command aborts the build: a partially-run setup script can leave the
//! content in an inconsistent state, so errors propagate instead of being
//! swallowed.

use crate::error::{BuildError, BuildResult};
use crate::pipeline::{BuildContext, FinalizeHook, InitHook};
use log::info;
use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};

/// Runs the configured `ASF_RUN` commands during initialization.
pub struct RunScripts;

/// Runs the configured `ASF_POSTRUN` commands during finalization, with
/// the full build configuration exported into the script environment.
pub struct PostRun;

impl InitHook for RunScripts {
    fn name(&self) -> &'static str {
        "asfrun"
    }

    fn on_init(&self, ctx: &BuildContext) -> BuildResult<()> {
        if let Some(commands) = ctx.string_list("ASF_RUN") {
            info!("-----\nasfrun");
            run_commands(&commands, ctx, &[])?;
        }
        Ok(())
    }
}

impl FinalizeHook for PostRun {
    fn name(&self) -> &'static str {
        "asfpostrun"
    }

    fn on_finalize(&self, ctx: &BuildContext) -> BuildResult<()> {
        if let Some(commands) = ctx.string_list("ASF_POSTRUN") {
            info!("-----\nasfpostrun");
            let env = ctx.env_vars();
            run_commands(&commands, ctx, &env)?;
        }
        Ok(())
    }
}

/// Executes each command in order. Commands are tokenized shell-style,
/// so quoted arguments stay intact.
fn run_commands(
    commands: &[String],
    ctx: &BuildContext,
    extra_env: &[(String, String)],
) -> BuildResult<()> {
    for command in commands {
        info!("-----\n{}", command);
        run_command(command, ctx, extra_env)?;
    }
    Ok(())
}

fn run_command(
    command: &str,
    ctx: &BuildContext,
    extra_env: &[(String, String)],
) -> BuildResult<()> {
    let words = shell_words::split(command)
        .map_err(|e| BuildError::HookError(format!("cannot parse '{}': {}", command, e)))?;
    let (program, args) = words.split_first().ok_or_else(|| {
        BuildError::HookError("empty command in run configuration".to_string())
    })?;

    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(&ctx.source_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit());
    for (key, value) in extra_env {
        cmd.env(key, value);
    }

    let mut child = cmd
        .spawn()
        .map_err(|e| BuildError::HookError(format!("cannot run '{}': {}", command, e)))?;

    // Stream the script's output into our own log as it arrives.
    if let Some(stdout) = child.stdout.take() {
        for line in BufReader::new(stdout).lines() {
            let line = line.map_err(BuildError::IoError)?;
            println!("{}", line.trim_end());
        }
    }

    let status = child.wait().map_err(BuildError::IoError)?;
    if !status.success() {
        return Err(BuildError::HookError(format!(
            "'{}' failed with {}",
            command, status
        )));
    }
    Ok(())
}
