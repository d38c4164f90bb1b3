//! Git subprocess wrappers.
//! Version control is driven through the external `git` command; success
//! and failure follow its exit codes. Only the verbs needed for checkout
//! and publishing are exposed.

use crate::error::{BuildError, BuildResult};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Clones `branch` of the repository at `url` into `dest`.
pub fn clone(git: &Path, url: &str, branch: &str, dest: &Path) -> BuildResult<()> {
    info!("Cloning from git repository {} (branch: {})", url, branch);
    run_checked(
        Command::new(git)
            .arg("clone")
            .arg("--branch")
            .arg(branch)
            .arg(url)
            .arg(dest),
    )
}

/// Operations against one working tree.
pub struct GitRepo {
    git: PathBuf,
    workdir: PathBuf,
}

impl GitRepo {
    pub fn new<P: AsRef<Path>>(git: P, workdir: P) -> Self {
        Self {
            git: git.as_ref().to_path_buf(),
            workdir: workdir.as_ref().to_path_buf(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.git);
        cmd.current_dir(&self.workdir);
        cmd
    }

    /// True when `origin/<branch>` resolves to a commit.
    pub fn remote_branch_exists(&self, branch: &str) -> BuildResult<bool> {
        let status = run(self
            .command()
            .arg("rev-parse")
            .arg("--verify")
            .arg(format!("origin/{}", branch)))?;
        Ok(status.success())
    }

    pub fn checkout_force(&self, branch: &str) -> BuildResult<()> {
        run_checked(self.command().arg("checkout").arg(branch).arg("-f"))
    }

    pub fn pull(&self) -> BuildResult<()> {
        run_checked(self.command().arg("pull"))
    }

    /// Creates `branch` as a fresh orphan and empties the index and tree.
    pub fn checkout_orphan(&self, branch: &str) -> BuildResult<()> {
        run_checked(self.command().arg("checkout").arg("--orphan").arg(branch))?;
        run_checked(self.command().arg("rm").arg("-rf").arg("."))
    }

    pub fn add(&self, pathspec: &str) -> BuildResult<()> {
        run_checked(self.command().arg("add").arg(pathspec))
    }

    /// True when the index differs from the branch tip. A clean index
    /// means regenerated output was byte-identical, a deliberate no-op.
    pub fn has_staged_changes(&self) -> BuildResult<bool> {
        let status = run(self.command().arg("diff").arg("--cached").arg("--quiet"))?;
        Ok(!status.success())
    }

    pub fn commit(&self, message: &str) -> BuildResult<()> {
        run_checked(self.command().arg("commit").arg("-m").arg(message))
    }

    pub fn push(&self, remote: &str, branch: &str) -> BuildResult<()> {
        run_checked(self.command().arg("push").arg(remote).arg(branch))
    }
}

fn describe(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
    parts.extend(cmd.get_args().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}

/// Runs a command to completion, returning its exit status.
fn run(cmd: &mut Command) -> BuildResult<ExitStatus> {
    debug!("Running: {}", describe(cmd));
    cmd.status().map_err(|e| BuildError::CommandError {
        command: describe(cmd),
        reason: e.to_string(),
    })
}

/// Runs a command to completion, failing on a non-zero exit.
fn run_checked(cmd: &mut Command) -> BuildResult<()> {
    let status = run(cmd)?;
    if !status.success() {
        return Err(BuildError::CommandError {
            command: describe(cmd),
            reason: format!("exit status {}", status),
        });
    }
    Ok(())
}
