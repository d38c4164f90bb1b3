//! Remote build trigger.
//! Small client that authenticates to the build-scheduling service and
//! requests a build for a named repository, decoupled from the
//! orchestrator itself. The scheduling call is fire-and-forget: a JSON-RPC
//! notification with no awaited response.

use crate::constants::{API_HOST, OUTPUT_BRANCH, SCHEDULER_NAME};
use crate::error::{BuildError, BuildResult};
use regex::Regex;
use serde_json::json;
use std::fs;
use std::path::Path;

/// LDAP-name to site-name mappings for a handful of irregular projects.
const PROJECT_ALIASES: &[(&str, &str)] = &[
    ("whimsy", "whimsical"),
    ("empire", "empire-db"),
    ("webservices", "ws"),
    ("infrastructure", "infra"),
    ("comdev", "community"),
];

/// One remote build request.
#[derive(Debug, Clone)]
pub struct TriggerRequest {
    pub repo: String,
    pub sourcebranch: String,
    pub outputbranch: String,
    pub theme: String,
    pub notify: String,
    pub min_pages: usize,
}

/// Infers the short project identifier from the repository name: strip an
/// optional `incubator-` prefix, truncate at the first `-` or `.`, then
/// map through the alias table.
pub fn derive_project(repo: &str) -> BuildResult<String> {
    let re = Regex::new(r"^(?:incubator-)?([^-.]+)").unwrap();
    let name = re
        .captures(repo)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| {
            BuildError::TriggerError(format!("cannot infer a project name from '{}'", repo))
        })?;
    Ok(PROJECT_ALIASES
        .iter()
        .find(|(ldap, _)| *ldap == name)
        .map(|(_, alias)| alias.to_string())
        .unwrap_or_else(|| name.to_string()))
}

/// Reads `username:password` from the first line of the credentials file.
pub fn read_credentials(path: &Path) -> BuildResult<(String, String)> {
    let contents = fs::read_to_string(path).map_err(|e| {
        BuildError::TriggerError(format!("cannot read credentials from {}: {}", path.display(), e))
    })?;
    let line = contents.lines().next().unwrap_or_default().trim();
    match line.split_once(':') {
        Some((user, pass)) if !user.is_empty() => Ok((user.to_string(), pass.to_string())),
        _ => Err(BuildError::TriggerError(format!(
            "malformed credentials in {}",
            path.display()
        ))),
    }
}

/// The JSON-RPC `force` notification submitted to the scheduler.
pub fn build_payload(request: &TriggerRequest, project: &str) -> serde_json::Value {
    json!({
        "method": "force",
        "jsonrpc": "2.0",
        // Notification to the server; no response needed.
        "id": null,
        "params": {
            "reason": format!("Rebuild {}, via buildsite kick", request.repo),
            "source": format!("https://gitbox.apache.org/repos/asf/{}.git", request.repo),
            "sourcebranch": request.sourcebranch,
            "outputbranch": request.outputbranch,
            "project": project,
            "theme": request.theme,
            "notify": request.notify,
            "minimum_page_count": request.min_pages,
        },
    })
}

/// Schedules a remote build.
///
/// Logs in with basic auth to obtain a session cookie, then posts the
/// `force` request to the scheduler. Never builds from the published
/// output branch.
pub fn trigger(request: &TriggerRequest, creds_path: &Path) -> BuildResult<()> {
    if request.sourcebranch == OUTPUT_BRANCH {
        return Err(BuildError::TriggerError(format!(
            "refusing to build from the published '{}' branch",
            OUTPUT_BRANCH
        )));
    }

    let project = derive_project(&request.repo)?;
    let (user, password) = read_credentials(creds_path)?;

    let client = reqwest::blocking::Client::builder()
        .cookie_store(true)
        .build()?;

    client
        .get(format!("https://{}/auth/login", API_HOST))
        .basic_auth(&user, Some(&password))
        .send()?;

    println!("Triggering pelican build...");
    client
        .post(format!(
            "https://{}/api/v2/forceschedulers/{}",
            API_HOST, SCHEDULER_NAME
        ))
        .json(&build_payload(request, &project))
        .send()?;
    Ok(())
}
