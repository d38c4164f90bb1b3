//! Common constants used throughout the buildsite application.

/// Default location of the git binary on the build hosts.
pub const GIT: &str = "/usr/bin/git";

/// Default location of bash, used for dependency installation.
pub const BASH: &str = "/bin/bash";

/// Directory holding the pelican tooling on the production build hosts.
/// Its presence is what marks a host as production.
pub const PELICANFILES: &str = "/home/buildslave/slave/tools";

/// Per-project scratch directories and lock files live here.
pub const SCRATCH_DIR: &str = "/tmp";

/// Version of the cmark-gfm rendering library the generator links against.
pub const CMARK_VERSION: &str = "0.28.3.gfm.12";

/// Declarative configuration file looked for in the source repository.
pub const AUTO_SETTINGS_YAML: &str = "pelicanconf.yaml";

/// Name of the generated settings artifact.
pub const AUTO_SETTINGS: &str = "pelican.auto.py";

/// Legacy settings file used when no declarative configuration exists.
pub const LEGACY_SETTINGS: &str = "pelicanconf.py";

/// Commit message used when publishing generated output.
pub const COMMIT_MESSAGE: &str = "Automatic Site Publish by Buildbot";

/// Branch that published output is committed to by convention.
pub const OUTPUT_BRANCH: &str = "asf-site";

/// The forcescheduler that accepts remote build requests.
pub const SCHEDULER_NAME: &str = "pelican_websites";

/// Host of the build-scheduling service.
pub const API_HOST: &str = "ci2.apache.org";

/// Credentials for the build-scheduling service (username:password, first line).
pub const CREDS_FILE: &str = "/x1/buildmaster/master1/kickbuild.txt";

/// How long a single build may wait for the per-project lock.
pub const LOCK_TIMEOUT_SECS: u64 = 120;

/// Pause between lock acquisition attempts.
pub const LOCK_POLL_SECS: u64 = 10;
