//! buildsite's main application entry point.
//! Parses command-line arguments and dispatches to the build orchestrator
//! or the remote trigger client.

use buildsite::build::{self, BuildConfig, BuildRequest};
use buildsite::cli::{Args, Command};
use buildsite::constants::CREDS_FILE;
use buildsite::error::{default_error_handler, BuildResult};
use buildsite::trigger::{self, TriggerRequest};
use clap::Parser;
use std::path::Path;

fn main() {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

fn run(args: Args) -> BuildResult<()> {
    match args.command {
        Command::Git(git) => {
            let config = BuildConfig::detect()?;
            let request = BuildRequest {
                source: git.source,
                project: git.project,
                sourcebranch: git.sourcebranch,
                outputbranch: git.outputbranch,
                minimum_page_count: git.count,
                listen: git.listen,
            };
            build::build(&config, &request)
        }
        Command::Dir(dir) => {
            let config = BuildConfig::detect()?;
            build::build_dir(&config, &dir.yaml_dir, &dir.content_dir, &dir.output, dir.listen)
        }
        Command::Kick(kick) => {
            let request = TriggerRequest {
                repo: kick.repo,
                sourcebranch: kick.sourcebranch,
                outputbranch: kick.outputbranch,
                theme: kick.theme,
                notify: kick.notify,
                min_pages: kick.min_pages,
            };
            trigger::trigger(&request, Path::new(CREDS_FILE))
        }
    }
}
