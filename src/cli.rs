//! Command-line interface implementation for buildsite.
//! Provides argument parsing using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments structure for buildsite.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "buildsite: pulls in pelican sources, generates static web sites and publishes the result",
    long_about = None
)]
pub struct Args {
    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a web site from a remote git repository and publish the result
    Git(GitArgs),
    /// Build a web site from a local directory, without locking or publishing
    Dir(DirArgs),
    /// Ask the build scheduler to rebuild a project web site
    Kick(KickArgs),
}

#[derive(clap::Args, Debug)]
pub struct GitArgs {
    /// Source repository URL
    #[arg(long)]
    pub source: String,

    /// Owning project
    #[arg(long)]
    pub project: String,

    /// Web site repository branch to build from
    #[arg(long, default_value = "main")]
    pub sourcebranch: String,

    /// Web site repository branch to commit output to
    #[arg(long, default_value = "asf-site")]
    pub outputbranch: String,

    /// Minimum number of html pages
    #[arg(long, default_value_t = 0)]
    pub count: usize,

    /// Serve the generated site and rebuild on change
    #[arg(long)]
    pub listen: bool,
}

#[derive(clap::Args, Debug)]
pub struct DirArgs {
    /// Directory where generated pages are written
    #[arg(long, default_value = "site-generated")]
    pub output: PathBuf,

    /// Serve the generated site and rebuild on change
    #[arg(long)]
    pub listen: bool,

    /// Directory holding pelicanconf.yaml
    #[arg(long, default_value = ".")]
    pub yaml_dir: PathBuf,

    /// Content directory, relative to the yaml directory
    #[arg(long, default_value = "content")]
    pub content_dir: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct KickArgs {
    /// Repository name to build
    #[arg(long)]
    pub repo: String,

    /// Branch with source content
    #[arg(long, default_value = "main")]
    pub sourcebranch: String,

    /// Branch where output will be saved
    #[arg(long, default_value = "asf-site")]
    pub outputbranch: String,

    /// Subdirectory containing the theme to use
    #[arg(long, default_value = "theme")]
    pub theme: String,

    /// Where to email the build result message
    #[arg(long, default_value = "private@infra.apache.org")]
    pub notify: String,

    /// Minimum number of generated pages
    #[arg(long, default_value_t = 0)]
    pub min_pages: usize,
}
