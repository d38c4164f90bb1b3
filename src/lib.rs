//! buildsite pulls in pelican sources, generates static web sites and
//! commits the result back to a publishing branch of the repository.
//! It translates a declarative YAML site configuration into generator
//! settings, runs the generator under a per-project lock, and publishes
//! the output tree.

/// Build orchestration: lock, clone, translate, generate, validate, publish
pub mod build;

/// Command-line interface module for the buildsite application
pub mod cli;

/// Typed model of the declarative `pelicanconf.yaml` site configuration
pub mod config;

/// Common constants: tool paths, filenames, scheduler endpoints
pub mod constants;

/// Error types and handling for the buildsite application
pub mod error;

/// External generator invocation and output counting
pub mod generator;

/// Git subprocess wrappers used for checkout and publishing
pub mod git;

/// Per-project advisory file locking
pub mod lock;

/// Lifecycle extension points invoked around the generator run
pub mod pipeline;

/// GFM Markdown content reader (slug derivation, metadata header, rendering)
pub mod reader;

/// Pre-run and post-run script hook adapters
pub mod runner;

/// Settings translation from site configuration to the generator artifact
pub mod settings;

/// Remote build trigger client
pub mod trigger;

/// Per-project scratch directory layout and environment preparation
pub mod workspace;
