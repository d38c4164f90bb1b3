//! Lifecycle extension points.
//! Instead of registering callbacks against a generator-internal signal
//! registry, the orchestrator owns an explicit pipeline: hooks run at
//! defined stages (initialization, content preflight, finalization) and
//! receive an explicit build context.

use crate::error::{BuildError, BuildResult};
use crate::reader::Page;
use crate::settings::Settings;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Context passed to every hook: the translated settings in their
/// artifact-keyed form, plus where the source checkout lives.
pub struct BuildContext {
    pub settings: IndexMap<String, serde_json::Value>,
    pub source_dir: PathBuf,
}

impl BuildContext {
    pub fn new(settings: &Settings, source_dir: &Path) -> Self {
        BuildContext {
            settings: settings.to_map(),
            source_dir: source_dir.to_path_buf(),
        }
    }

    /// Fetches a settings value that is a list of strings, if present.
    pub fn string_list(&self, key: &str) -> Option<Vec<String>> {
        self.settings.get(key).and_then(|v| {
            v.as_array().map(|items| {
                items
                    .iter()
                    .filter_map(|i| i.as_str().map(str::to_string))
                    .collect()
            })
        })
    }

    /// Exports every settings value as a prefixed, stringified environment
    /// variable, so invoked scripts can introspect the build. ASF_DATA is
    /// excluded: rather large, and not needed by scripts.
    pub fn env_vars(&self) -> Vec<(String, String)> {
        self.settings
            .iter()
            .filter(|(k, _)| k.as_str() != "ASF_DATA")
            .map(|(k, v)| (format!("PELICAN_{}", k), stringify(v)))
            .collect()
    }
}

fn stringify(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "None".to_string(),
        serde_json::Value::Bool(true) => "True".to_string(),
        serde_json::Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}

/// Runs before the generator is invoked.
pub trait InitHook {
    fn name(&self) -> &'static str;
    fn on_init(&self, ctx: &BuildContext) -> BuildResult<()>;
}

/// Runs after the generator has finished, before output validation.
pub trait FinalizeHook {
    fn name(&self) -> &'static str;
    fn on_finalize(&self, ctx: &BuildContext) -> BuildResult<()>;
}

/// Reads one content source file during the preflight stage.
pub trait ContentReader {
    fn read(&self, content_root: &Path, path: &Path) -> BuildResult<Page>;
}

/// Ordered hook registry invoked by the orchestrator at pipeline stages.
#[derive(Default)]
pub struct Pipeline {
    init_hooks: Vec<Box<dyn InitHook>>,
    finalize_hooks: Vec<Box<dyn FinalizeHook>>,
    readers: IndexMap<String, Box<dyn ContentReader>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_init_hook(&mut self, hook: Box<dyn InitHook>) {
        self.init_hooks.push(hook);
    }

    pub fn add_finalize_hook(&mut self, hook: Box<dyn FinalizeHook>) {
        self.finalize_hooks.push(hook);
    }

    /// Registers the reader for a file extension. Exactly one reader may
    /// be active per extension; a second registration is an error, not
    /// silently tolerated.
    pub fn register_reader(
        &mut self,
        extension: &str,
        reader: Box<dyn ContentReader>,
    ) -> BuildResult<()> {
        if self.readers.contains_key(extension) {
            return Err(BuildError::ConfigError(format!(
                "a reader for '.{}' files is already registered",
                extension
            )));
        }
        self.readers.insert(extension.to_string(), reader);
        Ok(())
    }

    pub fn reader_for(&self, extension: &str) -> Option<&dyn ContentReader> {
        self.readers.get(extension).map(|r| r.as_ref())
    }

    pub fn run_init(&self, ctx: &BuildContext) -> BuildResult<()> {
        for hook in &self.init_hooks {
            log::debug!("init hook: {}", hook.name());
            hook.on_init(ctx)?;
        }
        Ok(())
    }

    pub fn run_finalize(&self, ctx: &BuildContext) -> BuildResult<()> {
        for hook in &self.finalize_hooks {
            log::debug!("finalize hook: {}", hook.name());
            hook.on_finalize(ctx)?;
        }
        Ok(())
    }

    /// Content preflight: reads every source file a registered reader
    /// claims, so malformed content fails the build before the generator
    /// runs. Reader errors propagate.
    pub fn preflight(&self, content_root: &Path) -> BuildResult<usize> {
        if self.readers.is_empty() || !content_root.is_dir() {
            return Ok(0);
        }
        let mut checked = 0;
        for entry in walkdir::WalkDir::new(content_root) {
            let entry = entry.map_err(|e| BuildError::ContentError {
                path: content_root.display().to_string(),
                reason: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let ext = match entry.path().extension().and_then(|e| e.to_str()) {
                Some(ext) => ext.to_ascii_lowercase(),
                None => continue,
            };
            if let Some(reader) = self.reader_for(&ext) {
                reader.read(content_root, entry.path())?;
                checked += 1;
            }
        }
        Ok(checked)
    }
}

/// Diagnostic observer that prints when each lifecycle stage fires.
/// Used for debugging stage ordering; has no effect on build output.
pub struct SignalTrace;

impl InitHook for SignalTrace {
    fn name(&self) -> &'static str {
        "trace"
    }

    fn on_init(&self, ctx: &BuildContext) -> BuildResult<()> {
        println!("******initialized: (source: {})", ctx.source_dir.display());
        Ok(())
    }
}

impl FinalizeHook for SignalTrace {
    fn name(&self) -> &'static str {
        "trace"
    }

    fn on_finalize(&self, ctx: &BuildContext) -> BuildResult<()> {
        println!("******finalized: (source: {})", ctx.source_dir.display());
        Ok(())
    }
}
