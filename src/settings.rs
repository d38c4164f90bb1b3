//! Settings translation for buildsite.
//! Converts the declarative site configuration into the settings artifact
//! consumed by the pelican generator. The translation itself is pure; the
//! only side effect is writing the rendered artifact to a caller-specified
//! path, fully overwriting any prior content.

use crate::config::{GenId, SiteConfig, SiteMeta, Sitemap};
use crate::error::{BuildError, BuildResult};
use chrono::Datelike;
use indexmap::IndexMap;
use log::debug;
use minijinja::Environment;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Default theme path, relative to the source root.
pub const DEFAULT_THEME: &str = "theme/apache";

/// The Markdown-rendering plugin, always active unless the configuration
/// declares its own plugin list.
pub const DEFAULT_PLUGINS: &[&str] = &["gfm"];

/// Plugin list appended to a legacy `pelicanconf.py`. The build-tool
/// variants disagreed on how `toc` degrades without an existing list, so
/// the fallback is a fixed default instead.
pub const LEGACY_PLUGINS: &[&str] = &["toc", "gfm"];

/// The translated, generator-consumable settings.
///
/// Feature blocks are `Option`s: a present block implies the corresponding
/// plugin name appears in `plugins` exactly once.
#[derive(Debug, Serialize)]
pub struct Settings {
    pub site: SiteMeta,
    pub year: i32,
    pub debug: bool,
    pub theme: String,
    pub plugin_paths: Vec<String>,
    pub plugins: Vec<String>,
    pub pages: Option<String>,
    pub static_dirs: Vec<String>,
    pub genid: Option<GenId>,
    pub sitemap: Option<Sitemap>,
    pub data: Option<serde_json::Value>,
    pub run: Option<Vec<String>>,
    pub postrun: Option<Vec<String>>,
    pub ignore: Option<Vec<String>>,
    pub copy: Option<Vec<String>>,
}

/// Translates a site configuration into generator settings.
///
/// # Arguments
/// * `config` - parsed declarative configuration
/// * `builtin_plugin_paths` - plugin search roots supplied by the caller
/// * `source_root` - checkout of the site source; relative theme and plugin
///   paths are resolved against it
pub fn translate(
    config: SiteConfig,
    builtin_plugin_paths: &[PathBuf],
    source_root: &Path,
) -> BuildResult<Settings> {
    let year = chrono::Local::now().year();

    let theme = resolve_path(
        config.theme.as_deref().unwrap_or(DEFAULT_THEME),
        source_root,
    );

    let mut plugin_paths: Vec<String> = builtin_plugin_paths
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();

    let plugins_cfg = config.plugins.unwrap_or_default();
    if let Some(paths) = &plugins_cfg.paths {
        for p in paths {
            plugin_paths.push(resolve_path(p, source_root));
        }
    }

    // The explicit list replaces the default; feature plugins are appended
    // after it in a stable order, each at most once.
    let mut plugins: Vec<String> = match &plugins_cfg.use_ {
        Some(use_) => use_.clone(),
        None => DEFAULT_PLUGINS.iter().map(|s| s.to_string()).collect(),
    };

    if plugins_cfg.sitemap.is_some() {
        add_plugin(&mut plugins, "sitemap");
    }
    if config.genid.is_some() {
        add_plugin(&mut plugins, "asfgenid");
    }

    let setup = config.setup.unwrap_or_default();
    let data = match &setup.data {
        Some(value) => Some(serde_json::to_value(value).map_err(|e| {
            BuildError::ConfigError(format!("setup.data is not representable: {}", e))
        })?),
        None => None,
    };
    if data.is_some() {
        add_plugin(&mut plugins, "asfdata");
    }
    // Post-run commands alone still need the run plugin registered.
    if setup.run.is_some() || setup.postrun.is_some() {
        add_plugin(&mut plugins, "asfrun");
    }
    if setup.copy.is_some() {
        add_plugin(&mut plugins, "asfcopy");
    }
    // The ignore patterns are plain settings; no plugin needed.

    if has_ezmd_files(source_root) {
        add_plugin(&mut plugins, "asfreader");
    }

    let content = config.content.unwrap_or_default();
    let static_dirs = content
        .static_dirs
        .unwrap_or_else(|| vec![".".to_string()]);

    Ok(Settings {
        site: config.site,
        year,
        debug: config.debug,
        theme,
        plugin_paths,
        plugins,
        pages: content.pages,
        static_dirs,
        genid: config.genid,
        sitemap: plugins_cfg.sitemap,
        data,
        run: setup.run,
        postrun: setup.postrun,
        ignore: setup.ignore,
        copy: setup.copy,
    })
}

fn resolve_path(path: &str, source_root: &Path) -> String {
    let p = Path::new(path);
    if p.is_absolute() {
        path.to_string()
    } else {
        source_root.join(p).to_string_lossy().into_owned()
    }
}

fn add_plugin(plugins: &mut Vec<String>, name: &str) {
    if !plugins.iter().any(|p| p == name) {
        plugins.push(name.to_string());
    }
}

fn has_ezmd_files(source_root: &Path) -> bool {
    WalkDir::new(source_root)
        .into_iter()
        .filter_map(|e| e.ok())
        .any(|e| e.path().extension().map(|x| x == "ezmd").unwrap_or(false))
}

impl Settings {
    /// Renders the settings artifact as a Python settings module.
    pub fn render(&self) -> BuildResult<String> {
        let mut env = Environment::new();
        env.add_filter("py", py_filter);
        env.add_template("settings", SETTINGS_TEMPLATE)?;
        let tmpl = env.get_template("settings")?;
        Ok(tmpl.render(self)?)
    }

    /// Writes the rendered artifact to `path`, overwriting prior content.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> BuildResult<()> {
        let path = path.as_ref();
        debug!("Writing converted settings to {}", path.display());
        fs::write(path, self.render()?).map_err(BuildError::IoError)
    }

    /// Artifact-style view of the settings, keyed the way the generator
    /// sees them. Used for exporting the configuration to post-run scripts.
    pub fn to_map(&self) -> IndexMap<String, serde_json::Value> {
        use serde_json::json;

        let mut map = IndexMap::new();
        map.insert("SITENAME".to_string(), json!(self.site.name));
        map.insert("SITEDESC".to_string(), json!(self.site.description));
        map.insert("SITEDOMAIN".to_string(), json!(self.site.domain));
        map.insert("SITEURL".to_string(), json!(self.site.url));
        map.insert("SITELOGO".to_string(), json!(self.site.logo));
        map.insert("SITEREPOSITORY".to_string(), json!(self.site.repository));
        map.insert("TRADEMARKS".to_string(), json!(self.site.trademarks));
        map.insert("TIMEZONE".to_string(), json!(self.site.timezone));
        map.insert("CURRENTYEAR".to_string(), json!(self.year));
        map.insert("THEME".to_string(), json!(self.theme));
        map.insert("PLUGIN_PATHS".to_string(), json!(self.plugin_paths));
        map.insert("PLUGINS".to_string(), json!(self.plugins));
        map.insert("PAGE_PATHS".to_string(), json!(self.pages));
        map.insert("STATIC_PATHS".to_string(), json!(self.static_dirs));
        if let Some(genid) = &self.genid {
            map.insert("ASF_GENID".to_string(), json!(genid));
        }
        if let Some(sitemap) = &self.sitemap {
            map.insert("SITEMAP".to_string(), json!(sitemap));
        }
        if let Some(data) = &self.data {
            map.insert("ASF_DATA".to_string(), data.clone());
        }
        if let Some(run) = &self.run {
            map.insert("ASF_RUN".to_string(), json!(run));
        }
        if let Some(postrun) = &self.postrun {
            map.insert("ASF_POSTRUN".to_string(), json!(postrun));
        }
        if let Some(ignore) = &self.ignore {
            map.insert("IGNORE_FILES".to_string(), json!(ignore));
        }
        if let Some(copy) = &self.copy {
            map.insert("ASF_COPY".to_string(), json!(copy));
        }
        map
    }
}

/// Appends the fixed plugin list to a legacy `pelicanconf.py`.
/// Kept for repositories not yet migrated to the declarative format.
pub fn append_legacy_plugins<P: AsRef<Path>>(settings_path: P) -> BuildResult<()> {
    let mut file = OpenOptions::new()
        .append(true)
        .open(settings_path.as_ref())
        .map_err(BuildError::IoError)?;
    let list = LEGACY_PLUGINS
        .iter()
        .map(|p| format!("'{}'", p))
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(file, "\n# Plugins supported by the build system")?;
    writeln!(file, "PLUGINS = [{}]", list)?;
    Ok(())
}

/// minijinja filter rendering any value as a Python literal.
fn py_filter(value: minijinja::Value) -> Result<String, minijinja::Error> {
    let json = serde_json::to_value(&value).map_err(|e| {
        minijinja::Error::new(minijinja::ErrorKind::InvalidOperation, e.to_string())
    })?;
    Ok(py_literal(&json))
}

/// Renders a JSON value as the equivalent Python literal.
pub fn py_literal(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "None".to_string(),
        serde_json::Value::Bool(true) => "True".to_string(),
        serde_json::Value::Bool(false) => "False".to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => {
            let escaped = s.replace('\\', "\\\\").replace('\'', "\\'").replace('\n', "\\n");
            format!("'{}'", escaped)
        }
        serde_json::Value::Array(items) => {
            let inner = items.iter().map(py_literal).collect::<Vec<_>>().join(", ");
            format!("[{}]", inner)
        }
        serde_json::Value::Object(entries) => {
            let inner = entries
                .iter()
                .map(|(k, v)| format!("'{}': {}", k, py_literal(v)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{{}}}", inner)
        }
    }
}

/// Embedded template for the generated settings module.
const SETTINGS_TEMPLATE: &str = r#"# Generated by buildsite. DO NOT EDIT.

# Basic information about the site.
SITENAME = {{ site.name | py }}
SITEDESC = {{ site.description | py }}
SITEDOMAIN = {{ site.domain | py }}
SITEURL = {{ site.url | py }}
SITELOGO = {{ site.logo | py }}
SITEREPOSITORY = {{ site.repository | py }}
CURRENTYEAR = {{ year }}
TRADEMARKS = {{ site.trademarks | py }}
TIMEZONE = {{ site.timezone | py }}

# Theme includes templates and possibly static files
THEME = {{ theme | py }}

# Specify location of plugins, and which to use
PLUGIN_PATHS = {{ plugin_paths | py }}
PLUGINS = {{ plugins | py }}

{% if pages -%}
PAGE_PATHS = [{{ pages | py }}]
{%- else -%}
# All content is located at '.' (aka content/ )
PAGE_PATHS = ['.']
{%- endif %}
STATIC_PATHS = {{ static_dirs | py }}

# Where to place/link generated pages
PATH_METADATA = '(?P<path_no_ext>.*)\\..*'
PAGE_SAVE_AS = '{path_no_ext}.html'

# Don't try to translate
PAGE_TRANSLATION_ID = None

# Disable unused Pelican features
FEED_ALL_ATOM = None
INDEX_SAVE_AS = ''
TAGS_SAVE_AS = ''
CATEGORIES_SAVE_AS = ''
AUTHORS_SAVE_AS = ''
ARCHIVES_SAVE_AS = ''

# Disable articles by pointing to a (should-be-absent) subdir
ARTICLE_PATHS = ['blog']
# needed to create blogs page
ARTICLE_URL = 'blog/{slug}.html'
ARTICLE_SAVE_AS = 'blog/{slug}.html'

# Disable all processing of .html files
READERS = {'html': None}
{% if genid %}
# Configure the asfgenid plugin
ASF_GENID = {
    'unsafe': {{ genid.unsafe | py }},
    'metadata': {{ genid.metadata | py }},
    'elements': {{ genid.elements | py }},
    'permalinks': {{ genid.permalinks | py }},
    'tables': {{ genid.tables | py }},
    'headings_depth': {{ genid.headings_depth | py }},
    'toc_depth': {{ genid.toc_depth | py }},
    'debug': {{ genid.debug | py }},
}
{% endif %}
{%- if sitemap %}
# Configure the sitemap plugin
SITEMAP = {
    'exclude': {{ sitemap.exclude | py }},
    'format': {{ sitemap.format | py }},
    'priorities': {{ sitemap.priorities | py }},
    'changefreqs': {{ sitemap.changefreqs | py }},
}
{% endif %}
{%- if data %}
# Configure the asfdata plugin (external data for page metadata)
ASF_DATA = {{ data | py }}
{% endif %}
{%- if run %}
# Configure the asfrun plugin (initialization)
ASF_RUN = {{ run | py }}
{% endif %}
{%- if postrun %}
# Configure the asfrun plugin (finalization)
ASF_POSTRUN = {{ postrun | py }}
{% endif %}
{%- if ignore %}
# Files that must not be copied to the output
IGNORE_FILES = {{ ignore | py }}
{% endif %}
{%- if copy %}
# Configure the asfcopy plugin (directories copied to the output)
ASF_COPY = {{ copy | py }}
{% endif %}
"#;
