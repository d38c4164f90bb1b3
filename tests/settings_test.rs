use buildsite::config::SiteConfig;
use buildsite::settings::{append_legacy_plugins, py_literal, translate};
use chrono::Datelike;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const MINIMAL_YAML: &str = r#"
site:
  name: Apache Software Foundation
  description: Test site
  domain: test.apache.org
  url: https://test.apache.org
"#;

fn builtin_paths() -> Vec<PathBuf> {
    vec![PathBuf::from("/opt/buildsite/plugins")]
}

fn translate_yaml(yaml: &str, source_root: &std::path::Path) -> buildsite::settings::Settings {
    let config = SiteConfig::parse(yaml).unwrap();
    translate(config, &builtin_paths(), source_root).unwrap()
}

#[test]
fn test_minimal_config_defaults() {
    let dir = TempDir::new().unwrap();
    let settings = translate_yaml(MINIMAL_YAML, dir.path());

    assert_eq!(settings.site.name, "Apache Software Foundation");
    assert_eq!(settings.site.timezone, "UTC");
    assert_eq!(settings.year, chrono::Local::now().year());
    assert!(!settings.debug);
    assert_eq!(settings.plugins, vec!["gfm".to_string()]);
    assert_eq!(settings.static_dirs, vec![".".to_string()]);
    assert_eq!(
        settings.theme,
        dir.path().join("theme/apache").to_string_lossy()
    );
}

#[test]
fn test_missing_site_block_is_config_error() {
    let err = SiteConfig::parse("theme: theme/apache\n").unwrap_err();
    assert!(matches!(err, buildsite::error::BuildError::ConfigError(_)));
}

#[test]
fn test_absolute_theme_is_kept() {
    let dir = TempDir::new().unwrap();
    let yaml = format!("{}theme: /srv/themes/apache\n", MINIMAL_YAML);
    let settings = translate_yaml(&yaml, dir.path());
    assert_eq!(settings.theme, "/srv/themes/apache");
}

#[test]
fn test_genid_suboptions_default_off() {
    let dir = TempDir::new().unwrap();
    let yaml = format!("{}genid: {{}}\n", MINIMAL_YAML);
    let settings = translate_yaml(&yaml, dir.path());

    let genid = settings.genid.as_ref().unwrap();
    assert!(!genid.unsafe_ids);
    assert!(!genid.metadata);
    assert!(!genid.elements);
    assert!(!genid.permalinks);
    assert!(!genid.tables);
    assert!(!genid.debug);
    assert_eq!(genid.headings_depth, None);
    assert_eq!(genid.toc_depth, None);
    assert!(settings.plugins.contains(&"asfgenid".to_string()));
}

#[test]
fn test_postrun_only_registers_run_plugin_once() {
    let dir = TempDir::new().unwrap();
    let yaml = format!(
        "{}setup:\n  postrun:\n    - /bin/bash postrun.sh\n",
        MINIMAL_YAML
    );
    let settings = translate_yaml(&yaml, dir.path());

    let count = settings.plugins.iter().filter(|p| *p == "asfrun").count();
    assert_eq!(count, 1);
    assert!(settings.run.is_none());
    assert_eq!(
        settings.postrun,
        Some(vec!["/bin/bash postrun.sh".to_string()])
    );
}

#[test]
fn test_run_and_postrun_register_run_plugin_once() {
    let dir = TempDir::new().unwrap();
    let yaml = format!(
        "{}setup:\n  run:\n    - /bin/bash prep.sh\n  postrun:\n    - /bin/bash finish.sh\n",
        MINIMAL_YAML
    );
    let settings = translate_yaml(&yaml, dir.path());

    let count = settings.plugins.iter().filter(|p| *p == "asfrun").count();
    assert_eq!(count, 1);
}

#[test]
fn test_sitemap_appended_once_after_explicit_list() {
    let dir = TempDir::new().unwrap();
    let yaml = format!(
        r#"{}plugins:
  use:
    - gfm
    - asfgenid
  sitemap:
    exclude: "True"
    format: xml
    priorities:
      articles: 0.6
      indexes: 0.5
      pages: 0.7
    changefreqs:
      articles: daily
      indexes: daily
      pages: daily
"#,
        MINIMAL_YAML
    );
    let settings = translate_yaml(&yaml, dir.path());

    assert_eq!(settings.plugins[0], "gfm");
    assert_eq!(settings.plugins[1], "asfgenid");
    let count = settings.plugins.iter().filter(|p| *p == "sitemap").count();
    assert_eq!(count, 1);
    assert!(settings.plugins.iter().position(|p| p == "sitemap").unwrap() >= 2);
}

#[test]
fn test_incomplete_sitemap_block_is_config_error() {
    let yaml = format!("{}plugins:\n  sitemap:\n    format: xml\n", MINIMAL_YAML);
    let err = SiteConfig::parse(&yaml).unwrap_err();
    assert!(matches!(err, buildsite::error::BuildError::ConfigError(_)));
}

#[test]
fn test_plugin_paths_resolved_against_source_root() {
    let dir = TempDir::new().unwrap();
    let yaml = format!("{}plugins:\n  paths:\n    - plugins\n", MINIMAL_YAML);
    let settings = translate_yaml(&yaml, dir.path());

    assert_eq!(settings.plugin_paths[0], "/opt/buildsite/plugins");
    assert_eq!(
        settings.plugin_paths[1],
        dir.path().join("plugins").to_string_lossy()
    );
}

#[test]
fn test_ezmd_files_activate_reader_plugin() {
    let dir = TempDir::new().unwrap();
    let content = dir.path().join("content");
    fs::create_dir_all(&content).unwrap();
    fs::write(content.join("board.ezmd"), "placeholder").unwrap();

    let settings = translate_yaml(MINIMAL_YAML, dir.path());
    assert!(settings.plugins.contains(&"asfreader".to_string()));

    let empty = TempDir::new().unwrap();
    let settings = translate_yaml(MINIMAL_YAML, empty.path());
    assert!(!settings.plugins.contains(&"asfreader".to_string()));
}

#[test]
fn test_rendered_artifact_contains_expected_settings() {
    let dir = TempDir::new().unwrap();
    let yaml = format!(
        "{}setup:\n  run:\n    - /bin/bash prep.sh\n  ignore:\n    - README.md\n",
        MINIMAL_YAML
    );
    let settings = translate_yaml(&yaml, dir.path());
    let rendered = settings.render().unwrap();

    assert!(rendered.contains("SITENAME = 'Apache Software Foundation'"));
    assert!(rendered.contains("SITEDOMAIN = 'test.apache.org'"));
    assert!(rendered.contains(&format!("CURRENTYEAR = {}", chrono::Local::now().year())));
    assert!(rendered.contains("PLUGINS = ['gfm', 'asfrun']"));
    assert!(rendered.contains("ASF_RUN = ['/bin/bash prep.sh']"));
    assert!(rendered.contains("IGNORE_FILES = ['README.md']"));
    assert!(rendered.contains("PAGE_PATHS = ['.']"));
    // Features that are not configured must not appear.
    assert!(!rendered.contains("ASF_POSTRUN"));
    assert!(!rendered.contains("ASF_GENID"));
    assert!(!rendered.contains("SITEMAP"));
}

#[test]
fn test_write_overwrites_prior_artifact() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pelican.auto.py");
    fs::write(&path, "stale content that must disappear").unwrap();

    let settings = translate_yaml(MINIMAL_YAML, dir.path());
    settings.write(&path).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert!(!written.contains("stale content"));
    assert!(written.contains("SITENAME"));
}

#[test]
fn test_legacy_fallback_appends_fixed_plugin_list() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pelicanconf.py");
    fs::write(&path, "SITENAME = 'legacy'\n").unwrap();

    append_legacy_plugins(&path).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("SITENAME = 'legacy'\n"));
    assert!(contents.contains("PLUGINS = ['toc', 'gfm']"));
}

#[test]
fn test_py_literal() {
    assert_eq!(py_literal(&json!(null)), "None");
    assert_eq!(py_literal(&json!(true)), "True");
    assert_eq!(py_literal(&json!(false)), "False");
    assert_eq!(py_literal(&json!(3)), "3");
    assert_eq!(py_literal(&json!("it's")), "'it\\'s'");
    assert_eq!(py_literal(&json!(["a", "b"])), "['a', 'b']");
    assert_eq!(py_literal(&json!({"k": [1, null]})), "{'k': [1, None]}");
}
