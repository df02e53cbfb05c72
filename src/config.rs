//! Site configuration.
//!
//! A project is a directory holding content directories (posts, layouts,
//! assets) and an optional `config.toml`. The file is sparse: it overrides
//! only the keys it names, everything else keeps the stock default.
//!
//! ```toml
//! # All options are optional - defaults shown below
//! posts = "_log"
//! styles = "_styles"
//! scripts = "_scripts"
//! demos = "_demos"
//! images = "_images"
//! log_images = "_images/log"
//! output = "_site"
//! layouts = "_layouts"
//! remote_location = ""
//! date_format = "%Y-%m-%d"
//!
//! [site]
//! title = "Notebook"
//! url = "http://localhost:8000"
//! description = ""
//! author = ""
//! ```
//!
//! ## Output names
//!
//! Source directories carry a leading underscore so the page walker skips
//! them. Their copies in the output tree drop it: `_images/log` is published
//! as `images/log`. [`output_name`] implements that mapping.
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Name of the optional project-local override file.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Subdirectory of the output tree that receives rendered posts.
pub const POSTS_OUTPUT_DIR: &str = "notebook";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error in {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Logical directory roles every component resolves through the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirRole {
    Posts,
    Styles,
    Scripts,
    Demos,
    Images,
    LogImages,
    Output,
    Layouts,
}

impl DirRole {
    pub const ALL: [DirRole; 8] = [
        DirRole::Posts,
        DirRole::Styles,
        DirRole::Scripts,
        DirRole::Demos,
        DirRole::Images,
        DirRole::LogImages,
        DirRole::Output,
        DirRole::Layouts,
    ];

    pub fn key(self) -> &'static str {
        match self {
            DirRole::Posts => "posts",
            DirRole::Styles => "styles",
            DirRole::Scripts => "scripts",
            DirRole::Demos => "demos",
            DirRole::Images => "images",
            DirRole::LogImages => "log_images",
            DirRole::Output => "output",
            DirRole::Layouts => "layouts",
        }
    }
}

/// Static asset directories, copied untouched into the output tree.
pub const ASSET_ROLES: [DirRole; 3] = [DirRole::Images, DirRole::Styles, DirRole::Scripts];

/// Resolved site configuration. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub posts: String,
    pub styles: String,
    pub scripts: String,
    pub demos: String,
    pub images: String,
    pub log_images: String,
    pub output: String,
    pub layouts: String,
    /// rsync destination for `push`, e.g. `user@host:/var/www/site`.
    pub remote_location: String,
    /// strftime-style format every document date must match.
    pub date_format: String,
    /// Feed identity.
    pub site: SiteMeta,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            posts: "_log".to_string(),
            styles: "_styles".to_string(),
            scripts: "_scripts".to_string(),
            demos: "_demos".to_string(),
            images: "_images".to_string(),
            log_images: "_images/log".to_string(),
            output: "_site".to_string(),
            layouts: "_layouts".to_string(),
            remote_location: String::new(),
            date_format: "%Y-%m-%d".to_string(),
            site: SiteMeta::default(),
        }
    }
}

/// Site-wide identity shared by both feeds and exposed to every template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SiteMeta {
    pub title: String,
    /// Absolute base URL; canonical post URLs are built from it.
    pub url: String,
    pub description: String,
    pub author: String,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            title: "Notebook".to_string(),
            url: "http://localhost:8000".to_string(),
            description: String::new(),
            author: String::new(),
        }
    }
}

impl SiteMeta {
    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

impl SiteConfig {
    /// Configured (relative) path for a directory role.
    pub fn dir(&self, role: DirRole) -> &str {
        match role {
            DirRole::Posts => &self.posts,
            DirRole::Styles => &self.styles,
            DirRole::Scripts => &self.scripts,
            DirRole::Demos => &self.demos,
            DirRole::Images => &self.images,
            DirRole::LogImages => &self.log_images,
            DirRole::Output => &self.output,
            DirRole::Layouts => &self.layouts,
        }
    }

    /// Absolute source location of a role under the project root.
    pub fn source_path(&self, root: &Path, role: DirRole) -> PathBuf {
        root.join(self.dir(role))
    }

    /// Root of the generated tree.
    pub fn output_root(&self, root: &Path) -> PathBuf {
        root.join(&self.output)
    }

    /// Where a role's content lands inside the output tree.
    pub fn output_path(&self, root: &Path, role: DirRole) -> PathBuf {
        self.output_root(root).join(output_name(self.dir(role)))
    }

    /// Output directory for rendered posts.
    pub fn posts_output(&self, root: &Path) -> PathBuf {
        self.output_root(root).join(POSTS_OUTPUT_DIR)
    }

    /// URL path (leading slash, no trailing slash) under which log images are served.
    pub fn log_images_url(&self) -> String {
        let name = output_name(&self.log_images);
        let parts: Vec<String> = name
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        format!("/{}", parts.join("/"))
    }

    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for role in DirRole::ALL {
            let value = self.dir(role);
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{} must not be empty",
                    role.key()
                )));
            }
            if Path::new(value).is_absolute() {
                return Err(ConfigError::Validation(format!(
                    "{} must be relative to the project root, got {value}",
                    role.key()
                )));
            }
        }
        if Path::new(&self.output)
            .components()
            .all(|c| matches!(c, Component::CurDir))
        {
            return Err(ConfigError::Validation(
                "output must not be the project root".into(),
            ));
        }
        if self.date_format.is_empty() {
            return Err(ConfigError::Validation(
                "date_format must not be empty".into(),
            ));
        }
        if !(self.site.url.starts_with("http://") || self.site.url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "site.url must be an http(s) URL, got {:?}",
                self.site.url
            )));
        }
        Ok(())
    }
}

/// Map a source-relative directory to its name in the output tree by
/// stripping one leading `_` from every component.
///
/// - `_images` → `images`
/// - `_images/log` → `images/log`
/// - `notes/_drafts` → `notes/drafts`
pub fn output_name(relative: &str) -> PathBuf {
    Path::new(relative)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => {
                let part = part.to_string_lossy();
                Some(part.strip_prefix('_').unwrap_or(&part).to_string())
            }
            _ => None,
        })
        .collect()
}

// =============================================================================
// Config loading and merging
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load the raw override file from the project root, if there is one.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content).map_err(|source| ConfigError::Toml {
        path: config_path.clone(),
        source,
    })?;
    Ok(Some(value))
}

/// Resolve the project configuration: stock defaults, overridden per key by
/// `config.toml` when present, then validated.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let merged = match load_raw_config(root)? {
        Some(overlay) => merge_toml(stock_defaults_value(), overlay),
        None => stock_defaults_value(),
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_conventional_layout() {
        let config = SiteConfig::default();
        assert_eq!(config.posts, "_log");
        assert_eq!(config.log_images, "_images/log");
        assert_eq!(config.output, "_site");
        assert_eq!(config.date_format, "%Y-%m-%d");
        assert!(config.remote_location.is_empty());
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn project_file_overrides_per_key() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
posts = "_notes"
remote_location = "me@host:/srv/www"

[site]
title = "Field Notes"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.posts, "_notes");
        assert_eq!(config.remote_location, "me@host:/srv/www");
        assert_eq!(config.site.title, "Field Notes");
        // untouched keys keep their defaults
        assert_eq!(config.styles, "_styles");
        assert_eq!(config.site.url, "http://localhost:8000");
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "postz = \"_log\"\n").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn invalid_toml_names_the_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "posts = [unclosed").unwrap();
        let err = load_config(tmp.path()).unwrap_err();
        assert!(err.to_string().contains(CONFIG_FILENAME));
    }

    #[test]
    fn validate_rejects_absolute_dirs() {
        let config = SiteConfig {
            layouts: "/etc/layouts".to_string(),
            ..SiteConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_output_at_root() {
        let config = SiteConfig {
            output: ".".to_string(),
            ..SiteConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_http_url() {
        let mut config = SiteConfig::default();
        config.site.url = "example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn output_name_strips_leading_underscores() {
        assert_eq!(output_name("_images"), PathBuf::from("images"));
        assert_eq!(output_name("_images/log"), PathBuf::from("images/log"));
        assert_eq!(output_name("plain"), PathBuf::from("plain"));
        assert_eq!(output_name("a/_b"), PathBuf::from("a/b"));
    }

    #[test]
    fn output_paths_resolve_under_output_root() {
        let config = SiteConfig::default();
        let root = Path::new("/proj");
        assert_eq!(
            config.output_path(root, DirRole::Demos),
            PathBuf::from("/proj/_site/demos")
        );
        assert_eq!(
            config.posts_output(root),
            PathBuf::from("/proj/_site/notebook")
        );
        assert_eq!(config.log_images_url(), "/images/log");
    }

    #[test]
    fn base_url_trims_trailing_slash() {
        let mut meta = SiteMeta::default();
        meta.url = "https://example.com/".to_string();
        assert_eq!(meta.base_url(), "https://example.com");
    }

    #[test]
    fn merge_toml_preserves_base_keys() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("a = 10").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("a").unwrap().as_integer(), Some(10));
        assert_eq!(merged.get("b").unwrap().as_integer(), Some(2));
    }

    #[test]
    fn merge_toml_merges_nested_tables() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str("[site]\nauthor = \"J\"\n").unwrap();
        let merged = merge_toml(base, overlay);
        let site = merged.get("site").unwrap();
        assert_eq!(site.get("author").unwrap().as_str(), Some("J"));
        assert_eq!(site.get("title").unwrap().as_str(), Some("Notebook"));
    }
}
