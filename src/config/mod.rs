//! Site configuration management for `quire.toml`.
//!
//! # Sections
//!
//! | Section        | Purpose                                        |
//! |----------------|------------------------------------------------|
//! | `[base]`       | Site metadata (title, url, language, social)   |
//! | `[build]`      | Paths, output mode, minify, drafts, workers    |
//! | `[[sections]]` | Declared content sections and their sort order |
//! | `[feed]`       | RSS feed inclusion list and limits             |
//! | `[sitemap]`    | Sitemap exclusions and indentation             |
//! | `[deploy]`     | Publishing target and authentication           |
//!
//! # Example
//!
//! ```toml
//! [base]
//! title = "DreamBuildShip"
//! description = "A description of DreamBuildShip"
//! url = "https://example.com"
//!
//! [[sections]]
//! id = "posts"
//!
//! [feed]
//! include = ["posts"]
//!
//! [deploy]
//! repository = "alice/alice.github.io"
//! auth = "ssh"
//! ```

mod base;
mod build;
pub mod defaults;
mod deploy;
mod error;
mod feed;
mod sections;

pub use base::{BaseConfig, SocialConfig};
pub use build::{BuildConfig, OutputMode};
pub use deploy::{AuthMode, DeployConfig};
pub use error::ConfigError;
pub use feed::{FeedConfig, Indentation, SitemapConfig};
pub use sections::{SectionConfig, SortField, SortOrder};

use crate::cli::Cli;
use crate::utils::slug::slugify;
use anyhow::{Context, Result, bail};
use educe::Educe;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing quire.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Basic site information
    #[serde(default)]
    pub base: BaseConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Declared sections, in navigation order
    #[serde(default = "defaults::sections::list")]
    #[educe(Default = defaults::sections::list())]
    pub sections: Vec<SectionConfig>,

    /// RSS feed settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Sitemap settings
    #[serde(default)]
    pub sitemap: SitemapConfig,

    /// Deployment settings
    #[serde(default)]
    pub deploy: DeployConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let mut config = Self::from_str(&content)
            .with_context(|| format!("Failed to parse `{}`", path.display()))?;
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Look up a declared section by id
    pub fn section(&self, id: &str) -> Option<&SectionConfig> {
        self.sections.iter().find(|section| section.id == id)
    }

    pub fn is_declared_section(&self, id: &str) -> bool {
        self.section(id).is_some()
    }

    /// Base URL without trailing slash ("" when unset)
    pub fn site_url(&self) -> &str {
        self.base
            .url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .unwrap_or_default()
    }

    /// Absolute URL for a root-relative path such as `/posts/hello/`
    pub fn full_url(&self, url_path: &str) -> String {
        format!("{}{}", self.site_url(), url_path)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .as_ref()
            .cloned()
            .unwrap_or_else(|| self.get_root().to_owned());

        let args = cli.build_args();
        Self::update_option(&mut self.build.content, args.source.as_ref());
        Self::update_option(&mut self.build.assets, args.assets.as_ref());
        Self::update_option(&mut self.build.output, args.output.as_ref());
        Self::update_option(&mut self.build.drafts, args.drafts.as_ref());
        Self::update_option(&mut self.build.minify, args.minify.as_ref());
        if let Some(url) = &args.base_url {
            self.base.url = Some(url.clone());
        }

        self.update_path_with_root(&root, &cli.config);
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Update all paths relative to root directory and normalize to absolute paths
    pub fn update_path_with_root(&mut self, root: &Path, config_file: &Path) {
        let root = Self::normalize_path(root);
        self.set_root(&root);

        self.config_path = Self::normalize_path(&root.join(config_file));
        self.build.content = Self::normalize_path(&root.join(&self.build.content));
        self.build.assets = Self::normalize_path(&root.join(&self.build.assets));
        self.build.output = Self::normalize_path(&root.join(&self.build.output));

        // Tilde expansion for credentials kept outside the project
        self.deploy.token_path = self
            .deploy
            .token_path
            .take()
            .map(|path| Self::expand_path(&root, &path));
        self.deploy.ssh_key = self
            .deploy
            .ssh_key
            .take()
            .map(|path| Self::expand_path(&root, &path));
    }

    fn expand_path(root: &Path, path: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        let path = PathBuf::from(expanded);
        if path.is_relative() {
            Self::normalize_path(&root.join(path))
        } else {
            Self::normalize_path(&path)
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration for a build
    pub fn validate(&self) -> Result<()> {
        match &self.base.url {
            None => bail!(ConfigError::Validation(
                "[base.url] is required for feed and sitemap links".into()
            )),
            Some(url) if !url.starts_with("http://") && !url.starts_with("https://") => {
                bail!(ConfigError::Validation(
                    "[base.url] must start with http:// or https://".into()
                ))
            }
            _ => {}
        }

        if self.sections.is_empty() {
            bail!(ConfigError::Validation(
                "at least one [[sections]] entry is required".into()
            ));
        }

        let mut seen = FxHashSet::default();
        for section in &self.sections {
            if section.id.is_empty() || slugify(&section.id) != section.id {
                bail!(ConfigError::Validation(format!(
                    "section id `{}` must be a lowercase url slug",
                    section.id
                )));
            }
            if section.id == "tags" {
                bail!(ConfigError::Validation(
                    "section id `tags` is reserved for tag pages".into()
                ));
            }
            if !seen.insert(section.id.as_str()) {
                bail!(ConfigError::Validation(format!(
                    "section id `{}` is declared twice",
                    section.id
                )));
            }
            if section.per_page == Some(0) {
                bail!(ConfigError::Validation(format!(
                    "[sections.{}.per_page] must be greater than 0",
                    section.id
                )));
            }
        }

        if let Some(include) = &self.feed.include {
            for id in include {
                if !self.is_declared_section(id) {
                    bail!(ConfigError::Validation(format!(
                        "[feed.include] names undeclared section `{id}`"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Validate the `[deploy]` section, checked only when publishing
    pub fn validate_deploy(&self) -> Result<()> {
        let deploy = &self.deploy;

        if deploy.repository.trim().is_empty() {
            bail!(ConfigError::Validation(
                "[deploy.repository] is required for publishing".into()
            ));
        }
        if deploy.branch.trim().is_empty() {
            bail!(ConfigError::Validation("[deploy.branch] cannot be empty".into()));
        }

        match deploy.auth {
            AuthMode::Token => {
                if !deploy.remote_url().starts_with("https://") {
                    bail!(ConfigError::Validation(
                        "[deploy.auth] = \"token\" requires an https repository".into()
                    ));
                }
                match &deploy.token_path {
                    None => bail!(ConfigError::Validation(
                        "[deploy.auth] = \"token\" requires [deploy.token_path]".into()
                    )),
                    Some(path) if !path.is_file() => bail!(ConfigError::Validation(
                        "[deploy.token_path] not found".into()
                    )),
                    _ => {}
                }
            }
            AuthMode::Ssh => {
                if let Some(key) = &deploy.ssh_key
                    && !key.is_file()
                {
                    bail!(ConfigError::Validation("[deploy.ssh_key] not found".into()));
                }
            }
        }

        which::which("git").context("`git` not found. Please install it first.")?;

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
