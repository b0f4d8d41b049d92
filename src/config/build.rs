//! `[build]` section configuration.
//!
//! Contains build settings: source/output paths, output path mode,
//! minification, drafts and worker count.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How generated pages are laid out on disk.
///
/// Links are generated from the same mode, so it is site-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// `posts/hello.html`, linked as `/posts/hello.html`.
    Flat,
    /// `posts/hello/index.html`, linked as `/posts/hello/` (default).
    #[default]
    Folder,
}

impl OutputMode {
    /// Root-relative URL of the page at `rel` (`""` is the home page).
    pub fn url(self, rel: &str) -> String {
        match (self, rel) {
            (_, "") => "/".to_owned(),
            (Self::Flat, rel) => format!("/{rel}.html"),
            (Self::Folder, rel) => format!("/{rel}/"),
        }
    }

    /// Output file of the page at `rel`, relative to the output directory.
    pub fn file(self, rel: &str) -> PathBuf {
        match (self, rel) {
            (_, "") => PathBuf::from("index.html"),
            (Self::Flat, rel) => PathBuf::from(format!("{rel}.html")),
            (Self::Folder, rel) => PathBuf::from(rel).join("index.html"),
        }
    }
}

/// `[build]` section in quire.toml - build pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// content = "content"      # Markdown source directory
/// assets = "assets"        # Copied verbatim
/// output = "public"        # Output directory
/// output_mode = "folder"   # or "flat"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually the config file's directory).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Content source directory (markdown files).
    #[serde(default = "defaults::build::content")]
    #[educe(Default = defaults::build::content())]
    pub content: PathBuf,

    /// Build output directory.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Static assets directory (images, CSS, JS).
    #[serde(default = "defaults::build::assets")]
    #[educe(Default = defaults::build::assets())]
    pub assets: PathBuf,

    /// Page layout on disk.
    #[serde(default)]
    pub output_mode: OutputMode,

    /// Minify HTML output.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub minify: bool,

    /// Include items marked `draft: true`.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub drafts: bool,

    /// Tags whose description starts with this prefix are not listed on pages.
    #[serde(default = "defaults::build::hidden_tag_prefix")]
    #[educe(Default = defaults::build::hidden_tag_prefix())]
    pub hidden_tag_prefix: String,

    /// Worker threads for parsing and rendering (default: available cores).
    #[serde(default)]
    pub jobs: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use super::*;

    #[test]
    fn test_build_config_defaults() {
        let config = r#"
            [base]
            title = "Test"
            description = "Test blog"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.build.content, PathBuf::from("content"));
        assert_eq!(config.build.output, PathBuf::from("public"));
        assert_eq!(config.build.assets, PathBuf::from("assets"));
        assert_eq!(config.build.output_mode, OutputMode::Folder);
        assert!(!config.build.minify);
        assert!(!config.build.drafts);
        assert_eq!(config.build.hidden_tag_prefix, "hidden");
        assert!(config.build.jobs.is_none());
    }

    #[test]
    fn test_build_config_flat_mode() {
        let config = r#"
            [base]
            title = "Test"
            description = "Test"
            [build]
            output_mode = "flat"
            jobs = 2
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.build.output_mode, OutputMode::Flat);
        assert_eq!(config.build.jobs, Some(2));
    }

    #[test]
    fn test_output_mode_paths() {
        assert_eq!(OutputMode::Folder.url("posts/hello"), "/posts/hello/");
        assert_eq!(
            OutputMode::Folder.file("posts/hello"),
            PathBuf::from("posts/hello/index.html")
        );
        assert_eq!(OutputMode::Flat.url("posts/hello"), "/posts/hello.html");
        assert_eq!(OutputMode::Flat.file("posts/hello"), PathBuf::from("posts/hello.html"));

        for mode in [OutputMode::Flat, OutputMode::Folder] {
            assert_eq!(mode.url(""), "/");
            assert_eq!(mode.file(""), PathBuf::from("index.html"));
        }
    }

    #[test]
    fn test_build_config_bad_mode() {
        let config = r#"
            [base]
            title = "Test"
            description = "Test"
            [build]
            output_mode = "nested"
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);
        assert!(result.is_err());
    }
}
