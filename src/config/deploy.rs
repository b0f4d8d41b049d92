//! `[deploy]` section configuration.
//!
//! Where and how the built site is pushed.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the publisher authenticates against the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// SSH remote, key from the ssh agent or `ssh_key`.
    #[default]
    Ssh,
    /// HTTPS remote with a personal access token read from `token_path`.
    Token,
}

/// `[deploy]` section in quire.toml - deployment configuration.
///
/// # Example
/// ```toml
/// [deploy]
/// repository = "DandyLyons/DandyLyons.github.io"
/// branch = "main"
/// auth = "ssh"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct DeployConfig {
    /// `owner/name` on GitHub, or a full remote URL.
    #[serde(default)]
    pub repository: String,

    /// Target branch for deployment (e.g., "main", "gh-pages").
    #[serde(default = "defaults::deploy::branch")]
    #[educe(Default = defaults::deploy::branch())]
    pub branch: String,

    #[serde(default)]
    pub auth: AuthMode,

    /// Path to file containing a personal access token (token auth).
    ///
    /// Store outside the repository; never commit tokens.
    #[serde(default)]
    pub token_path: Option<PathBuf>,

    /// Private key passed to ssh (ssh auth). Uses the ssh agent when unset.
    #[serde(default)]
    pub ssh_key: Option<PathBuf>,

    /// Seconds before a push is abandoned.
    #[serde(default = "defaults::deploy::timeout_secs")]
    #[educe(Default = defaults::deploy::timeout_secs())]
    pub timeout_secs: u64,

    /// Force push (overwrites remote history).
    #[serde(default = "defaults::r#false")]
    #[educe(Default = defaults::r#false())]
    pub force: bool,

    /// Commit message for each publish.
    #[serde(default = "defaults::deploy::message")]
    #[educe(Default = defaults::deploy::message())]
    pub message: String,
}

impl DeployConfig {
    /// Resolve `repository` into a remote URL.
    ///
    /// `owner/name` shorthand expands to GitHub: `git@github.com:owner/name.git`
    /// for ssh, `https://github.com/owner/name.git` for token auth.
    pub fn remote_url(&self) -> String {
        let repo = self.repository.trim();
        let is_shorthand =
            !repo.contains("://") && !repo.contains('@') && repo.matches('/').count() == 1;

        if !is_shorthand {
            return repo.to_owned();
        }

        let repo = repo.trim_end_matches(".git");
        match self.auth {
            AuthMode::Ssh => format!("git@github.com:{repo}.git"),
            AuthMode::Token => format!("https://github.com/{repo}.git"),
        }
    }
}
