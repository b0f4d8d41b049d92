use crate::{
    config::{AuthMode, DeployConfig},
    exec, log,
    utils::exec::{Bounds, CancelToken, ExecError, exec_bounded, internal::to_cmd_vec},
};
use anyhow::{Context, Result, bail};
use gix::{Repository, remote::Direction};
use std::{ffi::OsString, fs, path::Path, time::Duration};

/// Point `origin` at `url`, adding the remote when it is missing.
pub fn configure_origin_remote(root: &Path, repo: &Repository, url: &str) -> Result<()> {
    if origin_url(repo).as_deref() == Some(url) {
        return Ok(());
    }
    let action = if repo.find_remote("origin").is_ok() {
        "set-url"
    } else {
        "add"
    };
    exec!(root; ["git"]; "remote", action, "origin", url)?;
    Ok(())
}

/// Current push (or fetch) URL of `origin`.
fn origin_url(repo: &Repository) -> Option<String> {
    let remote = repo.find_remote("origin").ok()?;
    remote
        .url(Direction::Push)
        .or_else(|| remote.url(Direction::Fetch))
        .map(|url| url.to_bstring().to_string())
}

/// Remote URL to push to, with credentials applied for token auth.
pub fn push_url(deploy: &DeployConfig) -> Result<String> {
    let url = deploy.remote_url();
    match deploy.auth {
        AuthMode::Ssh => Ok(url),
        AuthMode::Token => build_authenticated_url(&url, deploy.token_path.as_deref()),
    }
}

/// Environment for the push child process.
pub fn push_env(deploy: &DeployConfig) -> Vec<(&'static str, OsString)> {
    let mut envs = vec![("GIT_TERMINAL_PROMPT", OsString::from("0"))];
    if deploy.auth == AuthMode::Ssh
        && let Some(key) = &deploy.ssh_key
    {
        let mut command = OsString::from("ssh -o IdentitiesOnly=yes -i ");
        command.push(key.as_os_str());
        envs.push(("GIT_SSH_COMMAND", command));
    }
    envs
}

/// Run `git push origin HEAD:refs/heads/<branch>`.
pub fn push(
    root: &Path,
    deploy: &DeployConfig,
    cancel: &CancelToken,
) -> Result<(), ExecError> {
    log!("git"; "pushing to {} ({})", deploy.remote_url(), deploy.branch);

    let refspec = format!("HEAD:refs/heads/{}", deploy.branch);
    let mut args: Vec<OsString> = ["push", "origin"].map(OsString::from).to_vec();
    args.push(refspec.into());
    if deploy.force {
        args.push("--force".into());
    }

    let envs = push_env(deploy);
    let bounds = Bounds {
        timeout: Duration::from_secs(deploy.timeout_secs),
        cancel,
        envs: &envs,
    };
    exec_bounded(Some(root), &to_cmd_vec(["git"]), &args, &bounds)?;
    Ok(())
}

/// Embed the token read from `token_path` into an HTTPS URL.
fn build_authenticated_url(url: &str, token_path: Option<&Path>) -> Result<String> {
    let base_url = url
        .strip_prefix("https://")
        .context("Token auth needs an https:// repository URL")?;
    let token_path = token_path.context("Token auth needs [deploy] token_path")?;

    let token = fs::read_to_string(token_path)
        .with_context(|| format!("Failed to read token from {}", token_path.display()))?;
    let token = token.trim();
    if token.is_empty() {
        bail!("Token file {} is empty", token_path.display());
    }

    Ok(format!("https://{token}@{base_url}"))
}
