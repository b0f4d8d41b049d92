use crate::log;
use anyhow::{Result, anyhow, bail};
use gix::{ObjectId, Repository, ThreadSafeRepository, index::State};
use std::{fs, path::Path};

use super::tree::TreeBuilder;

/// Entries every output repository ignores.
pub const DEFAULT_IGNORES: &[&str] = &[".DS_Store"];

/// Create a new git repository at the given path
pub fn create_repo(root: &Path) -> Result<ThreadSafeRepository> {
    let repo = gix::init(root)?;
    ensure_gitignore(root, DEFAULT_IGNORES)?;
    Ok(repo.into_sync())
}

/// Open an existing git repository
pub fn open_repo(root: &Path) -> Result<ThreadSafeRepository> {
    let repo = gix::open(root)?;
    Ok(repo.into_sync())
}

/// Open the repository at `root`, initializing one if there is none yet.
pub fn open_or_create_repo(root: &Path) -> Result<ThreadSafeRepository> {
    if root.join(".git").exists() {
        open_repo(root)
    } else {
        log!("git"; "init {}", root.display());
        create_repo(root)
    }
}

/// Commit the working directory as a snapshot on top of `HEAD`.
///
/// Returns `None` when the tree matches `HEAD` and there is nothing to
/// commit.
pub fn commit_all(repo: &ThreadSafeRepository, message: &str) -> Result<Option<ObjectId>> {
    if message.trim().is_empty() {
        bail!("Commit message cannot be empty");
    }

    let mut repo_local = repo.to_thread_local();
    let root = get_repo_root(&repo_local)?.to_path_buf();
    let gitignore = read_gitignore(&root)?;

    let mut index = State::new(repo_local.object_hash());
    let tree = TreeBuilder::new(repo, &gitignore)?.build_from_dir(&root, &mut index)?;
    index.sort_entries();

    let tree_id = repo_local.write_object(&tree)?.detach();
    if head_tree_id(&repo_local) == Some(tree_id) {
        log!("git"; "nothing to commit");
        return Ok(None);
    }

    let mut index_file = gix::index::File::from_state(index, repo_local.index_path());
    index_file.write(gix::index::write::Options::default())?;

    // Freshly created output repos often have no identity configured
    repo_local.committer_or_set_generic_fallback()?;
    let parents = parent_commit_ids(&repo_local);
    let commit_id = repo_local.commit("HEAD", message, tree_id, parents)?.detach();

    log!("git"; "commit {commit_id}");
    Ok(Some(commit_id))
}

/// Get repository root path
pub fn get_repo_root(repo: &Repository) -> Result<&Path> {
    repo.path()
        .parent()
        .ok_or_else(|| anyhow!("Invalid repository path"))
}

/// Append missing entries to the `.gitignore` at `root`.
pub fn ensure_gitignore(root: &Path, entries: &[&str]) -> Result<()> {
    let path = root.join(".gitignore");
    let mut content = fs::read_to_string(&path).unwrap_or_default();

    let missing: Vec<&str> = entries
        .iter()
        .copied()
        .filter(|entry| !content.lines().any(|line| line.trim() == *entry))
        .collect();
    if missing.is_empty() && path.exists() {
        return Ok(());
    }

    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    for entry in missing {
        content.push_str(entry);
        content.push('\n');
    }
    fs::write(path, content)?;
    Ok(())
}

/// Read .gitignore file if it exists
fn read_gitignore(root: &Path) -> Result<Vec<u8>> {
    let path = root.join(".gitignore");
    if path.exists() {
        Ok(fs::read(path)?)
    } else {
        Ok(Vec::new())
    }
}

/// `HEAD` as the only parent, or none for the first commit.
fn parent_commit_ids(repo: &Repository) -> Vec<ObjectId> {
    repo.head_id()
        .map(|id| vec![id.detach()])
        .unwrap_or_default()
}

fn head_tree_id(repo: &Repository) -> Option<ObjectId> {
    repo.head_commit()
        .ok()
        .and_then(|commit| commit.tree_id().ok())
        .map(|id| id.detach())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn with_temp_repo<F>(f: F)
    where
        F: FnOnce(&Path, &ThreadSafeRepository),
    {
        let temp_dir = TempDir::new().unwrap();
        let repo = create_repo(temp_dir.path()).expect("Failed to create repo");
        f(temp_dir.path(), &repo);
    }

    fn head_summary(repo: &ThreadSafeRepository) -> String {
        let repo_local = repo.to_thread_local();
        let commit = repo_local.head_commit().unwrap();
        commit.message().unwrap().summary().to_string()
    }

    #[test]
    fn test_create_and_open_repo() {
        with_temp_repo(|dir, _repo| {
            assert!(dir.join(".git").exists());
            let gitignore = fs::read_to_string(dir.join(".gitignore")).unwrap();
            assert_eq!(gitignore, ".DS_Store\n");
            assert!(open_repo(dir).is_ok());
            assert!(open_or_create_repo(dir).is_ok());
        });
    }

    #[test]
    fn test_open_or_create_initializes() {
        let temp_dir = TempDir::new().unwrap();
        open_or_create_repo(temp_dir.path()).unwrap();
        assert!(temp_dir.path().join(".git").exists());
    }

    #[test]
    fn test_commit_all_chains_on_head() {
        with_temp_repo(|dir, repo| {
            fs::write(dir.join("index.html"), "v1").unwrap();
            let first = commit_all(repo, "First publish").unwrap().unwrap();
            assert_eq!(head_summary(repo), "First publish");

            fs::write(dir.join("index.html"), "v2").unwrap();
            commit_all(repo, "Second publish").unwrap().unwrap();
            assert_eq!(head_summary(repo), "Second publish");

            let repo_local = repo.to_thread_local();
            let head = repo_local.head_commit().unwrap();
            let parents: Vec<ObjectId> = head.parent_ids().map(|id| id.detach()).collect();
            assert_eq!(parents, vec![first]);
        });
    }

    #[test]
    fn test_commit_all_unchanged_tree_is_noop() {
        with_temp_repo(|dir, repo| {
            fs::write(dir.join("index.html"), "same").unwrap();
            assert!(commit_all(repo, "Publish").unwrap().is_some());
            assert!(commit_all(repo, "Publish").unwrap().is_none());
        });
    }

    #[test]
    fn test_commit_empty_message() {
        with_temp_repo(|_dir, repo| {
            let result = commit_all(repo, "   ");
            assert_eq!(
                result.unwrap_err().to_string(),
                "Commit message cannot be empty"
            );
        });
    }

    #[test]
    fn test_ensure_gitignore_appends_missing_only() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join(".gitignore"), "*.log").unwrap();

        ensure_gitignore(dir, &["*.log", ".DS_Store"]).unwrap();
        ensure_gitignore(dir, &[".DS_Store"]).unwrap();

        let content = fs::read_to_string(dir.join(".gitignore")).unwrap();
        assert_eq!(content, "*.log\n.DS_Store\n");
    }

    #[test]
    fn test_read_gitignore_missing() {
        with_temp_repo(|dir, _repo| {
            fs::remove_file(dir.join(".gitignore")).unwrap();
            assert!(read_gitignore(dir).unwrap().is_empty());
        });
    }
}
