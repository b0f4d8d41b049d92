use super::ignore::IgnoreMatcher;
use anyhow::{Context, Result, anyhow};
use gix::{
    ThreadSafeRepository,
    bstr::{BString, ByteSlice},
    index::{
        State,
        entry::{Flags, Mode, Stat},
        fs::Metadata,
    },
    objs::{Tree, tree},
};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Builds a git tree (and matching index) from the working directory.
pub struct TreeBuilder<'a> {
    repo: &'a ThreadSafeRepository,
    root: PathBuf,
    matcher: IgnoreMatcher,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(repo: &'a ThreadSafeRepository, gitignore: &[u8]) -> Result<Self> {
        let root = repo
            .path()
            .parent()
            .context("Invalid repository path")?
            .to_path_buf();
        Ok(Self {
            repo,
            root,
            matcher: IgnoreMatcher::new(gitignore),
        })
    }

    /// Write blobs and subtrees for `dir`, recording every file in `index`.
    pub fn build_from_dir(&self, dir: &Path, index: &mut State) -> Result<Tree> {
        let repo = self.repo.to_thread_local();
        let mut entries = Vec::new();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let filename = file_name(&path)?;
            let rel_path = self.relative(&path)?;
            let is_dir = path.is_dir();

            if filename == ".git" || self.matcher.matches(&rel_path, is_dir) {
                continue;
            }

            if is_dir {
                let sub_tree = self.build_from_dir(&path, index)?;
                // git has no empty trees
                if sub_tree.entries.is_empty() {
                    continue;
                }
                let oid = repo.write_object(&sub_tree)?.detach();
                entries.push(tree::Entry {
                    mode: tree::EntryKind::Tree.into(),
                    oid,
                    filename,
                });
            } else if path.is_file() {
                let oid: gix::ObjectId = repo.write_blob(fs::read(&path)?)?.into();
                let stat = Stat::from_fs(&Metadata::from_path_no_follow(&path)?)?;
                index.dangerously_push_entry(
                    stat,
                    oid,
                    Flags::empty(),
                    Mode::FILE,
                    rel_path.as_bytes().as_bstr(),
                );
                entries.push(tree::Entry {
                    mode: tree::EntryKind::Blob.into(),
                    oid,
                    filename,
                });
            }
        }

        sort_tree_entries(&mut entries);
        Ok(Tree { entries })
    }

    /// Repository-relative path with `/` separators, as git stores it.
    fn relative(&self, path: &Path) -> Result<String> {
        let rel = path.strip_prefix(&self.root)?;
        Ok(rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"))
    }
}

fn file_name(path: &Path) -> Result<BString> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(Into::into)
        .ok_or_else(|| anyhow!("Invalid UTF-8 in filename: {}", path.display()))
}

/// Git orders tree entries by name, comparing directories as if they
/// ended with `/`.
fn sort_tree_entries(entries: &mut [tree::Entry]) {
    let tree_mode: tree::EntryMode = tree::EntryKind::Tree.into();
    entries.sort_by_cached_key(|e| {
        let mut key = e.filename.to_vec();
        if e.mode == tree_mode {
            key.push(b'/');
        }
        key
    });
}
