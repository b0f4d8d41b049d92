//! Generated output files.

use crate::{error::RenderError, utils::date::DateTimeUtc};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Html,
    Feed,
    Sitemap,
    Asset,
}

#[derive(Debug, Clone)]
pub struct Artifact {
    /// Relative to the output directory.
    pub path: PathBuf,
    /// Root-relative URL the artifact is served at.
    pub url: String,
    pub content: Vec<u8>,
    pub kind: ArtifactKind,
    /// Publication date of the page's content, for sitemap `lastmod`.
    pub lastmod: Option<DateTimeUtc>,
}

impl Artifact {
    pub fn new(path: PathBuf, url: String, content: Vec<u8>, kind: ArtifactKind) -> Self {
        Self {
            path,
            url,
            content,
            kind,
            lastmod: None,
        }
    }

    pub fn with_lastmod(mut self, lastmod: DateTimeUtc) -> Self {
        self.lastmod = Some(lastmod);
        self
    }
}

/// Write-once collection of a run's artifacts, keyed by output path.
///
/// Safe to fill from rayon workers.
#[derive(Debug, Default)]
pub struct ArtifactSet {
    artifacts: Mutex<FxHashMap<PathBuf, Artifact>>,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an artifact; a second artifact for the same path is an error.
    pub fn insert(&self, artifact: Artifact) -> Result<(), RenderError> {
        let mut artifacts = self.artifacts.lock();
        if artifacts.contains_key(&artifact.path) {
            return Err(RenderError::PathCollision(artifact.path));
        }
        artifacts.insert(artifact.path.clone(), artifact);
        Ok(())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.artifacts.lock().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.artifacts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.lock().is_empty()
    }

    pub fn count(&self, kind: ArtifactKind) -> usize {
        self.artifacts
            .lock()
            .values()
            .filter(|artifact| artifact.kind == kind)
            .count()
    }

    /// Snapshot of the artifacts of `kind`, sorted by path.
    pub fn of_kind(&self, kind: ArtifactKind) -> Vec<Artifact> {
        let mut artifacts: Vec<Artifact> = self
            .artifacts
            .lock()
            .values()
            .filter(|artifact| artifact.kind == kind)
            .cloned()
            .collect();
        artifacts.sort_by(|a, b| a.path.cmp(&b.path));
        artifacts
    }

    /// All artifacts, sorted by path.
    pub fn into_sorted(self) -> Vec<Artifact> {
        let mut artifacts: Vec<Artifact> = self.artifacts.into_inner().into_values().collect();
        artifacts.sort_by(|a, b| a.path.cmp(&b.path));
        artifacts
    }

    /// Write every artifact below `dir`, in path order.
    pub fn write_to(&self, dir: &Path) -> Result<usize, RenderError> {
        let artifacts = self.artifacts.lock();
        let mut paths: Vec<&PathBuf> = artifacts.keys().collect();
        paths.sort();

        for path in &paths {
            let target = dir.join(path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|err| RenderError::io(parent, err))?;
            }
            fs::write(&target, &artifacts[*path].content)
                .map_err(|err| RenderError::io(&target, err))?;
        }
        Ok(paths.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;
    use tempfile::TempDir;

    fn html(path: &str) -> Artifact {
        Artifact::new(
            PathBuf::from(path),
            format!("/{path}"),
            path.as_bytes().to_vec(),
            ArtifactKind::Html,
        )
    }

    #[test]
    fn test_insert_rejects_duplicate_path() {
        let set = ArtifactSet::new();
        set.insert(html("posts/a/index.html")).unwrap();
        let err = set.insert(html("posts/a/index.html")).unwrap_err();
        assert!(matches!(err, RenderError::PathCollision(p) if p == Path::new("posts/a/index.html")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_parallel_insert_and_sorted_output() {
        let set = ArtifactSet::new();
        (0..100)
            .into_par_iter()
            .try_for_each(|i| set.insert(html(&format!("p{i:03}.html"))))
            .unwrap();

        assert_eq!(set.count(ArtifactKind::Html), 100);
        let sorted = set.into_sorted();
        assert_eq!(sorted[0].path, PathBuf::from("p000.html"));
        assert_eq!(sorted[99].path, PathBuf::from("p099.html"));
    }

    #[test]
    fn test_of_kind_filters() {
        let set = ArtifactSet::new();
        set.insert(html("b.html")).unwrap();
        set.insert(html("a.html")).unwrap();
        set.insert(Artifact::new(
            "feed.rss".into(),
            "/feed.rss".into(),
            Vec::new(),
            ArtifactKind::Feed,
        ))
        .unwrap();

        let pages: Vec<PathBuf> = set
            .of_kind(ArtifactKind::Html)
            .into_iter()
            .map(|a| a.path)
            .collect();
        assert_eq!(pages, [PathBuf::from("a.html"), PathBuf::from("b.html")]);
        assert!(set.contains(Path::new("feed.rss")));
    }

    #[test]
    fn test_write_to_creates_directories() {
        let dir = TempDir::new().unwrap();
        let set = ArtifactSet::new();
        set.insert(html("posts/hello/index.html")).unwrap();
        set.insert(html("index.html")).unwrap();

        assert_eq!(set.write_to(dir.path()).unwrap(), 2);
        let written = fs::read_to_string(dir.path().join("posts/hello/index.html")).unwrap();
        assert_eq!(written, "posts/hello/index.html");
    }
}
