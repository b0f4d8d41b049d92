//! Content repository reader.
//!
//! Walks the content and assets directories lazily in file-name order, so
//! the read index of every record is the same on every run.

use super::front_matter::FrontMatter;
use crate::error::ReadError;
use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};
use walkdir::WalkDir;

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// One markdown file, split but not yet interpreted.
#[derive(Debug, Clone)]
pub struct RawContent {
    pub source: PathBuf,
    /// Path relative to the content directory.
    pub relative: PathBuf,
    /// Position in read order.
    pub index: usize,
    pub front_matter: FrontMatter,
    pub body: String,
    pub modified: SystemTime,
}

/// A file copied to the output verbatim.
#[derive(Debug, Clone)]
pub struct Resource {
    /// Destination relative to the output directory.
    pub relative: PathBuf,
    pub bytes: Vec<u8>,
}

pub struct ContentReader {
    content: PathBuf,
    assets: PathBuf,
}

impl ContentReader {
    pub fn new(content: &Path, assets: &Path) -> Self {
        Self {
            content: content.to_path_buf(),
            assets: assets.to_path_buf(),
        }
    }

    /// Markdown records under the content directory.
    pub fn records(
        &self,
    ) -> Result<impl Iterator<Item = Result<RawContent, ReadError>> + '_, ReadError> {
        if !self.content.is_dir() {
            return Err(ReadError::MissingDir(self.content.clone()));
        }

        let records = walk_files(&self.content)
            .filter(|entry| entry.as_ref().map_or(true, |path| is_markdown(path)))
            .enumerate()
            .map(|(index, entry)| self.read_record(index, entry?));
        Ok(records)
    }

    /// Assets plus every non-markdown file under the content directory.
    ///
    /// A missing assets directory yields nothing.
    pub fn resources(&self) -> impl Iterator<Item = Result<Resource, ReadError>> + '_ {
        let assets = self
            .assets
            .is_dir()
            .then(|| walk_files(&self.assets))
            .into_iter()
            .flatten()
            .map(|entry| read_resource(&self.assets, entry?));

        let content = self
            .content
            .is_dir()
            .then(|| walk_files(&self.content))
            .into_iter()
            .flatten()
            .filter(|entry| entry.as_ref().map_or(true, |path| !is_markdown(path)))
            .map(|entry| read_resource(&self.content, entry?));

        assets.chain(content)
    }

    fn read_record(&self, index: usize, source: PathBuf) -> Result<RawContent, ReadError> {
        let bytes = fs::read(&source).map_err(|err| io_error(&source, err))?;
        let text = String::from_utf8(bytes).map_err(|_| ReadError::Decode(source.clone()))?;
        let modified = fs::metadata(&source)
            .and_then(|meta| meta.modified())
            .map_err(|err| io_error(&source, err))?;

        let (front_matter, body) = FrontMatter::split(&text);
        let body = body.to_owned();
        let relative = relative_to(&self.content, &source);

        Ok(RawContent {
            source,
            relative,
            index,
            front_matter,
            body,
            modified,
        })
    }
}

/// Files below `root`, sorted by name, skipping dotfiles and dot-directories.
fn walk_files(root: &Path) -> impl Iterator<Item = Result<PathBuf, ReadError>> + use<> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()))
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_file() => Some(Ok(entry.into_path())),
            Ok(_) => None,
            Err(err) => {
                let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                Some(Err(io_error(&path, err.into())))
            }
        })
}

fn read_resource(root: &Path, source: PathBuf) -> Result<Resource, ReadError> {
    let bytes = fs::read(&source).map_err(|err| io_error(&source, err))?;
    Ok(Resource {
        relative: relative_to(root, &source),
        bytes,
    })
}

fn relative_to(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|name| name.starts_with('.'))
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MARKDOWN_EXTENSIONS.contains(&ext))
}

fn io_error(path: &Path, source: std::io::Error) -> ReadError {
    ReadError::Io {
        path: path.to_path_buf(),
        source,
    }
}
