//! Build pipeline orchestration.
//!
//! # Architecture
//!
//! ```text
//! Pipeline::run()
//!     │
//!     ├── Reading     ContentReader ──► RawContent + Resource
//!     ├── Building    ItemBuilder ──► Items + Pages, organize() ──► Sections
//!     ├── Rendering   Renderer ──► ArtifactSet (in memory)
//!     ├── Feeds       feed + sitemap artifacts, then staging dir ──► output
//!     └── Publishing  commit + push (only with --publish)
//! ```
//!
//! Any failure moves the pipeline to `Failed` and returns the error tagged
//! with its stage. Output is only replaced once every artifact exists, so a
//! failed run leaves the previous site in place.

use crate::{
    config::SiteConfig,
    content::{
        Content, ContentReader, ItemBuilder, PlainCodeBlocks, RawContent, Resource, Sections,
        organize,
    },
    deploy,
    error::{PipelineError, RenderError, Stage, StageFailure},
    generator::{build_feed, build_sitemap},
    log,
    render::{ArtifactKind, ArtifactSet, Renderer},
    utils::exec::CancelToken,
};
use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

// ============================================================================
// State Machine
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Reading,
    Building,
    Rendering,
    Feeds,
    Publishing,
    Done,
    Failed,
}

impl PipelineState {
    /// The state after a successful step, `None` from a terminal state.
    ///
    /// Without `publish`, `Feeds` goes straight to `Done`.
    pub fn advance(self, publish: bool) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Reading),
            Self::Reading => Some(Self::Building),
            Self::Building => Some(Self::Rendering),
            Self::Rendering => Some(Self::Feeds),
            Self::Feeds if publish => Some(Self::Publishing),
            Self::Feeds | Self::Publishing => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Stage label for errors raised in this state.
    pub fn stage(self) -> Option<Stage> {
        match self {
            Self::Reading => Some(Stage::Reading),
            Self::Building => Some(Stage::Building),
            Self::Rendering => Some(Stage::Rendering),
            Self::Feeds => Some(Stage::Feeds),
            Self::Publishing => Some(Stage::Publishing),
            Self::Idle | Self::Done | Self::Failed => None,
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Commit and push the output after a successful build.
    pub publish: bool,
    /// Set from the Ctrl-C handler; stops a running push.
    pub cancel: CancelToken,
}

/// Counts reported after a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub items: usize,
    pub pages: usize,
    pub sections: usize,
    pub html: usize,
    pub artifacts: usize,
    pub published: bool,
    pub elapsed: Duration,
}

pub struct Pipeline<'a> {
    config: &'a SiteConfig,
    options: PipelineOptions,
    state: PipelineState,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a SiteConfig, options: PipelineOptions) -> Self {
        Self {
            config,
            options,
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run every stage in order on a pool sized by `[build] jobs`.
    pub fn run(&mut self) -> Result<BuildSummary, PipelineError> {
        let result = match self.thread_pool() {
            Some(pool) => pool.install(|| self.run_stages()),
            None => self.run_stages(),
        };
        if result.is_err() {
            self.state = PipelineState::Failed;
        }
        result
    }

    fn thread_pool(&self) -> Option<rayon::ThreadPool> {
        let jobs = self.config.build.jobs?;
        match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
            Ok(pool) => Some(pool),
            Err(err) => {
                log!("warn"; "cannot start {jobs} workers ({err}), using the global pool");
                None
            }
        }
    }

    fn run_stages(&mut self) -> Result<BuildSummary, PipelineError> {
        let started = Instant::now();
        let config = self.config;

        // Reading
        self.advance();
        let build = &config.build;
        log!("read"; "{}", build.content.display());
        let reader = ContentReader::new(&build.content, &build.assets);
        let records = reader
            .records()
            .and_then(|records| records.collect::<Result<Vec<RawContent>, _>>())
            .map_err(|err| self.fail(err))?;
        let resources = reader
            .resources()
            .collect::<Result<Vec<Resource>, _>>()
            .map_err(|err| self.fail(err))?;
        log!("read"; "{} sources, {} resources", records.len(), resources.len());

        // Building
        self.advance();
        let Content { items, pages } = ItemBuilder::new(config, &PlainCodeBlocks)
            .build_all(&records)
            .map_err(|err| self.fail(err))?;
        let sections = organize(config, items);
        log!("build"; "{} items in {} sections, {} pages", sections.item_count(), sections.len(), pages.len());

        // Rendering
        self.advance();
        let artifacts = Renderer::new(config, &sections, &pages)
            .render(resources)
            .map_err(|err| self.fail(err))?;
        let html = artifacts.count(ArtifactKind::Html);
        log!("render"; "{} pages, {} assets", html, artifacts.count(ArtifactKind::Asset));

        // Feeds
        self.advance();
        self.generate(&artifacts, &sections)
            .map_err(|err| self.fail(err))?;
        let written = commit_output(&artifacts, &build.output)
            .map_err(|err| PipelineError::new(Stage::Rendering, err))?;
        log!("write"; "{} files to {}", written, build.output.display());

        // Publishing
        let published = self.options.publish;
        if published {
            self.advance();
            deploy::publish(config, &build.output, &self.options.cancel)
                .map_err(|err| self.fail(err))?;
        }

        self.advance();
        Ok(BuildSummary {
            items: sections.item_count(),
            pages: pages.len(),
            sections: sections.len(),
            html,
            artifacts: written,
            published,
            elapsed: started.elapsed(),
        })
    }

    fn generate(&self, artifacts: &ArtifactSet, sections: &Sections) -> Result<(), RenderError> {
        if self.config.feed.enable {
            let feed = build_feed(self.config, sections)?;
            log!("feed"; "{}", feed.path.display());
            artifacts.insert(feed)?;
        }
        if self.config.sitemap.enable {
            let sitemap = build_sitemap(self.config, artifacts)?;
            log!("sitemap"; "{}", sitemap.path.display());
            artifacts.insert(sitemap)?;
        }
        Ok(())
    }

    fn advance(&mut self) {
        if let Some(next) = self.state.advance(self.options.publish) {
            self.state = next;
        }
    }

    fn fail(&self, err: impl Into<StageFailure>) -> PipelineError {
        // Only called from a running stage
        let stage = self.state.stage().unwrap_or(Stage::Reading);
        PipelineError::new(stage, err)
    }
}

// ============================================================================
// Output
// ============================================================================

/// Write `artifacts` into a staging directory beside `output`, then swap it
/// in. The old output's `.git` is moved into the staging directory first, so
/// every failure leaves the previous output and its history where they were.
fn commit_output(artifacts: &ArtifactSet, output: &Path) -> Result<usize, RenderError> {
    let staging = sibling(output, "staging");
    let backup = sibling(output, "old");
    for dir in [&staging, &backup] {
        if dir.exists() {
            fs::remove_dir_all(dir).map_err(|err| RenderError::io(dir, err))?;
        }
    }

    fs::create_dir_all(&staging).map_err(|err| RenderError::io(&staging, err))?;
    let written = match artifacts.write_to(&staging) {
        Ok(written) => written,
        Err(err) => {
            let _ = fs::remove_dir_all(&staging);
            return Err(err);
        }
    };

    let git = output.join(".git");
    let staged_git = staging.join(".git");
    let has_git = git.exists();
    if has_git && let Err(err) = fs::rename(&git, &staged_git) {
        let _ = fs::remove_dir_all(&staging);
        return Err(RenderError::io(&git, err));
    }
    let restore_git = || {
        if has_git {
            let _ = fs::rename(&staged_git, &git);
        }
    };

    let had_output = output.exists();
    if had_output && let Err(err) = fs::rename(output, &backup) {
        restore_git();
        let _ = fs::remove_dir_all(&staging);
        return Err(RenderError::io(output, err));
    }
    if let Err(err) = fs::rename(&staging, output) {
        if had_output {
            let _ = fs::rename(&backup, output);
        }
        restore_git();
        return Err(RenderError::io(output, err));
    }

    if had_output {
        fs::remove_dir_all(&backup).map_err(|err| RenderError::io(&backup, err))?;
    }
    Ok(written)
}

/// `public` -> `.public.<suffix>` in the same parent directory.
fn sibling(output: &Path, suffix: &str) -> PathBuf {
    let name = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_owned());
    output.with_file_name(format!(".{name}.{suffix}"))
}
