//! Error taxonomy for the build pipeline.
//!
//! Each stage fails with its own error type; the orchestrator wraps the
//! first failure in a [`PipelineError`] that records the stage and the
//! offending source path and maps to a process exit code.

use std::{
    fmt, io,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

/// Failure while reading the content repository.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("content directory `{}` not found", .0.display())]
    MissingDir(PathBuf),

    #[error("`{}` is not valid UTF-8", .0.display())]
    Decode(PathBuf),

    #[error("failed to read `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ReadError {
    pub fn path(&self) -> &Path {
        match self {
            Self::MissingDir(path) | Self::Decode(path) | Self::Io { path, .. } => path,
        }
    }
}

/// Failure while turning raw records into items.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("`{}` belongs to undeclared section `{section}`", .path.display())]
    InvalidSection { section: String, path: PathBuf },

    #[error("`{}`: {message}", .path.display())]
    Validation { path: PathBuf, message: String },
}

impl BuildError {
    pub fn validation(path: &Path, message: impl Into<String>) -> Self {
        Self::Validation {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::InvalidSection { path, .. } | Self::Validation { path, .. } => path,
        }
    }
}

/// Failure while producing artifacts.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("broken link in `{from}`: `{target}` does not resolve")]
    BrokenLink { from: String, target: String },

    #[error("two artifacts would be written to `{}`", .0.display())]
    PathCollision(PathBuf),

    #[error("cannot render `{page}`: {message}")]
    Template { page: String, message: String },

    #[error("failed to write `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RenderError {
    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Failure while publishing the output directory.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("authentication rejected by remote: {0}")]
    Auth(String),

    #[error("remote unreachable: {0}")]
    Network(String),

    #[error("push rejected (remote has commits the local branch lacks): {0}")]
    Rejected(String),

    #[error("push timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("push cancelled")]
    Cancelled,

    #[error("git: {0}")]
    Git(String),
}

/// Pipeline stage, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Reading,
    Building,
    Rendering,
    Feeds,
    Publishing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reading => "read",
            Self::Building => "build",
            Self::Rendering => "render",
            Self::Feeds => "feed",
            Self::Publishing => "publish",
        })
    }
}

/// The step-local error behind a [`PipelineError`].
#[derive(Debug, Error)]
pub enum StageFailure {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// First failure of a pipeline run.
#[derive(Debug, Error)]
#[error("{stage}: {kind}")]
pub struct PipelineError {
    pub stage: Stage,
    pub path: Option<PathBuf>,
    #[source]
    pub kind: StageFailure,
}

impl PipelineError {
    pub fn new(stage: Stage, kind: impl Into<StageFailure>) -> Self {
        let kind = kind.into();
        let path = match &kind {
            StageFailure::Read(err) => Some(err.path().to_path_buf()),
            StageFailure::Build(err) => Some(err.path().to_path_buf()),
            StageFailure::Render(RenderError::Io { path, .. })
            | StageFailure::Render(RenderError::PathCollision(path)) => Some(path.clone()),
            StageFailure::Render(_) | StageFailure::Publish(_) => None,
        };
        Self { stage, path, kind }
    }

    /// Process exit code: 2 read, 3 build, 4 render, 5 publish.
    pub fn exit_code(&self) -> u8 {
        match self.kind {
            StageFailure::Read(_) => 2,
            StageFailure::Build(_) => 3,
            StageFailure::Render(_) => 4,
            StageFailure::Publish(_) => 5,
        }
    }
}
