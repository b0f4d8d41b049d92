//! Git operations for the output repository.
//!
//! Local work (init, tree building, commits) goes through gix; the network
//! push shells out to `git` so the user's credential setup applies.

mod ignore;
mod remote;
mod repo;
mod tree;

pub use remote::{configure_origin_remote, push, push_url};
pub use repo::{DEFAULT_IGNORES, commit_all, ensure_gitignore, get_repo_root, open_or_create_repo};
