//! Utility modules for the site builder.

pub mod date;
pub mod exec;
pub mod git;
pub mod log;
pub mod minify;
pub mod slug;
