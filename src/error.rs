//! Typed error taxonomy for jacobgit's core operations.
//!
//! Command functions return `anyhow::Result`, but the concrete variants
//! here let callers (the CLI, tests) match on failure kind when they
//! need to.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("not a jacobgit repository (run `jacobgit init` first)")]
    NotARepository,

    #[error("object not found: {0}")]
    ObjectNotFound(String),

    #[error("corrupt object {0}: {1}")]
    ObjectCorrupt(String, String),

    #[error("corrupt index: {0}")]
    IndexCorrupt(String),

    #[error("invalid checkout target '{0}'")]
    InvalidTarget(String),

    #[error("{0}")]
    UsageError(String),

    #[error("{0}")]
    PreconditionViolated(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
