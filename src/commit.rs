//! `commit`: snapshot the index into a commit object and advance the
//! current branch.

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;

use crate::hash::{short_hex, Hash};
use crate::index::Index;
use crate::object::{self, Object};
use crate::refs::{self, DEFAULT_BRANCH};
use crate::repository::Repository;
use crate::tree::write_tree;

pub const DEFAULT_IDENTITY: &str = "jacobgit <jacobgit@localhost>";

pub struct CommitResult {
    pub hash: Hash,
    pub branch: String,
}

/// Builds a tree from `index`, resolves the branch to advance from
/// HEAD (defaulting to `refs/heads/master` when HEAD is absent or
/// unparseable), and writes a new commit object pointing at the
/// branch's current tip as parent (if any).
pub fn commit(repo: &Repository, index: &Index, author: &str, message: &str) -> Result<CommitResult> {
    let tree_hash = write_tree(&repo.store, index.entries())?;

    let branch_name = refs::current_branch(&repo.root)?.unwrap_or_else(|| DEFAULT_BRANCH.to_string());
    let ref_name = refs::branch_ref(&branch_name);
    let parent = refs::read_ref_file(&repo.root, &ref_name)?;

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);

    let commit = object::Commit {
        tree: tree_hash,
        parent,
        author: author.to_string(),
        committer: author.to_string(),
        timestamp,
        message: message.to_string(),
    };
    let hash = repo.store.write_object(&Object::Commit(commit))?;
    refs::write_ref_file(&repo.root, &ref_name, &hash)?;

    Ok(CommitResult { hash, branch: branch_name })
}

#[must_use]
pub fn format_commit_summary(result: &CommitResult, message: &str) -> String {
    format!("[{} {}] {}", result.branch, short_hex(&result.hash), message)
}
