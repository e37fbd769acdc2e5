//! `checkout`: materializes a target commit's tree onto the working
//! directory and updates HEAD.
//!
//! Does not check for uncommitted changes by default; this is a known
//! sharp edge (spec §4.7/§9). `RepoConfig::strict_checkout` adds an
//! opt-in precondition check.

use std::fs;

use anyhow::Result;

use crate::error::Error;
use crate::hash::hex_to_hash;
use crate::object::Object;
use crate::refs::{self};
use crate::repository::Repository;
use crate::status::status;
use crate::tree::read_tree;
use crate::working_tree::enumerate_working_files;

pub fn checkout(repo: &Repository, target: &str, index: &crate::index::Index) -> Result<()> {
    let branch_ref_name = refs::branch_ref(target);
    let (commit_hash, new_head_symbolic) = if refs::ref_file_exists(&repo.root, &branch_ref_name) {
        let hash = refs::read_ref_file(&repo.root, &branch_ref_name)?
            .ok_or_else(|| Error::PreconditionViolated(format!("branch '{target}' has no commits yet")))?;
        (hash, Some(branch_ref_name.clone()))
    } else {
        let hash = hex_to_hash(target).map_err(|_| Error::InvalidTarget(target.to_string()))?;
        (hash, None)
    };

    if repo.config.strict_checkout {
        let report = status(repo, index)?;
        if !report.modified.is_empty() {
            return Err(Error::PreconditionViolated(
                "refusing to checkout: you have unstaged modifications (JACOBGIT_STRICT_CHECKOUT is set)".into(),
            )
            .into());
        }
    }

    let commit = match repo.store.read_object(&commit_hash)? {
        Object::Commit(c) => c,
        _ => return Err(Error::InvalidTarget(target.to_string()).into()),
    };

    let target_files = read_tree(&repo.store, &commit.tree)?;

    for path in enumerate_working_files(&repo.root)? {
        if !target_files.contains_key(&path) {
            let _ = fs::remove_file(repo.root.join(&path));
        }
    }

    for (path, blob_hash) in &target_files {
        let data = match repo.store.read_object(blob_hash)? {
            Object::Blob(data) => data,
            _ => return Err(Error::ObjectCorrupt(target.to_string(), "expected blob in tree".into()).into()),
        };
        let full_path = repo.root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full_path, data)?;
    }

    match new_head_symbolic {
        Some(ref_name) => refs::write_head_symbolic(&repo.root, &ref_name)?,
        None => refs::write_head_detached(&repo.root, &commit_hash)?,
    }

    Ok(())
}
