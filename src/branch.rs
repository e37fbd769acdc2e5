//! `branch`: list, create, and delete branches.

use std::fs;

use anyhow::Result;

use crate::error::Error;
use crate::refs::{self};
use crate::repository::Repository;

#[must_use]
pub fn list(repo: &Repository) -> Vec<String> {
    let heads_dir = repo.root.join(".jacobgit/refs/heads");
    let mut names: Vec<String> = fs::read_dir(&heads_dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter_map(|e| e.file_name().into_string().ok())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[must_use]
pub fn format_list(repo: &Repository) -> String {
    let current = refs::current_branch(&repo.root).ok().flatten();
    let mut out = String::new();
    for name in list(repo) {
        if Some(&name) == current.as_ref() {
            out.push_str(&format!("* {name}\n"));
        } else {
            out.push_str(&format!("  {name}\n"));
        }
    }
    out
}

/// Creates `refs/heads/<name>` at the current HEAD-resolved commit.
/// Fails if the branch exists or HEAD resolves to nothing.
pub fn create(repo: &Repository, name: &str) -> Result<()> {
    let ref_name = refs::branch_ref(name);
    if refs::ref_file_exists(&repo.root, &ref_name) {
        return Err(Error::PreconditionViolated(format!("branch '{name}' already exists")).into());
    }
    let head_commit = refs::resolve_head(&repo.root)?
        .ok_or_else(|| Error::PreconditionViolated("no commits yet".into()))?;
    refs::write_ref_file(&repo.root, &ref_name, &head_commit)
}

/// Deletes `refs/heads/<name>`. Fails if it does not exist or is the
/// branch HEAD currently points to.
pub fn delete(repo: &Repository, name: &str) -> Result<()> {
    let ref_name = refs::branch_ref(name);
    if !refs::ref_file_exists(&repo.root, &ref_name) {
        return Err(Error::PreconditionViolated(format!("branch '{name}' not found")).into());
    }
    if refs::current_branch(&repo.root)?.as_deref() == Some(name) {
        return Err(Error::PreconditionViolated(format!(
            "cannot delete the branch '{name}' which you are currently on"
        ))
        .into());
    }
    refs::delete_ref_file(&repo.root, &ref_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::add::add;
    use crate::checkout::checkout;
    use crate::commit::{commit, DEFAULT_IDENTITY};
    use crate::index::Index;

    fn repo_with_one_commit() -> (tempfile::TempDir, Repository, Index) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let file = dir.path().join("a");
        std::fs::write(&file, "1").unwrap();
        let mut index = Index::default();
        add(&repo, &mut index, &[file.as_path()]).unwrap();
        commit(&repo, &index, DEFAULT_IDENTITY, "A").unwrap();
        (dir, repo, index)
    }

    #[test]
    fn create_then_list_shows_both_branches() {
        let (_dir, repo, _index) = repo_with_one_commit();
        create(&repo, "feature").unwrap();
        let names = list(&repo);
        assert_eq!(names, vec!["feature".to_string(), "master".to_string()]);
    }

    #[test]
    fn create_duplicate_fails() {
        let (_dir, repo, _index) = repo_with_one_commit();
        create(&repo, "feature").unwrap();
        assert!(create(&repo, "feature").is_err());
    }

    #[test]
    fn delete_current_branch_is_protected() {
        let (_dir, repo, index) = repo_with_one_commit();
        create(&repo, "feature").unwrap();
        checkout(&repo, "feature", &index).unwrap();

        let err = delete(&repo, "feature").unwrap_err();
        assert!(err.to_string().contains("cannot delete the branch 'feature' which you are currently on"));
        assert!(refs::ref_file_exists(&repo.root, "refs/heads/feature"));
    }

    #[test]
    fn delete_missing_branch_fails() {
        let (_dir, repo, _index) = repo_with_one_commit();
        assert!(delete(&repo, "nope").is_err());
    }
}
