//! `tag`: lightweight refs to commit SHAs — simple pointers, no
//! annotated-tag objects.

use std::fs;

use anyhow::Result;

use crate::error::Error;
use crate::hash::short_hex;
use crate::refs;
use crate::repository::Repository;

#[must_use]
pub fn list(repo: &Repository) -> Vec<String> {
    let tags_dir = repo.root.join(".jacobgit/refs/tags");
    let mut names: Vec<String> = fs::read_dir(&tags_dir)
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

pub fn format_list(repo: &Repository) -> Result<String> {
    let names = list(repo);
    if names.is_empty() {
        return Ok("No tags exist yet.\n".to_string());
    }
    let mut out = String::new();
    for name in names {
        let sha = refs::read_ref_file(&repo.root, &refs::tag_ref(&name))?
            .ok_or_else(|| Error::PreconditionViolated(format!("tag '{name}' has no commit")))?;
        out.push_str(&format!("{name}\t{}\n", short_hex(&sha)));
    }
    Ok(out)
}

/// Creates `refs/tags/<name>` at the current HEAD-resolved commit.
/// Fails if the tag exists or there are no commits yet.
pub fn create(repo: &Repository, name: &str) -> Result<()> {
    let ref_name = refs::tag_ref(name);
    if refs::ref_file_exists(&repo.root, &ref_name) {
        return Err(Error::PreconditionViolated(format!("tag '{name}' already exists")).into());
    }
    let head_commit = refs::resolve_head(&repo.root)?
        .ok_or_else(|| Error::PreconditionViolated("no commits yet".into()))?;
    refs::write_ref_file(&repo.root, &ref_name, &head_commit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::add::add;
    use crate::commit::{commit, DEFAULT_IDENTITY};
    use crate::index::Index;
    use crate::repository::Repository;

    #[test]
    fn no_tags_message() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        assert_eq!(format_list(&repo).unwrap(), "No tags exist yet.\n");
    }

    #[test]
    fn create_then_list_shows_short_sha() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let file = dir.path().join("a");
        std::fs::write(&file, "1").unwrap();
        let mut index = Index::default();
        add(&repo, &mut index, &[file.as_path()]).unwrap();
        let result = commit(&repo, &index, DEFAULT_IDENTITY, "A").unwrap();

        create(&repo, "v1").unwrap();
        let listing = format_list(&repo).unwrap();
        assert_eq!(listing, format!("v1\t{}\n", short_hex(&result.hash)));
    }

    #[test]
    fn duplicate_tag_fails() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let file = dir.path().join("a");
        std::fs::write(&file, "1").unwrap();
        let mut index = Index::default();
        add(&repo, &mut index, &[file.as_path()]).unwrap();
        commit(&repo, &index, DEFAULT_IDENTITY, "A").unwrap();

        create(&repo, "v1").unwrap();
        assert!(create(&repo, "v1").is_err());
    }
}
