//! `status`: classify every working-tree path into independent
//! {staged, modified, untracked} buckets and render the three-section
//! report.

use std::collections::HashMap;
use std::fs;

use anyhow::Result;

use crate::hash::{hash_bytes, Hash};
use crate::index::Index;
use crate::object::Object;
use crate::refs::resolve_head;
use crate::repository::Repository;
use crate::tree::read_tree;
use crate::working_tree::enumerate_working_files;

pub struct StatusReport {
    pub staged: Vec<String>,
    pub modified: Vec<String>,
    pub untracked: Vec<String>,
}

/// `blob_hash(bytes) = SHA1("blob <len>\0" || bytes)`, the same scheme
/// the object store uses, so fingerprints match blob object ids.
#[must_use]
pub fn blob_hash(bytes: &[u8]) -> Hash {
    let mut framed = format!("blob {}\0", bytes.len()).into_bytes();
    framed.extend_from_slice(bytes);
    hash_bytes(&framed)
}

fn head_tree(repo: &Repository) -> Result<HashMap<String, Hash>> {
    let Some(head_commit) = resolve_head(&repo.root)? else {
        return Ok(HashMap::new());
    };
    match repo.store.read_object(&head_commit)? {
        Object::Commit(commit) => read_tree(&repo.store, &commit.tree),
        _ => Ok(HashMap::new()),
    }
}

pub fn status(repo: &Repository, index: &Index) -> Result<StatusReport> {
    let head = head_tree(repo)?;

    let mut staged = Vec::new();
    let mut modified = Vec::new();
    let mut untracked = Vec::new();

    for path in enumerate_working_files(&repo.root)? {
        match index.find(&path) {
            None => untracked.push(path),
            Some(entry) => {
                if head.get(&path) != Some(&entry.sha1) {
                    staged.push(path.clone());
                }
                let bytes = fs::read(repo.root.join(&path))?;
                if blob_hash(&bytes) != entry.sha1 {
                    modified.push(path);
                }
            }
        }
    }

    staged.sort();
    modified.sort();
    untracked.sort();

    Ok(StatusReport { staged, modified, untracked })
}

#[must_use]
pub fn format_status(report: &StatusReport) -> String {
    let mut out = String::new();
    let mut any = false;

    if !report.staged.is_empty() {
        any = true;
        out.push_str("Changes to be committed:\n");
        for path in &report.staged {
            out.push_str(&format!("\t{path}\n"));
        }
        out.push('\n');
    }

    if !report.modified.is_empty() {
        any = true;
        out.push_str("Changes not staged for commit:\n");
        for path in &report.modified {
            out.push_str(&format!("\t{path}\n"));
        }
        out.push('\n');
    }

    if !report.untracked.is_empty() {
        any = true;
        out.push_str("Untracked files:\n");
        for path in &report.untracked {
            out.push_str(&format!("\t{path}\n"));
        }
        out.push('\n');
    }

    if !any {
        out.push_str("nothing to commit, working tree clean\n");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::add::add;
    use crate::commit::{commit, DEFAULT_IDENTITY};

    #[test]
    fn new_staged_file_is_staged_not_modified() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "hi").unwrap();

        let mut index = Index::default();
        add(&repo, &mut index, &[file.as_path()]).unwrap();

        let report = status(&repo, &index).unwrap();
        assert_eq!(report.staged, vec!["a.txt".to_string()]);
        assert!(report.modified.is_empty());
        assert!(report.untracked.is_empty());
    }

    #[test]
    fn staged_then_edited_is_both_staged_and_modified() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "hi").unwrap();

        let mut index = Index::default();
        add(&repo, &mut index, &[file.as_path()]).unwrap();
        fs::write(&file, "changed").unwrap();

        let report = status(&repo, &index).unwrap();
        assert_eq!(report.staged, vec!["a.txt".to_string()]);
        assert_eq!(report.modified, vec!["a.txt".to_string()]);
    }

    #[test]
    fn untracked_file_not_in_index() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        fs::write(dir.path().join("new.txt"), "x").unwrap();

        let index = Index::default();
        let report = status(&repo, &index).unwrap();
        assert_eq!(report.untracked, vec!["new.txt".to_string()]);
    }

    #[test]
    fn committed_unchanged_file_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "hi").unwrap();

        let mut index = Index::default();
        add(&repo, &mut index, &[file.as_path()]).unwrap();
        commit(&repo, &index, DEFAULT_IDENTITY, "init").unwrap();

        let report = status(&repo, &index).unwrap();
        assert!(report.staged.is_empty());
        assert!(report.modified.is_empty());
        assert!(report.untracked.is_empty());
        assert!(format_status(&report).contains("nothing to commit"));
    }
}
