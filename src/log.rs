//! `log`: walk the commit chain from HEAD back, printing each commit's
//! SHA and indented message.

use std::fmt::Write;

use anyhow::Result;

use crate::hash::hash_to_hex;
use crate::object::Object;
use crate::refs::resolve_head;
use crate::repository::Repository;

pub fn log(repo: &Repository, out: &mut dyn Write) -> Result<()> {
    let mut current = resolve_head(&repo.root)?;

    while let Some(hash) = current {
        let object = match repo.store.read_object(&hash) {
            Ok(o) => o,
            Err(_) => break,
        };
        let commit = match object {
            Object::Commit(c) => c,
            _ => break,
        };

        writeln!(out, "commit {}", hash_to_hex(&hash))?;
        for line in commit.message.lines() {
            writeln!(out, "    {line}")?;
        }
        writeln!(out)?;

        current = commit.parent;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::add::add;
    use crate::commit::{commit, DEFAULT_IDENTITY};
    use crate::index::Index;

    #[test]
    fn two_commits_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let file = dir.path().join("a");
        std::fs::write(&file, "1").unwrap();

        let mut index = Index::default();
        add(&repo, &mut index, &[file.as_path()]).unwrap();
        commit(&repo, &index, DEFAULT_IDENTITY, "A").unwrap();

        std::fs::write(&file, "2").unwrap();
        add(&repo, &mut index, &[file.as_path()]).unwrap();
        commit(&repo, &index, DEFAULT_IDENTITY, "B").unwrap();

        let mut out = String::new();
        log(&repo, &mut out).unwrap();

        let b_pos = out.find("B").unwrap();
        let a_pos = out.find("A").unwrap();
        assert!(b_pos < a_pos);
        assert_eq!(out.matches("commit ").count(), 2);
    }

    #[test]
    fn no_commits_prints_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let mut out = String::new();
        log(&repo, &mut out).unwrap();
        assert!(out.is_empty());
    }
}
