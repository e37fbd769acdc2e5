//! `add`: stage listed files into the index.

use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};

use crate::error::Error;
use crate::index::{Index, IndexEntry};
use crate::object::{Object, MODE_EXEC, MODE_FILE};
use crate::repository::Repository;

/// Stages each of `paths` (must already exist) into the index,
/// returning the number of files added.
pub fn add(repo: &Repository, index: &mut Index, paths: &[&Path]) -> Result<usize> {
    if paths.is_empty() {
        return Err(Error::UsageError("add requires at least one path".into()).into());
    }

    let mut count = 0;
    for path in paths {
        add_file(repo, index, path)?;
        count += 1;
    }
    Ok(count)
}

fn add_file(repo: &Repository, index: &mut Index, path: &Path) -> Result<()> {
    let metadata = fs::metadata(path).map_err(Error::Io)?;
    if !metadata.is_file() {
        return Err(Error::UsageError(format!("{} is not a regular file", path.display())).into());
    }

    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let hash = repo.store.write_object(&Object::Blob(data))?;

    let mode = if is_executable(&metadata) { MODE_EXEC } else { MODE_FILE };
    let mtime = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0);

    let rel_path = path
        .strip_prefix(&repo.root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/");

    index.upsert(IndexEntry { path: rel_path, mode, mtime, sha1: hash });
    Ok(())
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_a_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let file = dir.path().join("hello.txt");
        fs::write(&file, "hello\n").unwrap();

        let mut index = Index::default();
        let added = add(&repo, &mut index, &[file.as_path()]).unwrap();

        assert_eq!(added, 1);
        let entry = index.find("hello.txt").unwrap();
        let expected_hash = crate::hash::hash_bytes(b"blob 6\0hello\n");
        assert_eq!(entry.sha1, expected_hash);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let mut index = Index::default();
        let missing = dir.path().join("nope.txt");
        assert!(add(&repo, &mut index, &[missing.as_path()]).is_err());
    }

    #[test]
    fn no_paths_is_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let mut index = Index::default();
        assert!(add(&repo, &mut index, &[]).is_err());
    }

    #[test]
    fn mtime_is_captured_from_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let file = dir.path().join("timed.txt");
        fs::write(&file, "x").unwrap();

        let stamp = filetime::FileTime::from_unix_time(1_000_000, 0);
        filetime::set_file_mtime(&file, stamp).unwrap();

        let mut index = Index::default();
        add(&repo, &mut index, &[file.as_path()]).unwrap();

        let entry = index.find("timed.txt").unwrap();
        assert_eq!(entry.mtime, 1_000_000);
    }
}
