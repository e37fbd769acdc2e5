//! Working-tree file enumeration shared by `status` and `add`.

use std::path::Path;

use anyhow::Result;
use walkdir::WalkDir;

/// Recursively lists regular files under `root`, excluding any path
/// whose components include `.jacobgit` or `.git`. Returns
/// repository-relative, forward-slash paths, sorted.
pub fn enumerate_working_files(root: &Path) -> Result<Vec<String>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_entry(|e| !is_vcs_dir(e.file_name())) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
        paths.push(to_repo_relative(rel));
    }
    paths.sort();
    Ok(paths)
}

fn is_vcs_dir(name: &std::ffi::OsStr) -> bool {
    name == ".jacobgit" || name == ".git"
}

fn to_repo_relative(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn excludes_jacobgit_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir_all(dir.path().join(".jacobgit/objects")).unwrap();
        fs::write(dir.path().join(".jacobgit/objects/deadbeef"), "x").unwrap();

        let files = enumerate_working_files(dir.path()).unwrap();
        assert_eq!(files, vec!["a.txt".to_string()]);
    }

    #[test]
    fn lists_nested_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("sub/a.txt"), "a").unwrap();

        let files = enumerate_working_files(dir.path()).unwrap();
        assert_eq!(files, vec!["b.txt".to_string(), "sub/a.txt".to_string()]);
    }
}
