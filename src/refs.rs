//! HEAD and ref (branch/tag) file handling.
//!
//! `HEAD` is either symbolic (`"ref: refs/heads/<name>\n"`) or detached
//! (a raw 40-hex SHA with optional trailing newline). A branch/tag file
//! that exists but is empty means "no commits yet" — distinct from a
//! missing file, which also resolves to `None` but signals a different
//! state at the HEAD level (absent entirely vs. pointing at nothing).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::hash::{hash_to_hex, hex_to_hash, Hash};

pub const DEFAULT_BRANCH: &str = "master";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    Symbolic(String),
    Detached(Hash),
}

fn jacobgit_dir(repo_root: &Path) -> PathBuf {
    repo_root.join(".jacobgit")
}

fn head_path(repo_root: &Path) -> PathBuf {
    jacobgit_dir(repo_root).join("HEAD")
}

fn ref_file_path(repo_root: &Path, ref_name: &str) -> PathBuf {
    jacobgit_dir(repo_root).join(ref_name)
}

pub fn branch_ref(name: &str) -> String {
    format!("refs/heads/{name}")
}

pub fn tag_ref(name: &str) -> String {
    format!("refs/tags/{name}")
}

/// Parses HEAD's raw contents per spec §4.3: strip trailing newline; if
/// what remains starts with `"ref: "`, the rest is a ref path,
/// otherwise the whole thing is a detached SHA.
pub fn parse_head(contents: &str) -> Result<Head> {
    let trimmed = contents.trim_end_matches('\n');
    if let Some(rest) = trimmed.strip_prefix("ref: ") {
        Ok(Head::Symbolic(rest.to_string()))
    } else {
        Ok(Head::Detached(hex_to_hash(trimmed)?))
    }
}

/// Reads HEAD. Absent HEAD (e.g. before `init`) yields `None`.
pub fn read_head(repo_root: &Path) -> Result<Option<Head>> {
    match fs::read_to_string(head_path(repo_root)) {
        Ok(contents) => Ok(Some(parse_head(&contents)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn write_head_symbolic(repo_root: &Path, ref_name: &str) -> Result<()> {
    write_text(&head_path(repo_root), &format!("ref: {ref_name}\n"))
}

pub fn write_head_detached(repo_root: &Path, hash: &Hash) -> Result<()> {
    write_text(&head_path(repo_root), &format!("{}\n", hash_to_hex(hash)))
}

/// Reads a ref file by its repo-relative path (e.g. `"refs/heads/master"`).
/// Missing file or empty contents both yield `None` ("no commits yet" /
/// "ref doesn't exist" are collapsed at this level; callers that care
/// about the distinction check existence separately).
pub fn read_ref_file(repo_root: &Path, ref_name: &str) -> Result<Option<Hash>> {
    let path = ref_file_path(repo_root, ref_name);
    match fs::read_to_string(&path) {
        Ok(contents) => {
            let trimmed = contents.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(hex_to_hash(trimmed)?))
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn ref_file_exists(repo_root: &Path, ref_name: &str) -> bool {
    ref_file_path(repo_root, ref_name).is_file()
}

pub fn write_ref_file(repo_root: &Path, ref_name: &str, hash: &Hash) -> Result<()> {
    write_text(&ref_file_path(repo_root, ref_name), &format!("{}\n", hash_to_hex(hash)))
}

pub fn create_empty_ref_file(repo_root: &Path, ref_name: &str) -> Result<()> {
    write_text(&ref_file_path(repo_root, ref_name), "")
}

pub fn delete_ref_file(repo_root: &Path, ref_name: &str) -> Result<()> {
    fs::remove_file(ref_file_path(repo_root, ref_name)).context("deleting ref file")
}

fn write_text(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
    debug!(path = %path.display(), "wrote ref");
    Ok(())
}

/// Resolves HEAD to a commit SHA: if symbolic, follows the target ref
/// (a branch that exists-but-is-empty, or doesn't exist, resolves to
/// `None`); if detached, returns the raw SHA directly. Absent HEAD
/// (repository never initialized in this tree) also yields `None`.
pub fn resolve_head(repo_root: &Path) -> Result<Option<Hash>> {
    match read_head(repo_root)? {
        None => Ok(None),
        Some(Head::Detached(hash)) => Ok(Some(hash)),
        Some(Head::Symbolic(ref_name)) => read_ref_file(repo_root, &ref_name),
    }
}

/// Returns the branch name HEAD points to, or `None` if detached or
/// unparseable/absent (callers default to `refs/heads/master` in that
/// case, per spec §4.5).
pub fn current_branch(repo_root: &Path) -> Result<Option<String>> {
    match read_head(repo_root)? {
        Some(Head::Symbolic(ref_name)) => Ok(ref_name.strip_prefix("refs/heads/").map(str::to_string)),
        _ => Ok(None),
    }
}
