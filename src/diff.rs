//! `diff`: line-oriented unified diff between working tree/index
//! (default) or HEAD tree/index (`--staged`).
//!
//! Bytes are treated as text unconditionally (lossy UTF-8 decoding),
//! per spec §4.6: "the format makes no special-case for non-UTF-8
//! bytes."

use std::fmt::Write;

use anyhow::Result;
use imara_diff::{Algorithm, BasicLineDiffPrinter, Diff, InternedInput, UnifiedDiffConfig};

use crate::index::Index;
use crate::object::Object;
use crate::refs::resolve_head;
use crate::repository::Repository;
use crate::tree::read_tree;

pub fn diff_unstaged(repo: &Repository, index: &Index, out: &mut dyn Write) -> Result<()> {
    let mut any = false;
    for entry in index.entries() {
        let disk_path = repo.root.join(&entry.path);
        let Ok(on_disk) = std::fs::read(&disk_path) else {
            continue;
        };
        let before = match repo.store.read_object(&entry.sha1)? {
            Object::Blob(data) => data,
            _ => continue,
        };
        if before == on_disk {
            continue;
        }
        any |= print_diff(&before, &on_disk, &entry.path, out)?;
    }
    if !any {
        writeln!(out, "no differences")?;
    }
    Ok(())
}

pub fn diff_staged(repo: &Repository, index: &Index, out: &mut dyn Write) -> Result<()> {
    let head_tree = match resolve_head(&repo.root)? {
        Some(commit_hash) => match repo.store.read_object(&commit_hash)? {
            Object::Commit(c) => read_tree(&repo.store, &c.tree)?,
            _ => Default::default(),
        },
        None => Default::default(),
    };

    let mut any = false;
    for entry in index.entries() {
        let Some(head_sha) = head_tree.get(&entry.path) else {
            continue;
        };
        if *head_sha == entry.sha1 {
            continue;
        }
        let before = match repo.store.read_object(head_sha)? {
            Object::Blob(data) => data,
            _ => continue,
        };
        let after = match repo.store.read_object(&entry.sha1)? {
            Object::Blob(data) => data,
            _ => continue,
        };
        any |= print_diff(&before, &after, &entry.path, out)?;
    }
    if !any {
        writeln!(out, "no staged changes")?;
    }
    Ok(())
}

/// Returns whether any hunks were printed.
fn print_diff(before: &[u8], after: &[u8], path: &str, out: &mut dyn Write) -> Result<bool> {
    let before = String::from_utf8_lossy(before);
    let after = String::from_utf8_lossy(after);

    let input = InternedInput::new(before.as_ref(), after.as_ref());
    let mut diff = Diff::compute(Algorithm::Histogram, &input);
    diff.postprocess_lines(&input);

    if diff.hunks().next().is_none() {
        return Ok(false);
    }

    let printer = BasicLineDiffPrinter(&input.interner);
    let unified = diff.unified_diff(&printer, UnifiedDiffConfig::default(), &input);

    writeln!(out, "--- a/{path}")?;
    writeln!(out, "+++ b/{path}")?;
    writeln!(out, "{unified}")?;
    Ok(true)
}
