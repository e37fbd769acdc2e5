//! Tree building and reading: converts a flat index into a hierarchy
//! of tree objects, and walks one back into a flat path→blob map.
//!
//! Built as an explicit recursive free function over a grouped
//! mapping, per the source's structure (a nested closure capturing a
//! grouped mapping, lifted here to avoid closure-over-mutable-state).

use std::collections::{BTreeMap, HashMap};

use anyhow::{bail, Result};

use crate::error::Error;
use crate::hash::{hash_to_hex, Hash};
use crate::index::IndexEntry;
use crate::object::{Object, TreeEntry, MODE_DIR};
use crate::store::ObjectStore;

/// Builds a tree object from the index's current entries and returns
/// its SHA. Empty index writes an empty-payload tree object.
pub fn write_tree(store: &ObjectStore, entries: &[IndexEntry]) -> Result<Hash> {
    let refs: Vec<&IndexEntry> = entries.iter().collect();
    build_dir(store, "", &refs)
}

struct Child<'a> {
    is_dir: bool,
    items: Vec<&'a IndexEntry>,
}

fn build_dir(store: &ObjectStore, prefix: &str, entries: &[&IndexEntry]) -> Result<Hash> {
    // Group by the next path component under `prefix`; a group with
    // any multi-component remainder is a subdirectory, otherwise it's
    // a direct file. The index keys on full path, so a file and a
    // directory can never collide at the same name (spec §4.4).
    let mut children: BTreeMap<String, Child> = BTreeMap::new();

    for &entry in entries {
        let rel = strip_prefix(&entry.path, prefix);
        match rel.split_once('/') {
            Some((name, _)) => {
                children
                    .entry(name.to_string())
                    .or_insert_with(|| Child { is_dir: true, items: Vec::new() })
                    .items
                    .push(entry);
            }
            None => {
                children.insert(rel.to_string(), Child { is_dir: false, items: vec![entry] });
            }
        }
    }

    // BTreeMap iterates keys in ascending byte order, satisfying the
    // "sort children by name ascending (byte-wise)" requirement.
    let mut tree_entries = Vec::with_capacity(children.len());
    for (name, child) in children {
        if child.is_dir {
            let child_prefix = join_prefix(prefix, &name);
            let hash = build_dir(store, &child_prefix, &child.items)?;
            tree_entries.push(TreeEntry { mode: MODE_DIR, name, hash });
        } else {
            let entry = child.items[0];
            tree_entries.push(TreeEntry { mode: entry.mode, name, hash: entry.sha1 });
        }
    }

    store.write_object(&Object::Tree(tree_entries))
}

fn strip_prefix<'a>(path: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        path
    } else {
        path.strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(path)
    }
}

fn join_prefix(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

/// Walks a tree object recursively, returning a flat `path → blob sha`
/// map. Key order is not contractual.
pub fn read_tree(store: &ObjectStore, root: &Hash) -> Result<HashMap<String, Hash>> {
    let mut out = HashMap::new();
    read_tree_into(store, root, "", &mut out)?;
    Ok(out)
}

fn read_tree_into(store: &ObjectStore, hash: &Hash, prefix: &str, out: &mut HashMap<String, Hash>) -> Result<()> {
    let object = store.read_object(hash)?;
    let entries = match object {
        Object::Tree(entries) => entries,
        other => {
            return Err(Error::ObjectCorrupt(
                hash_to_hex(hash),
                format!("expected tree, found {}", other.kind()),
            )
            .into())
        }
    };
    for entry in entries {
        let full = join_prefix(prefix, &entry.name);
        if entry.mode == MODE_DIR {
            read_tree_into(store, &entry.hash, &full, out)?;
        } else {
            out.insert(full, entry.hash);
        }
    }
    Ok(())
}

/// Reads a commit object and returns its tree SHA, failing if the
/// object isn't a commit.
pub fn commit_tree_hash(store: &ObjectStore, commit_hash: &Hash) -> Result<Hash> {
    match store.read_object(commit_hash)? {
        Object::Commit(commit) => Ok(commit.tree),
        other => bail!("expected commit, found {}", other.kind()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::MODE_FILE;
    use std::fs;

    fn store() -> (tempfile::TempDir, ObjectStore) {
        let dir = tempfile::tempdir().unwrap();
        let objects = dir.path().join("objects");
        fs::create_dir_all(&objects).unwrap();
        (dir, ObjectStore::new(objects))
    }

    fn entry(store: &ObjectStore, path: &str, data: &[u8]) -> IndexEntry {
        let hash = store.write_object(&Object::Blob(data.to_vec())).unwrap();
        IndexEntry { path: path.to_string(), mode: MODE_FILE, mtime: 0, sha1: hash }
    }

    #[test]
    fn builds_and_reads_nested_tree() {
        let (_dir, store) = store();
        let entries = vec![
            entry(&store, "a.txt", b"a"),
            entry(&store, "dir/b.txt", b"b"),
            entry(&store, "dir/sub/c.txt", b"c"),
        ];
        let tree_hash = write_tree(&store, &entries).unwrap();
        let flat = read_tree(&store, &tree_hash).unwrap();
        assert_eq!(flat.len(), 3);
        assert!(flat.contains_key("a.txt"));
        assert!(flat.contains_key("dir/b.txt"));
        assert!(flat.contains_key("dir/sub/c.txt"));
    }

    #[test]
    fn idempotent_on_unchanged_index() {
        let (_dir, store) = store();
        let entries = vec![entry(&store, "x.txt", b"x")];
        let h1 = write_tree(&store, &entries).unwrap();
        let h2 = write_tree(&store, &entries).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn empty_index_writes_empty_tree() {
        let (_dir, store) = store();
        let hash = write_tree(&store, &[]).unwrap();
        match store.read_object(&hash).unwrap() {
            Object::Tree(entries) => assert!(entries.is_empty()),
            _ => panic!("expected tree"),
        }
    }
}
