//! Binary staging index: `<repo>/.jacobgit/index`. Magic `JIDX`,
//! version 0, little-endian, variable-length path records.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

use crate::error::Error;
use crate::hash::Hash;

const MAGIC: &[u8; 4] = b"JIDX";
const VERSION: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub path: String,
    pub mode: u32,
    pub mtime: u32,
    pub sha1: Hash,
}

/// Flat staging list plus a fast path→row lookup. The lookup map is a
/// pure in-memory optimization; it has no on-disk representation.
#[derive(Default)]
pub struct Index {
    entries: Vec<IndexEntry>,
    by_path: HashMap<u64, Vec<usize>>,
}

impl Index {
    fn path_key(path: &str) -> u64 {
        xxh3_64(path.as_bytes())
    }

    fn rebuild_lookup(&mut self) {
        self.by_path.clear();
        for (i, entry) in self.entries.iter().enumerate() {
            self.by_path.entry(Self::path_key(&entry.path)).or_default().push(i);
        }
    }

    /// Missing index file yields an empty index; it is not an error.
    pub fn load(repo_root: &Path) -> Result<Self> {
        let path = index_path(repo_root);
        let data = match fs::read(&path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e).into()),
        };
        let entries = decode(&data)?;
        debug!(count = entries.len(), "loaded index");
        let mut index = Self { entries, by_path: HashMap::new() };
        index.rebuild_lookup();
        Ok(index)
    }

    /// Unconditionally truncates and rewrites the index file.
    pub fn save(&self, repo_root: &Path) -> Result<()> {
        let path = index_path(repo_root);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, encode(&self.entries)).context("writing index")?;
        debug!(count = self.entries.len(), "saved index");
        Ok(())
    }

    #[must_use]
    pub fn find(&self, path: &str) -> Option<&IndexEntry> {
        let bucket = self.by_path.get(&Self::path_key(path))?;
        bucket
            .iter()
            .map(|&i| &self.entries[i])
            .find(|e| e.path == path)
    }

    /// Replaces any existing entry for this path, otherwise appends.
    pub fn upsert(&mut self, entry: IndexEntry) {
        if let Some(bucket) = self.by_path.get(&Self::path_key(&entry.path)) {
            if let Some(&i) = bucket.iter().find(|&&i| self.entries[i].path == entry.path) {
                self.entries[i] = entry;
                return;
            }
        }
        let idx = self.entries.len();
        self.by_path.entry(Self::path_key(&entry.path)).or_default().push(idx);
        self.entries.push(entry);
    }

    #[must_use]
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn index_path(repo_root: &Path) -> std::path::PathBuf {
    repo_root.join(".jacobgit").join("index")
}

fn encode(entries: &[IndexEntry]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    for entry in entries {
        let path_bytes = entry.path.as_bytes();
        out.extend_from_slice(&(path_bytes.len() as u16).to_le_bytes());
        out.extend_from_slice(&entry.mode.to_le_bytes());
        out.extend_from_slice(&entry.mtime.to_le_bytes());
        out.extend_from_slice(&entry.sha1);
        out.extend_from_slice(path_bytes);
    }
    out
}

fn decode(data: &[u8]) -> Result<Vec<IndexEntry>> {
    if data.len() < 12 {
        return Err(Error::IndexCorrupt("header shorter than 12 bytes".into()).into());
    }
    if &data[0..4] != MAGIC {
        return Err(Error::IndexCorrupt("bad magic".into()).into());
    }
    let version = u32::from_le_bytes(data[4..8].try_into().unwrap());
    if version > VERSION {
        return Err(Error::IndexCorrupt(format!("unsupported version {version}")).into());
    }
    let count = u32::from_le_bytes(data[8..12].try_into().unwrap()) as usize;

    let mut entries = Vec::with_capacity(count);
    let mut pos = 12usize;
    for _ in 0..count {
        if pos + 2 + 4 + 4 + 20 > data.len() {
            return Err(Error::IndexCorrupt("truncated entry header".into()).into());
        }
        let path_len = u16::from_le_bytes(data[pos..pos + 2].try_into().unwrap()) as usize;
        pos += 2;
        let mode = u32::from_le_bytes(data[pos..pos + 4].try_into().unwrap());
        pos += 4;
        let mtime = u32::from_le_bytes(data[pos..pos + 4].try_into().unwrap());
        pos += 4;
        if pos + 20 > data.len() {
            return Err(Error::IndexCorrupt("truncated SHA-1".into()).into());
        }
        let mut sha1 = [0u8; 20];
        sha1.copy_from_slice(&data[pos..pos + 20]);
        pos += 20;
        if pos + path_len > data.len() {
            return Err(Error::IndexCorrupt("truncated path".into()).into());
        }
        let path = std::str::from_utf8(&data[pos..pos + path_len])
            .map_err(|_| Error::IndexCorrupt("path is not valid UTF-8".into()))?
            .to_string();
        pos += path_len;
        entries.push(IndexEntry { path, mode, mtime, sha1 });
    }
    Ok(entries)
}
