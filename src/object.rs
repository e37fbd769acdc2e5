//! Object kinds and their framing: a typed, length-prefixed payload
//! hashed and stored as a single byte sequence.

use anyhow::{anyhow, bail, Context, Result};

use crate::hash::{hash_bytes, hash_to_hex, hex_to_hash, Hash};

pub const MODE_FILE: u32 = 0o100644;
pub const MODE_EXEC: u32 = 0o100755;
pub const MODE_DIR: u32 = 0o040000;

#[derive(Debug, Clone)]
pub struct TreeEntry {
    pub mode: u32,
    pub name: String,
    pub hash: Hash,
}

#[derive(Debug, Clone)]
pub struct Commit {
    pub tree: Hash,
    pub parent: Option<Hash>,
    pub author: String,
    pub committer: String,
    pub timestamp: i64,
    pub message: String,
}

#[derive(Debug, Clone)]
pub enum Object {
    Blob(Vec<u8>),
    Tree(Vec<TreeEntry>),
    Commit(Commit),
}

impl Object {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Object::Blob(_) => "blob",
            Object::Tree(_) => "tree",
            Object::Commit(_) => "commit",
        }
    }

    /// Encodes the payload only (not the `"<type> <len>\0"` header).
    pub fn encode_payload(&self) -> Vec<u8> {
        match self {
            Object::Blob(data) => data.clone(),
            Object::Tree(entries) => encode_tree(entries),
            Object::Commit(commit) => encode_commit(commit).into_bytes(),
        }
    }

    /// Frames the payload with its header and hashes the whole sequence.
    /// This is the same framing `write_object` persists.
    #[must_use]
    pub fn framed(&self) -> (Hash, Vec<u8>) {
        let payload = self.encode_payload();
        let mut framed = format!("{} {}\0", self.kind(), payload.len()).into_bytes();
        framed.extend_from_slice(&payload);
        let hash = hash_bytes(&framed);
        (hash, framed)
    }

    pub fn decode(kind: &str, payload: &[u8]) -> Result<Object> {
        match kind {
            "blob" => Ok(Object::Blob(payload.to_vec())),
            "tree" => Ok(Object::Tree(decode_tree(payload)?)),
            "commit" => Ok(Object::Commit(decode_commit(payload)?)),
            other => bail!("unknown object kind '{other}'"),
        }
    }
}

fn encode_tree(entries: &[TreeEntry]) -> Vec<u8> {
    let mut out = Vec::new();
    for entry in entries {
        out.extend_from_slice(format!("{:o} {}\0", entry.mode, entry.name).as_bytes());
        out.extend_from_slice(&entry.hash);
    }
    out
}

fn decode_tree(payload: &[u8]) -> Result<Vec<TreeEntry>> {
    let mut entries = Vec::new();
    let mut pos = 0usize;
    while pos < payload.len() {
        let nul = payload[pos..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| anyhow!("tree entry missing NUL terminator"))?
            + pos;
        let header = std::str::from_utf8(&payload[pos..nul]).context("tree entry header is not valid UTF-8")?;
        let (mode_str, name) = header
            .split_once(' ')
            .ok_or_else(|| anyhow!("tree entry header '{header}' missing space"))?;
        let mode = u32::from_str_radix(mode_str, 8)
            .with_context(|| format!("tree entry mode '{mode_str}' is not valid octal"))?;
        let hash_start = nul + 1;
        let hash_end = hash_start + 20;
        if hash_end > payload.len() {
            bail!("tree entry truncated before 20-byte hash");
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&payload[hash_start..hash_end]);
        entries.push(TreeEntry {
            mode,
            name: name.to_string(),
            hash,
        });
        pos = hash_end;
    }
    Ok(entries)
}

fn encode_commit(commit: &Commit) -> String {
    let mut lines = vec![format!("tree {}", hash_to_hex(&commit.tree))];
    if let Some(parent) = commit.parent {
        lines.push(format!("parent {}", hash_to_hex(&parent)));
    }
    lines.push(format!(
        "author {} {} +0000",
        commit.author, commit.timestamp
    ));
    lines.push(format!(
        "committer {} {} +0000",
        commit.committer, commit.timestamp
    ));
    lines.push(String::new());
    lines.push(commit.message.clone());
    lines.join("\n")
}

fn decode_commit(payload: &[u8]) -> Result<Commit> {
    let text = std::str::from_utf8(payload).context("commit payload is not valid UTF-8")?;
    let (header, message) = text
        .split_once("\n\n")
        .ok_or_else(|| anyhow!("commit payload missing header/message separator"))?;

    let mut tree = None;
    let mut parent = None;
    let mut author = None;
    let mut committer = None;
    let mut timestamp = 0i64;

    for line in header.lines() {
        if let Some(rest) = line.strip_prefix("tree ") {
            tree = Some(hex_to_hash(rest)?);
        } else if let Some(rest) = line.strip_prefix("parent ") {
            parent = Some(hex_to_hash(rest)?);
        } else if let Some(rest) = line.strip_prefix("author ") {
            let (identity, ts) = split_identity_and_timestamp(rest)?;
            author = Some(identity);
            timestamp = ts;
        } else if let Some(rest) = line.strip_prefix("committer ") {
            let (identity, _ts) = split_identity_and_timestamp(rest)?;
            committer = Some(identity);
        }
    }

    Ok(Commit {
        tree: tree.ok_or_else(|| anyhow!("commit payload missing 'tree' line"))?,
        parent,
        author: author.ok_or_else(|| anyhow!("commit payload missing 'author' line"))?,
        committer: committer.unwrap_or_default(),
        timestamp,
        message: message.to_string(),
    })
}

/// Splits `"<identity> <unix-ts> +0000"` into `(identity, ts)`. The
/// identity itself may contain spaces, so the timestamp and offset are
/// peeled off the tail.
fn split_identity_and_timestamp(rest: &str) -> Result<(String, i64)> {
    let mut parts: Vec<&str> = rest.rsplitn(3, ' ').collect();
    if parts.len() != 3 {
        bail!("malformed author/committer line '{rest}'");
    }
    parts.reverse();
    let identity = parts[0].to_string();
    let ts: i64 = parts[1]
        .parse()
        .with_context(|| format!("invalid timestamp '{}' in '{rest}'", parts[1]))?;
    Ok((identity, ts))
}
