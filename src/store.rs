//! Content-addressed object storage: one file per object under
//! `<repo>/.jacobgit/objects/<40-hex>`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, trace};

use crate::error::Error;
use crate::hash::{hash_to_hex, Hash};
use crate::object::Object;

#[derive(Debug)]
pub struct ObjectStore {
    objects_dir: PathBuf,
}

impl ObjectStore {
    #[must_use]
    pub fn new(objects_dir: PathBuf) -> Self {
        Self { objects_dir }
    }

    fn path_for(&self, hash: &Hash) -> PathBuf {
        self.objects_dir.join(hash_to_hex(hash))
    }

    /// Writes the framed object if it isn't already on disk. Idempotent:
    /// re-writing identical bytes produces the same file, never a
    /// duplicate.
    pub fn write_object(&self, object: &Object) -> Result<Hash> {
        let (hash, framed) = object.framed();
        let path = self.path_for(&hash);
        if path.exists() {
            trace!(hash = %hash_to_hex(&hash), "object already present");
            return Ok(hash);
        }
        fs::write(&path, &framed)
            .with_context(|| format!("writing object {}", path.display()))?;
        debug!(hash = %hash_to_hex(&hash), kind = object.kind(), "wrote object");
        Ok(hash)
    }

    pub fn read_object(&self, hash: &Hash) -> Result<Object> {
        let path = self.path_for(hash);
        let data = fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::ObjectNotFound(hash_to_hex(hash))
            } else {
                Error::Io(e)
            }
        })?;

        let nul = data
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::ObjectCorrupt(hash_to_hex(hash), "missing NUL after header".into()))?;
        let header = std::str::from_utf8(&data[..nul])
            .map_err(|_| Error::ObjectCorrupt(hash_to_hex(hash), "header is not valid UTF-8".into()))?;
        let (kind, _len) = header
            .split_once(' ')
            .ok_or_else(|| Error::ObjectCorrupt(hash_to_hex(hash), "header missing space".into()))?;

        trace!(hash = %hash_to_hex(hash), kind, "read object");
        let object = Object::decode(kind, &data[nul + 1..])
            .map_err(|e| Error::ObjectCorrupt(hash_to_hex(hash), e.to_string()))?;
        Ok(object)
    }

    #[must_use]
    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Object;

    fn store() -> (tempfile::TempDir, ObjectStore) {
        let dir = tempfile::tempdir().unwrap();
        let objects = dir.path().join("objects");
        fs::create_dir_all(&objects).unwrap();
        (dir, ObjectStore::new(objects))
    }

    #[test]
    fn write_then_read_blob() {
        let (_dir, store) = store();
        let hash = store.write_object(&Object::Blob(b"hello\n".to_vec())).unwrap();
        match store.read_object(&hash).unwrap() {
            Object::Blob(data) => assert_eq!(data, b"hello\n"),
            _ => panic!("expected blob"),
        }
    }

    #[test]
    fn writing_twice_is_idempotent_single_file() {
        let (_dir, store) = store();
        let h1 = store.write_object(&Object::Blob(b"same".to_vec())).unwrap();
        let h2 = store.write_object(&Object::Blob(b"same".to_vec())).unwrap();
        assert_eq!(h1, h2);
        let entries: Vec<_> = fs::read_dir(store.objects_dir()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn missing_object_is_not_found() {
        let (_dir, store) = store();
        let err = store.read_object(&[0u8; 20]).unwrap_err();
        assert!(err.to_string().contains("object not found"));
    }
}
