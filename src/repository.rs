//! Repository bootstrap: creates the on-disk skeleton and verifies it
//! on every mutating operation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::error::Error;
use crate::refs::{self, DEFAULT_BRANCH};
use crate::store::ObjectStore;

/// Gates the open question in spec §9 ("Checkout safety gap") behind
/// an environment toggle rather than a new on-disk config format.
#[derive(Debug)]
pub struct RepoConfig {
    pub strict_checkout: bool,
}

impl RepoConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let strict_checkout = std::env::var("JACOBGIT_STRICT_CHECKOUT")
            .map(|v| v == "1")
            .unwrap_or(false);
        Self { strict_checkout }
    }
}

#[derive(Debug)]
pub struct Repository {
    pub root: PathBuf,
    pub store: ObjectStore,
    pub config: RepoConfig,
}

impl Repository {
    fn jacobgit_dir(root: &Path) -> PathBuf {
        root.join(".jacobgit")
    }

    /// Creates `.jacobgit/` skeleton. No-op with a message if it
    /// already exists, per spec §6.
    pub fn init(root: &Path) -> Result<Self> {
        let dot = Self::jacobgit_dir(root);
        if dot.is_dir() {
            println!("Reinitialized existing jacobgit repository in {}", dot.display());
            return Self::open(root);
        }

        fs::create_dir_all(dot.join("objects"))?;
        fs::create_dir_all(dot.join("refs").join("heads"))?;
        fs::create_dir_all(dot.join("refs").join("tags"))?;
        refs::write_head_symbolic(root, &refs::branch_ref(DEFAULT_BRANCH))?;
        refs::create_empty_ref_file(root, &refs::branch_ref(DEFAULT_BRANCH))?;

        info!(root = %root.display(), "initialized jacobgit repository");
        println!("Initialized empty jacobgit repository in {}", dot.display());

        Self::open(root)
    }

    /// Opens an existing repository, failing with `NotARepository` if
    /// `.jacobgit/` is absent.
    pub fn open(root: &Path) -> Result<Self> {
        let dot = Self::jacobgit_dir(root);
        if !dot.is_dir() {
            return Err(Error::NotARepository.into());
        }
        Ok(Self {
            root: root.to_path_buf(),
            store: ObjectStore::new(dot.join("objects")),
            config: RepoConfig::from_env(),
        })
    }
}
