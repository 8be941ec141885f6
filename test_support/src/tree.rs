//! Temporary source trees.

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

/// Sources found in a minimal FLIF checkout.
pub const FLIF_SOURCES: &[&str] = &[
    "extern/lodepng.cpp",
    "src/flif.cpp",
    "src/flif-interface.cpp",
    "src/image/image.cpp",
    "src/maniac/chance.cpp",
    "src/transform/factory.cpp",
];

/// A source tree rooted in a temporary directory, removed on drop.
#[derive(Debug)]
pub struct SourceTree {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl SourceTree {
    /// Create an empty tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or its path is not
    /// UTF-8.
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("create source tree dir")?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|path| anyhow!("temp dir {} is not UTF-8", path.display()))?;
        Ok(Self { _dir: dir, root })
    }

    /// Create a tree holding [`FLIF_SOURCES`] and a header.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be written.
    pub fn flif() -> Result<Self> {
        let tree = Self::new()?;
        for source in FLIF_SOURCES {
            tree.write(source, "int unit;\n")?;
        }
        tree.write("src/common.hpp", "#pragma once\n")?;
        Ok(tree)
    }

    /// Write `contents` to `relative`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write(&self, relative: &str, contents: &str) -> Result<Utf8PathBuf> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {path}"))?;
        Ok(path)
    }

    /// Absolute root of the tree.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Absolute path of `relative` inside the tree.
    #[must_use]
    pub fn path(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(relative)
    }
}
