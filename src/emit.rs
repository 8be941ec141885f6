//! Graph emitters.
//!
//! A [`GraphEmitter`] serialises a finished [`BuildGraph`] somewhere. The file
//! emitter never leaves a truncated build file behind: it writes a temporary
//! file beside the destination and renames it into place only once the whole
//! graph has been flushed to disk.

use crate::ir::BuildGraph;
use crate::ninja_gen;
use camino::{Utf8Path, Utf8PathBuf};
use std::io::{self, Write};
use tempfile::{Builder, NamedTempFile};
use thiserror::Error;
use tracing::info;

/// Errors raised while writing a graph.
#[derive(Debug, Error)]
pub enum EmitError {
    /// The destination directory does not exist or is not writable.
    #[error("failed to create a temporary build file in '{dir}'")]
    CreateTemp {
        /// Directory the temporary file was created in.
        dir: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// Writing, flushing or syncing the content failed.
    #[error("failed to write build file '{path}'")]
    Write {
        /// Destination path.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The finished file could not be moved into place.
    #[error("failed to replace build file '{path}'")]
    Persist {
        /// Destination path.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Destination for a finished build graph.
pub trait GraphEmitter {
    /// Serialise `graph`.
    ///
    /// # Errors
    ///
    /// Returns [`EmitError`] when the graph cannot be written in full.
    fn emit(&mut self, graph: &BuildGraph) -> Result<(), EmitError>;
}

/// Writes the graph as a Ninja file, replacing `path` atomically.
#[derive(Debug, Clone)]
pub struct NinjaFileEmitter {
    path: Utf8PathBuf,
}

impl NinjaFileEmitter {
    /// Emit to `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn staging_dir(&self) -> &Utf8Path {
        self.path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."))
    }

    fn write_temp(&self, content: &str) -> Result<NamedTempFile, EmitError> {
        let dir = self.staging_dir();
        let mut tmp = Builder::new()
            .prefix(".flif-configure.")
            .suffix(".ninja.tmp")
            .tempfile_in(dir)
            .map_err(|source| EmitError::CreateTemp {
                dir: dir.to_path_buf(),
                source,
            })?;
        let write_error = |source: io::Error| EmitError::Write {
            path: self.path.clone(),
            source,
        };
        let handle = tmp.as_file_mut();
        handle.write_all(content.as_bytes()).map_err(write_error)?;
        handle.flush().map_err(write_error)?;
        handle.sync_all().map_err(write_error)?;
        Ok(tmp)
    }
}

impl GraphEmitter for NinjaFileEmitter {
    fn emit(&mut self, graph: &BuildGraph) -> Result<(), EmitError> {
        let content = ninja_gen::generate(graph);
        // Dropping the temporary file on any error removes it.
        let tmp = self.write_temp(&content)?;
        tmp.persist(&self.path)
            .map_err(|err| EmitError::Persist {
                path: self.path.clone(),
                source: err.error,
            })?;
        info!("Wrote Ninja file to {}", self.path);
        Ok(())
    }
}

/// Writes the graph as Ninja text to any [`Write`] sink.
///
/// Used for `--output -` with standard output, and with a `Vec<u8>` to keep
/// the text in memory. A closed pipe is not an error.
#[derive(Debug, Default)]
pub struct WriterEmitter<W> {
    writer: W,
}

impl<W: Write> WriterEmitter<W> {
    /// Emit into `writer`.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn ignore_broken_pipe(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

impl<W: Write> GraphEmitter for WriterEmitter<W> {
    fn emit(&mut self, graph: &BuildGraph) -> Result<(), EmitError> {
        let content = ninja_gen::generate(graph);
        let write_error = |source: io::Error| EmitError::Write {
            path: Utf8PathBuf::from("-"),
            source,
        };
        ignore_broken_pipe(self.writer.write_all(content.as_bytes())).map_err(write_error)?;
        ignore_broken_pipe(self.writer.flush()).map_err(write_error)?;
        Ok(())
    }
}
