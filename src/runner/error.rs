//! Error types for the runner module.
//!
//! Every failure ends the run: a build file is either written in full or not
//! at all.

use crate::discover::DiscoveryError;
use crate::emit::EmitError;
use crate::ir::GraphError;
use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while generating the build file.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// A tool the generated build needs is not installed.
    #[error("required tool '{tool}' was not found on PATH")]
    #[diagnostic(code(flif_configure::runner::missing_collaborator))]
    MissingCollaborator {
        /// Program that was searched for.
        tool: String,
        /// Installation guidance.
        #[help]
        help: String,
    },

    /// A discovery root is missing or unreadable.
    #[error("cannot use source root '{root}'")]
    #[diagnostic(
        code(flif_configure::runner::invalid_root),
        help("check that every --root directory exists and is readable")
    )]
    InvalidRoot {
        /// Root that failed.
        root: Utf8PathBuf,
        /// Discovery failure.
        #[source]
        source: Box<DiscoveryError>,
    },

    /// Sources could not be mapped to objects.
    #[error("source discovery failed")]
    #[diagnostic(code(flif_configure::runner::discovery))]
    Discovery(#[source] Box<DiscoveryError>),

    /// The generated graph broke one of its invariants.
    #[error("generated build graph is inconsistent")]
    #[diagnostic(code(flif_configure::runner::graph))]
    Graph(#[from] GraphError),

    /// The build file could not be written.
    #[error("failed to write the build file")]
    #[diagnostic(
        code(flif_configure::runner::write_failure),
        help("check that the output directory exists and is writable")
    )]
    WriteFailure(#[from] EmitError),
}

impl From<DiscoveryError> for RunnerError {
    fn from(err: DiscoveryError) -> Self {
        match err.root().map(ToOwned::to_owned) {
            Some(root) => Self::InvalidRoot {
                root,
                source: Box::new(err),
            },
            None => Self::Discovery(Box::new(err)),
        }
    }
}
