//! Generation pipeline driven from the command line.
//!
//! Keeps `main` minimal: [`run`] resolves the configuration, optionally checks
//! the toolchain, then discovers sources, assembles the graph and hands it to
//! an emitter. The Ninja availability hint is printed last and never affects
//! the outcome.

mod error;
mod hints;

pub use error::RunnerError;
pub use hints::{NINJA_MISSING, READY, install_guidance};

use crate::cli::Cli;
use crate::config::Configuration;
use crate::emit::{GraphEmitter, NinjaFileEmitter, WriterEmitter};
use crate::which::{self, NINJA_ENV, SearchPath};
use crate::{assemble, discover};
use camino::Utf8Path;
use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Program queried for compiler and linker flags.
pub const PKG_CONFIG_PROGRAM: &str = "pkg-config";

/// Process environment consulted by a run.
///
/// Captured once so tests can supply their own search path.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// Where programs are looked up.
    pub search: SearchPath,
    /// Explicit Ninja executable, normally from [`NINJA_ENV`].
    pub ninja_override: Option<OsString>,
}

impl Environment {
    /// Read `PATH`, `PATHEXT` and [`NINJA_ENV`] from the current process.
    #[must_use]
    pub fn capture() -> Self {
        Self {
            search: SearchPath::from_env(),
            ninja_override: env::var_os(NINJA_ENV),
        }
    }

    /// Locate Ninja, honouring the override.
    #[must_use]
    pub fn find_ninja(&self) -> Option<PathBuf> {
        which::find_ninja(&self.search, self.ninja_override.as_deref())
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// The output file did not exist before this run.
    pub first_run: bool,
    /// Ninja executable found after writing, if any.
    pub ninja: Option<PathBuf>,
    /// Number of translation units compiled by the graph.
    pub units: usize,
}

/// Return `true` when `output` has not been generated before.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use flif_configure::runner::is_first_run;
/// assert!(is_first_run(Utf8Path::new("does/not/exist.ninja")));
/// ```
#[must_use]
pub fn is_first_run(output: &Utf8Path) -> bool {
    !output.is_file()
}

/// Ensure the compiler and `pkg-config` are reachable through `search`.
///
/// `pkg-config` is only required when the toolchain names packages.
///
/// # Errors
///
/// Returns [`RunnerError::MissingCollaborator`] for the first tool that cannot
/// be found.
pub fn check_toolchain(config: &Configuration, search: &SearchPath) -> Result<(), RunnerError> {
    let toolchain = &config.toolchain;
    let mut required = vec![toolchain.cxx_program()];
    if !toolchain.all_packages().is_empty() {
        required.push(PKG_CONFIG_PROGRAM);
    }
    for tool in required {
        match search.find(tool) {
            Some(path) => debug!(tool, path = %path.display(), "found collaborator"),
            None => {
                return Err(RunnerError::MissingCollaborator {
                    tool: tool.to_owned(),
                    help: install_guidance(tool, toolchain),
                });
            }
        }
    }
    Ok(())
}

/// Discover sources, assemble the graph and pass it to `emitter`.
///
/// Returns the number of translation units in the graph.
///
/// # Errors
///
/// Returns [`RunnerError`] when discovery, assembly or emission fails. The
/// emitter is not called unless the graph is complete.
pub fn generate(
    config: &Configuration,
    emitter: &mut impl GraphEmitter,
) -> Result<usize, RunnerError> {
    let units = discover::discover(&config.layout)?;
    debug!(units = units.len(), "discovered translation units");
    let graph = assemble::assemble(config, &units)?;
    emitter.emit(&graph)?;
    Ok(units.len())
}

/// Execute the generator for `cli`.
///
/// The build file goes to the configured output path, or into `out` when the
/// output is `-`. Otherwise `out` receives the Ninja hint.
///
/// # Errors
///
/// Returns [`RunnerError`] when the toolchain check or generation fails.
pub fn run(cli: &Cli, env: &Environment, out: &mut impl Write) -> Result<Outcome, RunnerError> {
    let config = cli.to_configuration();
    log_configuration(&config);
    if cli.strict {
        check_toolchain(&config, &env.search)?;
    }

    if cli.writes_to_stdout() {
        let units = generate(&config, &mut WriterEmitter::new(&mut *out))?;
        return Ok(Outcome {
            first_run: false,
            ninja: env.find_ninja(),
            units,
        });
    }

    let first_run = is_first_run(&config.output);
    let units = generate(&config, &mut NinjaFileEmitter::new(config.output.clone()))?;
    let ninja = env.find_ninja();
    match &ninja {
        Some(path) => info!(ninja = %path.display(), "found Ninja"),
        None => info!("Ninja not found"),
    }
    if first_run {
        let hint = if ninja.is_some() { READY } else { NINJA_MISSING };
        if let Err(err) = print_hint(out, hint) {
            warn!(error = %err, "failed to print hint");
        }
    }
    Ok(Outcome {
        first_run,
        ninja,
        units,
    })
}

fn print_hint(out: &mut impl Write, hint: &str) -> io::Result<()> {
    writeln!(out, "{hint}")?;
    out.flush()
}

fn log_configuration(config: &Configuration) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    match serde_json::to_string_pretty(config) {
        Ok(json) => debug!("Configuration:\n{json}"),
        Err(err) => debug!(error = %err, "configuration is not serialisable"),
    }
}
