//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure. Most flags can also be set
//! through `FLIF_CONFIGURE_*` environment variables; command-line values win.
//! [`Cli::to_configuration`] resolves the parsed flags into the immutable
//! [`Configuration`] the generator consumes.

use crate::config::{
    Configuration, DEFAULT_CXX, DEFAULT_EXCLUDE, DEFAULT_OUTPUT, Define, SourceLayout,
    TargetPlatform, Toolchain,
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;

/// Output path meaning "write the build file to standard output".
pub const STDOUT_PATH: &str = "-";

/// Generate the Ninja build file for FLIF.
#[derive(Debug, Clone, Parser)]
#[command(name = "flif-configure", author, version, about, long_about = None)]
pub struct Cli {
    /// Compile with debug information and assertions.
    #[arg(short, long, env = "FLIF_CONFIGURE_DEBUG")]
    pub debug: bool,

    /// Enable optimisations for the build machine's CPU.
    #[arg(long, env = "FLIF_CONFIGURE_NATIVE")]
    pub native: bool,

    /// Define a preprocessor symbol, e.g. `-D EXAMPLE` or `-D EXAMPLE=1`.
    ///
    /// May be repeated; definitions are passed on in the order given.
    #[arg(short = 'D', long = "define", value_name = "KEY[=VALUE]")]
    pub defines: Vec<Define>,

    /// Output Ninja file; `-` writes to standard output.
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = DEFAULT_OUTPUT,
        env = "FLIF_CONFIGURE_OUTPUT"
    )]
    pub output: Utf8PathBuf,

    /// Precompile this header and rebuild every object when it changes.
    #[arg(long = "pch", value_name = "HEADER", env = "FLIF_CONFIGURE_PCH")]
    pub precompiled_header: Option<Utf8PathBuf>,

    /// Compiler driver used to compile and link.
    #[arg(
        long,
        value_name = "PROGRAM",
        default_value = DEFAULT_CXX,
        env = "CXX",
        value_parser = parse_compiler
    )]
    pub cxx: String,

    /// Directory to search for sources; may be repeated.
    ///
    /// Defaults to `extern` and `src`.
    #[arg(long = "root", value_name = "DIR")]
    pub roots: Vec<Utf8PathBuf>,

    /// Skip source files whose name contains this text.
    #[arg(
        long,
        value_name = "TEXT",
        default_value = DEFAULT_EXCLUDE,
        env = "FLIF_CONFIGURE_EXCLUDE"
    )]
    pub exclude: String,

    /// Platform to name the executable for; defaults to the host.
    #[arg(long, value_enum, value_name = "PLATFORM", env = "FLIF_CONFIGURE_TARGET")]
    pub target: Option<TargetPlatform>,

    /// Fail when the compiler or pkg-config cannot be found.
    #[arg(long, env = "FLIF_CONFIGURE_STRICT")]
    pub strict: bool,

    /// Enable verbose diagnostic logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve the parsed flags into a [`Configuration`].
    ///
    /// # Examples
    ///
    /// ```
    /// use clap::Parser;
    /// use flif_configure::cli::Cli;
    ///
    /// let cli = Cli::parse_from(["flif-configure", "-d", "-D", "A=1"]);
    /// let config = cli.to_configuration();
    /// assert!(config.debug);
    /// assert_eq!(config.defines[0].to_flag(), "-DA=1");
    /// ```
    #[must_use]
    pub fn to_configuration(&self) -> Configuration {
        let mut layout = SourceLayout {
            exclude: self.exclude.clone(),
            ..SourceLayout::default()
        };
        if !self.roots.is_empty() {
            layout.roots.clone_from(&self.roots);
        }
        Configuration {
            debug: self.debug,
            native: self.native,
            defines: self.defines.clone(),
            precompiled_header: self.precompiled_header.clone(),
            output: self.output.clone(),
            toolchain: Toolchain {
                cxx: self.cxx.clone(),
                ..Toolchain::default()
            },
            layout,
            target: self.target.unwrap_or_else(TargetPlatform::host),
        }
    }

    /// Whether the build file goes to standard output.
    #[must_use]
    pub fn writes_to_stdout(&self) -> bool {
        is_stdout_path(&self.output)
    }
}

/// Validate the compiler command given via `--cxx` or `CXX`.
///
/// The command is used verbatim at the start of both rule commands, so it must
/// name a program and stay on one line. Surrounding whitespace is trimmed.
fn parse_compiler(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("compiler must not be empty".to_owned());
    }
    if trimmed.contains(['\n', '\r']) {
        return Err(format!(
            "compiler '{}' must not contain line breaks",
            trimmed.escape_debug()
        ));
    }
    Ok(trimmed.to_owned())
}

/// Return `true` when `path` is the CLI sentinel indicating "write to stdout".
#[must_use]
pub fn is_stdout_path(path: &Utf8Path) -> bool {
    path.as_str() == STDOUT_PATH
}
