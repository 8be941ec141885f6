//! Resolved generator configuration.
//!
//! A [`Configuration`] is built once from the parsed command line and is never
//! mutated afterwards. Discovery reads [`SourceLayout`], assembly reads the
//! rest.

use camino::{Utf8Path, Utf8PathBuf};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Conventional name of the generated build description.
pub const DEFAULT_OUTPUT: &str = "build.ninja";
/// Compiler used when neither `--cxx` nor `CXX` is set.
pub const DEFAULT_CXX: &str = "g++";
/// Directories searched for sources when no `--root` is given.
pub const DEFAULT_ROOTS: &[&str] = &["extern", "src"];
/// Filename glob selecting translation units.
pub const DEFAULT_PATTERN: &str = "*.cpp";
/// Filename substring keeping the library interface out of the executable.
pub const DEFAULT_EXCLUDE: &str = "flif-interface";
/// Directory receiving every object file.
pub const DEFAULT_OBJECT_ROOT: &str = "obj";
/// Extension given to object files.
pub const DEFAULT_OBJECT_EXTENSION: &str = "o";
/// Link output, before any platform suffix.
pub const DEFAULT_EXECUTABLE: &str = "src/flif";

/// A single `-D` definition.
///
/// `KEY` alone renders as a bare define; `KEY=VALUE` keeps the value,
/// including an empty one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Define {
    /// Symbol name.
    pub key: String,
    /// Optional value following the first `=`.
    pub value: Option<String>,
}

impl Define {
    /// Build a define with an optional value.
    #[must_use]
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Render the compiler flag for this define.
    ///
    /// # Examples
    ///
    /// ```
    /// use flif_configure::config::Define;
    /// assert_eq!(Define::new("A", Some("1".into())).to_flag(), "-DA=1");
    /// assert_eq!(Define::new("B", None).to_flag(), "-DB");
    /// ```
    #[must_use]
    pub fn to_flag(&self) -> String {
        format!("-D{self}")
    }
}

impl Display for Define {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={value}", self.key),
            None => f.write_str(&self.key),
        }
    }
}

/// Errors raised while parsing a `KEY[=VALUE]` definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefineParseError {
    /// Nothing precedes the `=`, or the argument is empty.
    #[error("define '{0}' has an empty name")]
    EmptyKey(String),
    /// The name contains whitespace, which would split the compiler flag.
    #[error("define name '{0}' must not contain whitespace")]
    Whitespace(String),
    /// A line break would end the Ninja variable holding the flag.
    #[error("define '{0}' must not contain line breaks")]
    LineBreak(String),
}

impl FromStr for Define {
    type Err = DefineParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains(['\n', '\r']) {
            return Err(DefineParseError::LineBreak(s.escape_debug().to_string()));
        }
        let (key, value) = match s.split_once('=') {
            Some((key, value)) => (key, Some(value.to_owned())),
            None => (s, None),
        };
        if key.is_empty() {
            return Err(DefineParseError::EmptyKey(s.to_owned()));
        }
        if key.chars().any(char::is_whitespace) {
            return Err(DefineParseError::Whitespace(key.to_owned()));
        }
        Ok(Self::new(key, value))
    }
}

/// Platform family the link output is named for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TargetPlatform {
    /// Executables carry the `.exe` suffix.
    Windows,
    /// Executables carry no suffix.
    Unix,
}

impl TargetPlatform {
    /// Platform of the running host.
    #[must_use]
    pub const fn host() -> Self {
        if cfg!(windows) { Self::Windows } else { Self::Unix }
    }

    /// Suffix appended to executable paths.
    #[must_use]
    pub const fn exe_suffix(self) -> &'static str {
        match self {
            Self::Windows => ".exe",
            Self::Unix => "",
        }
    }

    /// Append the platform suffix to `path`.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use flif_configure::config::TargetPlatform;
    /// let exe = TargetPlatform::Windows.executable(Utf8Path::new("src/flif"));
    /// assert_eq!(exe.as_str(), "src/flif.exe");
    /// ```
    #[must_use]
    pub fn executable(self, path: &Utf8Path) -> Utf8PathBuf {
        let mut name = path.as_str().to_owned();
        name.push_str(self.exe_suffix());
        Utf8PathBuf::from(name)
    }
}

/// Compiler and library lookup settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toolchain {
    /// Compiler driver used for both compiling and linking.
    pub cxx: String,
    /// `pkg-config` packages whose cflags feed every compile.
    pub cflags_packages: Vec<String>,
    /// `pkg-config` packages whose libs feed the link.
    pub libs_packages: Vec<String>,
}

impl Toolchain {
    /// Program `cxx` runs, ignoring any arguments such as a `ccache` wrapper's.
    ///
    /// # Examples
    ///
    /// ```
    /// use flif_configure::config::Toolchain;
    /// let toolchain = Toolchain { cxx: "ccache g++".into(), ..Toolchain::default() };
    /// assert_eq!(toolchain.cxx_program(), "ccache");
    /// ```
    #[must_use]
    pub fn cxx_program(&self) -> &str {
        self.cxx.split_whitespace().next().unwrap_or_default()
    }

    /// Every `pkg-config` package, without repeats.
    #[must_use]
    pub fn all_packages(&self) -> Vec<&str> {
        let mut packages: Vec<&str> = Vec::new();
        for package in self.cflags_packages.iter().chain(&self.libs_packages) {
            if !packages.contains(&package.as_str()) {
                packages.push(package);
            }
        }
        packages
    }
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            cxx: DEFAULT_CXX.to_owned(),
            cflags_packages: vec!["zlib".to_owned(), "libpng".to_owned()],
            libs_packages: vec!["libpng".to_owned()],
        }
    }
}

/// Where sources live and where their products go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLayout {
    /// Directories walked for sources, in order.
    pub roots: Vec<Utf8PathBuf>,
    /// Glob matched against file names.
    pub pattern: String,
    /// Files whose name contains this substring are skipped.
    pub exclude: String,
    /// Directory under which object files mirror the source tree.
    pub object_root: Utf8PathBuf,
    /// Extension of object files, without the dot.
    pub object_extension: String,
    /// Link output, without the platform suffix.
    pub executable: Utf8PathBuf,
}

impl Default for SourceLayout {
    fn default() -> Self {
        Self {
            roots: DEFAULT_ROOTS.iter().copied().map(Utf8PathBuf::from).collect(),
            pattern: DEFAULT_PATTERN.to_owned(),
            exclude: DEFAULT_EXCLUDE.to_owned(),
            object_root: Utf8PathBuf::from(DEFAULT_OBJECT_ROOT),
            object_extension: DEFAULT_OBJECT_EXTENSION.to_owned(),
            executable: Utf8PathBuf::from(DEFAULT_EXECUTABLE),
        }
    }
}

/// Immutable input to one generation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Configuration {
    /// Emit debug symbols and keep assertions.
    pub debug: bool,
    /// Tune for the build machine's CPU.
    pub native: bool,
    /// User definitions, in command-line order.
    pub defines: Vec<Define>,
    /// Header to precompile; `None` disables precompiled headers.
    pub precompiled_header: Option<Utf8PathBuf>,
    /// Destination of the generated Ninja file.
    pub output: Utf8PathBuf,
    /// Compiler settings.
    pub toolchain: Toolchain,
    /// Source discovery settings.
    pub layout: SourceLayout,
    /// Platform the executable is named for.
    pub target: TargetPlatform,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            debug: false,
            native: false,
            defines: Vec::new(),
            precompiled_header: None,
            output: Utf8PathBuf::from(DEFAULT_OUTPUT),
            toolchain: Toolchain::default(),
            layout: SourceLayout::default(),
            target: TargetPlatform::host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("A", Define::new("A", None))]
    #[case("A=1", Define::new("A", Some("1".into())))]
    #[case("A=", Define::new("A", Some(String::new())))]
    #[case("A=b=c", Define::new("A", Some("b=c".into())))]
    fn parses_defines(#[case] raw: &str, #[case] expected: Define) {
        assert_eq!(raw.parse::<Define>(), Ok(expected));
    }

    #[rstest]
    #[case("")]
    #[case("=1")]
    fn rejects_nameless_defines(#[case] raw: &str) {
        assert_eq!(
            raw.parse::<Define>(),
            Err(DefineParseError::EmptyKey(raw.to_owned()))
        );
    }

    #[rstest]
    #[case("EVIL=1\nbuild pwned: cxx x")]
    #[case("A\r=1")]
    #[case("A=x\r\n")]
    fn rejects_line_breaks(#[case] raw: &str) {
        assert!(matches!(
            raw.parse::<Define>(),
            Err(DefineParseError::LineBreak(_))
        ));
    }

    #[rstest]
    fn rejects_whitespace_in_name() {
        assert!(matches!(
            "A B=1".parse::<Define>(),
            Err(DefineParseError::Whitespace(_))
        ));
    }

    #[rstest]
    #[case(TargetPlatform::Windows, "src/flif.exe")]
    #[case(TargetPlatform::Unix, "src/flif")]
    fn executable_suffix_follows_platform(
        #[case] platform: TargetPlatform,
        #[case] expected: &str,
    ) {
        assert_eq!(platform.executable(Utf8Path::new("src/flif")), expected);
    }
}
