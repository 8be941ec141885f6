//! Executable lookup.
//!
//! Answers "is this program reachable?" for the Ninja availability hint and
//! for the optional strict toolchain check. Lookup is pure environment
//! inspection: it reads `PATH` (and `PATHEXT` on Windows) and checks file
//! metadata, nothing more.

use std::env;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

pub use ninja_env::NINJA_ENV;

/// Name of the Ninja executable searched for on `PATH`.
pub const NINJA_PROGRAM: &str = "ninja";

/// Extensions tried when `PATHEXT` is unset on Windows.
const DEFAULT_PATHEXT: &[&str] = &[".com", ".exe", ".bat", ".cmd"];

/// Directories and filename suffixes to search for programs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
    extensions: Vec<String>,
}

impl SearchPath {
    /// Search `dirs` for programs carrying one of `extensions`.
    ///
    /// An empty extension list means programs are found under their bare
    /// name.
    #[must_use]
    pub const fn new(dirs: Vec<PathBuf>, extensions: Vec<String>) -> Self {
        Self { dirs, extensions }
    }

    /// Capture the search path of the current process.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(
            env::var_os("PATH").as_deref(),
            env::var_os("PATHEXT").as_deref(),
            cfg!(windows),
        )
    }

    /// Build a search path from raw `PATH` and `PATHEXT` values.
    ///
    /// With `windows` set the current directory is searched first and
    /// candidates take the `PATHEXT` suffixes, as the Windows shell does.
    /// Empty `PATH` entries are skipped.
    #[must_use]
    pub fn from_vars(path: Option<&OsStr>, pathext: Option<&OsStr>, windows: bool) -> Self {
        let mut dirs: Vec<PathBuf> = Vec::new();
        if windows {
            dirs.push(PathBuf::from("."));
        }
        if let Some(raw) = path {
            dirs.extend(env::split_paths(raw).filter(|dir| !dir.as_os_str().is_empty()));
        }
        let extensions = if windows {
            parse_pathext(pathext)
        } else {
            Vec::new()
        };
        Self { dirs, extensions }
    }

    /// Directories searched, in order.
    #[must_use]
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Return the first executable named `program`.
    ///
    /// A program containing a path separator is checked directly instead of
    /// being searched for.
    #[must_use]
    pub fn find(&self, program: &str) -> Option<PathBuf> {
        if program.contains(['/', std::path::MAIN_SEPARATOR]) {
            return self
                .candidates(Path::new(""), program)
                .into_iter()
                .find(|candidate| is_executable(candidate));
        }
        self.dirs
            .iter()
            .flat_map(|dir| self.candidates(dir, program))
            .find(|candidate| is_executable(candidate))
    }

    fn candidates(&self, dir: &Path, program: &str) -> Vec<PathBuf> {
        let base = dir.join(program);
        if self.extensions.is_empty() || Path::new(program).extension().is_some() {
            return vec![base];
        }
        self.extensions
            .iter()
            .map(|ext| {
                let mut candidate = OsString::from(base.as_os_str());
                candidate.push(ext);
                PathBuf::from(candidate)
            })
            .collect()
    }
}

fn parse_pathext(raw: Option<&OsStr>) -> Vec<String> {
    let parsed: Vec<String> = raw
        .map(|value| value.to_string_lossy().into_owned())
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let lower = segment.to_ascii_lowercase();
            if lower.starts_with('.') {
                lower
            } else {
                format!(".{lower}")
            }
        })
        .collect();
    if parsed.is_empty() {
        DEFAULT_PATHEXT.iter().map(|ext| (*ext).to_owned()).collect()
    } else {
        parsed
    }
}

/// Return `true` when `path` is a regular file the current user may run.
#[must_use]
pub fn is_executable(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|metadata| metadata.is_file() && has_execute_permission(&metadata))
}

#[cfg(unix)]
fn has_execute_permission(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_execute_permission(metadata: &fs::Metadata) -> bool {
    metadata.is_file()
}

/// Locate Ninja.
///
/// An executable named by `override_path` (normally the value of
/// [`NINJA_ENV`]) wins; otherwise `search` is consulted.
#[must_use]
pub fn find_ninja(search: &SearchPath, override_path: Option<&OsStr>) -> Option<PathBuf> {
    if let Some(explicit) = override_path.filter(|value| !value.is_empty()) {
        let path = PathBuf::from(explicit);
        return is_executable(&path).then_some(path);
    }
    search.find(NINJA_PROGRAM)
}
