//! Source discovery.
//!
//! Walks the configured roots and yields every translation unit that should be
//! compiled into the executable, paired with the object file it produces. The
//! walk order is fixed so an unchanged tree always yields the same sequence:
//! roots in the order given, and within each directory its files before its
//! subdirectories, each sorted by name.

use crate::config::SourceLayout;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use glob::Pattern;
use indexmap::IndexMap;
use indexmap::map::Entry;
use std::cmp::Ordering;
use std::io;
use thiserror::Error;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Replacement for `..` components inside the object tree.
const PARENT_DIR_COMPONENT: &str = "__";

/// A compilable source and the object file it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Source path, starting with the discovery root.
    pub source: Utf8PathBuf,
    /// Object path under the object root.
    pub object: Utf8PathBuf,
}

/// Errors raised while discovering sources.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A root is missing, not a directory, or could not be read.
    #[error("source root '{root}' is not a readable directory")]
    InvalidRoot {
        /// Root as configured.
        root: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// An entry below a root could not be read.
    #[error("failed to read '{path}' under source root '{root}'")]
    UnreadableEntry {
        /// Root being walked.
        root: Utf8PathBuf,
        /// Entry that failed, when known.
        path: String,
        /// Underlying walk failure.
        #[source]
        source: walkdir::Error,
    },
    /// A discovered path is not valid UTF-8.
    #[error("source path '{0}' is not valid UTF-8")]
    NonUtf8Path(String),
    /// The filename pattern is not a valid glob.
    #[error("invalid source pattern '{pattern}'")]
    InvalidPattern {
        /// Pattern as configured.
        pattern: String,
        /// Parser failure.
        #[source]
        source: glob::PatternError,
    },
    /// Two sources would write the same object file.
    #[error("sources '{first}' and '{second}' both compile to '{object}'")]
    ObjectCollision {
        /// Source discovered first.
        first: Utf8PathBuf,
        /// Source discovered later.
        second: Utf8PathBuf,
        /// Shared object path.
        object: Utf8PathBuf,
    },
}

impl DiscoveryError {
    /// Root the failure was found under, if any.
    #[must_use]
    pub fn root(&self) -> Option<&Utf8Path> {
        match self {
            Self::InvalidRoot { root, .. } | Self::UnreadableEntry { root, .. } => Some(root),
            Self::NonUtf8Path(_) | Self::InvalidPattern { .. } | Self::ObjectCollision { .. } => {
                None
            }
        }
    }
}

/// Return `true` when `file_name` should be left out of the build.
///
/// This is a plain substring test on the file name, not a glob.
///
/// # Examples
///
/// ```
/// use flif_configure::discover::is_excluded;
/// assert!(is_excluded("widget-interface.cpp", "-interface"));
/// assert!(!is_excluded("widget.cpp", "-interface"));
/// ```
#[must_use]
pub fn is_excluded(file_name: &str, exclude: &str) -> bool {
    !exclude.is_empty() && file_name.contains(exclude)
}

/// Derive the object path for `source`.
///
/// The full source path, root directory included, is mirrored under
/// `object_root` with only the extension replaced. Current-directory
/// components and absolute prefixes are dropped and `..` becomes `__`, so the
/// result always stays inside `object_root`.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use flif_configure::discover::object_path;
/// let obj = object_path(Utf8Path::new("obj"), Utf8Path::new("src/maniac/bit.cpp"), "o");
/// assert_eq!(obj.as_str(), "obj/src/maniac/bit.o");
/// ```
#[must_use]
pub fn object_path(object_root: &Utf8Path, source: &Utf8Path, extension: &str) -> Utf8PathBuf {
    let mut object = object_root.to_path_buf();
    for component in source.components() {
        match component {
            Utf8Component::Normal(part) => object.push(part),
            Utf8Component::ParentDir => object.push(PARENT_DIR_COMPONENT),
            Utf8Component::CurDir | Utf8Component::RootDir | Utf8Component::Prefix(_) => {}
        }
    }
    object.set_extension(extension);
    object
}

/// Discover every source unit described by `layout`.
///
/// # Errors
///
/// Returns [`DiscoveryError`] when a root cannot be walked, the pattern is
/// invalid, a path is not UTF-8, or two sources map to one object path.
///
/// # Examples
///
/// ```no_run
/// use flif_configure::config::SourceLayout;
/// use flif_configure::discover::discover;
/// let units = discover(&SourceLayout::default()).expect("discover sources");
/// assert!(units.iter().all(|unit| unit.object.starts_with("obj")));
/// ```
pub fn discover(layout: &SourceLayout) -> Result<Vec<SourceUnit>, DiscoveryError> {
    let pattern = Pattern::new(&layout.pattern).map_err(|source| {
        DiscoveryError::InvalidPattern {
            pattern: layout.pattern.clone(),
            source,
        }
    })?;

    // Keyed by object path; the value remembers which source claimed it.
    let mut units: IndexMap<Utf8PathBuf, Utf8PathBuf> = IndexMap::new();
    for root in &layout.roots {
        let found = walk_root(root, &pattern, &layout.exclude)?;
        debug!(%root, count = found.len(), "walked source root");
        for source in found {
            let object = object_path(&layout.object_root, &source, &layout.object_extension);
            match units.entry(object) {
                Entry::Vacant(slot) => {
                    slot.insert(source);
                }
                // Overlapping roots revisit the same file.
                Entry::Occupied(slot) if *slot.get() == source => {}
                Entry::Occupied(slot) => {
                    let (object, first) = slot.swap_remove_entry();
                    return Err(DiscoveryError::ObjectCollision {
                        first,
                        second: source,
                        object,
                    });
                }
            }
        }
    }

    Ok(units
        .into_iter()
        .map(|(object, source)| SourceUnit { source, object })
        .collect())
}

fn walk_root(
    root: &Utf8Path,
    pattern: &Pattern,
    exclude: &str,
) -> Result<Vec<Utf8PathBuf>, DiscoveryError> {
    ensure_directory(root)?;

    let mut sources = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by(files_before_directories);
    for walk_entry in walker {
        let entry = walk_entry.map_err(|source| DiscoveryError::UnreadableEntry {
            root: root.to_path_buf(),
            path: source
                .path()
                .map_or_else(String::new, |path| path.display().to_string()),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            return Err(DiscoveryError::NonUtf8Path(
                entry.path().display().to_string(),
            ));
        };
        if !pattern.matches(name) || is_excluded(name, exclude) {
            continue;
        }
        let path = Utf8PathBuf::from_path_buf(entry.into_path())
            .map_err(|path| DiscoveryError::NonUtf8Path(path.display().to_string()))?;
        sources.push(normalise(&path));
    }
    Ok(sources)
}

fn ensure_directory(root: &Utf8Path) -> Result<(), DiscoveryError> {
    let metadata = root
        .metadata()
        .map_err(|source| DiscoveryError::InvalidRoot {
            root: root.to_path_buf(),
            source,
        })?;
    if metadata.is_dir() {
        Ok(())
    } else {
        Err(DiscoveryError::InvalidRoot {
            root: root.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
        })
    }
}

fn files_before_directories(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

/// Drop `.` components and use forward slashes, as Ninja files expect.
fn normalise(path: &Utf8Path) -> Utf8PathBuf {
    let cleaned: Utf8PathBuf = path
        .components()
        .filter(|component| !matches!(component, Utf8Component::CurDir))
        .collect();
    if cfg!(windows) {
        Utf8PathBuf::from(cleaned.as_str().replace('\\', "/"))
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("widget-interface.cpp", "-interface", true)]
    #[case("widget.cpp", "-interface", false)]
    #[case("flif-interface.cpp", "flif-interface", true)]
    #[case("my-flif-interface_test.cpp", "flif-interface", true)]
    #[case("anything.cpp", "", false)]
    fn exclusion_is_a_substring_test(
        #[case] name: &str,
        #[case] token: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(is_excluded(name, token), expected);
    }

    #[rstest]
    #[case("src/flif.cpp", "obj/src/flif.o")]
    #[case("extern/lodepng.cpp", "obj/extern/lodepng.o")]
    #[case("./src/io.cpp", "obj/src/io.o")]
    #[case("../shared/x.cpp", "obj/__/shared/x.o")]
    #[case("src/archive.tar.cpp", "obj/src/archive.tar.o")]
    fn object_path_mirrors_source(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(
            object_path(Utf8Path::new("obj"), Utf8Path::new(source), "o"),
            expected
        );
    }

    #[cfg(unix)]
    #[rstest]
    fn object_path_strips_absolute_prefix() {
        assert_eq!(
            object_path(Utf8Path::new("obj"), Utf8Path::new("/abs/src/a.cpp"), "o"),
            "obj/abs/src/a.o"
        );
    }

    #[rstest]
    fn same_file_name_in_different_roots_does_not_collide() {
        let first = object_path(Utf8Path::new("obj"), Utf8Path::new("src/io.cpp"), "o");
        let second = object_path(Utf8Path::new("obj"), Utf8Path::new("extern/io.cpp"), "o");
        assert_ne!(first, second);
    }

    #[rstest]
    fn invalid_pattern_is_reported() {
        let layout = SourceLayout {
            pattern: "[".to_owned(),
            ..SourceLayout::default()
        };
        assert!(matches!(
            discover(&layout),
            Err(DiscoveryError::InvalidPattern { .. })
        ));
    }
}
