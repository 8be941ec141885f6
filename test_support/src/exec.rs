//! Fake executables.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Make a script file executable on Unix platforms.
#[cfg(unix)]
fn make_script_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)
        .with_context(|| format!("read metadata {}", path.display()))?
        .permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)
        .with_context(|| format!("set permissions {}", path.display()))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_script_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Write an executable shell script called `name` into `dir`.
///
/// # Errors
///
/// Returns an error if the script cannot be written or marked executable.
pub fn fake_program(dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    let mut file =
        File::create(&path).with_context(|| format!("create script {}", path.display()))?;
    writeln!(file, "#!/bin/sh\nexit 0")
        .with_context(|| format!("write script {}", path.display()))?;
    make_script_executable(&path)?;
    Ok(path)
}

/// Create a fake Ninja executable in its own temporary directory.
///
/// Returns the directory, which must outlive the test, and the path to the
/// executable.
///
/// # Errors
///
/// Returns an error if the directory or script cannot be created.
pub fn fake_ninja() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new().context("create fake ninja dir")?;
    let path = fake_program(dir.path(), "ninja")?;
    Ok((dir, path))
}
