//! Integration tests for the `flif-configure` binary using `assert_cmd`.
//!
//! Each test runs the binary inside a throwaway FLIF-shaped source tree with
//! an empty `PATH`, so Ninja and the compiler are only found when a test
//! provides them.

use anyhow::{Context, Result, ensure};
use assert_cmd::Command;
use flif_configure::runner::{NINJA_MISSING, READY};
use ninja_env::{ENV_PREFIX, NINJA_ENV};
use predicates::prelude::*;
use std::fs;
use test_support::{SourceTree, fake_ninja};

fn configure(tree: &SourceTree) -> Result<Command> {
    let mut cmd = Command::cargo_bin("flif-configure").context("locate flif-configure binary")?;
    cmd.current_dir(tree.root()).env("PATH", "").env_remove("CXX");
    for (key, _) in std::env::vars_os() {
        if key.to_string_lossy().starts_with(ENV_PREFIX) {
            cmd.env_remove(key);
        }
    }
    Ok(cmd)
}

fn read_build_file(tree: &SourceTree) -> Result<String> {
    let path = tree.path("build.ninja");
    fs::read_to_string(&path).with_context(|| format!("read {path}"))
}

#[test]
fn first_run_without_ninja_prints_install_instructions() -> Result<()> {
    let tree = SourceTree::flif()?;
    configure(&tree)?
        .assert()
        .success()
        .stdout(predicate::str::contains(NINJA_MISSING));
    let ninja = read_build_file(&tree)?;
    ensure!(ninja.contains("default src/flif"), "unexpected file:\n{ninja}");
    ensure!(
        ninja.contains("build obj/src/maniac/chance.o: cxx src/maniac/chance.cpp\n"),
        "unit missing:\n{ninja}"
    );
    ensure!(!ninja.contains("flif-interface"), "interface compiled");
    Ok(())
}

#[test]
fn first_run_with_ninja_prints_ready() -> Result<()> {
    let tree = SourceTree::flif()?;
    let (_ninja_dir, ninja) = fake_ninja()?;
    configure(&tree)?
        .env(NINJA_ENV, &ninja)
        .assert()
        .success()
        .stdout(predicate::str::contains(READY));
    Ok(())
}

#[test]
fn later_runs_are_quiet() -> Result<()> {
    let tree = SourceTree::flif()?;
    configure(&tree)?.assert().success();
    configure(&tree)?
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    Ok(())
}

#[test]
fn dash_output_streams_to_stdout() -> Result<()> {
    let tree = SourceTree::flif()?;
    let output = configure(&tree)?
        .args(["-o", "-"])
        .output()
        .context("run flif-configure -o -")?;
    ensure!(output.status.success(), "-o - should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    ensure!(
        stdout.contains("rule cxx") && stdout.contains("build src/flif: cxxlink"),
        "expected Ninja content, got: {stdout}"
    );
    ensure!(!stdout.contains(NINJA_MISSING), "hint mixed into the graph");
    ensure!(!tree.path("-").exists(), "created a file named '-'");
    ensure!(!tree.path("build.ninja").exists(), "wrote build.ninja");
    Ok(())
}

#[test]
fn flags_reach_the_build_file() -> Result<()> {
    let tree = SourceTree::flif()?;
    configure(&tree)?
        .args(["-d", "-D", "A=1", "--define", "B", "--target", "windows"])
        .assert()
        .success();
    let ninja = read_build_file(&tree)?;
    ensure!(ninja.contains("dbgflags = -ggdb\n"), "debug flags missing");
    ensure!(!ninja.contains("-DNDEBUG"), "assertions disabled in debug");
    ensure!(ninja.contains(" -DA=1 -DB\n"), "defines missing:\n{ninja}");
    ensure!(ninja.ends_with("default src/flif.exe\n"), "unsuffixed target");
    Ok(())
}

#[test]
fn custom_output_path_is_used() -> Result<()> {
    let tree = SourceTree::flif()?;
    fs::create_dir(tree.path("out")).context("create out dir")?;
    configure(&tree)?
        .args(["-o", "out/flif.ninja"])
        .assert()
        .success();
    ensure!(tree.path("out/flif.ninja").is_file(), "output missing");
    ensure!(!tree.path("build.ninja").exists(), "default output written");
    Ok(())
}

#[test]
fn missing_root_fails_without_writing() -> Result<()> {
    let tree = SourceTree::flif()?;
    configure(&tree)?
        .args(["--root", "absent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent"));
    ensure!(!tree.path("build.ninja").exists(), "output written on failure");
    Ok(())
}

#[test]
fn strict_mode_requires_the_compiler() -> Result<()> {
    let tree = SourceTree::flif()?;
    configure(&tree)?
        .arg("--strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required tool 'g++'"));
    ensure!(!tree.path("build.ninja").exists(), "output written on failure");
    Ok(())
}

#[test]
fn invalid_define_is_a_usage_error() -> Result<()> {
    let tree = SourceTree::flif()?;
    configure(&tree)?.args(["-D", "=1"]).assert().failure();
    configure(&tree)?
        .args(["-D", "EVIL=1\nbuild pwned: cxx x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line breaks"));
    ensure!(!tree.path("build.ninja").exists(), "output written on failure");
    Ok(())
}

#[test]
fn dollar_in_define_is_escaped() -> Result<()> {
    let tree = SourceTree::flif()?;
    configure(&tree)?
        .args(["-D", "HOME_DIR=$HOME"])
        .assert()
        .success();
    let ninja = read_build_file(&tree)?;
    ensure!(ninja.contains(" -DHOME_DIR=$$HOME\n"), "unescaped define:\n{ninja}");
    Ok(())
}

#[test]
fn empty_compiler_is_a_usage_error() -> Result<()> {
    let tree = SourceTree::flif()?;
    configure(&tree)?.args(["--cxx", ""]).assert().failure();
    ensure!(!tree.path("build.ninja").exists(), "output written on failure");
    Ok(())
}
