//! FLIF build configuration library.
//!
//! Discovers the C++ translation units of a FLIF checkout, assembles the
//! compile and link steps into a [`ir::BuildGraph`] and writes it out as a
//! Ninja build file. The `flif-configure` binary wraps [`runner::run`].

pub mod assemble;
pub mod cli;
pub mod config;
pub mod discover;
pub mod emit;
pub mod ir;
pub mod ninja_gen;
pub mod rules;
pub mod runner;
pub mod which;
