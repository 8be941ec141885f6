//! Test utilities for the generator.
//!
//! Provides throwaway source trees shaped like a FLIF checkout and fake
//! executables for the tool lookup paths.

pub mod exec;
pub mod tree;

pub use exec::{fake_ninja, fake_program};
pub use tree::SourceTree;
