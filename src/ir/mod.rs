//! Intermediate Representation structures.
//!
//! This module defines the backend-agnostic build graph produced by the
//! assembler. The IR mirrors the conceptual model of Ninja (variables, rules,
//! build edges and default targets) without embedding any Ninja syntax, and
//! checks the graph invariants as items are added: an edge may only use a rule
//! declared before it, no output is produced twice, and defaults must name an
//! existing output.
//!
//! # Examples
//!
//! ```
//! use flif_configure::ir::{BuildEdge, BuildGraph, Rule};
//! use camino::Utf8PathBuf;
//!
//! let mut graph = BuildGraph::default();
//! graph.variable("cc", "cc");
//! graph.add_rule(Rule::new("cc", "$cc -c $in -o $out"))?;
//! graph.add_edge(BuildEdge::new(vec!["a.o".into()], "cc", vec!["a.c".into()]))?;
//! graph.add_default(Utf8PathBuf::from("a.o"))?;
//! # Ok::<(), flif_configure::ir::GraphError>(())
//! ```

mod graph;

pub use graph::{Binding, BuildEdge, BuildGraph, GraphError, Rule};
