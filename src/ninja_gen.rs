//! Ninja file generator.
//!
//! This module converts a [`crate::ir::BuildGraph`] into the textual
//! representation expected by the Ninja build system. Items are written in
//! the order they were added to the graph, so identical graphs always produce
//! byte-identical files.

use crate::ir::{Binding, BuildEdge, BuildGraph, Rule};
use camino::Utf8PathBuf;
use itertools::Itertools;
use std::fmt::{self, Display, Formatter};

macro_rules! write_kv {
    ($f:expr, $key:expr, $opt:expr) => {
        if let Some(val) = $opt {
            writeln!($f, "  {} = {}", $key, val)?;
        }
    };
}

/// Generate a Ninja build file as a string.
///
/// # Examples
///
/// ```
/// use flif_configure::ir::{BuildEdge, BuildGraph, Rule};
/// use flif_configure::ninja_gen::generate;
///
/// let mut graph = BuildGraph::default();
/// graph.add_rule(Rule::new("touch", "touch $out"))?;
/// graph.add_edge(BuildEdge::new(vec!["out".into()], "touch", Vec::new()))?;
/// assert_eq!(generate(&graph), "rule touch\n  command = touch $out\n\nbuild out: touch\n\n");
/// # Ok::<(), flif_configure::ir::GraphError>(())
/// ```
#[must_use]
pub fn generate(graph: &BuildGraph) -> String {
    NinjaFile(graph).to_string()
}

/// Escape a path for use in a `build` or `default` line.
///
/// Ninja treats `$`, space and `:` specially in paths; each is prefixed with
/// `$`.
///
/// # Examples
///
/// ```
/// use flif_configure::ninja_gen::escape_path;
/// assert_eq!(escape_path("my dir/c:x$.o"), "my$ dir/c$:x$$.o");
/// ```
#[must_use]
pub fn escape_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for ch in path.chars() {
        if matches!(ch, '$' | ' ' | ':') {
            escaped.push('$');
        }
        escaped.push(ch);
    }
    escaped
}

/// Escape literal text for use as a variable value.
///
/// Doubles every `$` so Ninja does not read it as a variable reference.
///
/// # Examples
///
/// ```
/// use flif_configure::ninja_gen::escape_value;
/// assert_eq!(escape_value("-DHOME_DIR=$HOME"), "-DHOME_DIR=$$HOME");
/// ```
#[must_use]
pub fn escape_value(text: &str) -> String {
    text.replace('$', "$$")
}

/// Convert a slice of paths into a space-separated, escaped string.
fn join(paths: &[Utf8PathBuf]) -> String {
    paths.iter().map(|p| escape_path(p.as_str())).join(" ")
}

/// Wrapper struct to display a whole graph.
struct NinjaFile<'a>(&'a BuildGraph);

impl Display for NinjaFile<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let graph = self.0;
        if !graph.variables().is_empty() {
            for binding in graph.variables() {
                write!(f, "{}", DisplayBinding { binding, indent: "" })?;
            }
            writeln!(f)?;
        }
        for rule in graph.rules() {
            write!(f, "{}", DisplayRule(rule))?;
        }
        for edge in graph.edges() {
            write!(f, "{}", DisplayEdge(edge))?;
        }
        if !graph.defaults().is_empty() {
            writeln!(f, "default {}", join(graph.defaults()))?;
        }
        Ok(())
    }
}

/// Wrapper struct to display a variable binding.
struct DisplayBinding<'a> {
    binding: &'a Binding,
    indent: &'static str,
}

impl Display for DisplayBinding<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Binding { name, value } = self.binding;
        if value.is_empty() {
            writeln!(f, "{}{name} =", self.indent)
        } else {
            writeln!(f, "{}{name} = {value}", self.indent)
        }
    }
}

/// Wrapper struct to display a rule.
struct DisplayRule<'a>(&'a Rule);

impl Display for DisplayRule<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "rule {}", self.0.name)?;
        writeln!(f, "  command = {}", self.0.command)?;
        write_kv!(f, "depfile", &self.0.depfile);
        writeln!(f)
    }
}

/// Wrapper struct to display a build edge.
struct DisplayEdge<'a>(&'a BuildEdge);

impl Display for DisplayEdge<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let edge = self.0;
        write!(f, "build {}: {}", join(&edge.outputs), edge.rule)?;
        if !edge.inputs.is_empty() {
            write!(f, " {}", join(&edge.inputs))?;
        }
        if !edge.implicit_inputs.is_empty() {
            write!(f, " | {}", join(&edge.implicit_inputs))?;
        }
        writeln!(f)?;
        for binding in &edge.variables {
            write!(f, "{}", DisplayBinding { binding, indent: "  " })?;
        }
        writeln!(f)
    }
}
