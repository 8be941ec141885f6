//! Build graph types and their invariant checks.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

/// A `name = value` binding, either file-scoped or attached to one edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Variable name.
    pub name: String,
    /// Unescaped value; may reference other variables.
    pub value: String,
}

impl Binding {
    /// Create a binding.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A named command template shared by many edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Identifier referenced by edges.
    pub name: String,
    /// Command line with `$variable` placeholders.
    pub command: String,
    /// Dependency file written by the command, if any.
    pub depfile: Option<String>,
}

impl Rule {
    /// Create a rule without a depfile.
    #[must_use]
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            depfile: None,
        }
    }

    /// Declare the dependency file the command writes.
    #[must_use]
    pub fn with_depfile(mut self, depfile: impl Into<String>) -> Self {
        self.depfile = Some(depfile.into());
        self
    }
}

/// A single build statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEdge {
    /// Files produced by the edge.
    pub outputs: Vec<Utf8PathBuf>,
    /// Rule that produces them.
    pub rule: String,
    /// Explicit inputs, substituted for `$in`.
    pub inputs: Vec<Utf8PathBuf>,
    /// Inputs that trigger a rebuild without appearing in `$in`.
    pub implicit_inputs: Vec<Utf8PathBuf>,
    /// Variables overriding file-scoped bindings for this edge only.
    pub variables: Vec<Binding>,
}

impl BuildEdge {
    /// Create an edge with no implicit inputs or variables.
    #[must_use]
    pub fn new(outputs: Vec<Utf8PathBuf>, rule: impl Into<String>, inputs: Vec<Utf8PathBuf>) -> Self {
        Self {
            outputs,
            rule: rule.into(),
            inputs,
            implicit_inputs: Vec::new(),
            variables: Vec::new(),
        }
    }

    /// Add an implicit input.
    #[must_use]
    pub fn with_implicit(mut self, input: Utf8PathBuf) -> Self {
        self.implicit_inputs.push(input);
        self
    }

    /// Add an edge-scoped variable.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.push(Binding::new(name, value));
        self
    }
}

/// Invariant violations detected while building a graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A rule name was declared twice.
    #[error("rule '{0}' is already declared")]
    DuplicateRule(String),
    /// An edge references a rule that was not declared before it.
    #[error("build edge for '{output}' uses undeclared rule '{rule}'")]
    UnknownRule {
        /// Missing rule name.
        rule: String,
        /// First output of the offending edge.
        output: String,
    },
    /// An edge declares no outputs.
    #[error("build edge using rule '{0}' has no outputs")]
    NoOutputs(String),
    /// An output is produced by more than one edge.
    #[error("output '{0}' is produced by more than one edge")]
    DuplicateOutput(Utf8PathBuf),
    /// A default target names a path no edge produces.
    #[error("default target '{0}' is not produced by any edge")]
    UnknownDefault(Utf8PathBuf),
}

/// The complete build description for one generation pass.
///
/// Items keep their insertion order so the serialised form is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildGraph {
    variables: Vec<Binding>,
    rules: IndexMap<String, Rule>,
    edges: Vec<BuildEdge>,
    outputs: IndexSet<Utf8PathBuf>,
    defaults: Vec<Utf8PathBuf>,
}

impl BuildGraph {
    /// Append a file-scoped variable binding.
    ///
    /// Rebinding a name is allowed; later bindings shadow earlier ones.
    pub fn variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.push(Binding::new(name, value));
    }

    /// Declare a rule.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateRule`] if the name is taken.
    pub fn add_rule(&mut self, rule: Rule) -> Result<(), GraphError> {
        if self.rules.contains_key(&rule.name) {
            return Err(GraphError::DuplicateRule(rule.name));
        }
        self.rules.insert(rule.name.clone(), rule);
        Ok(())
    }

    /// Append a build edge.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] if the edge has no outputs, uses an undeclared
    /// rule, or produces an output another edge already produces. The graph
    /// is unchanged on error.
    pub fn add_edge(&mut self, edge: BuildEdge) -> Result<(), GraphError> {
        let Some(first) = edge.outputs.first() else {
            return Err(GraphError::NoOutputs(edge.rule));
        };
        if !self.rules.contains_key(&edge.rule) {
            return Err(GraphError::UnknownRule {
                rule: edge.rule.clone(),
                output: first.to_string(),
            });
        }
        let mut seen = IndexSet::with_capacity(edge.outputs.len());
        for output in &edge.outputs {
            if self.outputs.contains(output) || !seen.insert(output) {
                return Err(GraphError::DuplicateOutput(output.clone()));
            }
        }
        self.outputs.extend(edge.outputs.iter().cloned());
        self.edges.push(edge);
        Ok(())
    }

    /// Mark an output as built when no target is requested.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownDefault`] if no edge produces `target`.
    pub fn add_default(&mut self, target: Utf8PathBuf) -> Result<(), GraphError> {
        if !self.outputs.contains(&target) {
            return Err(GraphError::UnknownDefault(target));
        }
        self.defaults.push(target);
        Ok(())
    }

    /// File-scoped bindings in declaration order.
    #[must_use]
    pub fn variables(&self) -> &[Binding] {
        &self.variables
    }

    /// Look up the last binding for `name`.
    #[must_use]
    pub fn variable_value(&self, name: &str) -> Option<&str> {
        self.variables
            .iter()
            .rev()
            .find(|binding| binding.name == name)
            .map(|binding| binding.value.as_str())
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    /// Look up a rule by name.
    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    /// Edges in declaration order.
    #[must_use]
    pub fn edges(&self) -> &[BuildEdge] {
        &self.edges
    }

    /// Find the edge producing `output`.
    #[must_use]
    pub fn edge_for(&self, output: &Utf8Path) -> Option<&BuildEdge> {
        self.edges
            .iter()
            .find(|edge| edge.outputs.iter().any(|candidate| candidate == output))
    }

    /// Default targets in declaration order.
    #[must_use]
    pub fn defaults(&self) -> &[Utf8PathBuf] {
        &self.defaults
    }
}
