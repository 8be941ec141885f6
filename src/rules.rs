//! The closed set of rule templates.
//!
//! Commands are assembled from a fixed word list per rule rather than from
//! free-form format strings, so the order of flags is part of each rule's
//! contract. Both rules place optimisation flags before debug flags.
//!
//! | rule      | command |
//! |-----------|---------|
//! | `cxx`     | `$cxx $xtype -MMD -MF $out.d $optflags $dbgflags $cxxflags -c $in -o $out` |
//! | `cxxlink` | `$cxx $optflags $dbgflags $in $cxxlinkflags -o $out` |

use crate::ir::Rule;
use itertools::Itertools;
use std::fmt::{self, Display, Formatter};

/// Every variable a rule template may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// Compiler driver.
    Cxx,
    /// Language override, set only on the precompiled-header edge.
    XType,
    /// Optimisation and assertion flags.
    OptFlags,
    /// Debug-information flags.
    DbgFlags,
    /// Compile-only flags, defines included.
    CxxFlags,
    /// Link-only flags.
    CxxLinkFlags,
    /// Explicit inputs of the edge, supplied by Ninja.
    In,
    /// Outputs of the edge, supplied by Ninja.
    Out,
}

impl Placeholder {
    /// Variable name as written after `$`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cxx => "cxx",
            Self::XType => "xtype",
            Self::OptFlags => "optflags",
            Self::DbgFlags => "dbgflags",
            Self::CxxFlags => "cxxflags",
            Self::CxxLinkFlags => "cxxlinkflags",
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

impl Display for Placeholder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.name())
    }
}

/// One word of a command template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Word {
    Var(Placeholder),
    Flag(&'static str),
    /// The edge's dependency file, `$out.d`.
    Depfile,
}

impl Display for Word {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var(placeholder) => placeholder.fmt(f),
            Self::Flag(flag) => f.write_str(flag),
            Self::Depfile => f.write_str(DEPFILE),
        }
    }
}

/// Dependency file written next to each object.
const DEPFILE: &str = "$out.d";

const COMPILE_WORDS: &[Word] = &[
    Word::Var(Placeholder::Cxx),
    Word::Var(Placeholder::XType),
    Word::Flag("-MMD"),
    Word::Flag("-MF"),
    Word::Depfile,
    Word::Var(Placeholder::OptFlags),
    Word::Var(Placeholder::DbgFlags),
    Word::Var(Placeholder::CxxFlags),
    Word::Flag("-c"),
    Word::Var(Placeholder::In),
    Word::Flag("-o"),
    Word::Var(Placeholder::Out),
];

const LINK_WORDS: &[Word] = &[
    Word::Var(Placeholder::Cxx),
    Word::Var(Placeholder::OptFlags),
    Word::Var(Placeholder::DbgFlags),
    Word::Var(Placeholder::In),
    Word::Var(Placeholder::CxxLinkFlags),
    Word::Flag("-o"),
    Word::Var(Placeholder::Out),
];

/// The rules a generated graph may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// One translation unit (or header) to one object, with a depfile.
    Compile,
    /// Every object to the executable.
    Link,
}

impl RuleKind {
    /// All rules, in declaration order.
    pub const ALL: [Self; 2] = [Self::Compile, Self::Link];

    /// Name edges use to reference the rule.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Compile => "cxx",
            Self::Link => "cxxlink",
        }
    }

    const fn words(self) -> &'static [Word] {
        match self {
            Self::Compile => COMPILE_WORDS,
            Self::Link => LINK_WORDS,
        }
    }

    /// Placeholders referenced by the command, in order of appearance.
    pub fn placeholders(self) -> impl Iterator<Item = Placeholder> {
        self.words().iter().filter_map(|word| match word {
            Word::Var(placeholder) => Some(*placeholder),
            Word::Flag(_) | Word::Depfile => None,
        })
    }

    /// Render the command line.
    ///
    /// # Examples
    ///
    /// ```
    /// use flif_configure::rules::RuleKind;
    /// assert_eq!(
    ///     RuleKind::Link.command(),
    ///     "$cxx $optflags $dbgflags $in $cxxlinkflags -o $out",
    /// );
    /// ```
    #[must_use]
    pub fn command(self) -> String {
        self.words().iter().join(" ")
    }

    /// Dependency file the command writes, if any.
    #[must_use]
    pub const fn depfile(self) -> Option<&'static str> {
        match self {
            Self::Compile => Some(DEPFILE),
            Self::Link => None,
        }
    }

    /// Convert into an IR rule.
    #[must_use]
    pub fn to_rule(self) -> Rule {
        let rule = Rule::new(self.name(), self.command());
        match self.depfile() {
            Some(depfile) => rule.with_depfile(depfile),
            None => rule,
        }
    }
}
