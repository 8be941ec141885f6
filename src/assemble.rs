//! Build graph assembly.
//!
//! Turns a [`Configuration`] and the discovered [`SourceUnit`]s into a
//! [`BuildGraph`]: the file-scoped flag variables, the two rules, an optional
//! precompiled-header edge, one compile edge per unit, the link edge and the
//! default target. Assembly performs no I/O, and the same inputs always yield
//! the same graph.

use crate::config::{Configuration, Define, Toolchain};
use crate::discover::SourceUnit;
use crate::ir::{BuildEdge, BuildGraph, GraphError};
use crate::ninja_gen::escape_value;
use crate::rules::{Placeholder, RuleKind};
use camino::{Utf8Path, Utf8PathBuf};
use itertools::Itertools;
use tracing::debug;

/// Debug-information flag.
pub const DEBUG_FLAG: &str = "-ggdb";
/// Optimisation flags used by every build.
pub const BASE_OPT_FLAGS: &str = "-O2 -ftree-vectorize";
/// Flag tuning code for the build machine.
pub const NATIVE_FLAG: &str = "-march=native";
/// Flag disabling assertions in release builds.
pub const NO_ASSERT_FLAG: &str = "-DNDEBUG";
/// Language and warning flags used by every compile.
pub const BASE_CXX_FLAGS: &str = "-std=c++11 -Wall -pedantic";
/// Value of `xtype` on the precompiled-header edge.
pub const HEADER_XTYPE: &str = "-x c++-header";
/// Extension appended to a header to name its precompiled form.
pub const PCH_EXTENSION: &str = "gch";

/// Debug flags: [`DEBUG_FLAG`] for debug builds, otherwise nothing.
#[must_use]
pub fn debug_flags(config: &Configuration) -> String {
    if config.debug {
        DEBUG_FLAG.to_owned()
    } else {
        String::new()
    }
}

/// Optimisation flags.
///
/// [`BASE_OPT_FLAGS`], then [`NATIVE_FLAG`] when requested, then
/// [`NO_ASSERT_FLAG`] unless this is a debug build.
#[must_use]
pub fn optimization_flags(config: &Configuration) -> String {
    let mut flags = vec![BASE_OPT_FLAGS];
    if config.native {
        flags.push(NATIVE_FLAG);
    }
    if !config.debug {
        flags.push(NO_ASSERT_FLAG);
    }
    flags.join(" ")
}

/// One `-D` flag per define, in the order given.
///
/// Repeated keys are kept so the compiler's last-one-wins rule applies.
/// Each flag is escaped for Ninja, so a `$` reaches the compiler unchanged.
///
/// # Examples
///
/// ```
/// use flif_configure::assemble::define_flags;
/// use flif_configure::config::Define;
/// let defines = [Define::new("A", Some("1".into())), Define::new("B", None)];
/// assert_eq!(define_flags(&defines), "-DA=1 -DB");
/// ```
#[must_use]
pub fn define_flags(defines: &[Define]) -> String {
    defines
        .iter()
        .map(|define| escape_value(&define.to_flag()))
        .join(" ")
}

/// Shell substitution asking `pkg-config` for `query` flags of `packages`.
fn pkg_config(query: &str, packages: &[String]) -> Option<String> {
    if packages.is_empty() {
        None
    } else {
        Some(format!("`pkg-config {query} {}`", packages.join(" ")))
    }
}

/// Compile flags: language flags, package cflags, then the defines.
#[must_use]
pub fn compile_flags(config: &Configuration) -> String {
    let packages = pkg_config("--cflags", &config.toolchain.cflags_packages);
    let defines = define_flags(&config.defines);
    [Some(BASE_CXX_FLAGS.to_owned()), packages, Some(defines)]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .join(" ")
}

/// Link flags: the package libs.
#[must_use]
pub fn link_flags(toolchain: &Toolchain) -> String {
    pkg_config("--libs", &toolchain.libs_packages).unwrap_or_default()
}

/// Path of the precompiled form of `header`.
///
/// The artifact sits beside the header so the compiler picks it up whenever
/// the header is included.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use flif_configure::assemble::precompiled_artifact;
/// assert_eq!(precompiled_artifact(Utf8Path::new("src/common.hpp")), "src/common.hpp.gch");
/// ```
#[must_use]
pub fn precompiled_artifact(header: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{header}.{PCH_EXTENSION}"))
}

/// Path of the link output for `config`.
#[must_use]
pub fn executable_path(config: &Configuration) -> Utf8PathBuf {
    config.target.executable(&config.layout.executable)
}

/// Assemble the build graph.
///
/// # Errors
///
/// Returns [`GraphError`] if the inputs would break a graph invariant, for
/// example a source whose object path equals the executable path.
pub fn assemble(config: &Configuration, units: &[SourceUnit]) -> Result<BuildGraph, GraphError> {
    let mut graph = BuildGraph::default();
    declare_variables(&mut graph, config);
    for kind in RuleKind::ALL {
        graph.add_rule(kind.to_rule())?;
    }

    let pch = match &config.precompiled_header {
        Some(header) => Some(add_precompiled_header(&mut graph, header)?),
        None => None,
    };

    let mut objects = Vec::with_capacity(units.len());
    for unit in units {
        let mut edge = BuildEdge::new(
            vec![unit.object.clone()],
            RuleKind::Compile.name(),
            vec![unit.source.clone()],
        );
        if let Some(artifact) = &pch {
            edge = edge.with_implicit(artifact.clone());
        }
        graph.add_edge(edge)?;
        objects.push(unit.object.clone());
    }

    let executable = executable_path(config);
    graph.add_edge(BuildEdge::new(
        vec![executable.clone()],
        RuleKind::Link.name(),
        objects,
    ))?;
    graph.add_default(executable)?;

    debug!(
        units = units.len(),
        precompiled_header = pch.is_some(),
        "assembled build graph"
    );
    Ok(graph)
}

fn declare_variables(graph: &mut BuildGraph, config: &Configuration) {
    graph.variable(Placeholder::Cxx.name(), escape_value(&config.toolchain.cxx));
    graph.variable(Placeholder::DbgFlags.name(), debug_flags(config));
    graph.variable(Placeholder::OptFlags.name(), optimization_flags(config));
    graph.variable(Placeholder::CxxFlags.name(), compile_flags(config));
    graph.variable(Placeholder::CxxLinkFlags.name(), link_flags(&config.toolchain));
}

fn add_precompiled_header(
    graph: &mut BuildGraph,
    header: &Utf8Path,
) -> Result<Utf8PathBuf, GraphError> {
    let artifact = precompiled_artifact(header);
    graph.add_edge(
        BuildEdge::new(
            vec![artifact.clone()],
            RuleKind::Compile.name(),
            vec![header.to_path_buf()],
        )
        .with_variable(Placeholder::XType.name(), HEADER_XTYPE),
    )?;
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetPlatform;
    use rstest::{fixture, rstest};

    fn unit(source: &str, object: &str) -> SourceUnit {
        SourceUnit {
            source: source.into(),
            object: object.into(),
        }
    }

    #[fixture]
    fn units() -> Vec<SourceUnit> {
        vec![
            unit("src/a.cpp", "obj/src/a.o"),
            unit("src/sub/b.cpp", "obj/src/sub/b.o"),
        ]
    }

    fn assembled(config: &Configuration, units: &[SourceUnit]) -> BuildGraph {
        assemble(config, units).unwrap_or_else(|err| panic!("assemble graph: {err}"))
    }

    #[rstest]
    fn release_flags_disable_assertions() {
        let config = Configuration::default();
        let opt = optimization_flags(&config);
        assert!(opt.contains(NO_ASSERT_FLAG));
        assert!(!opt.contains(NATIVE_FLAG));
        assert!(!opt.contains(DEBUG_FLAG));
        assert!(debug_flags(&config).is_empty());
    }

    #[rstest]
    #[case(false, vec![])]
    #[case(true, vec![])]
    #[case(true, vec![Define::new("X", None)])]
    #[case(false, vec![Define::new("X", Some("2".into()))])]
    fn debug_keeps_assertions(#[case] native: bool, #[case] defines: Vec<Define>) {
        let config = Configuration {
            debug: true,
            native,
            defines,
            ..Configuration::default()
        };
        assert_eq!(debug_flags(&config), DEBUG_FLAG);
        assert!(!optimization_flags(&config).contains(NO_ASSERT_FLAG));
    }

    #[rstest]
    fn native_appends_after_base_flags() {
        let config = Configuration {
            native: true,
            ..Configuration::default()
        };
        assert_eq!(
            optimization_flags(&config),
            "-O2 -ftree-vectorize -march=native -DNDEBUG"
        );
    }

    #[rstest]
    fn defines_keep_order_and_duplicates() {
        let config = Configuration {
            defines: vec![
                Define::new("A", Some("1".into())),
                Define::new("B", None),
                Define::new("A", Some("2".into())),
            ],
            ..Configuration::default()
        };
        let graph = assembled(&config, &[]);
        assert_eq!(
            graph.variable_value("cxxflags"),
            Some("-std=c++11 -Wall -pedantic `pkg-config --cflags zlib libpng` -DA=1 -DB -DA=2")
        );
    }

    #[rstest]
    fn dollar_signs_reach_the_compiler_literally() {
        let config = Configuration {
            defines: vec![Define::new("HOME_DIR", Some("$HOME".into()))],
            toolchain: Toolchain {
                cxx: "$TOOLS/g++".into(),
                ..Toolchain::default()
            },
            ..Configuration::default()
        };
        let graph = assembled(&config, &[]);
        assert_eq!(graph.variable_value("cxx"), Some("$$TOOLS/g++"));
        let cxxflags = graph.variable_value("cxxflags").unwrap_or_default();
        assert!(cxxflags.ends_with(" -DHOME_DIR=$$HOME"), "{cxxflags}");
    }

    #[rstest]
    fn empty_package_lists_drop_pkg_config() {
        let config = Configuration {
            toolchain: Toolchain {
                cxx: "clang++".into(),
                cflags_packages: Vec::new(),
                libs_packages: Vec::new(),
            },
            ..Configuration::default()
        };
        assert_eq!(compile_flags(&config), BASE_CXX_FLAGS);
        assert!(link_flags(&config.toolchain).is_empty());
    }

    #[rstest]
    fn link_inputs_follow_discovery_order(units: Vec<SourceUnit>) {
        let config = Configuration {
            target: TargetPlatform::Unix,
            ..Configuration::default()
        };
        let graph = assembled(&config, &units);
        let link = graph
            .edge_for(Utf8Path::new("src/flif"))
            .unwrap_or_else(|| panic!("link edge missing"));
        assert_eq!(link.rule, "cxxlink");
        assert_eq!(
            link.inputs,
            [
                Utf8PathBuf::from("obj/src/a.o"),
                Utf8PathBuf::from("obj/src/sub/b.o")
            ]
        );
        assert!(link.implicit_inputs.is_empty());
        assert_eq!(graph.defaults(), [Utf8PathBuf::from("src/flif")]);
    }

    #[rstest]
    fn precompiled_header_is_an_implicit_compile_input(units: Vec<SourceUnit>) {
        let config = Configuration {
            precompiled_header: Some("src/common.hpp".into()),
            target: TargetPlatform::Unix,
            ..Configuration::default()
        };
        let graph = assembled(&config, &units);
        let gch = Utf8PathBuf::from("src/common.hpp.gch");

        let header_edge = graph
            .edges()
            .first()
            .unwrap_or_else(|| panic!("graph has no edges"));
        assert_eq!(header_edge.outputs, [gch.clone()]);
        assert_eq!(header_edge.rule, "cxx");
        assert_eq!(header_edge.variables.len(), 1);
        assert!(
            header_edge
                .variables
                .iter()
                .any(|binding| binding.name == "xtype" && binding.value == HEADER_XTYPE)
        );

        for unit in &units {
            let edge = graph
                .edge_for(&unit.object)
                .unwrap_or_else(|| panic!("missing edge for {}", unit.object));
            assert_eq!(edge.implicit_inputs, [gch.clone()]);
            assert!(edge.variables.is_empty());
        }

        let link = graph
            .edge_for(Utf8Path::new("src/flif"))
            .unwrap_or_else(|| panic!("link edge missing"));
        assert!(!link.inputs.contains(&gch));
        assert!(link.implicit_inputs.is_empty());
    }

    #[rstest]
    #[case(TargetPlatform::Windows, "src/flif.exe")]
    #[case(TargetPlatform::Unix, "src/flif")]
    fn default_target_follows_platform(#[case] target: TargetPlatform, #[case] expected: &str) {
        let config = Configuration {
            target,
            ..Configuration::default()
        };
        let graph = assembled(&config, &[]);
        assert_eq!(graph.defaults(), [Utf8PathBuf::from(expected)]);
    }

    #[rstest]
    fn object_clashing_with_executable_is_rejected() {
        let config = Configuration {
            target: TargetPlatform::Unix,
            ..Configuration::default()
        };
        let clash = [unit("src/flif.cpp", "src/flif")];
        assert_eq!(
            assemble(&config, &clash),
            Err(GraphError::DuplicateOutput("src/flif".into()))
        );
    }

    #[rstest]
    fn every_rule_variable_is_bound(units: Vec<SourceUnit>) {
        let graph = assembled(&Configuration::default(), &units);
        for kind in RuleKind::ALL {
            assert!(graph.rule(kind.name()).is_some(), "{kind:?} not declared");
            // Ninja binds `in` and `out`; `xtype` is bound per edge.
            for placeholder in kind.placeholders().filter(|placeholder| {
                !matches!(
                    placeholder,
                    Placeholder::In | Placeholder::Out | Placeholder::XType
                )
            }) {
                assert!(
                    graph.variable_value(placeholder.name()).is_some(),
                    "{placeholder} unbound"
                );
            }
        }
    }
}
