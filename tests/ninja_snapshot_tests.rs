//! Snapshot of a complete FLIF build file.
//!
//! Units are derived with [`object_path`] from fixed relative sources, so the
//! snapshot does not depend on the machine it runs on.

use camino::{Utf8Path, Utf8PathBuf};
use flif_configure::assemble::assemble;
use flif_configure::config::{Configuration, Define, TargetPlatform};
use flif_configure::discover::{SourceUnit, object_path};
use flif_configure::ir::GraphError;
use flif_configure::ninja_gen;
use insta::{Settings, assert_snapshot};

#[test]
fn flif_release_with_precompiled_header() -> Result<(), GraphError> {
    let units: Vec<SourceUnit> = ["extern/lodepng.cpp", "src/flif.cpp", "src/maniac/chance.cpp"]
        .into_iter()
        .map(|source| SourceUnit {
            source: Utf8PathBuf::from(source),
            object: object_path(Utf8Path::new("obj"), Utf8Path::new(source), "o"),
        })
        .collect();
    let config = Configuration {
        native: true,
        defines: vec![Define::new("SUPPORT_HDR", None)],
        precompiled_header: Some("src/common.hpp".into()),
        target: TargetPlatform::Unix,
        ..Configuration::default()
    };
    let ninja = ninja_gen::generate(&assemble(&config, &units)?);

    let mut settings = Settings::new();
    settings.set_snapshot_path(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/snapshots/ninja"
    ));
    settings.bind(|| {
        assert_snapshot!("flif_release_with_precompiled_header", ninja);
    });
    Ok(())
}
