//! User-facing messages printed after the build file is written.

use crate::config::Toolchain;

/// Printed when Ninja is available.
pub const READY: &str = "Type 'ninja' to build FLIF.";

/// Printed on a first run when Ninja cannot be found.
pub const NINJA_MISSING: &str = "\
It appears you're running flif-configure for the first time, but do not have
ninja in your path. On Windows we recommend simply downloading the binary:

    https://github.com/ninja-build/ninja/releases

Extract anywhere in your path, or even inside this directory.

On Linux it's easiest to install it from your package manager, for example:

    sudo apt install ninja-build

or to compile it from source:

    git clone https://github.com/ninja-build/ninja.git && cd ninja
    python3 configure.py --bootstrap
    sudo cp ninja /usr/local/bin

This should only take half a minute or so.";

/// Installation guidance for a missing `tool`.
#[must_use]
pub fn install_guidance(tool: &str, toolchain: &Toolchain) -> String {
    if tool == toolchain.cxx_program() {
        format!(
            "install a C++ compiler (for example `sudo apt install g++`) or choose one with --cxx; \
             '{tool}' is not executable on PATH"
        )
    } else {
        format!(
            "install {tool} and the development packages {} (for example `sudo apt install \
             pkg-config zlib1g-dev libpng-dev`)",
            toolchain.all_packages().join(", ")
        )
    }
}
