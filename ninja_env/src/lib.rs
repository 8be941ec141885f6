#![forbid(unsafe_code)]

//! Environment variable names shared by the flif-configure library, its
//! tests, and the test helpers.

/// Environment variable naming an explicit Ninja executable.
///
/// When set, executor detection checks this path instead of searching
/// `PATH`.
///
/// # Examples
///
/// ```
/// use ninja_env::NINJA_ENV;
/// assert_eq!(NINJA_ENV, "FLIF_CONFIGURE_NINJA");
/// ```
pub const NINJA_ENV: &str = "FLIF_CONFIGURE_NINJA";

/// Prefix applied to every command-line flag read from the environment.
///
/// # Examples
///
/// ```
/// use ninja_env::ENV_PREFIX;
/// assert!(format!("{ENV_PREFIX}DEBUG").starts_with("FLIF_CONFIGURE_"));
/// ```
pub const ENV_PREFIX: &str = "FLIF_CONFIGURE_";
