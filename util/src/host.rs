//! Host platform (linux for example) utility functions

use std::path::PathBuf;
use uname;

/// Name of the environment variable pointing at the software root directory.
pub const SW_ROOT_ENV_VAR: &str = "TROLLEY_SW_ROOT";

/// Retrieve uname information.
pub fn get_uname() -> std::io::Result<uname::Info> {
    uname::uname()
}

/// Get the software root directory from the environment.
///
/// The root directory contains the `params` and `sessions` directories.
pub fn get_trolley_sw_root() -> Result<PathBuf, std::env::VarError> {
    let root = std::env::var(SW_ROOT_ENV_VAR)?;
    Ok(PathBuf::from(root))
}
