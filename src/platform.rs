//! Small helpers for locating platform tools.

use std::path::PathBuf;

/// Locates an executable on `PATH`.
pub fn find_in_path(program: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

/// Returns true if `program` can be found on `PATH`.
pub fn has_program(program: &str) -> bool {
    find_in_path(program).is_some()
}
