//! Ingest tool discovery.

use std::path::{Path, PathBuf};

use log::info;

use crate::error_handling::InitializationError;

/// Resolves the ingest tool to an executable path.
///
/// A name containing a path separator is checked as-is; a bare name is
/// looked up in each `PATH` entry in order.
///
/// # Errors
///
/// Returns `InitializationError::ToolNotFoundError` if no executable is found.
pub fn locate_ingest_tool(tool: &str) -> Result<PathBuf, InitializationError> {
    let candidate = Path::new(tool);
    let resolved = if candidate.components().count() > 1 {
        is_executable(candidate).then(|| candidate.to_path_buf())
    } else {
        std::env::var_os("PATH").and_then(|paths| {
            std::env::split_paths(&paths)
                .map(|dir| dir.join(tool))
                .find(|path| is_executable(path))
        })
    };

    match resolved {
        Some(path) => {
            info!("'{}' path resolves to {}", tool, path.display());
            Ok(path)
        }
        None => Err(InitializationError::ToolNotFoundError(tool.to_string())),
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
