//! Map directories to dotted module names.
//!
//! A directory belongs to a package when its parent holds an `__init__.py`;
//! the walk goes up through such parents and joins the directory names with
//! `.`, stopping at the first parent without the marker.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// File marking a directory as a package.
pub const PACKAGE_MARKER: &str = "__init__.py";

/// Errors resolving a directory to a module name.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("cannot determine working directory: {0}")]
    WorkingDirectory(#[source] std::io::Error),

    #[error("directory has no usable name: {0}")]
    Unnamed(PathBuf),
}

/// Dotted module name for `directory`.
///
/// `directory` should be absolute; relative paths are resolved against the
/// working directory first.
pub fn module_of_directory(directory: &Path) -> Result<String, ResolveError> {
    let directory = if directory.is_absolute() {
        directory.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(ResolveError::WorkingDirectory)?
            .join(directory)
    };

    let mut segments = Vec::new();
    let mut current = directory.as_path();
    loop {
        let name = current
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ResolveError::Unnamed(current.to_path_buf()))?;
        segments.push(name);

        match current.parent() {
            Some(parent) if parent.join(PACKAGE_MARKER).exists() && parent.file_name().is_some() => {
                current = parent;
            }
            _ => break,
        }
    }

    segments.reverse();
    let module = segments.join(".");
    debug!(directory = %directory.display(), module, "resolved directory to module");
    Ok(module)
}

/// Directory to put on the import path so that `module`, resolved from
/// `directory` by [`module_of_directory`], can be imported.
pub fn search_root(directory: &Path, module: &str) -> Option<PathBuf> {
    directory
        .ancestors()
        .nth(module.split('.').count())
        .map(Path::to_path_buf)
}

/// Dotted module name for the current working directory.
pub fn module_of_working_directory() -> Result<String, ResolveError> {
    let cwd = std::env::current_dir().map_err(ResolveError::WorkingDirectory)?;
    module_of_directory(&cwd)
}
