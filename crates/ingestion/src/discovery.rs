//! Input file discovery.

use cryptorec_core::{Error, Result};
use std::path::{Path, PathBuf};

/// List the files in `dir` whose extension matches `extension`
/// (case-insensitive), sorted by path.
///
/// An empty result is [`Error::NoInput`].
pub fn discover_sources(dir: impl AsRef<Path>, extension: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let wanted = extension.trim_start_matches('.');

    let entries =
        std::fs::read_dir(dir).map_err(|e| Error::source_read(dir.display().to_string(), e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        tracing::warn!(directory = %dir.display(), extension = wanted, "no input files found");
        return Err(Error::no_input(format!(
            "No {} files found in directory: {}",
            wanted.to_uppercase(),
            dir.display()
        )));
    }

    tracing::debug!(directory = %dir.display(), count = files.len(), "discovered input files");
    Ok(files)
}
