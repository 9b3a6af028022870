//! Static asset placement after rendering.

use std::path::{Path, PathBuf};

use crate::resources::Resource;
use crate::transform::OutputFormats;
use crate::util::human_bytes;

use super::paths::stylesheet_dir;

/// Copy a stylesheet into every output folder whose format links it.
///
/// Returns the written paths. Formats without HTML output are skipped.
pub fn copy_stylesheet(
    output_dir: &Path,
    formats: OutputFormats,
    style_sheet_path: &str,
    file_name: &str,
    stylesheet: &Resource,
) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut written = Vec::new();
    for format in formats.formats() {
        let Some(dir) = stylesheet_dir(output_dir, format, style_sheet_path) else {
            continue;
        };
        std::fs::create_dir_all(&dir)?;
        let target = dir.join(file_name);
        std::fs::write(&target, &stylesheet.content)?;
        tracing::debug!(
            format = %format,
            origin = ?stylesheet.origin,
            size = %human_bytes(stylesheet.content.len() as u64),
            "copied {} to {}",
            stylesheet.name,
            target.display()
        );
        written.push(target);
    }
    Ok(written)
}
