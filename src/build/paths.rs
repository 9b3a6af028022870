//! Output path conventions.
//!
//! Each format writes to its own folder under the output directory. Rich
//! HTML formats keep topics (and stylesheets) under an `html/` sub-folder:
//!
//! ```text
//! _output/Website/html/T_Sample.Widget.htm
//! _output/Website/html/styles/PresentationStyleMods.css
//! _output/Markdown/T_Sample.Widget.md
//! ```

use std::path::{Path, PathBuf};

use crate::transform::OutputFormat;

/// Folder a format's topics are written to.
pub fn format_dir(output_dir: &Path, format: OutputFormat) -> PathBuf {
    let dir = output_dir.join(format.folder_name());
    if format.uses_html_folder() {
        dir.join("html")
    } else {
        dir
    }
}

/// Output file of one topic in one format.
pub fn topic_output_path(output_dir: &Path, format: OutputFormat, file_stem: &str) -> PathBuf {
    format_dir(output_dir, format).join(format!("{file_stem}.{}", format.topic_extension()))
}

/// Folder stylesheets are copied to, for formats that link them.
pub fn stylesheet_dir(
    output_dir: &Path,
    format: OutputFormat,
    style_sheet_path: &str,
) -> Option<PathBuf> {
    if !format.uses_html_folder() {
        return None;
    }
    let relative = style_sheet_path.trim_matches('/');
    let dir = format_dir(output_dir, format);
    Some(if relative.is_empty() {
        dir
    } else {
        dir.join(relative)
    })
}

/// Get the base path from a config file path.
pub fn base_path_from_config(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
