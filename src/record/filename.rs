//! Segment file naming.

use std::path::{Path, PathBuf};

/// Builds the file name for segment `index`: `<prefix>_<index><suffix>`.
#[must_use]
pub fn segment_filename(prefix: &str, index: u64, suffix: &str) -> String {
    format!("{prefix}_{index}{suffix}")
}

/// Builds the full path for segment `index` inside `output_dir`.
#[must_use]
pub fn segment_path(output_dir: &Path, prefix: &str, index: u64, suffix: &str) -> PathBuf {
    output_dir.join(segment_filename(prefix, index, suffix))
}

/// Returns true if `component` can be used verbatim inside a file name.
///
/// Rejects path separators so a prefix or suffix can never escape the output directory.
#[must_use]
pub fn is_plain_component(component: &str) -> bool {
    !component.contains(['/', '\\']) && !component.contains('\0')
}
