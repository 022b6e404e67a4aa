//! Shared utility functions.

/// Last component of a path hint, splitting on both `/` and `\`.
///
/// Path hints come from the host's file dialog and are never resolved
/// against the filesystem.
pub fn file_name_of(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Lowercased extension of a path hint, or an empty string if there is none.
///
/// # Examples
///
/// ```
/// use dbview::utils::extension_of;
///
/// assert_eq!(extension_of("dumps/Shop.SQL"), "sql");
/// assert_eq!(extension_of("archive.tar.gz"), "gz");
/// assert_eq!(extension_of("README"), "");
/// ```
pub fn extension_of(path: &str) -> String {
    let name = file_name_of(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
        _ => String::new(),
    }
}

/// Suggested file name for an exported image.
///
/// The full source file name is kept and the suffix appended, so
/// `data/foo.sqlite` becomes `foo.sqlite_updated`.
pub fn export_file_name(original_path: &str, suffix: &str) -> String {
    format!("{}{suffix}", file_name_of(original_path))
}

/// Format bytes in human-readable form.
///
/// # Examples
///
/// ```
/// use dbview::utils::format_bytes;
///
/// assert_eq!(format_bytes(0), "0 bytes");
/// assert_eq!(format_bytes(1536), "1.5 KB");
/// ```
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    const GB: u64 = 1024 * 1024 * 1024;

    if bytes == 0 {
        "0 bytes".to_string()
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} bytes")
    }
}

/// Truncate `text` to at most `max` characters, appending `...` when cut.
pub fn preview(text: &str, max: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max).collect();
        format!("{cut}...")
    }
}
