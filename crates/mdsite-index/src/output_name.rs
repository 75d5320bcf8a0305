//! Source path to output name transform.
//!
//! The single transform used by every producer of output paths (tree
//! indexing, manifest indexing, link fallback). Keeping it in one place is
//! what prevents divergent naming conventions between the index and the
//! resolver.

/// Filenames that map to `index.html` in their directory, case-insensitive.
const INDEX_FAMILY: [&str; 5] = ["readme", "index", "main", "root", "home"];

/// Whether a file stem belongs to the index family.
#[must_use]
pub fn is_index_stem(stem: &str) -> bool {
    INDEX_FAMILY.iter().any(|f| stem.eq_ignore_ascii_case(f))
}

/// Transform a markdown source path into its output path.
///
/// Only the final segment changes: `.md`/`.markdown` becomes `.html` with
/// the basename lowercased, and the index family (`readme`, `index`,
/// `main`, `root`, `home`) always becomes `index.html` in the same
/// directory, never a same-named `.html` file. Non-markdown paths are
/// returned unchanged.
#[must_use]
pub fn output_name(source_path: &str) -> String {
    let (dir, file) = match source_path.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, source_path),
    };

    let Some(stem) = file
        .strip_suffix(".md")
        .or_else(|| file.strip_suffix(".MD"))
        .or_else(|| file.strip_suffix(".markdown"))
    else {
        return source_path.to_owned();
    };

    let out_file = if is_index_stem(stem) {
        "index.html".to_owned()
    } else {
        format!("{}.html", stem.to_lowercase())
    };

    match dir {
        Some(dir) => format!("{dir}/{out_file}"),
        None => out_file,
    }
}
