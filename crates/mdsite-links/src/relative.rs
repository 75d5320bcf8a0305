//! POSIX-style relative path arithmetic.
//!
//! All paths here are site-root-relative with forward slashes. The empty
//! string denotes the site root directory.

/// Directory portion of an output path (`""` for root-level files).
#[must_use]
pub fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// Join a relative path onto a base directory.
///
/// Handles `.` and `..` components. `..` at the root is dropped rather than
/// escaping above the site root.
#[must_use]
pub fn join(base_dir: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();

    for component in relative.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(component),
        }
    }

    segments.join("/")
}

/// Relative path from the directory `from_dir` to the file `to`.
///
/// Inverse of [`join`]: `join(from_dir, &relative_from(from_dir, to))`
/// equals `to` for any two site-root-relative paths.
#[must_use]
pub fn relative_from(from_dir: &str, to: &str) -> String {
    let from: Vec<&str> = from_dir.split('/').filter(|s| !s.is_empty()).collect();
    let to_segments: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();

    let common = from
        .iter()
        .zip(to_segments.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = Vec::with_capacity(from.len() - common + to_segments.len() - common);
    for _ in common..from.len() {
        parts.push("..");
    }
    parts.extend(&to_segments[common..]);
    parts.join("/")
}
