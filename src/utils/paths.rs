//! Path normalization

/// Convert backslashes to forward slashes.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Lexically join `rel` onto the POSIX directory `base` and resolve `.` and `..`.
///
/// The result is always relative: `..` segments that would climb above `base`'s root are
/// dropped, and an empty result means the root itself.
pub fn join_posix(base: &str, rel: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(rel.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// Parent directory of a POSIX relative path (`""` for top-level entries).
pub fn posix_parent(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}
