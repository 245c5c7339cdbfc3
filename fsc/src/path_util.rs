//! Pure string/path helpers shared by the local walker and the sync engine.

/// Split `input` on any character of `delimiters`, dropping empty components.
#[must_use]
pub fn split(input: &str, delimiters: &str) -> Vec<String> {
    input
        .split(|c| delimiters.contains(c))
        .filter(|part| !part.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Path of `full` relative to `root`, with any leading separator removed.
/// Returns `full` unchanged when it does not start with `root`.
#[must_use]
pub fn relative_path(root: &str, full: &str, separator: char) -> String {
    let mut relative = match full.strip_prefix(root) {
        Some(rest) => rest,
        None => full,
    };
    relative = relative.strip_prefix(separator).unwrap_or(relative);
    relative.to_string()
}

/// Last component of a separator-delimited path.
#[must_use]
pub fn base_name(path: &str, separator: char) -> &str {
    path.rsplit(separator).next().unwrap_or(path)
}
