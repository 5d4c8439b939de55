//! Helpers for slash-separated entry paths.
//!
//! Paths are relative to the tree root. Leading and trailing slashes are
//! ignored, and the empty path names the root itself.

/// Strips surrounding slashes so that `"/dir/file/"` and `"dir/file"` match.
pub fn normalize(path: &str) -> &str {
    path.trim_matches('/')
}

/// Iterates over the non-empty segments of a path.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    normalize(path).split('/').filter(|segment| !segment.is_empty())
}

/// Splits a path into its parent path and its last segment.
///
/// Returns `None` for the root.
pub fn split_parent(path: &str) -> Option<(&str, &str)> {
    let path = normalize(path);
    if path.is_empty() {
        return None;
    }
    match path.rsplit_once('/') {
        Some((parent, name)) => Some((parent, name)),
        None => Some(("", path)),
    }
}

/// Last segment of a path, empty for the root.
pub fn name_of(path: &str) -> &str {
    split_parent(path).map(|(_, name)| name).unwrap_or_default()
}

/// Parent path, empty for top-level entries and for the root.
pub fn parent_of(path: &str) -> &str {
    split_parent(path)
        .map(|(parent, _)| parent)
        .unwrap_or_default()
}

pub fn join(parent: &str, name: &str) -> String {
    let parent = normalize(parent);
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// A name is a single non-empty path segment.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && name != "." && name != ".."
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("dir/file", Some(("dir", "file")))]
    #[case("/dir/sub/file/", Some(("dir/sub", "file")))]
    #[case("file", Some(("", "file")))]
    #[case("", None)]
    #[case("/", None)]
    fn split_parent_handles_nesting_and_slashes(
        #[case] path: &str,
        #[case] expected: Option<(&str, &str)>,
    ) {
        assert_eq!(split_parent(path), expected);
    }

    #[test]
    fn segments_skip_empty_parts() {
        let parts = segments("/a//b/c/").collect::<Vec<_>>();
        assert_eq!(parts, vec!["a", "b", "c"]);
    }

    #[test]
    fn join_with_root_parent_has_no_leading_slash() {
        assert_eq!(join("", "file"), "file");
        assert_eq!(join("dir/", "file"), "dir/file");
    }

    #[rstest]
    #[case("file.txt", true)]
    #[case("", false)]
    #[case("a/b", false)]
    #[case("..", false)]
    fn name_validation(#[case] name: &str, #[case] valid: bool) {
        assert_eq!(is_valid_name(name), valid);
    }
}
