//! Resource name normalization.
//!
//! Every resource name that reaches a store goes through [`normalize`], which
//! produces a clean, root-relative, forward-slash path. `..` segments are
//! resolved lexically; a name that would climb above the store root is
//! rejected, so stores never see traversal attempts.

use crate::error::StoreError;

/// Normalize a resource name.
///
/// - Replaces backslashes with forward slashes
/// - Collapses redundant separators (`a///b` → `a/b`)
/// - Drops `.` segments
/// - Resolves `..` by removing the previous segment
/// - Strips leading and trailing slashes
///
/// Returns `Err(StoreError::InvalidPath)` if the result is empty or a `..`
/// would climb above the root.
///
/// # Example
///
/// ```
/// use rescache::store::path::normalize;
///
/// assert_eq!(normalize("/shaders//basic/../common.vert").unwrap(), "shaders/common.vert");
/// assert!(normalize("../secret").is_err());
/// ```
pub fn normalize(path: &str) -> Result<String, StoreError> {
    let replaced = path.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();

    for segment in replaced.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                if segments.pop().is_none() {
                    return Err(StoreError::InvalidPath(format!(
                        "{path}: escapes the resource root"
                    )));
                }
            },
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return Err(StoreError::InvalidPath(format!("{path:?}: empty path")));
    }

    Ok(segments.join("/"))
}

/// Directory part of a normalized name, including the trailing `/`.
///
/// Returns `""` for names at the root.
///
/// ```
/// use rescache::store::path::parent_dir;
///
/// assert_eq!(parent_dir("shaders/basic.prog"), "shaders/");
/// assert_eq!(parent_dir("basic.prog"), "");
/// ```
pub fn parent_dir(name: &str) -> &str {
    match name.rfind('/') {
        Some(pos) => &name[..=pos],
        None => "",
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn segment() -> impl Strategy<Value = String> {
        prop_oneof![
            4 => "[a-z0-9_]{1,6}(\\.[a-z]{1,4})?",
            1 => Just(".".to_string()),
            1 => Just("..".to_string()),
            1 => Just(String::new()),
        ]
    }

    fn raw_path() -> impl Strategy<Value = String> {
        (
            prop::collection::vec(segment(), 0..8),
            prop::bool::ANY,
        )
            .prop_map(|(segments, backslash)| {
                segments.join(if backslash { "\\" } else { "/" })
            })
    }

    proptest! {
        /// normalize is idempotent on its own output.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_normalize_idempotent(path in raw_path()) {
            if let Ok(once) = normalize(&path) {
                prop_assert_eq!(normalize(&once).unwrap(), once);
            }
        }

        /// Normalized names never contain empty, `.` or `..` segments.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_normalized_segments_are_clean(path in raw_path()) {
            if let Ok(normalized) = normalize(&path) {
                prop_assert!(!normalized.starts_with('/'));
                prop_assert!(!normalized.ends_with('/'));
                prop_assert!(!normalized.contains('\\'));
                for segment in normalized.split('/') {
                    prop_assert!(!segment.is_empty());
                    prop_assert!(segment != "." && segment != "..");
                }
            }
        }

        /// Joining a normalized directory with a plain file name stays normalized.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_parent_dir_join_round_trips(
            dirs in prop::collection::vec("[a-z]{1,5}", 0..4),
            file in "[a-z]{1,5}\\.vert"
        ) {
            let mut name = dirs.join("/");
            if !name.is_empty() {
                name.push('/');
            }
            name.push_str(&file);
            let dir = parent_dir(&name);
            prop_assert_eq!(format!("{dir}{file}"), name.clone());
            prop_assert_eq!(normalize(&name).unwrap(), name);
        }
    }
}
