//! Program manifest micro-format.
//!
//! A manifest lists the shader files that make up one program, one per line:
//!
//! ```text
//! # basic lit program
//! basic.vert          # relative to the manifest's directory
//! /shared/light.frag  # relative to the resource root
//! ```
//!
//! `#` starts a comment that runs to the end of the line. Lines are trimmed
//! after comment stripping and blank lines are skipped.

use crate::store::path::parent_dir;

/// Parsed program manifest: resolved shader references in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    name: String,
    shaders: Vec<String>,
}

impl Manifest {
    /// Parse manifest `text` read from the resource `manifest_name`.
    ///
    /// Relative references are joined onto the manifest's directory; references
    /// starting with `/` are taken relative to the resource root. References
    /// are not normalized here; the store does that when they are read.
    ///
    /// # Example
    ///
    /// ```
    /// use rescache::resource::Manifest;
    ///
    /// let manifest = Manifest::parse("shaders/basic.prog", "a.vert\n# comment\n\n/shared/b.frag\n");
    /// assert_eq!(manifest.shaders(), ["shaders/a.vert", "shared/b.frag"]);
    /// ```
    pub fn parse(manifest_name: &str, text: &str) -> Self {
        let dir = parent_dir(manifest_name);
        let shaders = text
            .lines()
            .filter_map(|line| {
                let line = match line.find('#') {
                    Some(pos) => &line[..pos],
                    None => line,
                };
                let line = line.trim();
                if line.is_empty() {
                    None
                } else {
                    Some(resolve_reference(dir, line))
                }
            })
            .collect();

        Self {
            name: manifest_name.to_owned(),
            shaders,
        }
    }

    /// Name of the manifest resource.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved shader names, in file order.
    pub fn shaders(&self) -> &[String] {
        &self.shaders
    }

    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }
}

fn resolve_reference(dir: &str, reference: &str) -> String {
    match reference.strip_prefix('/') {
        Some(rooted) => rooted.to_owned(),
        None => format!("{dir}{reference}"),
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Comment-only and blank lines never produce references.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_comment_lines_produce_nothing(
            comments in prop::collection::vec("[ \t]*(#[^\n]*)?", 0..20)
        ) {
            let text = comments.join("\n");
            prop_assert!(Manifest::parse("dir/m.prog", &text).is_empty());
        }

        /// One reference per non-blank line, in order, with the manifest directory prefixed.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_relative_references_keep_order(
            files in prop::collection::vec("[a-z]{1,8}\\.(vert|frag|geom)", 0..10)
        ) {
            let text = files
                .iter()
                .map(|f| format!("  {f}  # stage"))
                .collect::<Vec<_>>()
                .join("\n\n");
            let manifest = Manifest::parse("dir/m.prog", &text);
            let expected: Vec<String> = files.iter().map(|f| format!("dir/{f}")).collect();
            prop_assert_eq!(manifest.shaders(), expected.as_slice());
        }

        /// Parsing never panics and yields at most one reference per line, none commented.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_references_are_comment_free(lines in prop::collection::vec("\\PC*", 0..10)) {
            let text = lines.join("\n");
            let manifest = Manifest::parse("m.prog", &text);
            prop_assert!(manifest.shaders().len() <= lines.len());
            for reference in manifest.shaders() {
                prop_assert!(!reference.contains('#'));
            }
        }
    }
}
