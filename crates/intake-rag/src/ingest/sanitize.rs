//! Upload filename sanitization
//!
//! Uploaded filenames are untrusted: they may carry directory components,
//! traversal sequences, or characters that are unsafe on common
//! filesystems. `sanitize_filename` reduces a name to a single path
//! component that always resolves inside the given base directory.

use std::path::Path;

use crate::error::{Error, Result};

/// Characters reserved on at least one supported filesystem
const RESERVED: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Normalize an uploaded filename to a safe name inside `base_dir`.
///
/// Directory components (either separator style) are dropped, control and
/// reserved characters are stripped, and dot/space edges are trimmed. A
/// name with nothing safe left is rejected.
pub fn sanitize_filename(filename: &str, base_dir: &Path) -> Result<String> {
    // Keep only the final path component, whichever separator style the
    // client used.
    let base_name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    let stripped: String = base_name
        .chars()
        .filter(|c| !c.is_control() && !RESERVED.contains(c))
        .collect();

    let clean = stripped.trim().trim_matches('.').trim().to_string();

    if clean.is_empty() {
        return Err(Error::Internal(format!("Unsafe filename: '{}'", filename)));
    }

    // A single component with no separators cannot escape, but the joined
    // path is verified anyway before any filesystem access.
    let target = base_dir.join(&clean);
    if !target.starts_with(base_dir) {
        return Err(Error::Internal(format!("Unsafe filename: '{}'", filename)));
    }

    Ok(clean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn base() -> PathBuf {
        PathBuf::from("/srv/intake/inputs")
    }

    #[test]
    fn plain_names_pass_through() {
        assert_eq!(sanitize_filename("report.pdf", &base()).unwrap(), "report.pdf");
        assert_eq!(sanitize_filename("notes v2.txt", &base()).unwrap(), "notes v2.txt");
    }

    #[test]
    fn traversal_sequences_resolve_inside_the_base_dir() {
        for name in [
            "../../../etc/passwd.txt",
            "..\\..\\windows\\system32\\config.txt",
            "/etc/shadow.txt",
            "inputs/../../escape.txt",
        ] {
            let safe = sanitize_filename(name, &base()).unwrap();
            let target = base().join(&safe);
            assert!(target.starts_with(base()), "{} escaped as {}", name, safe);
            assert!(!safe.contains('/') && !safe.contains('\\'));
        }
    }

    #[test]
    fn reserved_and_control_characters_are_stripped() {
        assert_eq!(
            sanitize_filename("we<ird:na|me?.txt", &base()).unwrap(),
            "weirdname.txt"
        );
        assert_eq!(
            sanitize_filename("line\nbreak\t.md", &base()).unwrap(),
            "linebreak.md"
        );
    }

    #[test]
    fn dot_edges_are_trimmed() {
        assert_eq!(sanitize_filename("  spaced.txt  ", &base()).unwrap(), "spaced.txt");
        assert_eq!(sanitize_filename("trailing.txt...", &base()).unwrap(), "trailing.txt");
    }

    #[test]
    fn names_with_nothing_safe_left_are_rejected() {
        for name in ["", "..", "...", "///", "  ", "\\\\"] {
            assert!(sanitize_filename(name, &base()).is_err(), "accepted {:?}", name);
        }
    }
}
