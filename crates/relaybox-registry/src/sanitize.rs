// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filename sanitization.

/// Longest filename kept, in characters.
pub const MAX_FILENAME_LEN: usize = 255;

const ILLEGAL: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

fn is_edge_junk(c: char) -> bool {
    c == '.' || c == ' '
}

/// Makes a user-supplied filename safe to store and display.
///
/// Illegal and control characters become `_`, leading and trailing dots and
/// spaces are removed, and names longer than [`MAX_FILENAME_LEN`] are cut
/// while keeping the extension. Returns `None` when nothing is left.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let replaced: String = name
        .chars()
        .map(|c| {
            if ILLEGAL.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let trimmed = replaced.trim_matches(is_edge_junk);
    if trimmed.is_empty() {
        return None;
    }

    let len = trimmed.chars().count();
    if len <= MAX_FILENAME_LEN {
        return Some(trimmed.to_string());
    }

    if let Some((stem, ext)) = trimmed.rsplit_once('.') {
        let ext_len = ext.chars().count();
        if !stem.is_empty() && ext_len + 1 < MAX_FILENAME_LEN {
            let stem: String = stem.chars().take(MAX_FILENAME_LEN - ext_len - 1).collect();
            return Some(format!("{stem}.{ext}"));
        }
    }

    let cut: String = trimmed.chars().take(MAX_FILENAME_LEN).collect();
    Some(cut.trim_end_matches(is_edge_junk).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn replaces_illegal_characters() {
        assert_eq!(
            sanitize_filename("a<b>c:d\"e/f\\g|h?i*.txt").as_deref(),
            Some("a_b_c_d_e_f_g_h_i_.txt")
        );
        assert_eq!(sanitize_filename("tab\there").as_deref(), Some("tab_here"));
    }

    #[test]
    fn trims_dots_and_spaces() {
        assert_eq!(sanitize_filename("  ..report.pdf. ").as_deref(), Some("report.pdf"));
    }

    #[test]
    fn keeps_ordinary_names() {
        assert_eq!(sanitize_filename("report.pdf").as_deref(), Some("report.pdf"));
        assert_eq!(sanitize_filename("фото 1.jpg").as_deref(), Some("фото 1.jpg"));
    }

    #[test]
    fn empty_result_is_rejected() {
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename(" . . "), None);
    }

    #[test]
    fn long_names_keep_extension() {
        let name = format!("{}.pdf", "a".repeat(400));
        let clean = sanitize_filename(&name).unwrap();
        assert_eq!(clean.chars().count(), MAX_FILENAME_LEN);
        assert!(clean.ends_with(".pdf"));
    }

    #[test]
    fn long_name_without_extension_is_cut() {
        let clean = sanitize_filename(&"b".repeat(300)).unwrap();
        assert_eq!(clean.chars().count(), MAX_FILENAME_LEN);
    }

    proptest! {
        #[test]
        fn output_is_always_safe(name in "\\PC{0,400}") {
            if let Some(clean) = sanitize_filename(&name) {
                prop_assert!(!clean.is_empty());
                prop_assert!(clean.chars().count() <= MAX_FILENAME_LEN);
                prop_assert!(!clean.chars().any(|c| ILLEGAL.contains(&c) || c.is_control()));
                prop_assert!(!clean.starts_with(is_edge_junk));
                prop_assert!(!clean.ends_with(is_edge_junk));
            }
        }

        #[test]
        fn names_with_letters_survive(stem in "[a-zA-Z0-9]{1,50}", ext in "[a-z]{1,5}") {
            let name = format!("{stem}.{ext}");
            prop_assert_eq!(sanitize_filename(&name), Some(name));
        }
    }
}
