//! Filesystem-safe naming for screenshots and test records.

use std::path::Path;

/// Normalize a free-text screenshot name into a filesystem-safe token.
///
/// Lowercases and replaces every non-ASCII-alphanumeric character with `_`.
/// Applying it twice yields the same string.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Replace non-alphanumeric characters with `_`, keeping case.
#[must_use]
pub fn sanitize(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Derive the reporter's test ID from a spec file and test title.
///
/// `tests/booking.spec.ts` + `"books a slot"` → `booking_spec-books_a_slot`
#[must_use]
pub fn derive_test_id(file: &str, title: &str) -> String {
    let stem = Path::new(file)
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.rsplit_once('.').map_or(n, |(stem, _)| stem))
        .unwrap_or(file);
    format!("{}-{}", sanitize(stem), sanitize(title))
}

/// File name used for actual, baseline and diff images of one screenshot
#[must_use]
pub fn screenshot_file_name(test_name: &str, screenshot_name: &str) -> String {
    format!("{test_name}_{screenshot_name}.png")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod normalize_tests {
        use super::*;

        #[test]
        fn test_lowercases_and_replaces() {
            assert_eq!(normalize_name("Hero Banner!"), "hero_banner_");
            assert_eq!(normalize_name("gallery/lightbox-open"), "gallery_lightbox_open");
        }

        #[test]
        fn test_already_safe() {
            assert_eq!(normalize_name("booking_form_2"), "booking_form_2");
        }

        #[test]
        fn test_non_ascii() {
            assert_eq!(normalize_name("café"), "caf_");
        }

        proptest! {
            #[test]
            fn prop_normalize_is_idempotent(name in ".*") {
                let once = normalize_name(&name);
                prop_assert_eq!(normalize_name(&once), once);
            }

            #[test]
            fn prop_normalize_is_filesystem_safe(name in ".*") {
                let out = normalize_name(&name);
                prop_assert!(out.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
            }
        }
    }

    mod test_id_tests {
        use super::*;

        #[test]
        fn test_strips_directory_and_extension() {
            assert_eq!(
                derive_test_id("tests/e2e/booking.spec.ts", "books a slot"),
                "booking_spec-books_a_slot"
            );
        }

        #[test]
        fn test_file_without_extension() {
            assert_eq!(derive_test_id("gallery", "Opens"), "gallery-Opens");
        }

        #[test]
        fn test_screenshot_file_name() {
            assert_eq!(screenshot_file_name("home", "hero"), "home_hero.png");
        }
    }
}
