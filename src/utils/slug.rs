//! URL slugification.
//!
//! Slugs name item files, tag pages and section paths, so the same input
//! must always map to the same slug.

use deunicode::deunicode;

/// Characters forbidden in file paths
const FORBIDDEN_CHARS: &[char] = &[
    '<', '>', '|', '?', '*', '#', '\\', '(', ')', '[', ']', '"', '\'',
];

/// Convert text into a lowercase ASCII slug.
///
/// Non-ASCII is transliterated and path-hostile characters are dropped.
/// Any other run of non-alphanumerics becomes a single `-`, never leading
/// or trailing.
///
/// `"Hello, Wörld!"` → `"hello-world"`
pub fn slugify(text: &str) -> String {
    let ascii = deunicode(text);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if !FORBIDDEN_CHARS.contains(&c) {
            pending_dash = true;
        }
    }

    slug
}
