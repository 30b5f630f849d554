//! URL slugification.
//!
//! Converts admin-entered labels to URL-safe slugs.

use deunicode::deunicode;

/// Convert label text to a URL-safe slug.
///
/// Transliterates unicode to ASCII, lowercases, and collapses every run
/// of non-alphanumeric characters into a single `-`.
///
/// ```ignore
/// slugify("GST Registration")   // "gst-registration"
/// slugify("Société Générale")   // "societe-generale"
/// ```
pub fn slugify(text: &str) -> String {
    let ascii = deunicode(text);
    let mut slug = String::with_capacity(ascii.len());
    let mut prev_dash = true; // suppress leading dash

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            prev_dash = false;
        } else if !prev_dash {
            slug.push('-');
            prev_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
