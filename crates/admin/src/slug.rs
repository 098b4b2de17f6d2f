//! URL slug generation.

/// Turn a display name into a URL slug.
///
/// Lowercases, replaces every run of characters outside `[a-z0-9]` with a
/// single `-`, and trims dashes from both ends. Accented letters are not
/// transliterated; they count as separators.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut separator = false;

    for c in name.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if separator && !slug.is_empty() {
                slug.push('-');
            }
            separator = false;
            slug.push(c);
        } else {
            separator = true;
        }
    }

    slug
}
