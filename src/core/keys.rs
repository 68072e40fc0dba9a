//! Key and slug rules shared by schemas, taxonomies and entries.

/// Longest accepted schema or taxonomy key
pub const MAX_KEY_LEN: usize = 50;

/// Whether `key` is usable as a schema or taxonomy key.
///
/// Keys end up inside search filters, so only ASCII alphanumerics,
/// underscore and hyphen are allowed.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Derive a URL slug from free text.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}
