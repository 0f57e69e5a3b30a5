/// Maximum slug length in characters.
pub const MAX_SLUG_LENGTH: usize = 200;

/// Generate a URL slug from a title or name.
///
/// Lowercases, keeps ASCII alphanumerics, collapses every other run of
/// characters into a single `-` and trims dashes from both ends.
pub fn slugify(title: &str) -> String {
    let slug = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.len() <= MAX_SLUG_LENGTH {
        slug
    } else {
        slug.chars()
            .take(MAX_SLUG_LENGTH)
            .collect::<String>()
            .trim_end_matches('-')
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Rust   in  Production "), "rust-in-production");
    }

    #[test]
    fn test_slugify_drops_non_ascii() {
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_truncates() {
        let long = "a".repeat(MAX_SLUG_LENGTH + 50);
        assert_eq!(slugify(&long).len(), MAX_SLUG_LENGTH);
    }
}
