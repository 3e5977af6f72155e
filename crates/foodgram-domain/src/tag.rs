//! Tag field rules.

pub const TAG_NAME_MAX_LEN: usize = 150;
pub const TAG_SLUG_MAX_LEN: usize = 50;

/// `#RGB` or `#RRGGBB`, case-insensitive.
pub fn validate_hex_color(color: &str) -> bool {
    let Some(digits) = color.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// ASCII letters, digits, hyphen and underscore, 1-50 chars.
pub fn validate_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= TAG_SLUG_MAX_LEN
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
