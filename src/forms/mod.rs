//! Authoring payloads and the text helpers they share.

pub mod categories;
pub mod products;

/// Maximum length of a slug, shared by categories, classes and products.
pub const SLUG_MAX_LEN: usize = 128;

/// Collapse runs of whitespace into single spaces and drop control characters.
pub fn sanitize_inline_text(input: &str) -> String {
    let mut sanitized = String::with_capacity(input.len());
    let mut previous_whitespace = false;

    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !previous_whitespace {
                sanitized.push(' ');
                previous_whitespace = true;
            }
        } else if ch.is_control() {
            continue;
        } else {
            sanitized.push(ch);
            previous_whitespace = false;
        }
    }

    sanitized
}

/// Sanitize every line, trim blank lines at both ends and keep at most one
/// blank line between paragraphs.
pub fn sanitize_multiline_text(input: &str) -> String {
    let mut lines: Vec<String> = input.lines().map(sanitize_inline_text).collect();

    while matches!(lines.first(), Some(line) if line.is_empty()) {
        lines.remove(0);
    }

    while matches!(lines.last(), Some(line) if line.is_empty()) {
        lines.pop();
    }

    let mut result = Vec::with_capacity(lines.len());
    let mut previous_empty = false;
    for line in lines {
        let is_empty = line.is_empty();
        if is_empty && previous_empty {
            continue;
        }
        previous_empty = is_empty;
        result.push(line);
    }

    result.join("\n")
}

/// Sanitize optional text, mapping blank input to `None`.
pub fn sanitize_optional(input: Option<&str>, multiline: bool) -> Option<String> {
    input
        .map(|text| {
            if multiline {
                sanitize_multiline_text(text)
            } else {
                sanitize_inline_text(text)
            }
        })
        .filter(|text| !text.is_empty())
}

/// Derive a slug from a title: lowercase ASCII letters and digits, with any
/// other run of characters turned into a single `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug.truncate(SLUG_MAX_LEN);
    slug.trim_end_matches('-').to_string()
}

pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= SLUG_MAX_LEN
        && slug
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

/// Use the submitted slug when present, otherwise derive one from `title`.
/// Returns `Err` with the offending value when the result is unusable.
pub fn resolve_slug(slug: Option<&str>, title: &str) -> Result<String, String> {
    let candidate = match slug.map(str::trim).filter(|slug| !slug.is_empty()) {
        Some(slug) => slug.to_string(),
        None => slugify(title),
    };

    if is_valid_slug(&candidate) {
        Ok(candidate)
    } else {
        Err(candidate)
    }
}

/// Parse an optional positive identifier submitted as text. Blank input is
/// `None`; anything else must be a positive integer.
pub fn parse_optional_i32(value: Option<&str>) -> Result<Option<i32>, String> {
    let Some(trimmed) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };

    match trimmed.parse::<i32>() {
        Ok(parsed) if parsed > 0 => Ok(Some(parsed)),
        _ => Err(trimmed.to_string()),
    }
}
