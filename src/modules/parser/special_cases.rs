use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn vs_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\s+(?:vs\.?|versus)\s+").expect("static vs regex"))
}

fn and_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\s+and\s+").expect("static and regex"))
}

fn x_series_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"x-[a-zA-Z]+").expect("static x-series regex"))
}

/// Detect a team-up title and return its members in written order.
///
/// Recognized joins: slash ("Wolverine/Doop"), ampersand ("Cable & Deadpool"),
/// "and", and "vs"/"versus". A slash between two digits is an issue fraction
/// ("1/2"), never a join, so callers can safely run this on the title portion
/// after issue extraction.
pub fn detect_team_up(title: &str) -> Option<Vec<String>> {
    if let Some(members) = split_on_slashes(title) {
        return Some(members);
    }
    if title.contains('&') {
        if let Some(members) = validate_members(title.split('&')) {
            return Some(members);
        }
    }
    for re in [vs_regex(), and_regex()] {
        if re.is_match(title) {
            if let Some(members) = validate_members(re.split(title)) {
                return Some(members);
            }
        }
    }
    None
}

fn split_on_slashes(title: &str) -> Option<Vec<String>> {
    let chars: Vec<char> = title.chars().collect();
    let mut parts: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '/' {
            let prev_digit = i > 0 && chars[i - 1].is_ascii_digit();
            let next_digit = i + 1 < chars.len() && chars[i + 1].is_ascii_digit();
            // "1/2" is a fraction, not a join
            if !(prev_digit && next_digit) {
                parts.push(std::mem::take(&mut current));
                continue;
            }
        }
        current.push(c);
    }
    parts.push(current);

    if parts.len() < 2 {
        return None;
    }
    validate_members(parts.iter().map(|s| s.as_str()))
}

fn validate_members<'a, I>(parts: I) -> Option<Vec<String>>
where
    I: IntoIterator<Item = &'a str>,
{
    let members: Vec<String> = parts
        .into_iter()
        .map(|p| p.trim().to_string())
        .collect();
    if members.len() < 2 {
        return None;
    }
    if members
        .iter()
        .all(|m| !m.is_empty() && m.chars().any(|c| c.is_alphabetic()))
    {
        Some(members)
    } else {
        None
    }
}

/// Parse a roman numeral token, bounded to XX (20).
///
/// Single-character tokens ("X", "V", "I") are rejected as ambiguous: a
/// trailing "X" is far more often part of a name than a tenth installment.
pub fn roman_to_u32(token: &str) -> Option<u32> {
    let lowered = token.trim().to_lowercase();
    if lowered.len() < 2 || !lowered.chars().all(|c| matches!(c, 'i' | 'v' | 'x')) {
        return None;
    }
    const NUMERALS: [&str; 20] = [
        "i", "ii", "iii", "iv", "v", "vi", "vii", "viii", "ix", "x", "xi", "xii", "xiii",
        "xiv", "xv", "xvi", "xvii", "xviii", "xix", "xx",
    ];
    NUMERALS
        .iter()
        .position(|&n| n == lowered)
        .map(|idx| idx as u32 + 1)
}

/// Extract a trailing sequel marker from a title.
///
/// Arabic digits are matched preferentially (single digit 2-9; longer runs
/// are issue or year material, not sequels), falling back to roman numerals
/// II-XX. Returns the sequel number and the title with the marker stripped.
pub fn extract_sequel_number(title: &str) -> Option<(u32, String)> {
    let trimmed = title.trim();
    let (head, last) = trimmed.rsplit_once(char::is_whitespace)?;
    let token = last.trim();

    if !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
        let n: u32 = token.parse().ok()?;
        if (2..=9).contains(&n) {
            return Some((n, head.trim().to_string()));
        }
        return None;
    }

    match roman_to_u32(token) {
        Some(n) if n >= 2 => Some((n, head.trim().to_string())),
        _ => None,
    }
}

/// Resolve a series key through the franchise alias table.
///
/// Identity when no entry exists; new aliases are data, not code.
pub fn resolve_alias(series_key: &str, table: &HashMap<String, String>) -> String {
    table
        .get(series_key)
        .cloned()
        .unwrap_or_else(|| series_key.to_string())
}

/// First `x-<word>` token in a title ("uncanny x-men annual" -> "x-men").
///
/// X-family books share long common prefixes that fool string similarity;
/// the x-token pins down which branch of the franchise a title belongs to.
pub fn first_x_series_token(title: &str) -> Option<String> {
    x_series_regex()
        .find(title)
        .map(|m| m.as_str().to_lowercase())
}
