use regex::Regex;
use std::sync::OnceLock;

fn year_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(19|20)\d{2}\b").expect("static year regex"))
}

/// Extract a publication year from a loose date string.
///
/// Accepts bare years ("1982"), embedded years ("Jan 01 1982", "1982-05-01")
/// and returns `None` for anything without a plausible 4-digit year.
pub fn extract_year(date_str: &str) -> Option<i32> {
    let trimmed = date_str.trim();
    if trimmed.is_empty() {
        return None;
    }
    year_regex()
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<i32>().ok())
}

/// Normalize a publisher name to a canonical short form.
///
/// Unknown publishers pass through lowercased and trimmed.
pub fn normalize_publisher(publisher: &str) -> String {
    let publisher = publisher.trim().to_lowercase();
    if publisher.is_empty() {
        return String::new();
    }

    let table: &[(&str, &[&str])] = &[
        (
            "marvel",
            &["marvel comics", "marvel comic", "marvel entertainment"],
        ),
        ("dc", &["dc comics", "detective comics", "dc entertainment"]),
        ("image", &["image comics"]),
        ("dark horse", &["dark horse comics"]),
        ("idw", &["idw publishing"]),
        ("valiant", &["valiant entertainment", "valiant comics"]),
        ("boom", &["boom! studios", "boom studios"]),
        ("dynamite", &["dynamite entertainment"]),
    ];

    for (canonical, variations) in table {
        if publisher == *canonical || variations.contains(&publisher.as_str()) {
            return (*canonical).to_string();
        }
    }

    // Partial matches: "Marvel Comics Group" still maps to "marvel".
    for (canonical, variations) in table {
        if publisher.contains(canonical)
            || variations.iter().any(|v| publisher.contains(v))
        {
            return (*canonical).to_string();
        }
    }

    publisher
}
