use std::collections::HashMap;

use regex::Regex;

use super::normalizer::Normalizer;
use super::special_cases::{
    detect_team_up, extract_sequel_number, first_x_series_token, resolve_alias,
};
use super::types::{IssueNumber, ParsedTitle, SpecialEdition};

/// Table-driven knobs for the parser.
///
/// Everything here is data: new franchise aliases or edition markers are
/// configuration changes, not code changes.
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Marker phrase -> edition class, tried in order, first hit wins.
    pub special_editions: Vec<(String, SpecialEdition)>,
    /// Franchise alias table applied to the derived series key.
    pub aliases: HashMap<String, String>,
    /// Flavor prefixes that vary between catalogs but name the same series.
    pub series_prefixes: Vec<String>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        let special_editions = vec![
            ("annual".to_string(), SpecialEdition::Annual),
            ("one-shot".to_string(), SpecialEdition::OneShot),
            ("one shot".to_string(), SpecialEdition::OneShot),
            ("giant-size".to_string(), SpecialEdition::GiantSize),
            ("giant size".to_string(), SpecialEdition::GiantSize),
            ("limited series".to_string(), SpecialEdition::LimitedSeries),
            ("director's cut".to_string(), SpecialEdition::DirectorsCut),
            ("variant".to_string(), SpecialEdition::Variant),
            ("preview".to_string(), SpecialEdition::Preview),
            ("special".to_string(), SpecialEdition::Special),
        ];

        let mut aliases = HashMap::new();
        for flavor in ["uncanny", "all-new", "astonishing", "amazing"] {
            aliases.insert(format!("{} x-men", flavor), "x-men".to_string());
        }

        let series_prefixes = vec![
            "uncanny".to_string(),
            "amazing".to_string(),
            "spectacular".to_string(),
            "astonishing".to_string(),
            "all-new".to_string(),
            "all new".to_string(),
            "marvels".to_string(),
        ];

        Self {
            special_editions,
            aliases,
            series_prefixes,
        }
    }
}

/// Decomposes raw comic titles into structured, comparable fields.
///
/// Parsing is a convenience, not validation: malformed issues and years
/// degrade to absent fields and the rest of the record still parses, so one
/// garbage row never aborts a batch.
pub struct ComicTitleParser {
    year_re: Regex,
    volume_re: Regex,
    issue_re: Regex,
    edition_res: Vec<(Regex, SpecialEdition)>,
    options: ParserOptions,
    normalizer: Normalizer,
}

impl ComicTitleParser {
    pub fn new() -> Self {
        Self::with_options(ParserOptions::default())
            .expect("default parser options are well-formed")
    }

    pub fn with_options(options: ParserOptions) -> Result<Self, String> {
        let mut edition_res = Vec::with_capacity(options.special_editions.len());
        for (pattern, tag) in &options.special_editions {
            if pattern.trim().is_empty() {
                return Err("special edition marker pattern is empty".to_string());
            }
            let re = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(pattern)))
                .map_err(|e| format!("bad edition marker '{}': {}", pattern, e))?;
            edition_res.push((re, *tag));
        }

        Ok(Self {
            year_re: Regex::new(r"\((\d{4})\)").expect("static year pattern"),
            volume_re: Regex::new(r"(?i)\b(?:vol\.?|volume)\s*(\d+)")
                .expect("static volume pattern"),
            issue_re: Regex::new(r"#(\d+\.?\d*)").expect("static issue pattern"),
            edition_res,
            options,
            normalizer: Normalizer::comic_defaults(),
        })
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Parse a bare title string with no out-of-band fields.
    pub fn parse(&self, title: &str) -> ParsedTitle {
        self.parse_with(title, None, None, None)
    }

    /// Parse a title together with separately-sourced issue/year/volume.
    ///
    /// Supplied fields win over values embedded in the title; embedded
    /// values only fill gaps.
    pub fn parse_with(
        &self,
        title: &str,
        issue: Option<&str>,
        year: Option<i32>,
        volume: Option<&str>,
    ) -> ParsedTitle {
        let mut working = title.trim().to_string();

        // Stage 1: parenthesized year
        let embedded_year = self
            .year_re
            .captures(&working)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<i32>().ok());
        if embedded_year.is_some() {
            working = self.year_re.replace_all(&working, "").trim().to_string();
        }
        let year = year.or(embedded_year);

        // Stage 2: volume marker
        let embedded_volume = self
            .volume_re
            .captures(&working)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok());
        if embedded_volume.is_some() {
            working = self.volume_re.replace_all(&working, "").trim().to_string();
        }
        let volume = volume
            .and_then(|v| self.extract_issue_free_number(v))
            .or(embedded_volume);

        // Stage 3: embedded issue marker ("#142"), kept as a fallback when
        // the issue field itself is absent
        let embedded_issue = self
            .issue_re
            .captures(&working)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
        if embedded_issue.is_some() {
            working = self.issue_re.replace_all(&working, "").trim().to_string();
        }

        // Stage 4: special edition marker
        let mut special_edition = None;
        for (re, tag) in &self.edition_res {
            if re.is_match(&working) {
                special_edition = Some(*tag);
                working = re.replace_all(&working, "").trim().to_string();
                break;
            }
        }

        // Stage 5: subtitle split
        let (main, subtitle_raw) = split_subtitle(&working);
        working = main;
        let subtitle = subtitle_raw.map(|s| self.normalizer.normalize(&s)).filter(|s| !s.is_empty());

        // Stage 6: team-up members
        let team_up_members = detect_team_up(&working).map(|members| {
            members
                .iter()
                .map(|m| self.normalizer.normalize(m))
                .filter(|m| !m.is_empty())
                .collect::<Vec<_>>()
        });
        let team_up_members = team_up_members.filter(|m| m.len() >= 2);

        // Stage 7: trailing sequel marker
        let mut sequel_number = None;
        if let Some((n, stripped)) = extract_sequel_number(&working) {
            sequel_number = Some(n);
            working = stripped;
        }

        // Stage 8: normalize and derive the series key. Team-up keys are
        // order-insensitive so "Wolverine/Doop" and "Doop/Wolverine" land in
        // the same block.
        let clean_title = self.normalizer.normalize(&working);
        let series_key = match &team_up_members {
            Some(members) => {
                let mut sorted = members.clone();
                sorted.sort();
                sorted.join("/")
            }
            None => self.derive_series_key(&clean_title),
        };

        // Stage 9: issue normalization
        let issue_number = issue
            .and_then(|i| self.extract_issue_number(i))
            .or_else(|| embedded_issue.as_deref().and_then(IssueNumber::parse));

        // An annual-marked title with a plain issue number identifies the
        // annual run, not the main one; keep both views consistent.
        let (issue_number, special_edition) =
            harmonize_annuals(issue_number, special_edition);

        ParsedTitle {
            clean_title,
            series_key,
            volume,
            year,
            issue_number,
            sequel_number,
            special_edition,
            team_up_members,
            subtitle,
        }
    }

    /// Extract an issue number from free text.
    ///
    /// Accepts direct values ("7", "1/2", "Annual 3"), "#123" markers, and
    /// trailing numbers ("Series Name 123").
    pub fn extract_issue_number(&self, text: &str) -> Option<IssueNumber> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(issue) = IssueNumber::parse(trimmed) {
            return Some(issue);
        }

        if let Some(captures) = self.issue_re.captures(trimmed) {
            if let Some(m) = captures.get(1) {
                return IssueNumber::parse(m.as_str());
            }
        }

        let last = trimmed.split_whitespace().last()?;
        if last.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return IssueNumber::parse(last);
        }
        None
    }

    fn extract_issue_free_number(&self, text: &str) -> Option<u32> {
        let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            None
        } else {
            digits.parse().ok()
        }
    }

    /// Canonical grouping key: a deterministic pure function of the cleaned
    /// title with markers already removed. Multi-word series names are kept
    /// whole; only flavor prefixes and franchise aliases collapse.
    fn derive_series_key(&self, clean_title: &str) -> String {
        let mut key = clean_title.trim().to_string();

        'outer: loop {
            for prefix in &self.options.series_prefixes {
                let with_space = format!("{} ", prefix);
                if let Some(rest) = key.strip_prefix(with_space.as_str()) {
                    key = rest.trim_start().to_string();
                    continue 'outer;
                }
            }
            break;
        }

        if let Some(x_token) = first_x_series_token(&key) {
            key = x_token;
        }

        resolve_alias(&key, &self.options.aliases)
    }
}

impl Default for ComicTitleParser {
    fn default() -> Self {
        Self::new()
    }
}

fn harmonize_annuals(
    issue: Option<IssueNumber>,
    edition: Option<SpecialEdition>,
) -> (Option<IssueNumber>, Option<SpecialEdition>) {
    match (issue, edition) {
        (Some(IssueNumber::Standard(n)), Some(SpecialEdition::Annual)) => {
            let promoted = n
                .parse::<u32>()
                .map(IssueNumber::Annual)
                .unwrap_or(IssueNumber::Standard(n));
            (Some(promoted), Some(SpecialEdition::Annual))
        }
        (Some(IssueNumber::Annual(n)), None) => {
            (Some(IssueNumber::Annual(n)), Some(SpecialEdition::Annual))
        }
        other => other,
    }
}

/// Split on the first colon, em-dash, or spaced hyphen separator.
fn split_subtitle(title: &str) -> (String, Option<String>) {
    let separators = [":", "\u{2014}", " - "];
    let mut split_at: Option<(usize, usize)> = None;

    for sep in separators {
        if let Some(idx) = title.find(sep) {
            if split_at.map_or(true, |(best, _)| idx < best) {
                split_at = Some((idx, sep.len()));
            }
        }
    }

    match split_at {
        Some((idx, sep_len)) => {
            let left = title[..idx].trim();
            let right = title[idx + sep_len..].trim();
            if left.is_empty() || right.is_empty() {
                (title.trim().to_string(), None)
            } else {
                (left.to_string(), Some(right.to_string()))
            }
        }
        None => (title.trim().to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ComicTitleParser {
        ComicTitleParser::new()
    }

    #[test]
    fn test_series_key_ignores_articles_and_flavor_prefixes() {
        let p = parser();
        let a = p.parse("The Amazing Spider-Man");
        let b = p.parse("Amazing Spider-Man");
        let c = p.parse("Spider-Man");
        assert_eq!(a.series_key, b.series_key);
        assert_eq!(b.series_key, c.series_key);
        assert_eq!(a.series_key, "spider-man");
    }

    #[test]
    fn test_series_key_preserves_multi_word_names() {
        let p = parser();
        assert_eq!(p.parse("Fantastic Four").series_key, "fantastic four");
        assert_eq!(p.parse("Secret Wars").series_key, "secret wars");
    }

    #[test]
    fn test_series_key_x_family() {
        let p = parser();
        assert_eq!(p.parse("Uncanny X-Men").series_key, "x-men");
        assert_eq!(p.parse("X-Men").series_key, "x-men");
        assert_eq!(p.parse("X-Force").series_key, "x-force");
        assert_ne!(
            p.parse("X-Men").series_key,
            p.parse("X-Force").series_key
        );
    }

    #[test]
    fn test_embedded_year_fills_absent_field() {
        let p = parser();
        let parsed = p.parse("Uncanny X-Men (1981)");
        assert_eq!(parsed.year, Some(1981));
        assert!(!parsed.clean_title.contains("1981"));

        // Supplied year wins over the embedded one
        let parsed = p.parse_with("Uncanny X-Men (1981)", None, Some(1963), None);
        assert_eq!(parsed.year, Some(1963));
    }

    #[test]
    fn test_embedded_volume() {
        let p = parser();
        let parsed = p.parse("X-Men Vol. 2");
        assert_eq!(parsed.volume, Some(2));
        assert_eq!(parsed.series_key, "x-men");
    }

    #[test]
    fn test_special_edition_markers() {
        let p = parser();
        let annual = p.parse("X-Men Annual");
        assert_eq!(annual.special_edition, Some(SpecialEdition::Annual));
        assert_eq!(annual.series_key, "x-men");

        let giant = p.parse("Giant-Size X-Men");
        assert_eq!(giant.special_edition, Some(SpecialEdition::GiantSize));
        assert_eq!(giant.series_key, "x-men");

        let one_shot = p.parse("Deadpool One-Shot");
        assert_eq!(one_shot.special_edition, Some(SpecialEdition::OneShot));
    }

    #[test]
    fn test_subtitle_split() {
        let p = parser();
        let parsed = p.parse("X-Men: Days of Future Past");
        assert_eq!(parsed.series_key, "x-men");
        assert_eq!(parsed.subtitle.as_deref(), Some("days of future past"));

        let dashed = p.parse("Kitty Pryde - Shadow & Flame");
        assert_eq!(dashed.subtitle.as_deref(), Some("shadow flame"));
    }

    #[test]
    fn test_subtitle_does_not_break_hyphenated_names() {
        let p = parser();
        let parsed = p.parse("Spider-Man");
        assert_eq!(parsed.subtitle, None);
        assert_eq!(parsed.series_key, "spider-man");
    }

    #[test]
    fn test_sequel_numbers() {
        let p = parser();
        let roman = p.parse("Civil War II");
        assert_eq!(roman.sequel_number, Some(2));
        assert_eq!(roman.clean_title, "civil war");

        let arabic = p.parse("Secret Wars 2");
        assert_eq!(arabic.sequel_number, Some(2));
        assert_eq!(arabic.clean_title, "secret wars");

        let first = p.parse("Civil War");
        assert_eq!(first.sequel_number, None);
        assert_eq!(first.effective_sequel(), 1);
    }

    #[test]
    fn test_sequel_and_no_suffix_share_series_key() {
        let p = parser();
        assert_eq!(
            p.parse("Civil War II").series_key,
            p.parse("Civil War").series_key
        );
    }

    #[test]
    fn test_team_up_parsing() {
        let p = parser();
        let parsed = p.parse("Wolverine/Doop");
        assert_eq!(
            parsed.team_up_members,
            Some(vec!["wolverine".to_string(), "doop".to_string()])
        );

        let solo = p.parse("Wolverine");
        assert_eq!(solo.team_up_members, None);
    }

    #[test]
    fn test_team_up_series_key_is_order_insensitive() {
        let p = parser();
        assert_eq!(
            p.parse("Wolverine/Doop").series_key,
            p.parse("Doop/Wolverine").series_key
        );
    }

    #[test]
    fn test_issue_normalization() {
        let p = parser();
        let parsed = p.parse_with("X-Men", Some("007"), None, None);
        assert_eq!(
            parsed.issue_number,
            Some(IssueNumber::Standard("7".to_string()))
        );

        let half = p.parse_with("Gen13", Some("1/2"), None, None);
        assert_eq!(half.issue_number, Some(IssueNumber::Half));

        let annual = p.parse_with("X-Men", Some("Annual 5"), None, None);
        assert_eq!(annual.issue_number, Some(IssueNumber::Annual(5)));
        assert_eq!(annual.special_edition, Some(SpecialEdition::Annual));
    }

    #[test]
    fn test_annual_title_promotes_plain_issue() {
        let p = parser();
        let a = p.parse_with("X-Men Annual", Some("5"), None, None);
        let b = p.parse_with("X-Men", Some("Annual 5"), None, None);
        assert_eq!(a.issue_number, Some(IssueNumber::Annual(5)));
        assert_eq!(a.issue_number, b.issue_number);
    }

    #[test]
    fn test_embedded_issue_is_fallback_only() {
        let p = parser();
        let parsed = p.parse("Uncanny X-Men #142");
        assert_eq!(
            parsed.issue_number,
            Some(IssueNumber::Standard("142".to_string()))
        );
        assert_eq!(parsed.series_key, "x-men");

        let supplied = p.parse_with("Uncanny X-Men #142", Some("143"), None, None);
        assert_eq!(
            supplied.issue_number,
            Some(IssueNumber::Standard("143".to_string()))
        );
    }

    #[test]
    fn test_malformed_fields_degrade_to_absent() {
        let p = parser();
        let parsed = p.parse_with("X-Men", Some("not-a-number"), None, Some("???"));
        assert_eq!(parsed.issue_number, None);
        assert_eq!(parsed.volume, None);
        assert_eq!(parsed.series_key, "x-men");
    }

    #[test]
    fn test_empty_title_parses() {
        let p = parser();
        let parsed = p.parse("");
        assert_eq!(parsed.clean_title, "");
        assert_eq!(parsed.series_key, "");
    }

    #[test]
    fn test_parse_is_deterministic() {
        let p = parser();
        let title = "Marvel's Civil War II: Oath (2016) #1";
        assert_eq!(
            p.parse_with(title, Some("1"), None, None),
            p.parse_with(title, Some("1"), None, None)
        );
    }
}
