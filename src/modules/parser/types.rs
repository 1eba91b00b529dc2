use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A normalized issue number.
///
/// Issue numbers are categorical identifiers, not quantities: "7" and "8"
/// are as unrelated as "7" and "700". Half-issues and annual issues carry
/// their own variants so that "1/2" and "Annual #3" are never silently
/// coerced into plain numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum IssueNumber {
    /// A regular issue number in canonical decimal form
    /// (leading zeros stripped, trailing fractional zeros dropped).
    Standard(String),
    /// The "1/2" gimmick issue.
    Half,
    /// An annual, numbered separately from the main run.
    Annual(u32),
}

impl IssueNumber {
    /// Parse a raw issue value ("7", "007", "#12", "1/2", "Annual 3").
    ///
    /// Returns `None` for anything that does not look like an issue number;
    /// callers degrade to an absent issue rather than failing.
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned = raw.trim().trim_start_matches('#').trim().to_lowercase();
        if cleaned.is_empty() {
            return None;
        }

        if cleaned == "1/2" || cleaned == "½" {
            return Some(IssueNumber::Half);
        }

        if let Some(rest) = cleaned.strip_prefix("annual") {
            let digits: String = rest
                .chars()
                .filter(|c| c.is_ascii_digit())
                .collect();
            let number = if digits.is_empty() {
                1
            } else {
                digits.parse().ok()?
            };
            return Some(IssueNumber::Annual(number));
        }

        Self::canonical_decimal(&cleaned).map(IssueNumber::Standard)
    }

    /// Canonicalize a decimal string: "007" -> "7", "12.50" -> "12.5".
    fn canonical_decimal(text: &str) -> Option<String> {
        if !text.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return None;
        }
        let value: f64 = text.parse().ok()?;
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        if value.fract() == 0.0 {
            Some(format!("{}", value as u64))
        } else {
            let mut rendered = format!("{}", value);
            if rendered.contains('.') {
                while rendered.ends_with('0') {
                    rendered.pop();
                }
            }
            Some(rendered)
        }
    }
}

impl fmt::Display for IssueNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueNumber::Standard(n) => write!(f, "{}", n),
            IssueNumber::Half => write!(f, "1/2"),
            IssueNumber::Annual(n) => write!(f, "annual #{}", n),
        }
    }
}

/// A specially-labeled issue class that must never be conflated with the
/// regular numbered run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpecialEdition {
    Annual,
    OneShot,
    GiantSize,
    Special,
    LimitedSeries,
    Variant,
    Preview,
    DirectorsCut,
    Unlimited,
}

impl SpecialEdition {
    /// Canonical tag name used in configuration files.
    pub fn as_tag(&self) -> &'static str {
        match self {
            SpecialEdition::Annual => "annual",
            SpecialEdition::OneShot => "one-shot",
            SpecialEdition::GiantSize => "giant-size",
            SpecialEdition::Special => "special",
            SpecialEdition::LimitedSeries => "limited-series",
            SpecialEdition::Variant => "variant",
            SpecialEdition::Preview => "preview",
            SpecialEdition::DirectorsCut => "directors-cut",
            SpecialEdition::Unlimited => "unlimited",
        }
    }
}

impl FromStr for SpecialEdition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "annual" => Ok(SpecialEdition::Annual),
            "one-shot" | "oneshot" => Ok(SpecialEdition::OneShot),
            "giant-size" | "giantsize" => Ok(SpecialEdition::GiantSize),
            "special" => Ok(SpecialEdition::Special),
            "limited-series" => Ok(SpecialEdition::LimitedSeries),
            "variant" => Ok(SpecialEdition::Variant),
            "preview" => Ok(SpecialEdition::Preview),
            "directors-cut" => Ok(SpecialEdition::DirectorsCut),
            "unlimited" => Ok(SpecialEdition::Unlimited),
            other => Err(format!("unknown special edition tag '{}'", other)),
        }
    }
}

/// Structured decomposition of a raw comic title.
///
/// Immutable after construction; all comparison logic downstream works on
/// these fields rather than the raw string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ParsedTitle {
    /// Normalized title with markers stripped and aliases left unresolved.
    pub clean_title: String,
    /// Canonical grouping key for "which ongoing series is this".
    pub series_key: String,
    pub volume: Option<u32>,
    pub year: Option<i32>,
    pub issue_number: Option<IssueNumber>,
    /// Trailing sequel marker ("Civil War II" -> 2). Absent means sequel 1.
    pub sequel_number: Option<u32>,
    pub special_edition: Option<SpecialEdition>,
    /// Present only for team-up titles; left-to-right order as written.
    pub team_up_members: Option<Vec<String>>,
    /// Normalized subtitle text after a colon/dash separator.
    pub subtitle: Option<String>,
}

impl ParsedTitle {
    /// Sequel number with the "no suffix means first" convention applied.
    pub fn effective_sequel(&self) -> u32 {
        self.sequel_number.unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_number_strips_leading_zeros() {
        assert_eq!(
            IssueNumber::parse("007"),
            Some(IssueNumber::Standard("7".to_string()))
        );
        assert_eq!(
            IssueNumber::parse("#012"),
            Some(IssueNumber::Standard("12".to_string()))
        );
    }

    #[test]
    fn test_issue_number_keeps_fractions() {
        assert_eq!(
            IssueNumber::parse("12.5"),
            Some(IssueNumber::Standard("12.5".to_string()))
        );
        assert_eq!(
            IssueNumber::parse("12.50"),
            Some(IssueNumber::Standard("12.5".to_string()))
        );
    }

    #[test]
    fn test_issue_number_half() {
        assert_eq!(IssueNumber::parse("1/2"), Some(IssueNumber::Half));
        assert_eq!(IssueNumber::parse("#1/2"), Some(IssueNumber::Half));
    }

    #[test]
    fn test_issue_number_annual() {
        assert_eq!(IssueNumber::parse("Annual 3"), Some(IssueNumber::Annual(3)));
        assert_eq!(
            IssueNumber::parse("annual #12"),
            Some(IssueNumber::Annual(12))
        );
        // A bare "Annual" is the first annual
        assert_eq!(IssueNumber::parse("Annual"), Some(IssueNumber::Annual(1)));
    }

    #[test]
    fn test_issue_number_rejects_garbage() {
        assert_eq!(IssueNumber::parse(""), None);
        assert_eq!(IssueNumber::parse("abc"), None);
        assert_eq!(IssueNumber::parse("1.2.3"), None);
    }

    #[test]
    fn test_annual_and_standard_are_distinct() {
        assert_ne!(
            IssueNumber::parse("Annual 1"),
            IssueNumber::parse("1")
        );
    }

    #[test]
    fn test_special_edition_from_str() {
        assert_eq!("annual".parse(), Ok(SpecialEdition::Annual));
        assert_eq!("One-Shot".parse(), Ok(SpecialEdition::OneShot));
        assert_eq!("giant-size".parse(), Ok(SpecialEdition::GiantSize));
        assert!("holographic".parse::<SpecialEdition>().is_err());
    }

    #[test]
    fn test_effective_sequel_defaults_to_one() {
        let parsed = ParsedTitle::default();
        assert_eq!(parsed.effective_sequel(), 1);

        let sequel = ParsedTitle {
            sequel_number: Some(2),
            ..ParsedTitle::default()
        };
        assert_eq!(sequel.effective_sequel(), 2);
    }

    #[test]
    fn test_parsed_title_serde_round_trip() {
        let parsed = ParsedTitle {
            clean_title: "civil war".to_string(),
            series_key: "civil war".to_string(),
            volume: Some(1),
            year: Some(2016),
            issue_number: Some(IssueNumber::Standard("1".to_string())),
            sequel_number: Some(2),
            special_edition: None,
            team_up_members: None,
            subtitle: None,
        };

        let json = serde_json::to_string(&parsed).unwrap();
        let back: ParsedTitle = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, back);
    }
}
