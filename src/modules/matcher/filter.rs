use std::collections::BTreeSet;
use std::fmt;

use crate::modules::matcher::config::MatcherConfig;
use crate::modules::matcher::similarity::SimilarityStrategy;
use crate::modules::parser::special_cases::first_x_series_token;
use crate::modules::parser::ParsedTitle;

/// Why a plausible-looking pair was thrown out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    IssueMismatch,
    SequelMismatch,
    EditionMismatch,
    SeriesMismatch,
    TeamUpMismatch,
    UnrelatedSubtitle,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectReason::IssueMismatch => "issue numbers differ",
            RejectReason::SequelMismatch => "sequel numbers differ",
            RejectReason::EditionMismatch => "special edition classes differ",
            RejectReason::SeriesMismatch => "franchise branches differ",
            RejectReason::TeamUpMismatch => "team-up members differ",
            RejectReason::UnrelatedSubtitle => "subtitles are unrelated",
        };
        write!(f, "{}", text)
    }
}

/// Outcome of the domain rule layer for one candidate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(RejectReason),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

/// Hard veto rules applied after scoring.
///
/// Similarity alone systematically over-scores near-miss sequels and
/// editions because the bulk of the title string is identical; these checks
/// are categorical identity, not fuzziness, and dominate any aggregate
/// score.
pub struct MatchFilter<'a> {
    strategy: &'a dyn SimilarityStrategy,
    config: &'a MatcherConfig,
}

impl<'a> MatchFilter<'a> {
    pub fn new(strategy: &'a dyn SimilarityStrategy, config: &'a MatcherConfig) -> Self {
        Self { strategy, config }
    }

    pub fn evaluate(&self, source: &ParsedTitle, target: &ParsedTitle) -> Verdict {
        if let (Some(a), Some(b)) = (&source.issue_number, &target.issue_number) {
            if a != b {
                return Verdict::Reject(RejectReason::IssueMismatch);
            }
        }

        // Effective comparison: "Civil War" is sequel 1, so it conflicts
        // with "Civil War II" even though only one side wrote a number.
        if source.effective_sequel() != target.effective_sequel() {
            return Verdict::Reject(RejectReason::SequelMismatch);
        }

        if let (Some(a), Some(b)) = (&source.special_edition, &target.special_edition) {
            if a != b {
                return Verdict::Reject(RejectReason::EditionMismatch);
            }
        }

        // "X-Men" and "X-Force" share most of their characters but name
        // different branches of the franchise; issue and year agreement
        // must never outvote that.
        if let (Some(a), Some(b)) = (
            first_x_series_token(&source.clean_title),
            first_x_series_token(&target.clean_title),
        ) {
            if a != b {
                return Verdict::Reject(RejectReason::SeriesMismatch);
            }
        }

        if source.team_up_members.is_some() || target.team_up_members.is_some() {
            let set_a = member_set(source);
            let set_b = member_set(target);
            // A solo book never matches a team-up book, and overlapping but
            // different rosters are different publications.
            if set_a != set_b {
                return Verdict::Reject(RejectReason::TeamUpMismatch);
            }
        }

        if let (Some(a), Some(b)) = (&source.subtitle, &target.subtitle) {
            if a != b && self.strategy.calculate(a, b) < self.config.subtitle_reject_floor {
                return Verdict::Reject(RejectReason::UnrelatedSubtitle);
            }
        }

        Verdict::Accept
    }
}

/// The roster to compare: declared members for a team-up, the cleaned
/// title as a singleton otherwise.
fn member_set(parsed: &ParsedTitle) -> BTreeSet<String> {
    match &parsed.team_up_members {
        Some(members) => members.iter().cloned().collect(),
        None => {
            let mut set = BTreeSet::new();
            if !parsed.clean_title.is_empty() {
                set.insert(parsed.clean_title.clone());
            }
            set
        }
    }
}
