use std::collections::BTreeSet;

use crate::modules::matcher::config::MatcherConfig;
use crate::modules::matcher::similarity::{jaccard, token_sorted, SimilarityStrategy};
use crate::modules::matcher::types::FieldScores;
use crate::modules::parser::special_cases::first_x_series_token;
use crate::modules::parser::ParsedTitle;

/// Score considered "unknown" when a field is missing on either side;
/// absence must not be punished as disagreement.
const NEUTRAL: f64 = 0.5;

/// Computes the per-field similarity vector for a candidate pair.
pub struct Comparator<'a> {
    strategy: &'a dyn SimilarityStrategy,
    config: &'a MatcherConfig,
}

impl<'a> Comparator<'a> {
    pub fn new(strategy: &'a dyn SimilarityStrategy, config: &'a MatcherConfig) -> Self {
        Self { strategy, config }
    }

    pub fn compare(&self, source: &ParsedTitle, target: &ParsedTitle) -> FieldScores {
        FieldScores {
            title: self.title_score(source, target),
            subtitle: self.subtitle_score(source, target),
            issue: issue_score(source, target),
            year: year_score(source.year, target.year),
            sequel: sequel_score(source, target),
        }
    }

    /// Title similarity: exact cleaned-title match short-circuits to 1.0;
    /// otherwise the best of as-written, token-sorted, and prefix-stripped
    /// comparisons, with team-up member overlap folded in when both sides
    /// are team-ups.
    fn title_score(&self, source: &ParsedTitle, target: &ParsedTitle) -> f64 {
        let left = source.clean_title.as_str();
        let right = target.clean_title.as_str();

        // Two absent titles are unknown, not identical; strsim would call
        // "" vs "" a perfect match
        if left.is_empty() && right.is_empty() {
            return NEUTRAL;
        }
        if left == right {
            return 1.0;
        }

        // Two different x-family branches are different series, no matter
        // how much of the string they share.
        if let (Some(x1), Some(x2)) = (first_x_series_token(left), first_x_series_token(right)) {
            if x1 != x2 {
                return 0.0;
            }
        }

        let (stripped_left, stripped_right) = self.strip_asymmetric_prefix(left, right);
        let mut score = self
            .strategy
            .calculate(&stripped_left, &stripped_right)
            .max(
                self.strategy
                    .calculate(&token_sorted(&stripped_left), &token_sorted(&stripped_right)),
            );

        if let (Some(a), Some(b)) = (&source.team_up_members, &target.team_up_members) {
            let set_a: BTreeSet<String> = a.iter().cloned().collect();
            let set_b: BTreeSet<String> = b.iter().cloned().collect();
            score = score.max(jaccard(&set_a, &set_b));
        }

        score
    }

    /// When exactly one side carries a flavor prefix ("uncanny x-men" vs
    /// "x-men"), strip it before measuring string distance.
    fn strip_asymmetric_prefix(&self, left: &str, right: &str) -> (String, String) {
        let mut left = left.to_string();
        let mut right = right.to_string();
        for prefix in &self.config.series_prefixes {
            let with_space = format!("{} ", prefix);
            let on_left = left.starts_with(&with_space);
            let on_right = right.starts_with(&with_space);
            if on_left && !on_right {
                left = left[with_space.len()..].trim_start().to_string();
            } else if on_right && !on_left {
                right = right[with_space.len()..].trim_start().to_string();
            }
        }
        (left, right)
    }

    fn subtitle_score(&self, source: &ParsedTitle, target: &ParsedTitle) -> f64 {
        match (&source.subtitle, &target.subtitle) {
            (None, None) => 1.0,
            (Some(a), Some(b)) => {
                if a == b {
                    1.0
                } else {
                    self.strategy.calculate(a, b)
                }
            }
            // Many catalogs omit subtitles; a mild penalty, not zero
            _ => self.config.subtitle_missing_score,
        }
    }
}

/// Issue numbers are categorical: equal or not, never "close".
fn issue_score(source: &ParsedTitle, target: &ParsedTitle) -> f64 {
    match (&source.issue_number, &target.issue_number) {
        (Some(a), Some(b)) => {
            if a == b {
                1.0
            } else {
                0.0
            }
        }
        _ => NEUTRAL,
    }
}

/// Years tolerate small drift (reprints, cover-date vs street-date) and the
/// classic-decade-vs-modern-reprint pattern.
fn year_score(source: Option<i32>, target: Option<i32>) -> f64 {
    let (y1, y2) = match (source, target) {
        (Some(a), Some(b)) => (a, b),
        _ => return NEUTRAL,
    };

    if y1 == y2 {
        return 1.0;
    }
    if (y1 - y2).abs() <= 2 {
        return 0.8;
    }

    let classic = |y: i32| (1960..2000).contains(&y);
    let modern = |y: i32| y >= 2000;
    if (modern(y1) && classic(y2)) || (modern(y2) && classic(y1)) {
        return 0.7;
    }

    0.0
}

/// Sequels compare on effective numbers: no suffix means the first entry,
/// and a mismatch is a strong negative signal left unsmoothed for the
/// filter stage.
fn sequel_score(source: &ParsedTitle, target: &ParsedTitle) -> f64 {
    if source.effective_sequel() == target.effective_sequel() {
        1.0
    } else {
        0.0
    }
}
