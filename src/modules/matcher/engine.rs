use std::cmp::Ordering;
use std::path::Path;

use crate::modules::matcher::blocker;
use crate::modules::matcher::comparator::Comparator;
use crate::modules::matcher::config::MatcherConfig;
use crate::modules::matcher::filter::{MatchFilter, Verdict};
use crate::modules::matcher::fuzzy_cache::FuzzyHashCache;
use crate::modules::matcher::similarity::{HybridStrategy, SimilarityStrategy};
use crate::modules::matcher::types::{CandidatePair, FieldScores, MatchResult, RawComicRecord};
use crate::modules::parser::types::IssueNumber;
use crate::modules::parser::{ComicTitleParser, ParsedTitle};
use crate::shared::{MatcherError, MatcherResult};

/// The full matching pipeline: parse, block, score, veto, select.
pub struct ComicMatcher {
    parser: ComicTitleParser,
    config: MatcherConfig,
    strategy: Box<dyn SimilarityStrategy>,
    cache: FuzzyHashCache,
}

impl ComicMatcher {
    pub fn new() -> Self {
        Self {
            parser: ComicTitleParser::new(),
            config: MatcherConfig::default(),
            strategy: Box::new(HybridStrategy::default()),
            cache: FuzzyHashCache::empty(),
        }
    }

    /// Build a matcher from a validated configuration; the parser and the
    /// similarity strategy are both derived from it.
    pub fn with_config(config: MatcherConfig) -> MatcherResult<Self> {
        config.validate().map_err(MatcherError::Validation)?;
        let parser = ComicTitleParser::with_options(config.parser_options())
            .map_err(MatcherError::Validation)?;
        let strategy = HybridStrategy::weighted(
            config.jaro_winkler_weight,
            config.levenshtein_weight,
        );
        Ok(Self {
            parser,
            config,
            strategy: Box::new(strategy),
            cache: FuzzyHashCache::empty(),
        })
    }

    /// Attach a fuzzy hash cache loaded from disk.
    pub fn with_fuzzy_cache<P: AsRef<Path>>(mut self, path: P) -> MatcherResult<Self> {
        self.cache = FuzzyHashCache::load(path)?;
        Ok(self)
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn parser(&self) -> &ComicTitleParser {
        &self.parser
    }

    /// Parsed form of one record, consulting the cache before the parser.
    pub fn parse_record(&self, record: &RawComicRecord) -> ParsedTitle {
        if let Some(cached) = self.cache.get(&record.title, record.issue.as_deref()) {
            return cached.clone();
        }
        self.parser.parse_with(
            &record.title,
            record.issue.as_deref(),
            record.year,
            record.volume.as_deref(),
        )
    }

    /// Match every source record against the target set, keeping pairs at or
    /// above the threshold. Results are ordered by descending score, ties
    /// broken by input order.
    pub fn match_records(
        &self,
        source: &[RawComicRecord],
        target: &[RawComicRecord],
        threshold: Option<f64>,
    ) -> Vec<MatchResult> {
        let threshold = threshold.unwrap_or(self.config.threshold);
        let parsed_source: Vec<ParsedTitle> =
            source.iter().map(|r| self.parse_record(r)).collect();
        let parsed_target: Vec<ParsedTitle> =
            target.iter().map(|r| self.parse_record(r)).collect();

        let mut results: Vec<MatchResult> = self
            .scored_pairs(&parsed_source, &parsed_target)
            .into_iter()
            .filter(|pair| pair.aggregate_score >= threshold)
            .map(|pair| MatchResult {
                source: source[pair.source_index].clone(),
                target: target[pair.target_index].clone(),
                score: pair.aggregate_score,
                field_scores: pair.field_scores,
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
        });

        log::info!(
            "matched {} of {} source records against {} targets",
            results.len(),
            source.len(),
            target.len()
        );
        results
    }

    /// Best single match for one record, or `None` when nothing survives.
    ///
    /// An exact normalized title-and-issue hit short-circuits with a perfect
    /// score; otherwise candidates with an exact issue agreement outrank
    /// purely textual ones, then score decides, then input order.
    pub fn find_best_match(
        &self,
        record: &RawComicRecord,
        candidates: &[RawComicRecord],
    ) -> Option<MatchResult> {
        if candidates.is_empty() {
            return None;
        }

        let record_title = self.parser.normalizer().normalize(&record.title);
        let record_issue = record.issue.as_deref().and_then(IssueNumber::parse);
        for candidate in candidates {
            let candidate_issue =
                candidate.issue.as_deref().and_then(IssueNumber::parse);
            if self.parser.normalizer().normalize(&candidate.title) == record_title
                && candidate_issue == record_issue
            {
                return Some(MatchResult {
                    source: record.clone(),
                    target: candidate.clone(),
                    score: 1.0,
                    field_scores: FieldScores {
                        title: 1.0,
                        subtitle: 1.0,
                        issue: if record_issue.is_some() { 1.0 } else { 0.5 },
                        year: 0.5,
                        sequel: 1.0,
                    },
                });
            }
        }

        let parsed_source = vec![self.parse_record(record)];
        let parsed_target: Vec<ParsedTitle> =
            candidates.iter().map(|r| self.parse_record(r)).collect();

        let mut pairs = self.scored_pairs(&parsed_source, &parsed_target);
        pairs.retain(|pair| pair.aggregate_score >= self.config.threshold);
        pairs.sort_by(|a, b| {
            let a_exact = a.field_scores.issue == 1.0;
            let b_exact = b.field_scores.issue == 1.0;
            b_exact
                .cmp(&a_exact)
                .then(
                    b.aggregate_score
                        .partial_cmp(&a.aggregate_score)
                        .unwrap_or(Ordering::Equal),
                )
                .then(a.target_index.cmp(&b.target_index))
        });

        pairs.first().map(|pair| MatchResult {
            source: record.clone(),
            target: candidates[pair.target_index].clone(),
            score: pair.aggregate_score,
            field_scores: pair.field_scores,
        })
    }

    /// Blocked, scored, veto-filtered candidate pairs.
    fn scored_pairs(
        &self,
        source: &[ParsedTitle],
        target: &[ParsedTitle],
    ) -> Vec<CandidatePair> {
        let comparator = Comparator::new(self.strategy.as_ref(), &self.config);
        let filter = MatchFilter::new(self.strategy.as_ref(), &self.config);

        let mut pairs = Vec::new();
        for (i, j) in blocker::candidates(source, target, &self.config) {
            let s = &source[i];
            let t = &target[j];
            match filter.evaluate(s, t) {
                Verdict::Accept => {}
                Verdict::Reject(reason) => {
                    log::debug!(
                        "rejected '{}' vs '{}': {}",
                        s.clean_title,
                        t.clean_title,
                        reason
                    );
                    continue;
                }
            }

            let field_scores = comparator.compare(s, t);
            let aggregate_score = self.config.weights.aggregate(&field_scores);
            pairs.push(CandidatePair {
                source_index: i,
                target_index: j,
                field_scores,
                aggregate_score,
            });
        }
        pairs
    }
}

impl Default for ComicMatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::matcher::config::MatcherConfigBuilder;

    fn record(title: &str, issue: &str, year: i32) -> RawComicRecord {
        RawComicRecord::new(title).with_issue(issue).with_year(year)
    }

    #[test]
    fn test_identical_records_match_perfectly() {
        let matcher = ComicMatcher::new();
        let source = vec![record("Uncanny X-Men", "142", 1981)];
        let target = vec![record("Uncanny X-Men", "142", 1981)];

        let results = matcher.match_records(&source, &target, None);
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_flavor_prefix_variants_match() {
        let matcher = ComicMatcher::new();
        let source = vec![record("Uncanny X-Men", "142", 1981)];
        let target = vec![
            record("X-Men", "142", 1981),
            record("X-Force", "142", 1981),
        ];

        let results = matcher.match_records(&source, &target, None);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].target.title, "X-Men");
    }

    #[test]
    fn test_issue_mismatch_never_matches() {
        let matcher = ComicMatcher::new();
        let source = vec![record("X-Men", "142", 1981)];
        let target = vec![record("X-Men", "143", 1981)];
        assert!(matcher.match_records(&source, &target, None).is_empty());
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let matcher = ComicMatcher::new();
        // Same record apart from a far-apart classic-era year pair: every
        // field scores 1.0 except year at 0.0, so the aggregate is exactly
        // 0.9 and a threshold of exactly 0.9 must keep it
        let source = vec![record("X-Men", "142", 1964)];
        let target = vec![record("X-Men", "142", 1985)];

        let kept = matcher.match_records(&source, &target, Some(0.9));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].score, 0.9);
        assert!(matcher
            .match_records(&source, &target, Some(0.91))
            .is_empty());
    }

    #[test]
    fn test_perfect_pair_survives_threshold_of_one() {
        let matcher = ComicMatcher::new();
        let source = vec![record("X-Men", "142", 1981)];
        let target = vec![record("X-Men", "142", 1981)];

        // A threshold of 1.0 is valid configuration and must keep pairs
        // whose every field agrees
        let kept = matcher.match_records(&source, &target, Some(1.0));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].score, 1.0);
    }

    #[test]
    fn test_results_sorted_by_score() {
        let matcher = ComicMatcher::new();
        let source = vec![
            record("X-Men", "142", 1985),
            record("X-Men", "142", 1981),
        ];
        let target = vec![record("X-Men", "142", 1981)];

        let results = matcher.match_records(&source, &target, Some(0.5));
        assert_eq!(results.len(), 2);
        assert!(results[0].score >= results[1].score);
        assert_eq!(results[0].source.year, Some(1981));
    }

    #[test]
    fn test_find_best_match_exact_shortcut() {
        let matcher = ComicMatcher::new();
        let source = record("Uncanny X-Men", "142", 1981);
        let candidates = vec![
            record("Uncanny X-Men (1981)", "141", 1981),
            record("uncanny x-men", "142", 2006),
        ];

        let best = matcher.find_best_match(&source, &candidates);
        let best = best.unwrap();
        assert_eq!(best.target.issue.as_deref(), Some("142"));
        assert!((best.score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_find_best_match_prefers_exact_issue() {
        let matcher = ComicMatcher::new();
        let source = record("Uncanny X-Men", "142", 1981);
        let candidates = vec![
            RawComicRecord::new("X-Men").with_year(1981),
            record("X-Men", "142", 1985),
        ];

        let best = matcher.find_best_match(&source, &candidates).unwrap();
        assert_eq!(best.target.issue.as_deref(), Some("142"));
    }

    #[test]
    fn test_find_best_match_none_below_threshold() {
        let matcher = ComicMatcher::new();
        let source = record("X-Men", "142", 1981);
        // Unrelated title, no issue to agree on, distant year
        let candidates = vec![RawComicRecord::new("Daredevil").with_year(1977)];
        assert!(matcher.find_best_match(&source, &candidates).is_none());
    }

    #[test]
    fn test_empty_inputs() {
        let matcher = ComicMatcher::new();
        assert!(matcher.match_records(&[], &[], None).is_empty());
        let one = vec![record("X-Men", "142", 1981)];
        assert!(matcher.match_records(&one, &[], None).is_empty());
        assert!(matcher
            .find_best_match(&one[0], &[])
            .is_none());
    }

    #[test]
    fn test_custom_threshold_from_config() {
        let config = MatcherConfigBuilder::new().threshold(0.95).build().unwrap();
        let matcher = ComicMatcher::with_config(config).unwrap();
        let source = vec![record("X-Men", "142", 1964)];
        let target = vec![record("X-Men", "142", 1985)];
        // 0.9 falls below the configured 0.95 default
        assert!(matcher.match_records(&source, &target, None).is_empty());
    }
}
