use std::collections::BTreeSet;

use strsim::{jaro_winkler, normalized_levenshtein};

/// Strategy for scoring how alike two already-normalized strings are.
///
/// Kept behind a trait so the comparator can swap algorithms without
/// touching the pipeline.
pub trait SimilarityStrategy: Send + Sync {
    /// Returns a value between 0.0 (unrelated) and 1.0 (identical).
    fn calculate(&self, left: &str, right: &str) -> f64;

    /// Strategy name for logging.
    fn name(&self) -> &'static str;
}

/// Jaro-Winkler similarity.
///
/// Favors matching prefixes, which suits series titles: catalogs tend to
/// agree on how a title starts and diverge in trailing qualifiers.
#[derive(Debug, Clone)]
pub struct JaroWinklerStrategy;

impl SimilarityStrategy for JaroWinklerStrategy {
    fn calculate(&self, left: &str, right: &str) -> f64 {
        jaro_winkler(left, right)
    }

    fn name(&self) -> &'static str {
        "JaroWinkler"
    }
}

/// Normalized Levenshtein similarity, good at catching typos.
#[derive(Debug, Clone)]
pub struct LevenshteinStrategy;

impl SimilarityStrategy for LevenshteinStrategy {
    fn calculate(&self, left: &str, right: &str) -> f64 {
        normalized_levenshtein(left, right)
    }

    fn name(&self) -> &'static str {
        "Levenshtein"
    }
}

/// Weighted blend of Jaro-Winkler and Levenshtein.
pub struct HybridStrategy {
    strategies: Vec<(Box<dyn SimilarityStrategy>, f64)>,
}

impl HybridStrategy {
    /// Build a blend from validated weights. Weights must already sum to
    /// ~1.0; configuration validation guarantees this before construction.
    pub fn weighted(jaro_winkler_weight: f64, levenshtein_weight: f64) -> Self {
        let weight_sum = jaro_winkler_weight + levenshtein_weight;
        assert!(
            (weight_sum - 1.0).abs() < 0.01,
            "similarity weights must sum to 1.0, got {}",
            weight_sum
        );
        Self {
            strategies: vec![
                (Box::new(JaroWinklerStrategy), jaro_winkler_weight),
                (Box::new(LevenshteinStrategy), levenshtein_weight),
            ],
        }
    }
}

impl Default for HybridStrategy {
    fn default() -> Self {
        Self::weighted(0.7, 0.3)
    }
}

impl SimilarityStrategy for HybridStrategy {
    fn calculate(&self, left: &str, right: &str) -> f64 {
        self.strategies
            .iter()
            .map(|(strategy, weight)| strategy.calculate(left, right) * weight)
            .sum()
    }

    fn name(&self) -> &'static str {
        "Hybrid"
    }
}

/// Jaccard overlap between two unordered token sets.
///
/// Used for team-up member comparison, where written order is presentation
/// and must not affect matching.
pub fn jaccard(left: &BTreeSet<String>, right: &BTreeSet<String>) -> f64 {
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let intersection = left.intersection(right).count() as f64;
    let union = left.union(right).count() as f64;
    intersection / union
}

/// Rebuild a string with its whitespace tokens sorted.
///
/// Comparing both the as-written and token-sorted forms makes title
/// similarity insensitive to word order ("spider-man peter parker" vs
/// "peter parker spider-man").
pub fn token_sorted(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
