use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::modules::matcher::types::FieldScores;
use crate::modules::parser::types::SpecialEdition;
use crate::modules::parser::ParserOptions;
use crate::shared::{MatcherError, MatcherResult};

/// Per-field weights used to collapse a score vector into one confidence
/// value.
///
/// Issue number carries the largest weight: once two records share a series
/// block, the issue number is the strongest disambiguator there is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldWeights {
    pub issue: f64,
    pub title: f64,
    pub year: f64,
    pub subtitle: f64,
    pub sequel: f64,
}

impl FieldWeights {
    pub fn sum(&self) -> f64 {
        self.issue + self.title + self.year + self.subtitle + self.sequel
    }

    /// Weighted sum of a field-score vector, in [0, 1] for valid weights.
    ///
    /// Rounded at 1e-9 so exactly-attainable scores land on exact values:
    /// a perfect pair must aggregate to 1.0, not 0.999..., or an inclusive
    /// threshold of 1.0 would drop it.
    pub fn aggregate(&self, scores: &FieldScores) -> f64 {
        let raw = self.issue * scores.issue
            + self.title * scores.title
            + self.year * scores.year
            + self.subtitle * scores.subtitle
            + self.sequel * scores.sequel;
        (raw * 1e9).round() / 1e9
    }
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            issue: 0.45,
            title: 0.30,
            year: 0.10,
            subtitle: 0.075,
            sequel: 0.075,
        }
    }
}

/// A special-edition vocabulary entry: a marker phrase and the edition tag
/// it maps to ("giant size" -> "giant-size").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditionMarker {
    pub pattern: String,
    pub tag: String,
}

/// Externalized settings for the whole matching pipeline.
///
/// Everything a deployment might tune lives here: weights, thresholds,
/// blocking geometry, the edition vocabulary, and the franchise alias
/// table. Validated eagerly at construction so a bad setup fails before
/// any record is parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub weights: FieldWeights,

    /// Jaro-Winkler share of the hybrid string similarity.
    pub jaro_winkler_weight: f64,
    /// Levenshtein share of the hybrid string similarity.
    pub levenshtein_weight: f64,

    /// Default acceptance threshold for `match_records`.
    pub threshold: f64,

    /// Number of leading series-key characters used as the blocking key.
    pub blocking_key_width: usize,
    /// At or below this many records per side, candidate generation scans
    /// the full cross-product instead of building an index.
    pub small_input_threshold: usize,

    /// Subtitle score when exactly one side has a subtitle. Many catalogs
    /// legitimately omit subtitles, so this is a mild penalty, not zero.
    pub subtitle_missing_score: f64,
    /// Below this subtitle similarity, two present subtitles are considered
    /// unrelated and the pair is vetoed.
    pub subtitle_reject_floor: f64,

    /// Special-edition vocabulary, tried in order.
    pub special_editions: Vec<EditionMarker>,
    /// Franchise alias table applied to series keys.
    pub aliases: HashMap<String, String>,
    /// Flavor prefixes stripped when deriving series keys.
    pub series_prefixes: Vec<String>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        let parser_defaults = ParserOptions::default();
        let special_editions = parser_defaults
            .special_editions
            .iter()
            .map(|(pattern, tag)| EditionMarker {
                pattern: pattern.clone(),
                tag: tag.as_tag().to_string(),
            })
            .collect();

        Self {
            weights: FieldWeights::default(),
            jaro_winkler_weight: 0.7,
            levenshtein_weight: 0.3,
            threshold: 0.7,
            blocking_key_width: 4,
            small_input_threshold: 50,
            subtitle_missing_score: 0.7,
            subtitle_reject_floor: 0.2,
            special_editions,
            aliases: parser_defaults.aliases,
            series_prefixes: parser_defaults.series_prefixes,
        }
    }
}

impl MatcherConfig {
    /// Load and validate a configuration from a JSON file.
    ///
    /// Absent fields fall back to defaults, so partial overrides work.
    pub fn from_file<P: AsRef<Path>>(path: P) -> MatcherResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: MatcherConfig = serde_json::from_str(&text)?;
        config
            .validate()
            .map_err(MatcherError::Validation)?;
        Ok(config)
    }

    /// Eager validation of every tunable.
    pub fn validate(&self) -> Result<(), String> {
        let weights = &self.weights;
        for (name, value) in [
            ("issue", weights.issue),
            ("title", weights.title),
            ("year", weights.year),
            ("subtitle", weights.subtitle),
            ("sequel", weights.sequel),
        ] {
            if value < 0.0 {
                return Err(format!("field weight '{}' must be non-negative", name));
            }
        }
        let weight_sum = weights.sum();
        if (weight_sum - 1.0).abs() > 0.01 {
            return Err(format!(
                "field weights must sum to 1.0, got {}",
                weight_sum
            ));
        }

        if self.jaro_winkler_weight < 0.0 || self.levenshtein_weight < 0.0 {
            return Err("similarity weights must be non-negative".to_string());
        }
        let sim_sum = self.jaro_winkler_weight + self.levenshtein_weight;
        if (sim_sum - 1.0).abs() > 0.01 {
            return Err(format!(
                "similarity weights must sum to 1.0, got {}",
                sim_sum
            ));
        }

        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            ));
        }
        if !(0.0..=1.0).contains(&self.subtitle_missing_score) {
            return Err("subtitle_missing_score must be within [0, 1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.subtitle_reject_floor) {
            return Err("subtitle_reject_floor must be within [0, 1]".to_string());
        }

        if self.blocking_key_width == 0 {
            return Err("blocking_key_width must be > 0".to_string());
        }

        for marker in &self.special_editions {
            if marker.pattern.trim().is_empty() {
                return Err("special edition marker pattern is empty".to_string());
            }
            marker.tag.parse::<SpecialEdition>()?;
        }

        if self.series_prefixes.iter().any(|p| p.trim().is_empty()) {
            return Err("series prefix entries must be non-empty".to_string());
        }

        Ok(())
    }

    /// View of the parser-relevant subset of this configuration.
    pub fn parser_options(&self) -> ParserOptions {
        let special_editions = self
            .special_editions
            .iter()
            .filter_map(|marker| {
                marker
                    .tag
                    .parse::<SpecialEdition>()
                    .ok()
                    .map(|tag| (marker.pattern.clone(), tag))
            })
            .collect();
        ParserOptions {
            special_editions,
            aliases: self.aliases.clone(),
            series_prefixes: self.series_prefixes.clone(),
        }
    }
}

/// Fluent builder mirroring the config fields, mostly for tests and for
/// callers that override a handful of knobs.
#[derive(Default)]
pub struct MatcherConfigBuilder {
    config: MatcherConfig,
}

impl MatcherConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: MatcherConfig::default(),
        }
    }

    pub fn weights(mut self, weights: FieldWeights) -> Self {
        self.config.weights = weights;
        self
    }

    pub fn similarity_weights(mut self, jaro_winkler: f64, levenshtein: f64) -> Self {
        self.config.jaro_winkler_weight = jaro_winkler;
        self.config.levenshtein_weight = levenshtein;
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.config.threshold = threshold;
        self
    }

    pub fn blocking_key_width(mut self, width: usize) -> Self {
        self.config.blocking_key_width = width;
        self
    }

    pub fn small_input_threshold(mut self, threshold: usize) -> Self {
        self.config.small_input_threshold = threshold;
        self
    }

    pub fn subtitle_missing_score(mut self, score: f64) -> Self {
        self.config.subtitle_missing_score = score;
        self
    }

    pub fn subtitle_reject_floor(mut self, floor: f64) -> Self {
        self.config.subtitle_reject_floor = floor;
        self
    }

    pub fn alias(mut self, from: &str, to: &str) -> Self {
        self.config
            .aliases
            .insert(from.to_string(), to.to_string());
        self
    }

    pub fn special_edition(mut self, pattern: &str, tag: &str) -> Self {
        self.config.special_editions.push(EditionMarker {
            pattern: pattern.to_string(),
            tag: tag.to_string(),
        });
        self
    }

    pub fn build(self) -> MatcherResult<MatcherConfig> {
        self.config
            .validate()
            .map_err(MatcherError::Validation)?;
        Ok(self.config)
    }
}
