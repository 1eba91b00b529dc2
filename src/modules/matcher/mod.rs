pub mod blocker;
pub mod comparator;
pub mod config;
pub mod engine;
pub mod filter;
pub mod fuzzy_cache;
pub mod similarity;
pub mod types;

pub use config::{FieldWeights, MatcherConfig, MatcherConfigBuilder};
pub use engine::ComicMatcher;
pub use filter::{RejectReason, Verdict};
pub use fuzzy_cache::FuzzyHashCache;
pub use similarity::{HybridStrategy, JaroWinklerStrategy, LevenshteinStrategy, SimilarityStrategy};
pub use types::{FieldScores, MatchResult, RawComicRecord};
