pub mod modules;
pub mod shared;

pub use modules::io::{export_matches_to_csv, export_matches_to_json, load_records};
pub use modules::matcher::{
    ComicMatcher, FieldScores, FieldWeights, FuzzyHashCache, HybridStrategy, MatchResult,
    MatcherConfig, MatcherConfigBuilder, RawComicRecord, SimilarityStrategy,
};
pub use modules::parser::{ComicTitleParser, IssueNumber, ParsedTitle, SpecialEdition};
pub use shared::{MatcherError, MatcherResult};
