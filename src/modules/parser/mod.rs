pub mod normalizer;
pub mod special_cases;
pub mod title_parser;
pub mod types;

pub use normalizer::Normalizer;
pub use title_parser::{ComicTitleParser, ParserOptions};
pub use types::{IssueNumber, ParsedTitle, SpecialEdition};
