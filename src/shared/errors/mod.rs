mod matcher_error;

pub use matcher_error::{MatcherError, MatcherResult};
