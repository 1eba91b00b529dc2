/// A single string-level cleanup step.
///
/// Each transformation is composable and testable in isolation.
pub trait TitleTransformation: Send + Sync {
    fn transform(&self, title: &str) -> String;
    fn name(&self) -> &'static str;
}

/// Converts the title to lowercase.
#[derive(Debug, Clone)]
pub struct LowercaseTransform;

impl TitleTransformation for LowercaseTransform {
    fn transform(&self, title: &str) -> String {
        title.to_lowercase()
    }

    fn name(&self) -> &'static str {
        "Lowercase"
    }
}

/// Replaces punctuation with spaces, keeping hyphens and slashes.
///
/// Hyphens and slashes are load-bearing in this domain: "Spider-Man" is one
/// word and "Cloak/Dagger" is a team-up join, so neither may be destroyed.
/// Apostrophes are elided rather than spaced so "Marvel's" stays one word.
#[derive(Debug, Clone)]
pub struct StripPunctuationTransform;

impl TitleTransformation for StripPunctuationTransform {
    fn transform(&self, title: &str) -> String {
        let mut result = String::with_capacity(title.len());
        for c in title.chars() {
            if c == '\'' || c == '\u{2019}' {
                continue;
            }
            if c.is_alphanumeric() || c.is_whitespace() || c == '-' || c == '/' {
                result.push(c);
            } else {
                result.push(' ');
            }
        }
        result
    }

    fn name(&self) -> &'static str {
        "StripPunctuation"
    }
}

/// Collapses runs of whitespace and trims the ends.
#[derive(Debug, Clone)]
pub struct CollapseWhitespaceTransform;

impl TitleTransformation for CollapseWhitespaceTransform {
    fn transform(&self, title: &str) -> String {
        title.split_whitespace().collect::<Vec<&str>>().join(" ")
    }

    fn name(&self) -> &'static str {
        "CollapseWhitespace"
    }
}

/// Strips leading articles ("the", "a", "an"), repeatedly.
#[derive(Debug, Clone)]
pub struct StripArticlesTransform {
    articles: Vec<String>,
}

impl StripArticlesTransform {
    pub fn new(articles: Vec<String>) -> Self {
        Self { articles }
    }
}

impl TitleTransformation for StripArticlesTransform {
    fn transform(&self, title: &str) -> String {
        let mut result = title.trim();
        'outer: loop {
            for article in &self.articles {
                let prefix = format!("{} ", article);
                if let Some(rest) = result.strip_prefix(prefix.as_str()) {
                    result = rest.trim_start();
                    continue 'outer;
                }
            }
            break;
        }
        result.to_string()
    }

    fn name(&self) -> &'static str {
        "StripArticles"
    }
}

/// Pure string-level cleanup applied before any comparison.
///
/// Built as a pipeline of transformations so individual steps stay
/// independently testable. The composed pipeline is total (empty input
/// yields empty output) and idempotent.
pub struct Normalizer {
    transformations: Vec<Box<dyn TitleTransformation>>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            transformations: Vec::new(),
        }
    }

    /// Standard pipeline for comic titles: lowercase, drop punctuation
    /// except hyphen/slash, collapse whitespace, strip leading articles.
    pub fn comic_defaults() -> Self {
        Self::new()
            .with_lowercase()
            .with_strip_punctuation()
            .with_collapse_whitespace()
            .with_strip_articles(vec![
                "the".to_string(),
                "a".to_string(),
                "an".to_string(),
            ])
    }

    pub fn with_lowercase(mut self) -> Self {
        self.transformations.push(Box::new(LowercaseTransform));
        self
    }

    pub fn with_strip_punctuation(mut self) -> Self {
        self.transformations.push(Box::new(StripPunctuationTransform));
        self
    }

    pub fn with_collapse_whitespace(mut self) -> Self {
        self.transformations
            .push(Box::new(CollapseWhitespaceTransform));
        self
    }

    pub fn with_strip_articles(mut self, articles: Vec<String>) -> Self {
        self.transformations
            .push(Box::new(StripArticlesTransform::new(articles)));
        self
    }

    /// Apply every transformation in order. Never fails.
    pub fn normalize(&self, title: &str) -> String {
        let mut result = title.to_string();
        for transformation in &self.transformations {
            result = transformation.transform(&result);
            log::trace!("After {}: '{}'", transformation.name(), result);
        }
        result
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::comic_defaults()
    }
}
