use std::collections::HashMap;

use crate::modules::matcher::config::MatcherConfig;
use crate::modules::parser::ParsedTitle;

/// Generate the (source, target) index pairs worth scoring.
///
/// Large inputs are bucketed by a cheap blocking key, the leading characters
/// of the series key, so matching avoids the full O(n*m) comparison; a true
/// match shares the key because matching requires a shared series anyway.
/// When both sides are at or below `small_input_threshold`, every pair is
/// emitted with no key gate: on tiny inputs recall beats blocking precision,
/// and the filter and threshold stages still discard unrelated pairs.
/// Output order is deterministic: ascending by source index, then target
/// index.
pub fn candidates(
    source: &[ParsedTitle],
    target: &[ParsedTitle],
    config: &MatcherConfig,
) -> Vec<(usize, usize)> {
    if source.is_empty() || target.is_empty() {
        return Vec::new();
    }

    let small = source.len() <= config.small_input_threshold
        && target.len() <= config.small_input_threshold;

    let pairs = if small {
        cross_product(source, target)
    } else {
        indexed_scan(source, target, config)
    };

    log::debug!(
        "blocking kept {} of {} possible pairs",
        pairs.len(),
        source.len() * target.len()
    );
    pairs
}

fn blocking_key(parsed: &ParsedTitle, width: usize) -> String {
    parsed.series_key.chars().take(width).collect()
}

fn cross_product(source: &[ParsedTitle], target: &[ParsedTitle]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::with_capacity(source.len() * target.len());
    for i in 0..source.len() {
        for j in 0..target.len() {
            pairs.push((i, j));
        }
    }
    pairs
}

fn indexed_scan(
    source: &[ParsedTitle],
    target: &[ParsedTitle],
    config: &MatcherConfig,
) -> Vec<(usize, usize)> {
    let width = config.blocking_key_width;

    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (j, t) in target.iter().enumerate() {
        index.entry(blocking_key(t, width)).or_default().push(j);
    }

    let mut pairs = Vec::new();
    for (i, s) in source.iter().enumerate() {
        if let Some(js) = index.get(&blocking_key(s, width)) {
            pairs.extend(js.iter().map(|&j| (i, j)));
        }
    }
    pairs
}
