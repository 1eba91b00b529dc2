use std::io::Write;

use comic_matcher::{
    export_matches_to_csv, load_records, ComicMatcher, FuzzyHashCache, MatcherError,
    RawComicRecord,
};
use tempfile::NamedTempFile;

fn temp_file(extension: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{}", extension))
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_missing_cache_file_degrades_to_empty() {
    let matcher = ComicMatcher::new()
        .with_fuzzy_cache("/nonexistent/path/fuzzy.json")
        .unwrap();
    let source = vec![RawComicRecord::new("X-Men").with_issue("142")];
    let target = vec![RawComicRecord::new("X-Men").with_issue("142")];
    assert_eq!(matcher.match_records(&source, &target, None).len(), 1);
}

#[test]
fn test_corrupt_cache_file_is_a_hard_error() {
    let file = temp_file("json", "{not valid json");
    let result = ComicMatcher::new().with_fuzzy_cache(file.path());
    assert!(matches!(result, Err(MatcherError::Cache(_))));
}

#[test]
fn test_cache_entries_override_the_parser() {
    // Pin a parse that maps an obscure listing onto the x-men series key
    let parser = comic_matcher::ComicTitleParser::new();
    let pinned = parser.parse_with("X-Men", Some("142"), Some(1981), None);
    let mut entries = std::collections::HashMap::new();
    entries.insert(
        FuzzyHashCache::identity_key("Mutant Milestones Presents", Some("142")),
        pinned,
    );
    let file = temp_file("json", &serde_json::to_string(&entries).unwrap());

    let matcher = ComicMatcher::new().with_fuzzy_cache(file.path()).unwrap();
    let source = vec![RawComicRecord::new("Mutant Milestones Presents").with_issue("142")];
    let target = vec![RawComicRecord::new("X-Men")
        .with_issue("142")
        .with_year(1981)];

    let results = matcher.match_records(&source, &target, None);
    assert_eq!(results.len(), 1);
    assert!((results[0].score - 1.0).abs() < 1e-9);
}

#[test]
fn test_csv_to_matches_to_csv_round_trip() {
    let source = temp_file(
        "csv",
        "title,issue,year\nUncanny X-Men,142,1981\nDaredevil,181,1982\n",
    );
    let target = temp_file(
        "csv",
        "title,issue,year\nX-Men,142,1981\nBatman,404,1987\n",
    );

    let source_records = load_records(source.path()).unwrap();
    let target_records = load_records(target.path()).unwrap();

    let matcher = ComicMatcher::new();
    let matches = matcher.match_records(&source_records, &target_records, None);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].source.title, "Uncanny X-Men");
    assert_eq!(matches[0].target.title, "X-Men");

    let output = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    export_matches_to_csv(&matches, output.path()).unwrap();
    let text = std::fs::read_to_string(output.path()).unwrap();
    assert!(text.lines().count() >= 2);
    assert!(text.contains("Uncanny X-Men"));
}

#[test]
fn test_json_catalog_shapes_feed_the_matcher() {
    let wrapped = temp_file(
        "json",
        r#"{"comics": [{"title": "X-Men", "issue": 142, "year": 1981}]}"#,
    );
    let list = temp_file(
        "json",
        r#"[{"title": "Uncanny X-Men", "issue": "142", "year": 1981}]"#,
    );

    let source_records = load_records(list.path()).unwrap();
    let target_records = load_records(wrapped.path()).unwrap();

    let matcher = ComicMatcher::new();
    let matches = matcher.match_records(&source_records, &target_records, None);
    assert_eq!(matches.len(), 1);
}

#[test]
fn test_unsupported_input_format_reported() {
    let file = temp_file("txt", "X-Men #142");
    assert!(matches!(
        load_records(file.path()),
        Err(MatcherError::UnsupportedFormat(_))
    ));
}
