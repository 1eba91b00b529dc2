use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use comic_matcher::{
    export_matches_to_csv, export_matches_to_json, load_records, ComicMatcher, ComicTitleParser,
    MatcherConfig,
};

#[derive(Parser)]
#[command(name = "comic-matcher", version, about = "Entity resolution for comic book issues")]
struct Cli {
    /// Log level filter (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Match two comic catalogs against each other
    Match {
        /// Source records (CSV or JSON)
        source: PathBuf,
        /// Target records (CSV or JSON)
        target: PathBuf,
        /// Write matches to this file (CSV or JSON by extension); stdout otherwise
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Minimum confidence score, overriding the configured default
        #[arg(short, long)]
        threshold: Option<f64>,
        /// Precomputed fuzzy hash cache (JSON)
        #[arg(short, long)]
        fuzzy_hash: Option<PathBuf>,
        /// Matcher configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print per-field score breakdowns
        #[arg(short, long)]
        verbose: bool,
    },
    /// Parse a single title and print its structured form
    Parse {
        /// The raw title string
        title: String,
        /// Issue number supplied out of band
        #[arg(long)]
        issue: Option<String>,
        /// Publication year supplied out of band
        #[arg(long)]
        year: Option<i32>,
        /// Volume supplied out of band
        #[arg(long)]
        volume: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .parse_filters(&cli.log_level)
        .init();

    match cli.command {
        Command::Match {
            source,
            target,
            output,
            threshold,
            fuzzy_hash,
            config,
            verbose,
        } => run_match(source, target, output, threshold, fuzzy_hash, config, verbose),
        Command::Parse {
            title,
            issue,
            year,
            volume,
        } => run_parse(&title, issue.as_deref(), year, volume.as_deref()),
    }
}

fn run_match(
    source: PathBuf,
    target: PathBuf,
    output: Option<PathBuf>,
    threshold: Option<f64>,
    fuzzy_hash: Option<PathBuf>,
    config: Option<PathBuf>,
    verbose: bool,
) -> anyhow::Result<()> {
    let config = match config {
        Some(path) => MatcherConfig::from_file(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MatcherConfig::default(),
    };

    let mut matcher = ComicMatcher::with_config(config)?;
    if let Some(path) = fuzzy_hash {
        matcher = matcher
            .with_fuzzy_cache(&path)
            .with_context(|| format!("loading fuzzy hash cache {}", path.display()))?;
    }

    let source_records =
        load_records(&source).with_context(|| format!("loading {}", source.display()))?;
    let target_records =
        load_records(&target).with_context(|| format!("loading {}", target.display()))?;

    let matches = matcher.match_records(&source_records, &target_records, threshold);

    match output {
        Some(path) => {
            let extension = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_lowercase);
            match extension.as_deref() {
                Some("json") => export_matches_to_json(&matches, &path)?,
                _ => export_matches_to_csv(&matches, &path)?,
            }
            println!("{} matches written to {}", matches.len(), path.display());
        }
        None => {
            for result in &matches {
                println!(
                    "{:.3}  {} #{}  ->  {} #{}",
                    result.score,
                    result.source.title,
                    result.source.issue.as_deref().unwrap_or("-"),
                    result.target.title,
                    result.target.issue.as_deref().unwrap_or("-"),
                );
                if verbose {
                    println!(
                        "       title {:.3}  subtitle {:.3}  issue {:.3}  year {:.3}  sequel {:.3}",
                        result.field_scores.title,
                        result.field_scores.subtitle,
                        result.field_scores.issue,
                        result.field_scores.year,
                        result.field_scores.sequel,
                    );
                }
            }
            println!("{} matches", matches.len());
        }
    }
    Ok(())
}

fn run_parse(
    title: &str,
    issue: Option<&str>,
    year: Option<i32>,
    volume: Option<&str>,
) -> anyhow::Result<()> {
    let parser = ComicTitleParser::new();
    let parsed = parser.parse_with(title, issue, year, volume);
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}
