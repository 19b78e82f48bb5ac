//! Command dispatch for the `rulematch` entrypoint.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::{ArgGroup, Args, Parser, Subcommand};
use eyre::Result;
use rulematch::{Classifier, MatchContext, Query, RuleSet};
use tracing::{debug, info, instrument};

use crate::config::{CliConfig, LogLevel};
use crate::error::CliError;
use crate::output::{ClassifyReport, MatchReport, write_json_line, write_rule, write_warning};

/// Name used for standard input, both on the command line and in reports.
pub const STDIN: &str = "-";

/// Evaluate boolean keyword rules against documents.
#[derive(Parser, Debug)]
#[command(name = "rulematch", author, version, about)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,
    /// Reject inputs larger than this many bytes.
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_document_bytes: Option<u64>,
    /// Command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Supported commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Report whether each document satisfies a query.
    Match(MatchArgs),
    /// Assign each document to the first matching brand and sub-brand.
    Classify(ClassifyArgs),
    /// Compile rules, print their canonical form and list warnings.
    Check(CheckArgs),
}

/// Arguments for `match`.
#[derive(Args, Debug)]
pub struct MatchArgs {
    /// Query to evaluate.
    #[arg(long, short)]
    pub query: String,
    /// Documents to read. Standard input is read when none are given.
    pub documents: Vec<PathBuf>,
}

/// Arguments for `classify`.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// JSON rule set file.
    #[arg(long, short)]
    pub rules: PathBuf,
    /// Documents to read. Standard input is read when none are given.
    pub documents: Vec<PathBuf>,
}

/// Arguments for `check`.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["query", "rules"])))]
pub struct CheckArgs {
    /// Query to check.
    #[arg(long, short)]
    pub query: Option<String>,
    /// JSON rule set file to check.
    #[arg(long, short)]
    pub rules: Option<PathBuf>,
    /// Exit with status 1 when any warning is reported.
    #[arg(long)]
    pub strict: bool,
}

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to report beyond the written output.
    Clean,
    /// `check --strict` found this many warnings.
    Warnings(usize),
}

/// Run the parsed command, writing results to `writer`.
///
/// # Errors
///
/// Returns an error if an input cannot be read, exceeds the size limit, or
/// holds an invalid rule set, or if writing results fails.
pub fn run(cli: &Cli, config: &CliConfig, writer: &mut dyn Write) -> Result<Outcome> {
    match &cli.command {
        Commands::Match(args) => handle_match(args, config, writer).map(|()| Outcome::Clean),
        Commands::Classify(args) => {
            handle_classify(args, config, writer).map(|()| Outcome::Clean)
        }
        Commands::Check(args) => handle_check(args, config, writer),
    }
}

#[instrument(skip_all, fields(documents = args.documents.len()))]
fn handle_match(args: &MatchArgs, config: &CliConfig, writer: &mut dyn Write) -> Result<()> {
    let query = Query::compile(&args.query);
    for path in document_paths(&args.documents) {
        let name = display_name(path);
        let text = read_input(path, config.max_document_bytes)?;
        let matched = query.matches(&text);
        debug!(document = %name, matched, "evaluated document");
        write_json_line(
            writer,
            &MatchReport {
                document: &name,
                matched,
            },
        )?;
    }
    Ok(())
}

#[instrument(skip_all, fields(rules = %args.rules.display()))]
fn handle_classify(args: &ClassifyArgs, config: &CliConfig, writer: &mut dyn Write) -> Result<()> {
    let classifier = load_classifier(&args.rules, config)?;
    for path in document_paths(&args.documents) {
        let name = display_name(path);
        let text = read_input(path, config.max_document_bytes)?;
        let classification = classifier.classify_context(&MatchContext::new(&text));
        debug!(document = %name, ?classification, "classified document");
        write_json_line(
            writer,
            &ClassifyReport {
                document: &name,
                brand: classification.as_ref().map(|c| c.brand.as_str()),
                subbrand: classification.as_ref().and_then(|c| c.subbrand.as_deref()),
            },
        )?;
    }
    Ok(())
}

#[instrument(skip_all, fields(strict = args.strict))]
fn handle_check(args: &CheckArgs, config: &CliConfig, writer: &mut dyn Write) -> Result<Outcome> {
    let count = match (&args.query, &args.rules) {
        (Some(source), _) => check_query(source, writer)?,
        (None, Some(path)) => check_rules(path, config, writer)?,
        (None, None) => {
            return Err(CliError::InvalidConfig("check needs --query or --rules".to_owned()).into());
        }
    };

    if args.strict && count > 0 {
        Ok(Outcome::Warnings(count))
    } else {
        Ok(Outcome::Clean)
    }
}

fn check_query(source: &str, writer: &mut dyn Write) -> Result<usize> {
    let query = Query::compile(source);
    write_rule(writer, "query", &query)?;
    for warning in query.warnings() {
        write_warning(writer, warning)?;
    }
    Ok(query.warnings().len())
}

fn check_rules(path: &Path, config: &CliConfig, writer: &mut dyn Write) -> Result<usize> {
    let classifier = load_classifier(path, config)?;
    for rule in classifier.rules() {
        let label = rule.subbrand.map_or_else(
            || rule.brand.to_owned(),
            |sub| format!("{} / {sub}", rule.brand),
        );
        write_rule(writer, &label, rule.query)?;
    }
    for warning in classifier.warnings() {
        write_warning(writer, warning)?;
    }
    Ok(classifier.warnings().len())
}

fn load_classifier(path: &Path, config: &CliConfig) -> Result<Classifier, CliError> {
    let source = read_input(path, config.max_document_bytes)?;
    let rules = RuleSet::from_json(&source).map_err(|source| CliError::Rules {
        path: display_name(path),
        source,
    })?;
    let classifier = rules.compile();
    info!(
        brands = classifier.len(),
        warnings = classifier.warnings().len(),
        "loaded rule set"
    );
    Ok(classifier)
}

fn document_paths(documents: &[PathBuf]) -> Vec<&Path> {
    if documents.is_empty() {
        vec![Path::new(STDIN)]
    } else {
        documents.iter().map(PathBuf::as_path).collect()
    }
}

fn display_name(path: &Path) -> String {
    path.display().to_string()
}

/// Read a file, or standard input for `-`, refusing more than `limit` bytes.
fn read_input(path: &Path, limit: u64) -> Result<String, CliError> {
    let name = display_name(path);
    if path == Path::new(STDIN) {
        return read_limited(io::stdin().lock(), &name, limit);
    }
    let file = File::open(path).map_err(|source| CliError::Read {
        path: name.clone(),
        source,
    })?;
    read_limited(file, &name, limit)
}

/// Invalid UTF-8 sequences become U+FFFD.
fn read_limited(reader: impl Read, name: &str, limit: u64) -> Result<String, CliError> {
    let mut bytes = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|source| CliError::Read {
            path: name.to_owned(),
            source,
        })?;
    if u64::try_from(bytes.len()).unwrap_or(u64::MAX) > limit {
        return Err(CliError::DocumentTooLarge {
            path: name.to_owned(),
            limit,
        });
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    const RULES: &str = r#"{
        "brands": [
            {
                "name": "Stryker",
                "rule": "stryker OR \"salvation beams\"",
                "subbrands": [
                    { "name": "Salvation", "rule": "\"salvation beams\" OR salvationbeam*" },
                    { "name": "T2", "rule": "\"t2 femur\" NOT (stock OR" }
                ]
            },
            { "name": "Tornier", "rule": "\"aequalis humeral nail\"" }
        ]
    }"#;

    #[fixture]
    fn workspace() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("rules.json"), RULES).unwrap();
        fs::write(
            dir.path().join("stryker.html"),
            "<p>The Salvation Beams system by Stryker</p>",
        )
        .unwrap();
        fs::write(
            dir.path().join("tornier.txt"),
            "Aequalis Humeral Nail delivers stable fixation",
        )
        .unwrap();
        fs::write(dir.path().join("gaming.txt"), "Mortal Kombat tournament").unwrap();
        dir
    }

    fn run_args(args: &[&str], config: &CliConfig) -> (Result<Outcome>, String) {
        let cli = Cli::try_parse_from(std::iter::once("rulematch").chain(args.iter().copied()))
            .unwrap();
        let mut out = Vec::new();
        let outcome = run(&cli, config, &mut out);
        (outcome, String::from_utf8(out).unwrap())
    }

    fn path_str(dir: &TempDir, file: &str) -> String {
        dir.path().join(file).display().to_string()
    }

    #[rstest]
    fn match_reports_each_document(workspace: TempDir) {
        let stryker = path_str(&workspace, "stryker.html");
        let gaming = path_str(&workspace, "gaming.txt");
        let (outcome, out) = run_args(
            &["match", "--query", "stryker OR wright*", &stryker, &gaming],
            &CliConfig::default(),
        );
        assert_eq!(outcome.unwrap(), Outcome::Clean);
        let expected = format!(
            "{{\"document\":\"{stryker}\",\"matched\":true}}\n{{\"document\":\"{gaming}\",\"matched\":false}}\n"
        );
        assert_eq!(out, expected);
    }

    #[rstest]
    fn classify_picks_first_brand_and_subbrand(workspace: TempDir) {
        let rules = path_str(&workspace, "rules.json");
        let stryker = path_str(&workspace, "stryker.html");
        let tornier = path_str(&workspace, "tornier.txt");
        let gaming = path_str(&workspace, "gaming.txt");
        let (outcome, out) = run_args(
            &["classify", "--rules", &rules, &stryker, &tornier, &gaming],
            &CliConfig::default(),
        );
        assert_eq!(outcome.unwrap(), Outcome::Clean);
        let lines: Vec<serde_json::Value> = out
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(
            lines,
            vec![
                serde_json::json!({"document": stryker, "brand": "Stryker", "subbrand": "Salvation"}),
                serde_json::json!({"document": tornier, "brand": "Tornier", "subbrand": null}),
                serde_json::json!({"document": gaming, "brand": null, "subbrand": null}),
            ]
        );
    }

    #[rstest]
    fn check_rules_lists_canonical_forms_and_warnings(workspace: TempDir) {
        let rules = path_str(&workspace, "rules.json");
        let (outcome, out) = run_args(&["check", "--rules", &rules], &CliConfig::default());
        assert_eq!(outcome.unwrap(), Outcome::Clean);
        assert!(out.contains("Stryker: (stryker OR \"salvation beams\")\n"));
        assert!(out.contains("Stryker / Salvation: (\"salvation beams\" OR salvationbeam*)\n"));
        assert!(out.contains("Tornier: \"aequalis humeral nail\"\n"));
        assert!(out.contains("warning: brand `Stryker` sub-brand `T2`: "));
    }

    #[rstest]
    #[case(&["check", "--query", "stryker OR (wright*"], Outcome::Clean)]
    #[case(&["check", "--strict", "--query", "stryker OR (wright*"], Outcome::Warnings(1))]
    #[case(&["check", "--strict", "--query", "stryker OR wright*"], Outcome::Clean)]
    fn check_query_outcome(#[case] args: &[&str], #[case] expected: Outcome) {
        let (outcome, out) = run_args(args, &CliConfig::default());
        assert_eq!(outcome.unwrap(), expected);
        assert!(out.starts_with("query: (stryker OR wright*)\n"));
    }

    #[test]
    fn check_requires_exactly_one_source() {
        let none = Cli::try_parse_from(["rulematch", "check"]);
        assert!(none.is_err());
        let both = Cli::try_parse_from(["rulematch", "check", "-q", "a", "-r", "rules.json"]);
        assert!(both.is_err());
    }

    #[rstest]
    fn oversized_documents_are_rejected(workspace: TempDir) {
        let stryker = path_str(&workspace, "stryker.html");
        let config = CliConfig::default().apply_overrides(None, Some(8));
        let (outcome, out) = run_args(&["match", "-q", "stryker", &stryker], &config);
        let err = outcome.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::DocumentTooLarge { limit: 8, .. })
        ));
        assert!(out.is_empty());
    }

    #[rstest]
    fn invalid_rule_set_is_reported(workspace: TempDir) {
        let bad = workspace.path().join("bad.json");
        fs::write(&bad, r#"{"brands": [{"name": " ", "rule": "a"}]}"#).unwrap();
        let bad = bad.display().to_string();
        let (outcome, _) = run_args(&["classify", "-r", &bad], &CliConfig::default());
        let err = outcome.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::Rules { .. })
        ));
    }

    #[test]
    fn missing_document_is_a_read_error() {
        let (outcome, _) = run_args(
            &["match", "-q", "a", "/definitely/not/here.txt"],
            &CliConfig::default(),
        );
        let err = outcome.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::Read { .. })
        ));
    }

    #[rstest]
    #[case(b"exact".as_slice(), 5, true)]
    #[case(b"longer".as_slice(), 5, false)]
    #[case(b"".as_slice(), 1, true)]
    fn read_limited_enforces_the_limit(
        #[case] input: &[u8],
        #[case] limit: u64,
        #[case] accepted: bool,
    ) {
        assert_eq!(read_limited(input, "-", limit).is_ok(), accepted);
    }

    #[test]
    fn read_limited_replaces_invalid_utf8() {
        let text = read_limited(b"caf\xff ok".as_slice(), "-", 64).unwrap();
        assert_eq!(text, "caf\u{fffd} ok");
    }

    #[test]
    fn no_documents_means_stdin() {
        assert_eq!(document_paths(&[]), vec![Path::new(STDIN)]);
        let given = vec![PathBuf::from("a.txt")];
        assert_eq!(document_paths(&given), vec![Path::new("a.txt")]);
    }
}
