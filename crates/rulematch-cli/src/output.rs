//! Helpers for rendering command output.

use std::fmt::Display;
use std::io::Write;

use eyre::{Context, Result};
use rulematch::Query;
use serde::Serialize;

/// One line of `match` output.
#[derive(Debug, Serialize)]
pub(crate) struct MatchReport<'a> {
    pub document: &'a str,
    pub matched: bool,
}

/// One line of `classify` output.
#[derive(Debug, Serialize)]
pub(crate) struct ClassifyReport<'a> {
    pub document: &'a str,
    pub brand: Option<&'a str>,
    pub subbrand: Option<&'a str>,
}

pub(crate) fn write_json_line<T: Serialize>(writer: &mut dyn Write, report: &T) -> Result<()> {
    serde_json::to_writer(&mut *writer, report).wrap_err("failed to serialise report")?;
    writeln!(writer).wrap_err("failed to write report")
}

/// Write a rule's canonical form, or a marker when it compiled to nothing.
pub(crate) fn write_rule(writer: &mut dyn Write, label: &str, query: &Query) -> Result<()> {
    let rendered = query
        .root()
        .map_or_else(|| "<never matches>".to_owned(), ToString::to_string);
    writeln!(writer, "{label}: {rendered}")
        .wrap_err_with(|| format!("failed to write rule {label}"))
}

pub(crate) fn write_warning(writer: &mut dyn Write, warning: &dyn Display) -> Result<()> {
    writeln!(writer, "warning: {warning}").wrap_err("failed to write warning")
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn rendered(write: impl FnOnce(&mut dyn Write) -> Result<()>) -> String {
        let mut buf = Vec::new();
        write(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn match_report_is_one_json_line() {
        let out = rendered(|w| {
            write_json_line(
                w,
                &MatchReport {
                    document: "a.txt",
                    matched: true,
                },
            )
        });
        assert_eq!(out, "{\"document\":\"a.txt\",\"matched\":true}\n");
    }

    #[test]
    fn classify_report_keeps_null_fields() {
        let out = rendered(|w| {
            write_json_line(
                w,
                &ClassifyReport {
                    document: "-",
                    brand: Some("Stryker"),
                    subbrand: None,
                },
            )
        });
        assert_eq!(
            out,
            "{\"document\":\"-\",\"brand\":\"Stryker\",\"subbrand\":null}\n"
        );
    }

    #[rstest]
    #[case("stryker wright*", "query: (stryker AND wright*)\n")]
    #[case("\"Wall Street\" OR NOT gun", "query: (\"wall street\" OR NOT gun)\n")]
    #[case("AND OR", "query: <never matches>\n")]
    fn rule_renders_canonical_form(#[case] source: &str, #[case] expected: &str) {
        let query = Query::compile(source);
        assert_eq!(rendered(|w| write_rule(w, "query", &query)), expected);
    }

    #[test]
    fn warning_is_prefixed() {
        let warning = rulematch::QueryWarning::EmptyQuery;
        assert_eq!(
            rendered(|w| write_warning(w, &warning)),
            "warning: query is empty\n"
        );
    }
}
