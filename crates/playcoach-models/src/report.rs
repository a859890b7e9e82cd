//! Human-readable rendering of analyses.
//!
//! `format_analysis` produces the plain-text report for one document and
//! `render_html` wraps a set of already formatted reports into a listing
//! page. All stored content is HTML-escaped before it is embedded.

use std::fmt::Write;

use crate::analysis::AnalysisDocument;

/// Render an analysis as plain text with a fixed section order.
pub fn format_analysis(doc: &AnalysisDocument) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "Game: {}\n", doc.game);

    out.push_str("Key Focus Areas:\n");
    for area in &doc.key_focus_areas {
        let _ = writeln!(out, "- {}", area);
    }

    out.push_str("\nMistakes:\n");
    for mistake in &doc.mistakes {
        let _ = writeln!(out, "  Timestamp: {}", mistake.timestamp);
        let _ = writeln!(out, "  Description: {}", mistake.description);
        let _ = writeln!(out, "  Why Incorrect: {}", mistake.why_incorrect);
        let _ = writeln!(out, "  Better Alternative: {}", mistake.better_alternative);
        let _ = writeln!(out, "  Expected Benefit: {}", mistake.expected_benefit);
        out.push('\n');
    }

    out.push_str("Repeated Errors:\n");
    for error in &doc.repeated_errors {
        let _ = writeln!(out, "  Pattern: {}", error.pattern);
        let _ = writeln!(out, "  Occurrences: {}", error.occurrences.join(", "));
        let _ = writeln!(out, "  Fix: {}", error.fix);
        out.push('\n');
    }

    out.push_str("Missed Opportunities:\n");
    for opportunity in &doc.missed_opportunities {
        let _ = writeln!(out, "  Timestamp: {}", opportunity.timestamp);
        let _ = writeln!(out, "  Missed Action: {}", opportunity.missed_action);
        let _ = writeln!(out, "  Expected Outcome: {}", opportunity.expected_outcome);
        out.push('\n');
    }

    out
}

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Video Analyses</title>
    <style>
        body { font-family: sans-serif; }
        .analysis { border: 1px solid #ccc; margin-bottom: 10px; padding: 10px; }
    </style>
</head>
<body>
    <h1>Video Analyses</h1>
"#;

const PAGE_TAIL: &str = "</body>\n</html>\n";

/// Render a listing page from `(video name, formatted report)` pairs.
///
/// Entries appear in the order given.
pub fn render_html<N, T>(analyses: &[(N, T)]) -> String
where
    N: AsRef<str>,
    T: AsRef<str>,
{
    let mut html = String::from(PAGE_HEAD);

    for (name, text) in analyses {
        let _ = write!(
            html,
            "    <div class=\"analysis\">\n        <h2>Video: {}</h2>\n        <pre>{}</pre>\n    </div>\n",
            escape_html(name.as_ref()),
            escape_html(text.as_ref())
        );
    }

    html.push_str(PAGE_TAIL);
    html
}

/// Escape text for inclusion in HTML element content or attributes.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}
