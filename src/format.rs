//! Output formatting of search results as a markdown table or JSON.

use crate::image::SearchResultSet;

/// Output format for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Json,
    #[default]
    Markdown,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "markdown" | "md" | "table" => Some(OutputFormat::Markdown),
            _ => None,
        }
    }
}

/// Format result sets as a table with one row per image.
///
/// Rows are numbered across all sets, in the order the sets are given.
pub fn format_results_markdown(sets: &[SearchResultSet]) -> String {
    let mut md = String::new();
    md.push_str("| # | link | backend |\n");
    md.push_str("|---|------|---------|\n");

    let rows = sets.iter().flat_map(|set| set.results.iter());
    for (idx, result) in rows.enumerate() {
        md.push_str(&format!(
            "| {} | {} | {} |\n",
            idx + 1,
            result.url,
            result.backend_name
        ));
    }
    md
}

/// Format result sets as a JSON array, one object per backend.
pub fn format_results_json(sets: &[SearchResultSet]) -> String {
    let mut out = serde_json::to_string_pretty(sets).unwrap_or_else(|_| "[]".into());
    out.push('\n');
    out
}

pub fn format_results(sets: &[SearchResultSet], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format_results_json(sets),
        OutputFormat::Markdown => format_results_markdown(sets),
    }
}
