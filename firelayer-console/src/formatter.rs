//! Output formatters for console results.

use clap::ValueEnum;
use serde_json::Value;

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Indented JSON, one document after another
    #[default]
    Pretty,
    /// One compact JSON document per line
    Lines,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Pretty => write!(f, "pretty"),
            OutputFormat::Lines => write!(f, "lines"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format one document.
    fn format_document(&self, document: &Value) -> String;

    /// Format a list of documents.
    fn format_documents(&self, documents: &[Value]) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Pretty => Box::new(PrettyFormatter),
        OutputFormat::Lines => Box::new(LinesFormatter),
    }
}

fn count_footer(count: usize) -> String {
    match count {
        1 => "(1 document)".to_string(),
        n => format!("({n} documents)"),
    }
}

/// Indented JSON.
pub struct PrettyFormatter;

impl Formatter for PrettyFormatter {
    fn format_document(&self, document: &Value) -> String {
        serde_json::to_string_pretty(document).unwrap_or_else(|_| document.to_string())
    }

    fn format_documents(&self, documents: &[Value]) -> String {
        if documents.is_empty() {
            return "No results".to_string();
        }

        let mut output: Vec<String> = documents
            .iter()
            .map(|document| self.format_document(document))
            .collect();
        output.push(count_footer(documents.len()));
        output.join("\n")
    }
}

/// Compact JSON, one document per line.
pub struct LinesFormatter;

impl Formatter for LinesFormatter {
    fn format_document(&self, document: &Value) -> String {
        document.to_string()
    }

    fn format_documents(&self, documents: &[Value]) -> String {
        if documents.is_empty() {
            return "No results".to_string();
        }

        documents
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
