use std::io::Write;

use crossterm::style::Stylize;

use crate::args::OutputFormat;
use crate::error::{AppResult, ReportError};
use crate::probe::{NO_BODY, ProbeResult};

const NO_HEADERS: &str = "[No headers available]";

/// One table row: url, protocol, method, status, duration.
#[must_use]
pub fn format_row(result: &ProbeResult, no_color: bool) -> String {
    let status = status_line(result);
    let status = if no_color {
        status
    } else if result.is_success() {
        status.green().to_string()
    } else {
        status.red().to_string()
    };
    format!(
        "{}\t{}\t{}\t{}\t{}ms",
        result.url,
        result.protocol,
        result.method,
        status,
        result.duration_ms
    )
}

/// Full response view: request line, headers, then the body (or the error).
#[must_use]
pub fn format_details(result: &ProbeResult) -> String {
    let mut lines = vec![
        format!("Response Details: {} {}", result.method, result.url),
        format!("URL: {}", result.full_url),
        format!("Method: {}", result.method),
        format!("Status: {}", status_line(result)),
        format!("Time: {}ms", result.duration_ms),
        String::new(),
        "Headers:".to_owned(),
    ];
    if result.headers.is_empty() {
        lines.push(NO_HEADERS.to_owned());
    } else {
        lines.extend(
            result
                .headers
                .iter()
                .map(|(key, value)| format!("{}: {}", key, value)),
        );
    }
    lines.push(String::new());
    lines.push("Body:".to_owned());
    lines.push(display_body(result).to_owned());
    lines.join("\n")
}

fn status_line(result: &ProbeResult) -> String {
    if result.status_text.is_empty() {
        result.status.to_string()
    } else {
        format!("{} {}", result.status, result.status_text)
    }
}

fn display_body(result: &ProbeResult) -> &str {
    [result.body.as_deref(), result.error.as_deref()]
        .into_iter()
        .flatten()
        .find(|text| !text.is_empty())
        .unwrap_or(NO_BODY)
}

/// Streams shown results to a writer in the selected output format.
pub struct ResultPrinter<W: Write> {
    writer: W,
    format: OutputFormat,
    details: bool,
    no_color: bool,
}

impl<W: Write> ResultPrinter<W> {
    pub const fn new(writer: W, format: OutputFormat, details: bool, no_color: bool) -> Self {
        Self {
            writer,
            format,
            details,
            no_color,
        }
    }

    /// Writes one result.
    ///
    /// # Errors
    ///
    /// Returns an error when the writer fails or the result cannot be
    /// serialized.
    pub fn print(&mut self, result: &ProbeResult) -> AppResult<()> {
        match self.format {
            OutputFormat::Text => {
                writeln!(self.writer, "{}", format_row(result, self.no_color))?;
                if self.details {
                    writeln!(self.writer, "{}\n", format_details(result))?;
                }
            }
            OutputFormat::Jsonl => {
                let line = serde_json::to_string(result)
                    .map_err(|err| ReportError::Serialize { source: err })?;
                writeln!(self.writer, "{}", line)?;
            }
            OutputFormat::Quiet => {}
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Writes a trailing line in text mode; other formats stay machine-readable.
    ///
    /// # Errors
    ///
    /// Returns an error when the writer fails.
    pub fn print_footer(&mut self, footer: &str) -> AppResult<()> {
        if matches!(self.format, OutputFormat::Text) {
            writeln!(self.writer, "{}", footer)?;
            self.writer.flush()?;
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
