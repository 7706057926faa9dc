use std::path::PathBuf;

use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::error::ReportError;

const STDIN_PATH: &str = "-";

/// Splits newline-separated text into URLs, trimming and dropping blank lines.
#[must_use]
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Reads a URL list from `path`, or from stdin when `path` is `-`.
///
/// # Errors
///
/// Returns an error when the file or stdin cannot be read.
pub async fn read_url_source(path: &str) -> Result<Vec<String>, ReportError> {
    let text = if path == STDIN_PATH {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .map_err(|err| ReportError::ReadStdin { source: err })?;
        text
    } else {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|err| ReportError::ReadUrlFile {
                path: PathBuf::from(path),
                source: err,
            })?
    };
    let urls = parse_url_list(&text);
    debug!("Read {} url(s) from {}", urls.len(), path);
    Ok(urls)
}

/// Inline URLs first, then those from the URL source, in order.
///
/// # Errors
///
/// Returns an error when the URL source cannot be read.
pub async fn collect_urls(
    inline: &[String],
    source: Option<&str>,
) -> Result<Vec<String>, ReportError> {
    let mut urls: Vec<String> = inline
        .iter()
        .map(|url| url.trim())
        .filter(|url| !url.is_empty())
        .map(str::to_owned)
        .collect();
    if let Some(path) = source {
        urls.extend(read_url_source(path).await?);
    }
    Ok(urls)
}
