use tracing::warn;

use crate::args::{HttpMethod, Protocol};
use crate::error::{InputSet, ValidationError};

use super::types::Task;

const SCHEMES: [&str; 2] = ["http://", "https://"];

/// True when the URL already starts with `http://` or `https://`.
#[must_use]
pub fn has_explicit_scheme(url: &str) -> bool {
    SCHEMES.iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(scheme))
    })
}

/// Prefixes `<protocol>://` unless the URL already carries a scheme.
///
/// A URL with an explicit scheme is returned unchanged for every protocol, so
/// probing it under both protocols sends the same request twice.
#[must_use]
pub fn normalize_url(url: &str, protocol: Protocol) -> String {
    if has_explicit_scheme(url) {
        return url.to_owned();
    }
    format!("{}://{}", protocol.as_str(), url)
}

/// Builds the ordered task list: url-major, then protocol, then method.
///
/// Repeated protocols or methods are collapsed, keeping the first occurrence.
///
/// # Errors
///
/// Returns `ValidationError::EmptyInputSet` naming the first empty input.
pub fn build_batch(
    urls: &[String],
    protocols: &[Protocol],
    methods: &[HttpMethod],
) -> Result<Vec<Task>, ValidationError> {
    if urls.is_empty() {
        return Err(ValidationError::EmptyInputSet {
            set: InputSet::Urls,
        });
    }
    if protocols.is_empty() {
        return Err(ValidationError::EmptyInputSet {
            set: InputSet::Protocols,
        });
    }
    if methods.is_empty() {
        return Err(ValidationError::EmptyInputSet {
            set: InputSet::Methods,
        });
    }

    let protocols = dedupe(protocols);
    let methods = dedupe(methods);

    let capacity = urls
        .len()
        .saturating_mul(protocols.len())
        .saturating_mul(methods.len());
    let mut tasks = Vec::with_capacity(capacity);
    for url in urls {
        if protocols.len() > 1 && has_explicit_scheme(url) {
            warn!(
                "URL '{}' has an explicit scheme; it is probed unchanged under every protocol.",
                url
            );
        }
        for &protocol in &protocols {
            let full_url = normalize_url(url, protocol);
            for &method in &methods {
                tasks.push(Task {
                    url: url.clone(),
                    full_url: full_url.clone(),
                    protocol,
                    method,
                });
            }
        }
    }
    Ok(tasks)
}

fn dedupe<T: Copy + PartialEq>(items: &[T]) -> Vec<T> {
    let mut unique: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(item) {
            unique.push(*item);
        }
    }
    unique
}
