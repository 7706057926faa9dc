use std::time::Duration;

use serde::Deserialize;

use crate::args::{HttpMethod, OutputFormat, Protocol, parse_duration};
use crate::error::ValidationError;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub urls: Option<Vec<String>>,
    pub urls_file: Option<String>,
    #[serde(alias = "method")]
    pub methods: Option<Vec<HttpMethod>>,
    #[serde(alias = "protocol")]
    pub protocols: Option<Vec<Protocol>>,
    pub concurrency: Option<usize>,
    pub timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub proxy_prefix: Option<String>,
    #[serde(alias = "proxy")]
    pub proxy_url: Option<String>,
    pub headers: Option<Vec<String>>,
    pub insecure: Option<bool>,
    pub details: Option<bool>,
    pub show_successful: Option<bool>,
    pub show_failed: Option<bool>,
    pub search: Option<String>,
    pub export_json: Option<String>,
    pub export_jsonl: Option<String>,
    pub output_format: Option<OutputFormat>,
    pub no_color: Option<bool>,
}

/// A duration written either as bare seconds or as a string with a unit.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err(ValidationError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => parse_duration(text),
        }
    }
}
