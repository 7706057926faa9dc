use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{PositiveUsize, ProbeArgs, parse_header};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::{ConfigFile, DurationValue};

/// Applies configuration values to CLI arguments.
///
/// Values given explicitly on the command line win over the config file.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(
    args: &mut ProbeArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "urls")
        && let Some(urls) = config.urls.clone()
    {
        args.urls = urls;
    }

    if !is_cli(matches, "urls_file")
        && let Some(path) = config.urls_file.clone()
    {
        args.urls_file = Some(path);
    }

    if !is_cli(matches, "methods")
        && let Some(methods) = config.methods.clone()
    {
        args.methods = methods;
    }

    if !is_cli(matches, "protocols")
        && let Some(protocols) = config.protocols.clone()
    {
        args.protocols = protocols;
    }

    if !is_cli(matches, "concurrency")
        && let Some(value) = config.concurrency
    {
        args.concurrency = PositiveUsize::try_from(value).map_err(|err| {
            AppError::config(ConfigError::FieldMustBePositive {
                field: "concurrency",
                source: err,
            })
        })?;
    }

    if !is_cli(matches, "timeout")
        && let Some(value) = config.timeout.as_ref()
    {
        args.timeout = config_duration(value, "timeout")?;
    }

    if !is_cli(matches, "connect_timeout")
        && let Some(value) = config.connect_timeout.as_ref()
    {
        args.connect_timeout = Some(config_duration(value, "connect_timeout")?);
    }

    if !is_cli(matches, "proxy_prefix")
        && let Some(prefix) = config.proxy_prefix.clone()
    {
        args.proxy_prefix = Some(prefix);
    }

    if !is_cli(matches, "proxy_url")
        && let Some(proxy_url) = config.proxy_url.clone()
    {
        args.proxy_url = Some(proxy_url);
    }

    if !is_cli(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        args.headers = parse_headers(headers)?;
    }

    if !is_cli(matches, "insecure")
        && let Some(value) = config.insecure
    {
        args.insecure = value;
    }

    if !is_cli(matches, "details")
        && let Some(value) = config.details
    {
        args.details = value;
    }

    if !is_cli(matches, "hide_successful")
        && let Some(show) = config.show_successful
    {
        args.hide_successful = !show;
    }

    if !is_cli(matches, "hide_failed")
        && let Some(show) = config.show_failed
    {
        args.hide_failed = !show;
    }

    if !is_cli(matches, "search")
        && let Some(search) = config.search.clone()
    {
        args.search = Some(search);
    }

    if !is_cli(matches, "export_json")
        && let Some(path) = config.export_json.clone()
    {
        args.export_json = Some(path);
    }

    if !is_cli(matches, "export_jsonl")
        && let Some(path) = config.export_jsonl.clone()
    {
        args.export_jsonl = Some(path);
    }

    if !is_cli(matches, "output_format")
        && let Some(format) = config.output_format
    {
        args.output_format = format;
    }

    if !is_cli(matches, "no_color")
        && let Some(value) = config.no_color
    {
        args.no_color = value;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn config_duration(value: &DurationValue, field: &'static str) -> AppResult<std::time::Duration> {
    value
        .to_duration()
        .map_err(|err| AppError::config(ConfigError::InvalidDuration { field, source: err }))
}

fn parse_headers(headers: &[String]) -> AppResult<Vec<(String, String)>> {
    let mut parsed = Vec::with_capacity(headers.len());
    for header in headers {
        parsed.push(
            parse_header(header)
                .map_err(|err| AppError::config(ConfigError::InvalidHeader { source: err }))?,
        );
    }
    Ok(parsed)
}
