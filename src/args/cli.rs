use clap::Parser;
use std::time::Duration;

use super::parsers::{parse_bool_env, parse_duration_arg, parse_header, parse_positive_usize};
use super::types::{HttpMethod, OutputFormat, PositiveUsize, Protocol};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Batch HTTP probe: test every URL x protocol x method combination and report status, timing, headers, and body."
)]
pub struct ProbeArgs {
    /// URL to probe; a URL without http:// or https:// is tried under each protocol (repeatable)
    #[arg(long = "url", short = 'u')]
    pub urls: Vec<String>,

    /// Read newline-separated URLs from a file ('-' for stdin)
    #[arg(long = "urls-file", short = 'f')]
    pub urls_file: Option<String>,

    /// HTTP method to probe with (repeatable)
    #[arg(long = "method", short = 'X', default_value = "get", ignore_case = true)]
    pub methods: Vec<HttpMethod>,

    /// Protocol to probe scheme-less URLs with (repeatable)
    #[arg(long = "protocol", short = 'p', default_value = "https", ignore_case = true)]
    pub protocols: Vec<Protocol>,

    /// Number of requests in flight per group
    #[arg(long = "concurrency", short = 'c', default_value = "5", value_parser = parse_positive_usize)]
    pub concurrency: PositiveUsize,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(long = "timeout", default_value = "10s", value_parser = parse_duration_arg)]
    pub timeout: Duration,

    /// Connect timeout (supports ms/s/m/h); when unset, the per-request timeout covers connecting
    #[arg(long = "connect-timeout", value_parser = parse_duration_arg)]
    pub connect_timeout: Option<Duration>,

    /// Prefix prepended to every request URL on the wire (CORS-proxy style)
    #[arg(long = "proxy-prefix")]
    pub proxy_prefix: Option<String>,

    /// HTTP proxy URL for all requests
    #[arg(long = "proxy-url", alias = "proxy")]
    pub proxy_url: Option<String>,

    /// Extra request headers in 'Key: Value' format (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Accept invalid TLS certificates and hostnames
    #[arg(long = "insecure", short = 'k')]
    pub insecure: bool,

    /// Print headers and body for every shown result
    #[arg(long = "details")]
    pub details: bool,

    /// Hide results with a 2xx/3xx status
    #[arg(long = "hide-successful")]
    pub hide_successful: bool,

    /// Hide results with an error or a non-2xx/3xx status
    #[arg(long = "hide-failed")]
    pub hide_failed: bool,

    /// Only show results whose url, protocol, or method contains this text (case-insensitive)
    #[arg(long = "search")]
    pub search: Option<String>,

    /// Export all results as pretty-printed JSON (file or directory)
    #[arg(long = "export-json")]
    pub export_json: Option<String>,

    /// Export all results as JSON lines (file or directory)
    #[arg(long = "export-jsonl")]
    pub export_jsonl: Option<String>,

    /// How results are streamed to stdout
    #[arg(long = "output-format", short = 'o', default_value = "text", ignore_case = true)]
    pub output_format: OutputFormat,

    /// Path to config file (TOML or JSON)
    #[arg(long = "config")]
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by URLPROBE_LOG/RUST_LOG)
    #[arg(long = "verbose", short = 'v')]
    pub verbose: bool,

    /// Disable color output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,
}
