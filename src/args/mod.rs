//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;

#[cfg(test)]
mod test_support;

pub use cli::ProbeArgs;
pub use types::{HttpMethod, OutputFormat, PositiveUsize, Protocol};

pub(crate) use defaults::{
    DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};
pub(crate) use parsers::{parse_duration, parse_header};
