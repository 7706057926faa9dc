//! Configuration loading and application.
mod apply;
mod loader;
pub mod types;


pub use apply::apply_config;
pub use loader::load_config;

pub(crate) use loader::DEFAULT_CONFIG_FILES;

#[cfg(test)]
pub(crate) use loader::load_config_file;
