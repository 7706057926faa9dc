//! Core library for the `urlprobe` CLI.
//!
//! The batch runner in [`probe`] expands URLs, protocols, and methods into
//! tasks, runs them in fixed-size concurrent groups with a per-task deadline,
//! and streams one [`probe::ProbeResult`] per task. [`report`] renders,
//! filters, summarizes, and exports those results. The primary user-facing
//! interface is the `urlprobe` command-line application.
pub mod args;
pub mod config;
pub mod error;
pub mod input;
pub mod probe;
pub mod report;
pub mod shutdown;
