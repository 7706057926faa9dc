//! Consumers of the result stream: filtering, terminal rendering, export,
//! and the end-of-batch summary.
mod export;
mod filter;
mod render;
mod summary;


pub use export::{
    ExportTargets, default_export_file_name, export_json, export_jsonl, resolve_export_path,
    write_exports,
};
pub use filter::ResultFilter;
pub use render::{ResultPrinter, format_details, format_row};
pub use summary::BatchSummary;
