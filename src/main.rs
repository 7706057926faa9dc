mod args;
mod config;
mod entry;
mod error;
mod input;
mod logger;
mod probe;
mod report;
mod shutdown;
mod shutdown_handlers;

use error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
