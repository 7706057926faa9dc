use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::{error, info};

use crate::args::{OutputFormat, ProbeArgs};
use crate::config::{DEFAULT_CONFIG_FILES, apply_config, load_config};
use crate::error::{AppError, AppResult, HttpError};
use crate::input::collect_urls;
use crate::probe::{BatchRunner, HttpTransport, RunnerConfig, TransportConfig};
use crate::report::{BatchSummary, ExportTargets, ResultFilter, ResultPrinter, write_exports};
use crate::shutdown::shutdown_channel;
use crate::shutdown_handlers::setup_signal_shutdown_handler;

pub(crate) fn run() -> AppResult<()> {
    let (args, matches) = match parse_args()? {
        Some(parsed) => parsed,
        None => return Ok(()),
    };

    crate::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args, &matches))
}

fn parse_args() -> AppResult<Option<(ProbeArgs, ArgMatches)>> {
    let mut cmd = ProbeArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = ProbeArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    !has_default_config()
}

fn has_default_config() -> bool {
    DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}

async fn run_async(mut args: ProbeArgs, matches: &ArgMatches) -> AppResult<()> {
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, matches, &config)?;
    }

    let urls = collect_urls(&args.urls, args.urls_file.as_deref()).await?;
    let runner = BatchRunner::new(Arc::new(build_transport(&args)?), runner_config(&args)?);

    let (shutdown_tx, _) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let mut results_rx = match runner.run(
        &urls,
        &args.protocols,
        &args.methods,
        Some(shutdown_tx.subscribe()),
    ) {
        Ok(results_rx) => results_rx,
        Err(err) => {
            error!("{}", err);
            drop(shutdown_tx.send(()));
            signal_handle.await?;
            return Err(AppError::validation(err));
        }
    };

    let filter = ResultFilter::new(
        !args.hide_successful,
        !args.hide_failed,
        args.search.as_deref(),
    );
    let mut printer = ResultPrinter::new(
        std::io::stdout(),
        args.output_format,
        args.details,
        args.no_color,
    );
    let mut summary = BatchSummary::default();
    let mut results = Vec::new();

    while let Some(result) = results_rx.recv().await {
        summary.record(&result);
        if filter.matches(&result) {
            printer.print(&result)?;
        }
        results.push(result);
    }

    drop(shutdown_tx.send(()));
    signal_handle.await?;

    if matches!(args.output_format, OutputFormat::Text) {
        printer.print_footer(&summary.to_string())?;
    } else {
        info!("{}", summary);
    }

    let targets = ExportTargets {
        json: args.export_json.clone(),
        jsonl: args.export_jsonl.clone(),
    };
    write_exports(&targets, &results).await?;

    Ok(())
}

fn build_transport(args: &ProbeArgs) -> AppResult<HttpTransport> {
    let config = TransportConfig {
        connect_timeout: args.connect_timeout,
        proxy_url: args.proxy_url.clone(),
        headers: args.headers.clone(),
        insecure: args.insecure,
    };
    Ok(HttpTransport::new(&config)?)
}

fn runner_config(args: &ProbeArgs) -> AppResult<RunnerConfig> {
    if let Some(prefix) = args.proxy_prefix.as_deref() {
        url::Url::parse(prefix).map_err(|err| {
            AppError::http(HttpError::InvalidProxyPrefix {
                prefix: prefix.to_owned(),
                source: err,
            })
        })?;
    }
    Ok(RunnerConfig {
        concurrency: args.concurrency.into(),
        timeout: args.timeout,
        proxy_prefix: args.proxy_prefix.clone(),
    })
}
