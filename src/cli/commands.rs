//! CLI command implementations
//!
//! `suite` and `check` share one boot sequence:
//! 1. Configuration load
//! 2. Bracket table build
//! 3. Store open (the file store is truncated)
//! 4. Consumer spawn on the runtime's blocking pool
//!
//! The producer side then runs on the calling task until it finishes or
//! Ctrl-C arrives. A storage failure always wins over whatever the
//! producer saw and ends the command with an error.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;

use crate::engine::{Consumer, ConsumerExit, LogSink, MemorySink, StopReason, VerdictSink};
use crate::feed::{channel, BatchSummary, FeedReceiver, FeedSender};
use crate::generators::{run_suite, stream_reader, SourceError};
use crate::observability::{log_event, log_event_with_fields, Event, MetricsRegistry};
use crate::stack::{AddressableStore, StackResult};
use crate::validator::Validator;

use super::args::Command;
use super::config::{Config, StoreKind};
use super::errors::{CliError, CliResult};
use super::io::write_response;

type BoxedStore = Box<dyn AddressableStore>;
type ConsumerTask<K> = JoinHandle<StackResult<ConsumerExit<BoxedStore, K>>>;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Suite { config, wait } => suite(config.as_deref(), wait),
        Command::Check { config, input } => check(config.as_deref(), input.as_deref()),
    }
}

/// Write a default configuration file
///
/// Refuses to overwrite an existing file.
pub fn init(config_path: &Path) -> CliResult<()> {
    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            CliError::config_error(format!("Failed to create directory {:?}: {}", parent, e))
        })?;
    }

    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(config_path)
    {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(CliError::already_initialized(config_path))
        }
        Err(e) => {
            return Err(CliError::config_error(format!(
                "Failed to create config {:?}: {}",
                config_path, e
            )))
        }
    };

    let body = serde_json::to_string_pretty(&Config::default())?;
    file.write_all(body.as_bytes())?;
    file.write_all(b"\n")?;
    file.sync_all()?;

    write_response(json!({
        "initialized": true,
        "config": config_path.display().to_string()
    }))
}

/// Feed the configured suite through the validator
///
/// With `wait`, keeps the process alive after the suite until Ctrl-C.
pub fn suite(config_path: Option<&Path>, wait: bool) -> CliResult<()> {
    write_response(suite_report(config_path, wait)?)
}

/// Runs the suite and builds the JSON report printed by `suite`.
pub fn suite_report(config_path: Option<&Path>, wait: bool) -> CliResult<Value> {
    let (config, validator) = boot(config_path)?;
    let metrics = Arc::new(MetricsRegistry::new());
    let rt = runtime()?;

    let outcome = rt.block_on(async {
        let (mut sender, receiver) = channel(config.channel_capacity)?;
        let consumer = Consumer::new(validator, LogSink::new(), Arc::clone(&metrics));
        let task = spawn_consumer(consumer, receiver);

        let produced = tokio::select! {
            produced = run_suite(&mut sender, &config.suite, &metrics) => Some(produced),
            _ = shutdown_signal() => None,
        };

        if wait && matches!(produced, Some(Ok(_))) && !sender.is_closed() {
            log_event(Event::SuiteWaiting);
            shutdown_signal().await;
        }

        finish(sender, task, produced).await
    })?;

    let cases = outcome.produced.unwrap_or_default();
    let exit = outcome.exit;
    Ok(json!({
        "command": "suite",
        "cases": cases,
        "interrupted": outcome.interrupted,
        "state": exit.validator.state(),
        "depth": exit.validator.depth(),
        "total_size": exit.validator.total_size(),
        "metrics": metrics.snapshot()
    }))
}

/// Validate a file (or stdin) and print every verdict
pub fn check(config_path: Option<&Path>, input: Option<&Path>) -> CliResult<()> {
    write_response(check_report(config_path, input)?)
}

/// Validates the input and builds the JSON report printed by `check`.
pub fn check_report(config_path: Option<&Path>, input: Option<&Path>) -> CliResult<Value> {
    let (config, validator) = boot(config_path)?;
    let metrics = Arc::new(MetricsRegistry::new());
    let rt = runtime()?;

    let outcome = rt.block_on(async {
        let (mut sender, receiver) = channel(config.channel_capacity)?;
        let sink = (LogSink::new(), MemorySink::new());
        let consumer = Consumer::new(validator, sink, Arc::clone(&metrics));
        let task = spawn_consumer(consumer, receiver);

        let produced = tokio::select! {
            produced = feed_input(&mut sender, input) => Some(produced),
            _ = shutdown_signal() => None,
        };

        finish(sender, task, produced).await
    })?;
    // A pending stdin read must not hold up process exit.
    rt.shutdown_background();

    let bytes = outcome.produced.map(|summary| summary.enqueued);
    let exit = outcome.exit;
    let state = exit.validator.state();
    let depth = exit.validator.depth();
    let total_size = exit.validator.total_size();
    let (_, memory) = exit.sink;
    Ok(json!({
        "command": "check",
        "bytes": bytes,
        "verdicts": memory.into_verdicts(),
        "interrupted": outcome.interrupted,
        "state": state,
        "depth": depth,
        "total_size": total_size,
        "metrics": metrics.snapshot()
    }))
}

/// Loads config and builds the validator over a fresh store.
fn boot(config_path: Option<&Path>) -> CliResult<(Config, Validator<BoxedStore>)> {
    log_event(Event::BootStart);

    let config = Config::load_or_default(config_path)?;
    let source = config_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    let capacity = config.channel_capacity.to_string();
    log_event_with_fields(
        Event::ConfigLoaded,
        &[("capacity", capacity.as_str()), ("source", source.as_str())],
    );

    let table = config.bracket_table()?;
    let store = config.open_store()?;
    let path = match config.store.kind {
        StoreKind::File => config.store.path.display().to_string(),
        StoreKind::Memory => String::new(),
    };
    log_event_with_fields(
        Event::StoreOpened,
        &[("kind", store.kind()), ("path", path.as_str())],
    );

    Ok((config, Validator::new(table, store)))
}

fn runtime() -> CliResult<Runtime> {
    Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))
}

/// Runs the consumer on the blocking pool.
///
/// Store I/O is synchronous (one seek and write per byte, plus a sync
/// with `sync_writes`), so it must not occupy an async worker.
fn spawn_consumer<K>(consumer: Consumer<BoxedStore, K>, receiver: FeedReceiver) -> ConsumerTask<K>
where
    K: VerdictSink + 'static,
{
    let handle = Handle::current();
    tokio::task::spawn_blocking(move || handle.block_on(consumer.run(receiver, shutdown_signal())))
}

/// Resolves on Ctrl-C; never resolves if the handler can't be installed.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

async fn feed_input(
    sender: &mut FeedSender,
    input: Option<&Path>,
) -> Result<BatchSummary, SourceError> {
    let mut batch = sender.batch();
    match input {
        Some(path) => {
            let file = tokio::fs::File::open(path).await?;
            stream_reader(&mut batch, file).await?;
        }
        None => {
            stream_reader(&mut batch, tokio::io::stdin()).await?;
        }
    }
    Ok(batch.drain().await?)
}

struct RunOutcome<T, K: VerdictSink> {
    produced: Option<T>,
    interrupted: bool,
    exit: ConsumerExit<BoxedStore, K>,
}

/// Closes the feed, joins the consumer and decides the command result.
///
/// `produced` is `None` when Ctrl-C cut the producer short. A producer
/// error is only an error if the run was not interrupted.
async fn finish<T, E, K>(
    sender: FeedSender,
    task: ConsumerTask<K>,
    produced: Option<Result<T, E>>,
) -> CliResult<RunOutcome<T, K>>
where
    E: Into<CliError>,
    K: VerdictSink + 'static,
{
    log_event(Event::ShutdownStart);
    drop(sender);

    let exit = task
        .await
        .map_err(|e| CliError::boot_failed(format!("Consumer task failed: {}", e)))??;

    let interrupted = produced.is_none() || exit.reason == StopReason::Shutdown;
    let produced = match produced {
        Some(Ok(value)) => Some(value),
        Some(Err(e)) if !interrupted => return Err(e.into()),
        _ => None,
    };

    log_event(Event::ShutdownComplete);
    Ok(RunOutcome {
        produced,
        interrupted,
        exit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{InvalidReason, Verdict};
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("bracketstack.json");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conf").join("bracketstack.json");

        init(&path).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "{}");

        let err = init(&path).unwrap_err();
        assert_eq!(err.code_str(), "BRACE_CLI_ALREADY_INITIALIZED");
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_suite_report_counts_cases_and_verdicts() {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("buffer.txt");
        let body = json!({
            "store": {"kind": "file", "path": store},
            "channel_capacity": 4,
            "suite": [
                {"kind": "valid", "name": "one", "count": 3},
                {"kind": "insufficient_open", "name": "short", "size": 8}
            ]
        });
        let path = write_config(&dir, &body.to_string());

        let report = suite_report(Some(&path), false).unwrap();
        assert!(store.exists());

        let cases = report["cases"].as_array().unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0]["name"], "one");
        assert_eq!(cases[0]["bytes"], 15);
        assert_eq!(cases[1]["name"], "short");
        assert_eq!(cases[1]["bytes"], 11);

        assert_eq!(report["interrupted"], false);
        assert_eq!(report["state"], "idle");
        assert_eq!(report["depth"], 0);
        assert_eq!(report["total_size"], 0);

        let metrics = &report["metrics"];
        assert_eq!(metrics["bytes_received"], 26);
        assert_eq!(metrics["valid_streams"], 2);
        assert_eq!(metrics["invalid_streams"], 5);
        assert_eq!(metrics["batches_drained"], 2);
        assert_eq!(metrics["storage_failures"], 0);
    }

    #[test]
    fn test_check_report_lists_verdicts_in_order() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"store":{"kind":"memory"},"channel_capacity":2}"#);
        let input = dir.path().join("input.txt");
        fs::write(&input, "[{a}]]([)").unwrap();

        let report = check_report(Some(&path), Some(&input)).unwrap();

        let expected = serde_json::to_value(vec![
            Verdict::Valid { total_size: 4 },
            Verdict::Invalid {
                reason: InvalidReason::UnmatchedClose,
                position: 1,
            },
            Verdict::Invalid {
                reason: InvalidReason::Mismatch {
                    expected: ']',
                    found: ')',
                },
                position: 3,
            },
        ])
        .unwrap();
        assert_eq!(report["verdicts"], expected);
        assert_eq!(report["bytes"], 9);
        assert_eq!(report["interrupted"], false);
        assert_eq!(report["state"], "idle");
        assert_eq!(report["depth"], 0);
        assert_eq!(report["total_size"], 0);
        assert_eq!(report["metrics"]["pushes"], 4);
        assert_eq!(report["metrics"]["pops"], 4);
    }

    #[test]
    fn test_check_report_shows_open_candidate() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"store":{"kind":"memory"}}"#);
        let input = dir.path().join("input.txt");
        fs::write(&input, "()[[(").unwrap();

        let report = check_report(Some(&path), Some(&input)).unwrap();
        assert_eq!(report["verdicts"].as_array().unwrap().len(), 1);
        assert_eq!(report["state"], "accumulating");
        assert_eq!(report["depth"], 3);
        assert_eq!(report["total_size"], 3);
    }

    #[test]
    fn test_check_missing_input_fails() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"store":{"kind":"memory"}}"#);

        let err = check(Some(&path), Some(&dir.path().join("missing.txt"))).unwrap_err();
        assert_eq!(err.code_str(), "BRACE_CLI_IO_ERROR");
    }

    #[test]
    fn test_bad_config_fails_before_boot() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"channel_capacity":0}"#);

        let err = suite(Some(&path), false).unwrap_err();
        assert_eq!(err.code_str(), "BRACE_CLI_CONFIG_ERROR");
    }
}
