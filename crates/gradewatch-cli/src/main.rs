// crates/gradewatch-cli/src/main.rs
// ============================================================================
// Module: Gradewatch CLI Entry Point
// Description: Command dispatcher wiring config, fetcher, store, notify, and journal.
// Purpose: Drive one pipeline cycle, single-shot or on a daemon schedule.
// Dependencies: clap, gradewatch-config, gradewatch-core, gradewatch-fetcher,
//               gradewatch-journal, gradewatch-notify, gradewatch-providers,
//               gradewatch-store-sqlite, signal-hook, tracing, tracing-subscriber
// ============================================================================

//! ## Overview
//! `gradewatch run` executes one pipeline cycle and exits; `gradewatch run
//! --daemon` repeats it on the configured (or `--times`-overridden) schedule
//! until interrupted. All wiring of the backend-agnostic interfaces in
//! `gradewatch_core::interfaces` to their concrete implementations happens
//! here and nowhere else — the process entry point is the one place that
//! knows every concrete type.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use gradewatch_config::ConfigError;
use gradewatch_config::GradewatchConfig;
use gradewatch_core::interfaces::HealthPing;
use gradewatch_core::interfaces::NoopHealthPing;
use gradewatch_core::runtime::RetryConfig;
use gradewatch_core::runtime::ScrapeTime;
use gradewatch_core::runtime::next;
use gradewatch_core::runtime::run_cycle;
use gradewatch_fetcher::GradeApiConfig;
use gradewatch_fetcher::HttpSnapshotFetcher;
use gradewatch_journal::NdjsonChangeJournal;
use gradewatch_notify::NotificationManagerBuilder;
use gradewatch_providers::FileProvider;
use gradewatch_providers::HttpHealthPing;
use gradewatch_providers::LogProvider;
use gradewatch_providers::WebhookProvider;
use gradewatch_store_sqlite::SqliteSnapshotStore;
use gradewatch_store_sqlite::SqliteStoreConfig;
use time::OffsetDateTime;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "gradewatch", disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands, per spec §6.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute one pipeline cycle, or run on a schedule with `--daemon`.
    Run(RunArgs),
}

/// Arguments for `run`.
#[derive(Args, Debug)]
struct RunArgs {
    /// Optional config file path (defaults to `gradewatch.toml` or
    /// `GRADEWATCH_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Run continuously on the configured (or overridden) schedule instead
    /// of exiting after one cycle.
    #[arg(long)]
    daemon: bool,
    /// Comma-separated `HH:MM` schedule, overriding `scrape_times` from
    /// configuration. Only meaningful with `--daemon`.
    #[arg(long, value_name = "HH:MM,HH:MM,...")]
    times: Option<String>,
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    let cli = Cli::parse();
    let Commands::Run(args) = cli.command;
    run_command(&args)
}

/// Loads configuration, initializes logging, and dispatches to single-shot
/// or daemon execution. Exit codes follow spec §6: `0` success, `1`
/// configuration error, `2` unrecoverable runtime error.
fn run_command(args: &RunArgs) -> ExitCode {
    let config = match GradewatchConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            write_stderr_line(&format!("configuration error: {err}"));
            return ExitCode::from(1);
        }
    };

    init_logging(&config.log.level);

    let schedule = match resolve_schedule(&config, args.times.as_deref()) {
        Ok(schedule) => schedule,
        Err(err) => {
            tracing::error!(error = %err, "invalid schedule configuration");
            return ExitCode::from(1);
        }
    };

    let pipeline = match Pipeline::build(&config) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            tracing::error!(error = %err, "failed to initialize pipeline components");
            return ExitCode::from(1);
        }
    };

    if args.daemon {
        run_daemon(&pipeline, &schedule)
    } else {
        run_once(&pipeline)
    }
}

/// Resolves `scrape_times`, validating non-emptiness when `--daemon` is set
/// (per the orchestrator's documented precondition on [`next`]).
fn resolve_schedule(config: &GradewatchConfig, override_times: Option<&str>) -> Result<Vec<ScrapeTime>, ConfigError> {
    if let Some(raw) = override_times {
        return ScrapeTime::parse_list(raw).map_err(|err| ConfigError::Invalid(err.to_string()));
    }
    config.parsed_scrape_times()
}

/// Writes a single line to stderr, for the one fatal error that can occur
/// before logging is initialized (a bad config path means `log.level` was
/// never read).
fn write_stderr_line(message: &str) {
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "{message}");
}

/// Installs a `tracing-subscriber` fmt layer. `RUST_LOG` is an operator
/// escape hatch that overrides `log.level` when set, per spec §6's
/// "implementation must be consistent" latitude on logging detail.
fn init_logging(configured_level: &str) {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| configured_level.to_owned());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

// ============================================================================
// SECTION: Pipeline Wiring
// ============================================================================

/// Every concrete collaborator the orchestrator needs for one cycle, built
/// once at startup and reused across every cycle in daemon mode.
struct Pipeline {
    /// Fetches the current snapshot from the remote grade service.
    fetcher: HttpSnapshotFetcher,
    /// Holds the one persisted snapshot.
    store: SqliteSnapshotStore,
    /// The active, availability-filtered notification providers.
    providers: gradewatch_notify::NotificationManager,
    /// Append-only record of every change report emitted.
    journal: NdjsonChangeJournal,
    /// Reports cycle success/failure to an external uptime check.
    health: Box<dyn HealthPing>,
    /// Fetch retry policy applied each cycle.
    retry: RetryConfig,
}

impl Pipeline {
    /// Constructs every collaborator from `config`, selecting `HttpHealthPing`
    /// over `NoopHealthPing` when `healthcheck.url` is configured.
    fn build(config: &GradewatchConfig) -> Result<Self, String> {
        let fetcher = HttpSnapshotFetcher::new(GradeApiConfig {
            domain: config.api.domain.clone(),
            key: config.api.key.clone(),
            secret: config.api.secret.clone(),
        })
        .map_err(|err| format!("fetcher: {err}"))?;

        let store_config =
            SqliteStoreConfig { path: config.storage.path.clone(), busy_timeout_ms: config.storage.timeout_ms };
        let store = SqliteSnapshotStore::open(&store_config).map_err(|err| format!("store: {err}"))?;

        let mut builder = NotificationManagerBuilder::new().with_provider(Box::new(LogProvider));
        if let Some(webhook) = &config.notifications.webhook {
            builder = builder.with_provider(Box::new(WebhookProvider::new(Some(webhook.url.clone()))));
        }
        if let Some(file) = &config.notifications.file {
            builder = builder.with_provider(Box::new(FileProvider::open(&file.path)));
        }
        let providers = builder.build();

        let journal = NdjsonChangeJournal::open(&config.journal.path, config.journal.retention_days)
            .map_err(|err| format!("journal: {err}"))?;

        let health: Box<dyn HealthPing> = match &config.healthcheck.url {
            Some(url) => Box::new(HttpHealthPing::new(url.clone())),
            None => Box::new(NoopHealthPing),
        };

        let retry = RetryConfig {
            max_attempts: config.retry.max_attempts,
            delay: time::Duration::milliseconds(i64::try_from(config.retry.delay_ms).unwrap_or(i64::MAX)),
        };

        tracing::info!(
            providers = ?providers.active_provider_names(),
            "gradewatch pipeline initialized"
        );

        Ok(Self { fetcher, store, providers, journal, health, retry })
    }

    /// Runs one cycle and logs the outcome at the level spec §7 assigns to
    /// the cycle's result kind.
    fn run_one(&self) -> gradewatch_core::runtime::CycleResult {
        use gradewatch_core::runtime::CycleResult;

        let outcome = run_cycle(
            &self.fetcher,
            &self.store,
            self.providers.providers(),
            &self.journal,
            self.health.as_ref(),
            &self.retry,
            &std::thread::sleep,
        );

        if let Some(report) = &outcome.report {
            for change in &report.changes {
                tracing::debug!(?change, "change detected");
            }
        }

        match outcome.result {
            CycleResult::OkNoChanges | CycleResult::OkChanges => {
                if let Some(report) = &outcome.report {
                    tracing::info!(summary = %report.counts.summary_sentence(), "cycle complete");
                }
            }
            CycleResult::FetchFailed => {
                tracing::error!("cycle failed: snapshot could not be fetched after retrying");
            }
            CycleResult::PersistFailed => {
                tracing::error!("cycle failed: snapshot store could not be persisted");
            }
            CycleResult::Partial => {
                tracing::warn!(
                    notify_results = ?outcome.notify_results,
                    "cycle completed with a partial failure (notification or journal)"
                );
            }
        }

        outcome.result
    }
}

// ============================================================================
// SECTION: Execution Modes
// ============================================================================

/// Executes exactly one cycle. Exit `0` on `ok_*`, `1` otherwise, per §6.
fn run_once(pipeline: &Pipeline) -> ExitCode {
    use gradewatch_core::runtime::CycleResult;
    match pipeline.run_one() {
        CycleResult::OkNoChanges | CycleResult::OkChanges | CycleResult::Partial => ExitCode::SUCCESS,
        CycleResult::FetchFailed | CycleResult::PersistFailed => ExitCode::from(1),
    }
}

/// Runs cycles on `schedule` until a shutdown signal arrives. Sleeps in
/// short slices so a signal is observed promptly rather than after a long
/// uninterrupted sleep, grounded on the pack's `signal-hook`-based
/// flag-polling idiom for synchronous daemons.
fn run_daemon(pipeline: &Pipeline, schedule: &[ScrapeTime]) -> ExitCode {
    if schedule.is_empty() {
        tracing::error!("daemon mode requires a non-empty scrape_times schedule");
        return ExitCode::from(1);
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    if signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&shutdown)).is_err()
        || signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&shutdown)).is_err()
    {
        tracing::warn!("failed to register shutdown signal handlers; Ctrl-C will not be graceful");
    }

    let poll_slice = time::Duration::milliseconds(250);

    while !shutdown.load(Ordering::SeqCst) {
        let now = OffsetDateTime::now_utc();
        let target = next(now, schedule);
        let mut remaining = target - now;

        while remaining.is_positive() && !shutdown.load(Ordering::SeqCst) {
            let slice = remaining.min(poll_slice);
            std::thread::sleep(slice.unsigned_abs());
            remaining = target - OffsetDateTime::now_utc();
        }

        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        pipeline.run_one();
    }

    tracing::info!("gradewatch daemon shutting down");
    ExitCode::SUCCESS
}
