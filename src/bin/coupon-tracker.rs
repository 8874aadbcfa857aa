//! CLI for one coupon tracking run.

use core::time::Duration;
use std::io::{self, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use coupon_tracker::client::Endpoints;
use coupon_tracker::clock::SystemClock;
use coupon_tracker::config::{SchedulePolicy, TrackerConfig, load_template};
use coupon_tracker::error::CouponError;
use coupon_tracker::logging::{self, DEFAULT_LOG_FILE, LoggingConfig};
use coupon_tracker::models::{Credentials, MemberId, StoreId};
use coupon_tracker::pipeline::{self, RunSummary};
use coupon_tracker::poller::StoreOutcome;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

/// Format of availability times in the summary table.
const TABLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Create a test coupon, assign it to a member and watch stores until it
/// becomes available.
#[derive(Debug, Parser)]
#[command(name = "coupon-tracker", version, about)]
struct Cli {
    /// Tenant label used in log lines.
    #[arg(long, env = "COUPON_TRACKER_CLIENT")]
    client: String,
    /// API base URL.
    #[arg(long, env = "COUPON_TRACKER_BASE_URL", value_name = "URL")]
    base_url: String,
    /// Administrator login name.
    #[arg(long, env = "COUPON_TRACKER_ADMIN_USERNAME")]
    admin_username: String,
    /// Administrator password.
    #[arg(long, env = "COUPON_TRACKER_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: String,
    /// Member login name.
    #[arg(long, env = "COUPON_TRACKER_MEMBER_USERNAME")]
    member_username: String,
    /// Member password.
    #[arg(long, env = "COUPON_TRACKER_MEMBER_PASSWORD", hide_env_values = true)]
    member_password: String,
    /// Member receiving the coupon.
    #[arg(long, env = "COUPON_TRACKER_MEMBER_ID", default_value_t = 1)]
    member_id: i64,
    /// Comma-separated store IDs to watch (default: 116,100,284,30,119).
    #[arg(long, env = "COUPON_TRACKER_STORES", value_delimiter = ',')]
    stores: Option<Vec<i64>>,
    /// Seconds between polls of one store.
    #[arg(
        long,
        env = "COUPON_TRACKER_POLL_INTERVAL",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..),
        value_name = "SECONDS"
    )]
    poll_interval: u64,
    /// What to do when assigning the coupon fails.
    #[arg(
        long,
        env = "COUPON_TRACKER_ON_SCHEDULE_FAILURE",
        value_enum,
        default_value_t = SchedulePolicy::Continue
    )]
    on_schedule_failure: SchedulePolicy,
    /// JSON file overriding coupon template fields.
    #[arg(long, env = "COUPON_TRACKER_COUPON_TEMPLATE", value_name = "FILE")]
    coupon_template: Option<PathBuf>,
    /// Append-only log file.
    #[arg(long, env = "COUPON_TRACKER_LOG_FILE", default_value = DEFAULT_LOG_FILE, value_name = "FILE")]
    log_file: PathBuf,
    /// Keep log lines out of stderr and show a spinner instead.
    #[arg(long, short)]
    quiet: bool,
    /// Login endpoint path.
    #[arg(long, env = "COUPON_TRACKER_LOGIN_PATH", value_name = "PATH")]
    login_path: Option<String>,
    /// Coupon-creation endpoint path.
    #[arg(long, env = "COUPON_TRACKER_CREATE_COUPON_PATH", value_name = "PATH")]
    create_coupon_path: Option<String>,
    /// Coupon-assignment endpoint path, may contain `{coupon_id}`.
    #[arg(long, env = "COUPON_TRACKER_SCHEDULE_COUPON_PATH", value_name = "PATH")]
    schedule_coupon_path: Option<String>,
    /// Store coupon listing path, may contain `{store_id}`.
    #[arg(long, env = "COUPON_TRACKER_STORE_COUPONS_PATH", value_name = "PATH")]
    store_coupons_path: Option<String>,
}

impl Cli {
    /// Logging settings for this invocation.
    fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            file: self.log_file.clone(),
            console: !self.quiet,
            ..LoggingConfig::default()
        }
    }

    /// Endpoint paths with any overrides applied.
    fn endpoints(&self) -> Endpoints {
        let defaults = Endpoints::default();
        Endpoints {
            login: self.login_path.clone().unwrap_or(defaults.login),
            create_coupon: self
                .create_coupon_path
                .clone()
                .unwrap_or(defaults.create_coupon),
            schedule_coupon: self
                .schedule_coupon_path
                .clone()
                .unwrap_or(defaults.schedule_coupon),
            store_coupons: self
                .store_coupons_path
                .clone()
                .unwrap_or(defaults.store_coupons),
        }
    }

    /// Builds the run configuration, reading the template file if given.
    fn into_tracker_config(self) -> coupon_tracker::error::Result<TrackerConfig> {
        let endpoints = self.endpoints();
        let mut config = TrackerConfig::new(
            self.client,
            self.base_url,
            Credentials::new(self.admin_username, self.admin_password),
            Credentials::new(self.member_username, self.member_password),
        );
        config.endpoints = endpoints;
        config.member_id = MemberId::new(self.member_id);
        if let Some(stores) = self.stores {
            config.store_ids = stores.into_iter().map(StoreId::new).collect();
        }
        config.poll_interval = Duration::from_secs(self.poll_interval);
        config.schedule_policy = self.on_schedule_failure;
        if let Some(path) = self.coupon_template {
            config.template = load_template(&path)?;
        }
        Ok(config)
    }
}

/// Writes an error line to stderr.
fn report_error(context: &str, err: &CouponError) -> io::Result<()> {
    writeln!(
        io::stderr().lock(),
        "{} {context}: {err}",
        "error:".red().bold()
    )
}

/// Runs the CLI, returning an appropriate exit code.
async fn run() -> io::Result<ExitCode> {
    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let _log_guard = match logging::init(&cli.logging_config()) {
        Ok(guard) => guard,
        Err(err) => {
            report_error("failed to initialize logging", &err)?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let quiet = cli.quiet;
    let config = match cli.into_tracker_config() {
        Ok(config) => config,
        Err(err) => {
            report_error("invalid configuration", &err)?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let spinner = quiet.then(|| make_spinner(&config));
    let result = pipeline::run(&config, Arc::new(SystemClock)).await;
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    match result {
        Ok(summary) => {
            print_summary(&summary)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report_error("run aborted", &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Creates a spinner describing the run.
fn make_spinner(config: &TrackerConfig) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!(
        "Tracking coupon for {} across {} stores...",
        config.client_label,
        config.store_ids.len()
    ));
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Prints the per-store outcome table.
fn print_summary(summary: &RunSummary) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(
        out,
        "{} {}",
        "Run complete!".green().bold(),
        format_args!(
            "(Program Name: {}, Coupon ID: {})",
            summary.coupon.program.name, summary.coupon.id
        )
        .dimmed()
    )?;
    if !summary.scheduled {
        writeln!(
            out,
            "{} the coupon was not assigned to the member",
            "warning:".yellow().bold()
        )?;
    }
    writeln!(out)?;

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Store").fg(Color::Cyan),
        Cell::new("Status").fg(Color::Cyan),
        Cell::new("Polls").fg(Color::Cyan),
        Cell::new("Detail").fg(Color::Cyan),
    ]);

    for report in &summary.stores {
        let (status, detail) = match report.outcome {
            StoreOutcome::Available { at } => (
                Cell::new("available").fg(Color::Green),
                at.format(TABLE_TIME_FORMAT).to_string(),
            ),
            StoreOutcome::Failed { ref reason } => {
                (Cell::new("failed").fg(Color::Red), reason.clone())
            }
        };
        _ = table.add_row(vec![
            Cell::new(report.store),
            status,
            Cell::new(report.polls),
            Cell::new(detail),
        ]);
    }

    writeln!(
        out,
        "{table}\n{}",
        format_args!(
            "{}/{} stores report the coupon as available",
            summary.available_count(),
            summary.stores.len()
        )
        .dimmed()
    )
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}
