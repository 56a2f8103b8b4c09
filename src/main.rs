use anyhow::Result;
use clap::Parser;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::IsTerminal;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use runapp::{AppCommand, AppExitStatus, BuildInfo, LogConfig, LogFormat, RunappConfig, Supervisor};

#[derive(Parser, Debug)]
#[command(name = "runapp")]
#[command(about = "Run a command and forward termination signals to it")]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Args {
    /// Print usage and exit
    #[arg(short, long)]
    help: bool,

    /// Print version info and exit
    #[arg(short = 'V', long)]
    version: bool,

    /// Write supervisor log output to FILE
    #[arg(long, value_name = "FILE")]
    init_log: Option<PathBuf>,

    /// App to execute and its arguments. The app requires a full path.
    #[arg(value_name = "COMMAND", num_args = 1.., trailing_var_arg = true)]
    command: Vec<OsString>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let argv: Vec<OsString> = std::env::args_os().collect();
    let build = BuildInfo::from_argv0(argv.first().and_then(|arg| arg.to_str()));

    let (config, config_error) = match RunappConfig::load().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => (config, None),
        Err(e) => (RunappConfig::default(), Some(e)),
    };

    let args = match Args::try_parse_from(&argv) {
        Ok(args) => args,
        Err(e) => {
            let _log_guard = init_logging(&config.log, None).ok().flatten();
            let message = e.to_string();
            error!("Bad flag: {}", message.lines().next().unwrap_or_default());
            build.print_usage();
            return AppExitStatus::BadFlag.into();
        }
    };

    if args.version {
        build.print_version();
        return AppExitStatus::Ok.into();
    }

    if args.help {
        build.print_usage();
        return AppExitStatus::Ok.into();
    }

    let (log_file, log_file_error) = match args.init_log.as_deref() {
        Some(path) => match open_log_file(path) {
            Ok(file) => (Some(file), None),
            Err(e) => (None, Some((path, e))),
        },
        None => (None, None),
    };

    let log_guard = match init_logging(&config.log, log_file) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Warning: failed to initialise logging: {}", e);
            None
        }
    };

    if let Some((path, e)) = log_file_error {
        warn!("Cannot open log file ({}): {}. Using stderr.", path.display(), e);
    }
    if let Some(e) = config_error {
        warn!("Invalid configuration, using defaults: {}", e);
    }

    let Some(command) = AppCommand::from_argv(args.command) else {
        build.print_usage();
        error!("Missing <command>");
        return AppExitStatus::MissingArgument.into();
    };

    let supervisor = match Supervisor::from_config(&config) {
        Ok(supervisor) => supervisor,
        Err(e) => {
            error!("Failed to build supervisor: {}", e);
            return AppExitStatus::CannotStartApp.into();
        }
    };

    info!("Starting {} v{}", build.program, build.version);
    let status = supervisor.run(&command).await;

    if status == AppExitStatus::FailedToKillApp {
        // Flush what has been logged, then leave without tearing anything else down.
        drop(log_guard);
        std::process::exit(i32::from(status.code()));
    }

    drop(log_guard);
    status.into()
}

/// Open the `--init-log` target for appending, creating it if needed
fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .mode(0o664)
        .open(path)
}

fn init_logging(log: &LogConfig, log_file: Option<File>) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{
        fmt, fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
        Layer,
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("runapp={}", log.level)));

    // A log file gets everything through the non-blocking writer; the guard
    // flushes it when dropped.
    let (writer, guard, ansi) = match log_file {
        Some(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            (BoxMakeWriter::new(writer), Some(guard), false)
        }
        None => (
            BoxMakeWriter::new(std::io::stderr),
            None,
            std::io::stderr().is_terminal(),
        ),
    };

    let fmt_layer = match log.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(false)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_writer(writer)
            .with_ansi(ansi)
            .boxed(),
        LogFormat::Full => fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(false)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()?;

    Ok(guard)
}
