//! Hyperschema Generator
//!
//! Generates a JSON Hyper-Schema document and its serving stub from an API
//! definition.

use std::path::PathBuf;
use std::process::ExitCode;

use colored::Colorize;
use hyperschema_gen::config::{Invocation, ParsedArgs, parse_args};
use hyperschema_gen::{Generator, GeneratorError, run_with_crash_trap};
use tracing::{debug, info};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status for a failed generation.
const EXIT_FAILURE: u8 = 1;
/// Exit status for unusable arguments or configuration.
const EXIT_USAGE: u8 = 2;
/// Exit status for a trapped panic.
const EXIT_CRASH: u8 = 101;
/// Exit status for a run stopped by SIGINT.
const EXIT_INTERRUPTED: u8 = 130;

/// Initialize tracing based on verbosity and output format. `RUST_LOG` wins
/// over the `-v` flags.
fn init_tracing(invocation: &Invocation) {
    let base_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| invocation.log_filter().to_string());
    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    if invocation.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_file(invocation.verbosity >= 3)
                    .with_line_number(invocation.verbosity >= 3)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    }
}

fn run(invocation: Invocation) -> Result<Vec<PathBuf>, GeneratorError> {
    let api = invocation.definition.load()?;
    debug!(
        api = %api.name,
        resources = api.resources.len(),
        types = api.types.len(),
        "API definition loaded"
    );

    let mut generator = Generator::with_defaults(invocation.config)?;
    info!(root = %generator.config().output_root.display(), "output root resolved");

    #[cfg(unix)]
    let _trap = match hyperschema_gen::signals::SignalTrap::install(generator.handle()) {
        Ok(trap) => Some(trap),
        Err(e) => {
            tracing::warn!(error = %e, "signal trap unavailable, interrupted runs will not roll back");
            None
        }
    };

    run_with_crash_trap(|| generator.generate(&api))
}

fn exit_code(err: &GeneratorError) -> u8 {
    match err {
        GeneratorError::CrashDuringGeneration { .. } => EXIT_CRASH,
        GeneratorError::Interrupted => EXIT_INTERRUPTED,
        e if e.is_configuration_error() => EXIT_USAGE,
        _ => EXIT_FAILURE,
    }
}

fn main() -> ExitCode {
    let invocation = match parse_args(std::env::args_os()) {
        Ok(ParsedArgs::Run(invocation)) => invocation,
        Ok(ParsedArgs::Exit(text)) => {
            print!("{}", text);
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err.report());
            return ExitCode::from(exit_code(&err));
        }
    };

    init_tracing(&invocation);

    match run(invocation) {
        Ok(artifacts) => {
            for path in &artifacts {
                println!("{}", path.display());
            }
            eprintln!(
                "{} generated {} artifacts",
                "✓".green().bold(),
                artifacts.len()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err.report());
            ExitCode::from(exit_code(&err))
        }
    }
}
