use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swellcast::cli::commands::forecast::ForecastRunOptions;

#[derive(Parser)]
#[command(name = "swellcast")]
#[command(
    version,
    about = "LLM-driven surf forecasts with automated critique and refinement"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true, help = "Config file (replaces ./swellcast.toml)")]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate refined forecasts from uploaded evidence
    Forecast {
        #[arg(long, short, help = "Region to forecast (repeatable; default: configured regions)")]
        region: Vec<String>,
        #[arg(long, short, help = "Collector bundle metadata (bundle_metadata.json)")]
        bundle: Option<PathBuf>,
        #[arg(long = "file-id", help = "Uploaded evidence file id (repeatable)")]
        file_id: Vec<String>,
        #[arg(long, help = "Use this assessment report instead of running the assessor")]
        assessment_file: Option<PathBuf>,
        #[arg(long, help = "Skip the data assessment run")]
        skip_assessment: bool,
        #[arg(long, help = "Refinement cycles override")]
        cycles: Option<usize>,
        #[arg(long, short, help = "Output directory")]
        output: Option<PathBuf>,
        #[arg(long, help = "Write JSON only")]
        no_markdown: bool,
    },

    /// Run only the data assessment role over an evidence set
    Assess {
        #[arg(long, short, help = "Collector bundle metadata (bundle_metadata.json)")]
        bundle: Option<PathBuf>,
        #[arg(long = "file-id", help = "Uploaded evidence file id (repeatable)")]
        file_id: Vec<String>,
        #[arg(long, short, help = "Write the report to this file")]
        output: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show {
        #[arg(long, short, help = "Show global config only")]
        global: bool,
        #[arg(
            long,
            short,
            default_value = "toml",
            help = "Output format: toml, json"
        )]
        format: String,
    },
    /// Show config file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        // Extract panic message
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mswellcast encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Forecast {
            region,
            bundle,
            file_id,
            assessment_file,
            skip_assessment,
            cycles,
            output,
            no_markdown,
        } => {
            let summary = swellcast::cli::commands::forecast::run(ForecastRunOptions {
                regions: region,
                bundle,
                file_ids: file_id,
                assessment_file,
                skip_assessment,
                cycles,
                output,
                no_markdown,
                config_path: cli.config,
            })?;

            if !summary.all_succeeded() {
                anyhow::bail!(
                    "{} of {} region(s) failed",
                    summary.failed.len(),
                    summary.failed.len() + summary.saved.len()
                );
            }
        }
        Commands::Assess {
            bundle,
            file_id,
            output,
        } => {
            swellcast::cli::commands::assess::run(bundle, file_id, output, cli.config)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { global, format } => {
                swellcast::cli::commands::config::show(global, &format)?;
            }
            ConfigAction::Path => {
                swellcast::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                swellcast::cli::commands::config::init(global, force)?;
            }
        },
    }

    Ok(())
}
