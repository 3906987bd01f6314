//! evolution CLI - back-office commands for the evolution applications.

use clap::{Parser, Subcommand};
use evolution::{Config, EvolutionError, Orchestrator};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

#[derive(Parser)]
#[command(name = "evolution")]
#[command(about = "Back-office tooling for the evolution applications")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, env = "CONFIG_PATH", default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP application
    Serve,

    /// Create the system tables (drops them first when reset is set)
    Init,

    /// Copy legacy target/entity links into user resources
    Transfer {
        /// Override the user that receives the resources
        #[arg(long)]
        user_id: Option<i64>,
    },

    /// Fetch the stock type classification from the quant engine
    QuantType,

    /// Test database connections
    HealthCheck,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), EvolutionError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    let mut config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    match cli.command {
        Commands::Serve => {
            let cancel_token = setup_signal_handler();
            Orchestrator::new(config).serve(cancel_token).await?;
        }

        Commands::Init => {
            Orchestrator::new(config).init().await?;
            if !cli.output_json {
                println!("System tables synced");
            }
        }

        Commands::Transfer { user_id } => {
            if let Some(id) = user_id {
                config.transfer.user_id = id;
                config.validate()?;
            }
            let report = Orchestrator::new(config).transfer().await?;

            if cli.output_json {
                println!("{}", report.to_json()?);
            } else {
                println!("target and entity transfer success: {}", report.inserted());
                println!("  Run ID: {}", report.run_id);
                println!("  Duration: {:.2}s", report.duration_seconds);
                println!("  Links read: {}", report.stats.links_read);
                println!("  Already linked: {}", report.stats.already_linked);
                println!("  Skipped: {}", report.stats.skipped());
            }
        }

        Commands::QuantType => {
            let types = Orchestrator::new(config).quant_types().await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&types)?);
            } else {
                for (category, codes) in &types {
                    println!("{}: {}", category, codes.join(", "));
                }
            }
        }

        Commands::HealthCheck => {
            let report = Orchestrator::new(config).health_check().await;

            if cli.output_json {
                println!("{}", report.to_json()?);
            } else {
                println!("Health Check Results:");
                for (name, state) in [
                    ("system", report.system),
                    ("time", report.time),
                    ("legacy", report.legacy),
                ] {
                    let status = match state {
                        Some(true) => "OK",
                        Some(false) => "FAILED",
                        None => "not configured",
                    };
                    println!("  {}: {}", name, status);
                }
                println!(
                    "\n  Overall: {}",
                    if report.healthy() { "HEALTHY" } else { "UNHEALTHY" }
                );
            }

            if !report.healthy() {
                return Err(EvolutionError::pool(
                    "health check failed",
                    "one or more databases are unreachable",
                ));
            }
        }
    }

    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Cancel the returned token on SIGINT or SIGTERM.
#[cfg(unix)]
fn setup_signal_handler() -> CancellationToken {
    let cancel_token = CancellationToken::new();

    for (kind, name) in [
        (SignalKind::interrupt(), "SIGINT"),
        (SignalKind::terminate(), "SIGTERM"),
    ] {
        let token = cancel_token.clone();
        tokio::spawn(async move {
            match signal(kind) {
                Ok(mut stream) => {
                    stream.recv().await;
                    eprintln!("\nReceived {}. Shutting down gracefully...", name);
                    token.cancel();
                }
                Err(e) => error!("Failed to install {} handler: {}", name, e),
            }
        });
    }

    cancel_token
}

/// Cancel the returned token on Ctrl-C.
#[cfg(not(unix))]
fn setup_signal_handler() -> CancellationToken {
    let cancel_token = CancellationToken::new();
    let token = cancel_token.clone();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                eprintln!("\nReceived Ctrl-C. Shutting down gracefully...");
                token.cancel();
            }
            Err(e) => error!("Failed to install Ctrl-C handler: {}", e),
        }
    });

    cancel_token
}
