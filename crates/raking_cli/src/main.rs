mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rake")]
#[command(version, about = "Survey raking (iterative proportional fitting) CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check targets against a dataset without fitting
    Check {
        /// Path to the dataset (CSV, JSON or JSON Lines)
        data: String,

        /// Path to the targets file (YAML, TOML or JSON)
        targets: String,

        /// Output format: text, json
        #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Compute raking weights
    Fit {
        /// Path to the dataset (CSV, JSON or JSON Lines)
        data: String,

        /// Path to the targets file (YAML, TOML or JSON)
        targets: String,

        /// Iteration config file (YAML, TOML or JSON); flags override it
        #[arg(short, long)]
        config: Option<String>,

        /// Maximum number of raking passes
        #[arg(long)]
        max_iter: Option<usize>,

        /// Convergence tolerance, in percentage points
        #[arg(long)]
        tol: Option<f64>,

        /// Lower bound for every weight
        #[arg(long)]
        min_weight: Option<f64>,

        /// Upper bound for every weight
        #[arg(long)]
        max_weight: Option<f64>,

        /// Fit even if target columns have missing values
        #[arg(long)]
        allow_missings: bool,

        /// Write weights to this CSV file
        #[arg(short, long)]
        output: Option<String>,

        /// Output format: text, json
        #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Commands::Check {
            data,
            targets,
            format,
        } => commands::check::execute(&data, &targets, &format),

        Commands::Fit {
            data,
            targets,
            config,
            max_iter,
            tol,
            min_weight,
            max_weight,
            allow_missings,
            output,
            format,
        } => {
            let overrides = commands::fit::ConfigOverrides {
                max_iter,
                tol,
                min_weight,
                max_weight,
                allow_missings,
            };
            commands::fit::execute(
                &data,
                &targets,
                config.as_deref(),
                &overrides,
                output.as_deref(),
                &format,
            )
        }
    }
}
