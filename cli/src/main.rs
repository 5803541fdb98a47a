//! Shopsight CLI
//!
//! Command-line interface for the Shopsight analytics dashboard backend.
//!
//! # Usage
//!
//! ```bash
//! shopsight --help
//! shopsight health
//! shopsight window --period 90d
//! ```

#![deny(unsafe_code)]

use clap::{Parser, Subcommand};
use shared::chrono::Utc;
use shared::period::PeriodWindow;

/// Shopsight CLI - analytics dashboard command-line interface
#[derive(Parser)]
#[command(name = "shopsight")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API server URL
    #[arg(
        short,
        long,
        env = "SHOPSIGHT_API_URL",
        default_value = "http://localhost:8080"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API server health
    Health,
    /// Show the date range and granularity a period token resolves to
    Window {
        /// Period token (7d, 30d, 90d, 1y)
        #[arg(short, long, default_value = "30d")]
        period: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Health) => {
            println!("Checking health of Shopsight API at {}...", cli.api_url);
            println!("Health check not yet implemented");
        }
        Some(Commands::Window { period }) => {
            let window =
                PeriodWindow::resolve_or_default(Some(period.as_str()), Utc::now().date_naive());
            println!(
                "{}: {} .. {} ({})",
                window.period, window.start, window.end, window.granularity
            );
        }
        None => {
            println!("Shopsight CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
