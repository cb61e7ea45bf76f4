mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde_json::Value;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::dashboard::DashboardArgs;
use commands::export::ExportArgs;
use commands::options::OptionsArgs;
use commands::session::SessionArgs;

/// Role-based sales analytics dashboard
#[derive(Parser)]
#[command(
    name = "salesdash",
    version,
    about = "Role-based sales analytics dashboard",
    long_about = "Loads a sales event log, applies the selected filters and renders \
                  the KPI and chart view for a manager, salesperson or marketer. \
                  The same view can be exported as a PDF report, and the filtered \
                  rows as CSV."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the dashboard view for a role
    Dashboard(DashboardArgs),
    /// List filter options and the selectable date range
    Options(OptionsArgs),
    /// Write the filtered rows to filtered_sales_data_<date>.csv
    ExportCsv(ExportArgs),
    /// Write the role's report to <role>_report_<date>.pdf
    ExportPdf(ExportArgs),
    /// Read JSON actions line by line from stdin against one dataset cache
    Session(SessionArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result: Result<Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Dashboard(args) => commands::dashboard::run_dashboard(args),
        Commands::Options(args) => commands::options::run_options(args),
        Commands::ExportCsv(args) => commands::export::run_export_csv(args),
        Commands::ExportPdf(args) => commands::export::run_export_pdf(args),
        Commands::Session(args) => commands::session::run_session(args).map(|_| Value::Null),
        Commands::Version => {
            println!("salesdash {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            if !value.is_null() {
                output::format_output(&cli.output, &value);
            }
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
