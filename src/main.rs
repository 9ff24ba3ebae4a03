use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use well_allocation::app;
use well_allocation::config::Config;

#[derive(Parser)]
#[command(name = "well-allocation")]
#[command(
    about = "Validate well fluid-split factors and allocate measured production rates",
    long_about = None
)]
struct Cli {
    /// Path to the production workbook (sheets: splits, rates, invalid_splits)
    file_name: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing with environment filter support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,well_allocation=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    // Load .env file if it exists (ignore errors if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if !cli.file_name.exists() {
        error!("File not found: {:?}", cli.file_name);
        return Err(format!("File not found: {:?}", cli.file_name).into());
    }

    let config = Config::from_env()?;
    info!("Starting allocation batch with config: {:?}", config);

    let summary = app::run(&cli.file_name, &config)?;

    println!("\n{}", "=".repeat(60));
    println!("Allocation Batch Summary");
    println!("{}", "=".repeat(60));
    println!("Workbook:           {}", cli.file_name.display());
    println!("Tables Loaded:      {}", summary.tables_loaded);
    println!("Invalid Split Rows: {}", summary.invalid_rows);
    println!("Allocated Rows:     {}", summary.allocated_rows);
    println!("{}", "-".repeat(60));
    println!("Load Time:          {:.2}s", summary.load_duration.as_secs_f64());
    println!("Compute Time:       {:.2}s", summary.compute_duration.as_secs_f64());
    println!("Write Time:         {:.2}s", summary.write_duration.as_secs_f64());
    println!("{}", "=".repeat(60));
    println!("Reports Written:");
    for path in &summary.reports_written {
        println!("  {}", path.display());
    }
    println!();

    Ok(())
}
