use tracing_subscriber::EnvFilter;

use fuel_reports::config::ScraperConfig;
use fuel_reports::error::Result;
use fuel_reports::report::{DeliveryBasisReporter, DepartureStationsReporter};

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "FUEL_REPORTS_CONFIG";

/// Configuration file used when the variable is not set.
const DEFAULT_CONFIG: &str = "config.yml";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config_path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG.to_string());

    let result = match args.as_slice() {
        [command, template] if command == "delivery-basis" => {
            run_delivery_basis(&config_path, template).await
        }
        [command, arrival, fuel] if command == "departure-stations" => {
            run_departure_stations(&config_path, arrival, fuel).await
        }
        _ => {
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Fill the delivery-basis template and print it as CSV.
async fn run_delivery_basis(config_path: &str, template: &str) -> Result<()> {
    let config = ScraperConfig::from_file(config_path)?;
    let reporter = DeliveryBasisReporter::new(&config, template)?;
    let report = reporter.get_report().await;
    reporter.close();
    report?.write_csv(std::io::stdout().lock())?;
    Ok(())
}

/// Rank departure stations for a fuel and print the table as CSV.
async fn run_departure_stations(config_path: &str, arrival: &str, fuel: &str) -> Result<()> {
    let config = ScraperConfig::from_file(config_path)?;
    let mut reporter = DepartureStationsReporter::new(config)?;
    let report = reporter.get_report(arrival, fuel).await;
    reporter.close();
    report?.write_csv(std::io::stdout().lock())?;
    Ok(())
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  fuel-reports delivery-basis <template.csv>");
    eprintln!("  fuel-reports departure-stations <arrival-station> <fuel-name>");
    eprintln!();
    eprintln!("Configuration is read from {DEFAULT_CONFIG}, or from the file");
    eprintln!("named by {CONFIG_ENV}.");
}
