use bazaar_runner::{MarketConfig, MarketSystem};
use env_logger::Env;
use log::info;

fn print_help() {
    eprintln!(
        r#"Bazaar - toy marketplace: entity store plus buyer and seller gateways

USAGE:
    bazaar [OPTIONS]

OPTIONS:
    --config <PATH>     Load configuration from JSON file
    --help              Print this help message

ENVIRONMENT VARIABLES:
    BAZAAR_HOST                   Listen host for all services (default: 127.0.0.1)
    BAZAAR_STORE_PORT             Store port (default: 5300)
    BAZAAR_BUYER_PORT             Buyer gateway port (default: 5100)
    BAZAAR_SELLER_PORT            Seller gateway port (default: 5200)
    BAZAAR_SESSION_TIMEOUT_SECS   Session idle timeout (default: 300)
    BAZAAR_ENABLE_MAKE_PURCHASE   Enable checkout at the buyer gateway (default: false)
    RUST_LOG                      Log level filter

EXAMPLES:
    # Run with defaults
    bazaar

    # Run with config file
    bazaar --config bazaar.json

    # Run with checkout enabled on a different buyer port
    BAZAAR_ENABLE_MAKE_PURCHASE=true BAZAAR_BUYER_PORT=6100 bazaar
"#
    );
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
                config_path = Some(args[i].clone());
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut config = match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            MarketConfig::from_file(&path)?
        }
        None => {
            info!("Using default configuration");
            MarketConfig::default()
        }
    };
    config.apply_env()?;

    info!(
        "Session timeout {}s, make_purchase {}",
        config.session.timeout_secs,
        if config.features.enable_make_purchase { "enabled" } else { "disabled" }
    );

    let system = MarketSystem::start(&config).await?;
    info!("Buyer gateway: {}", system.buyer_addr());
    info!("Seller gateway: {}", system.seller_addr());

    tokio::signal::ctrl_c().await?;
    system.shutdown().await;
    Ok(())
}
