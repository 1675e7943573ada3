use std::process::ExitCode;
use std::sync::Arc;

use geoprobe::config::load_config;
use geoprobe::scheduler::{report, run_all};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let ctx = match geoprobe::build_context(&config) {
        Ok(ctx) => ctx,
        Err(e) => {
            log::error!("Failed to initialise probes: {e}");
            return ExitCode::FAILURE;
        }
    };
    println!("Detecting geolocation...");
    println!("{}", report::SEPARATOR);
    let results = run_all(Arc::new(ctx), config.workers).await;
    print!("{}", report::render(&results));
    println!("All checks complete");

    for line in report::summary(&results) {
        log::debug!("{line}");
    }
    ExitCode::SUCCESS
}
