//! Onebox - a terminal client for the Onebox inbox service
//!
//! This is the main entry point for the onebox binary.

use log::error;

mod cli;
mod render;
mod shell;

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // Bootstrap config directory
    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    if let Err(e) = cli::run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
