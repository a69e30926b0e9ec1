//! Media Vault - Entry Point
//!
//! Loads configuration, verifies the content root and keeps the vault
//! running until interrupted.

use log::{error, info};
use std::process::ExitCode;

use media_vault::error::handle_error;
use media_vault::utils::setup_logging;
use media_vault::{Vault, VaultConfig, VaultError};

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    info!("Launching media vault...");

    match run().await {
        Ok(()) => {
            info!("Vault finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            handle_error(&e);
            error!("Vault stopped after an unrecoverable error");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), VaultError> {
    let config = VaultConfig::load()?;
    let vault = Vault::start(config).await?;

    info!("Vault started, waiting for shutdown signal");
    vault.run_until_shutdown().await
}
