//! `cta` command: records a locate intent for the next `map` run.

use clap::Subcommand;
use concession_core::AppConfig;
use concession_locator::{CtaOutcome, LocateCta};

use crate::locate::intent_store;

/// Sub-commands available under `cta`.
#[derive(Debug, Subcommand)]
pub enum CtaCommands {
    /// Find dealerships near a typed address or postal code
    Address { address: String },
    /// Find dealerships near the current position
    Geolocate,
}

pub(crate) fn run_cta(config: &AppConfig, command: &CtaCommands) -> anyhow::Result<()> {
    let cta = LocateCta::new(intent_store(config), config.map_page_url.clone());
    let outcome = match command {
        CtaCommands::Address { address } => cta.submit_address(address),
        CtaCommands::Geolocate => cta.request_geolocation(),
    };

    match outcome {
        Ok(CtaOutcome::Navigate(url)) => {
            println!("Intention enregistrée. Ouvrez {url} ou lancez `concession map`.");
            Ok(())
        }
        Ok(CtaOutcome::Broadcast) => Ok(()),
        Err(e) => {
            eprintln!("{}", e.user_message());
            Err(e.into())
        }
    }
}
