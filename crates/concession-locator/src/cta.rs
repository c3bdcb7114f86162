//! "Find a dealer near me" call-to-action.
//!
//! Off the map page the CTA records a [`LocateIntent`] and asks the caller
//! to navigate. On the map page it hands the address straight to the
//! presenter over a broadcast channel.

use thiserror::Error;
use tokio::sync::broadcast;

use crate::error::IntentStoreError;
use crate::intent::{IntentStore, LocateIntent};

/// Same-page hand-off of a typed address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocateSignal {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CtaOutcome {
    /// The intent is stored; go to this URL.
    Navigate(String),
    /// A presenter on this page received the address.
    Broadcast,
}

#[derive(Debug, Error)]
pub enum CtaError {
    #[error("no address entered")]
    EmptyAddress,

    #[error(transparent)]
    Store(#[from] IntentStoreError),
}

impl CtaError {
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            CtaError::EmptyAddress => "Veuillez saisir une adresse ou un code postal.",
            CtaError::Store(_) => "Impossible d'enregistrer votre recherche. Réessayez.",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocateCta {
    store: IntentStore,
    map_page_url: String,
    signal: Option<broadcast::Sender<LocateSignal>>,
}

impl LocateCta {
    pub fn new(store: IntentStore, map_page_url: impl Into<String>) -> Self {
        Self {
            store,
            map_page_url: map_page_url.into(),
            signal: None,
        }
    }

    /// Marks this CTA as mounted on the map page itself.
    #[must_use]
    pub fn on_map_page(mut self, signal: broadcast::Sender<LocateSignal>) -> Self {
        self.signal = Some(signal);
        self
    }

    /// # Errors
    ///
    /// Returns [`CtaError::EmptyAddress`] for blank input and
    /// [`CtaError::Store`] if the intent cannot be persisted.
    pub fn submit_address(&self, address: &str) -> Result<CtaOutcome, CtaError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(CtaError::EmptyAddress);
        }

        if let Some(signal) = &self.signal {
            let signal_msg = LocateSignal {
                address: address.to_owned(),
            };
            match signal.send(signal_msg) {
                Ok(receivers) => {
                    tracing::debug!(receivers, "broadcast address to map presenter");
                    return Ok(CtaOutcome::Broadcast);
                }
                // No presenter listening: fall back to the cross-page path.
                Err(_) => tracing::debug!("no map presenter listening, storing intent"),
            }
        }

        self.store.set(&LocateIntent::Address {
            address: address.to_owned(),
        })?;
        Ok(CtaOutcome::Navigate(self.map_page_url.clone()))
    }

    /// # Errors
    ///
    /// Returns [`CtaError::Store`] if the intent cannot be persisted.
    pub fn request_geolocation(&self) -> Result<CtaOutcome, CtaError> {
        self.store.set(&LocateIntent::Geolocate)?;
        Ok(CtaOutcome::Navigate(self.map_page_url.clone()))
    }
}
