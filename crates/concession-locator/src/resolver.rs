use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use concession_core::Coordinate;
use tokio::time::Instant;

use crate::error::{GeolocationError, LocateError};
use crate::intent::{IntentStore, LocateIntent};
use crate::page::PageReady;
use crate::ports::{Geocoder, PositionOptions, PositionProvider};

/// How many 150 ms readiness checks the intent hand-off tolerates.
pub const INTENT_READY_ATTEMPTS: u32 = 20;
pub const INTENT_READY_INTERVAL: Duration = Duration::from_millis(150);

/// Produces the single authoritative user coordinate, from the platform
/// position source or from a typed address.
#[derive(Debug)]
pub struct LocationResolver<G, P> {
    geocoder: G,
    positions: P,
    options: PositionOptions,
    last_fix: Mutex<Option<(Coordinate, Instant)>>,
}

impl<G: Geocoder, P: PositionProvider> LocationResolver<G, P> {
    pub fn new(geocoder: G, positions: P) -> Self {
        Self::with_options(geocoder, positions, PositionOptions::default())
    }

    pub fn with_options(geocoder: G, positions: P, options: PositionOptions) -> Self {
        Self {
            geocoder,
            positions,
            options,
            last_fix: Mutex::new(None),
        }
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    pub fn options(&self) -> &PositionOptions {
        &self.options
    }

    /// Asks the position source once. Errors are returned as-is and never
    /// retried here.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::Geolocation`] with the provider's failure, or
    /// `Timeout` if the provider does not answer within the configured bound.
    pub async fn resolve_from_geolocation(&self) -> Result<Coordinate, LocateError> {
        if let Some(cached) = self.cached_fix() {
            tracing::debug!(%cached, "reusing recent position fix");
            return Ok(cached);
        }

        let request = self.positions.current_position(&self.options);
        let coordinate = match tokio::time::timeout(self.options.timeout, request).await {
            Ok(Ok(coordinate)) => coordinate,
            Ok(Err(e)) => {
                tracing::info!(error = %e, "geolocation failed");
                return Err(e.into());
            }
            Err(_) => {
                tracing::info!(timeout = ?self.options.timeout, "geolocation timed out");
                return Err(GeolocationError::Timeout.into());
            }
        };

        let mut last_fix = self.last_fix.lock().unwrap_or_else(PoisonError::into_inner);
        *last_fix = Some((coordinate, Instant::now()));
        Ok(coordinate)
    }

    /// # Errors
    ///
    /// Returns [`LocateError::AddressNotFound`] when nothing matches the
    /// address and [`LocateError::Transport`] on service failures.
    pub async fn resolve_from_address(&self, address: &str) -> Result<Coordinate, LocateError> {
        self.geocoder
            .geocode(address)
            .await
            .map_err(LocateError::from_geocode)
    }

    /// # Errors
    ///
    /// See [`Self::resolve_from_address`] and [`Self::resolve_from_geolocation`].
    pub async fn resolve_intent(&self, intent: &LocateIntent) -> Result<Coordinate, LocateError> {
        match intent {
            LocateIntent::Address { address } => self.resolve_from_address(address).await,
            LocateIntent::Geolocate => self.resolve_from_geolocation().await,
        }
    }

    /// Redeems the intent left by a call-to-action, once the page is ready.
    ///
    /// Returns `None` when nothing is pending or the page never became ready
    /// within [`INTENT_READY_ATTEMPTS`] x [`INTENT_READY_INTERVAL`]. In the
    /// latter case the intent stays in storage and is not retried.
    pub async fn consume_pending_intent(
        &self,
        store: &IntentStore,
        ready: &PageReady,
    ) -> Option<(LocateIntent, Result<Coordinate, LocateError>)> {
        self.consume_pending_intent_unless(store, ready, || false).await
    }

    /// Like [`Self::consume_pending_intent`], but hands nothing off once
    /// `superseded` reports a newer search.
    ///
    /// `superseded` is checked before resolving and again before the intent
    /// is removed from storage. A superseded intent is left in place.
    pub async fn consume_pending_intent_unless<F>(
        &self,
        store: &IntentStore,
        ready: &PageReady,
        superseded: F,
    ) -> Option<(LocateIntent, Result<Coordinate, LocateError>)>
    where
        F: Fn() -> bool,
    {
        store.claim()?;

        let bound = INTENT_READY_INTERVAL * INTENT_READY_ATTEMPTS;
        if !ready.wait(bound).await {
            tracing::debug!(?bound, "page not ready, abandoning pending locate intent");
            return None;
        }
        if superseded() {
            tracing::debug!("pending locate intent superseded before resolution");
            return None;
        }

        let claim = store.claim()?;
        tracing::info!(intent = ?claim.intent(), "redeeming pending locate intent");
        let result = self.resolve_intent(claim.intent()).await;
        if superseded() {
            tracing::debug!("pending locate intent superseded during resolution");
            return None;
        }
        Some((claim.redeem(), result))
    }

    fn cached_fix(&self) -> Option<Coordinate> {
        let last_fix = self.last_fix.lock().unwrap_or_else(PoisonError::into_inner);
        last_fix
            .filter(|(_, at)| at.elapsed() <= self.options.maximum_age)
            .map(|(coordinate, _)| coordinate)
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
