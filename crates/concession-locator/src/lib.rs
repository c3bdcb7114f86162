//! Store locator behaviour: locating the user, ranking dealerships by
//! driving distance and presenting them on a map surface.
//!
//! The pieces, leaf first:
//!
//! - [`intent`]: the pending "locate me" request handed from one page to another.
//! - [`resolver`]: turns geolocation or a typed address into one coordinate.
//! - [`sorter`]: ranks facilities by route distance and debounces reorders.
//! - [`markers`]: the per-marker hover/click state machine.
//! - [`session`]: per-page state with the single active coordinate.
//! - [`presenter`]: event loop tying the above to a [`presenter::MapSurface`].
//! - [`cta`]: the call-to-action that writes intents or broadcasts addresses.
//! - [`autocomplete`]: debounced address suggestions for the search input.

pub mod autocomplete;
pub mod cta;
pub mod debounce;
pub mod error;
pub mod intent;
pub mod markers;
pub mod page;
pub mod ports;
pub mod presenter;
pub mod resolver;
pub mod session;
pub mod sorter;

pub use autocomplete::{SuggestionDebouncer, Suggestions, DEFAULT_SUGGEST_DELAY};
pub use cta::{CtaError, CtaOutcome, LocateCta, LocateSignal};
pub use debounce::Debouncer;
pub use error::{GeolocationError, IntentStoreError, LocateError};
pub use intent::{FileStorage, IntentClaim, IntentStorage, IntentStore, LocateIntent, MemoryStorage};
pub use markers::{MarkerBoard, MarkerEffect, MarkerInput, MarkerState};
pub use page::PageReady;
pub use ports::{DeniedPosition, FixedPosition, Geocoder, PositionOptions, PositionProvider, Router};
pub use presenter::{MapEvent, MapPresenter, MapSurface, PresenterTimings};
pub use resolver::LocationResolver;
pub use session::{MapSession, ResolutionTicket};
pub use sorter::{Distance, DistanceSorter, FacilityRecord, ReorderScheduler};
