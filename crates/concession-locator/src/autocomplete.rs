//! Debounced address suggestions for the search input.

use std::sync::Arc;
use std::time::Duration;

use concession_mapbox::AddressSuggestion;
use tokio::sync::mpsc;

use crate::debounce::Debouncer;
use crate::ports::Geocoder;

pub const DEFAULT_SUGGEST_DELAY: Duration = Duration::from_millis(300);
const MIN_QUERY_CHARS: usize = 2;

/// Suggestions for one settled input value.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestions {
    pub query: String,
    pub items: Vec<AddressSuggestion>,
}

/// Fetches suggestions once typing pauses. A keystroke aborts both the
/// pending timer and any lookup already in flight for an older value.
pub struct SuggestionDebouncer<G> {
    geocoder: Arc<G>,
    delay: Duration,
    debouncer: Debouncer<()>,
    sink: mpsc::UnboundedSender<Suggestions>,
}

impl<G> std::fmt::Debug for SuggestionDebouncer<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionDebouncer")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl<G: Geocoder + 'static> SuggestionDebouncer<G> {
    pub fn new(geocoder: Arc<G>, delay: Duration, sink: mpsc::UnboundedSender<Suggestions>) -> Self {
        Self {
            geocoder,
            delay,
            debouncer: Debouncer::new(),
            sink,
        }
    }

    /// Call on every input change.
    pub fn input(&self, value: &str) {
        let query = value.trim().to_owned();
        if query.chars().count() < MIN_QUERY_CHARS {
            self.debouncer.cancel(&());
            let _ = self.sink.send(Suggestions {
                query,
                items: Vec::new(),
            });
            return;
        }

        let geocoder = Arc::clone(&self.geocoder);
        let sink = self.sink.clone();
        self.debouncer.schedule((), self.delay, async move {
            let items = geocoder.suggest(&query).await;
            tracing::debug!(%query, count = items.len(), "address suggestions");
            let _ = sink.send(Suggestions { query, items });
        });
    }

    pub fn clear(&self) {
        self.debouncer.cancel(&());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use concession_core::Coordinate;
    use concession_mapbox::MapboxError;

    use super::*;

    #[derive(Default)]
    struct RecordingGeocoder {
        queries: Mutex<Vec<String>>,
    }

    impl Geocoder for RecordingGeocoder {
        async fn suggest(&self, query: &str) -> Vec<AddressSuggestion> {
            self.queries.lock().unwrap().push(query.to_owned());
            vec![AddressSuggestion {
                id: format!("place.{query}"),
                display_name: format!("{query}, France"),
                short_label: query.to_owned(),
                coordinate: Coordinate::new(4.8, 45.7),
            }]
        }

        async fn geocode(&self, address: &str) -> Result<Coordinate, MapboxError> {
            Err(MapboxError::NotFound {
                query: address.to_owned(),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn typing_burst_queries_only_final_value() {
        let geocoder = Arc::new(RecordingGeocoder::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let suggester = SuggestionDebouncer::new(Arc::clone(&geocoder), DEFAULT_SUGGEST_DELAY, tx);

        for value in ["69", "690", "6900", "69007"] {
            suggester.input(value);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let settled = rx.recv().await.unwrap();
        assert_eq!(settled.query, "69007");
        assert_eq!(settled.items.len(), 1);
        assert_eq!(*geocoder.queries.lock().unwrap(), ["69007"]);
    }

    #[tokio::test(start_paused = true)]
    async fn short_input_clears_without_querying() {
        let geocoder = Arc::new(RecordingGeocoder::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let suggester = SuggestionDebouncer::new(Arc::clone(&geocoder), DEFAULT_SUGGEST_DELAY, tx);

        suggester.input("Lyon");
        suggester.input("L");

        let cleared = rx.recv().await.unwrap();
        assert_eq!(cleared.query, "L");
        assert!(cleared.items.is_empty());
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
        assert!(geocoder.queries.lock().unwrap().is_empty());
    }
}
