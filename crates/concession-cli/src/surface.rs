//! A [`MapSurface`] that prints to the terminal.

use concession_core::Coordinate;
use concession_locator::{FacilityRecord, MapSurface};
use concession_mapbox::RouteResult;

#[derive(Debug, Default)]
pub(crate) struct TerminalSurface {
    user_marker: Option<Coordinate>,
}

pub(crate) fn format_row(rank: usize, facility: &FacilityRecord) -> String {
    let duration = facility
        .route_duration_min
        .map(|min| format!(" ({min:.0} min)"))
        .unwrap_or_default();
    format!(
        "{rank:>2}. {:<32} {}{duration}\n    {}",
        facility.name, facility.distance, facility.address
    )
}

impl MapSurface for TerminalSurface {
    fn render_markers(&mut self, facilities: &[FacilityRecord]) {
        tracing::debug!(count = facilities.len(), "markers rendered");
    }

    fn render_list(&mut self, facilities: &[FacilityRecord]) {
        if self.user_marker.is_none() {
            return;
        }
        println!();
        for (i, facility) in facilities.iter().enumerate() {
            println!("{}", format_row(i + 1, facility));
        }
    }

    fn show_popup(&mut self, facility: &FacilityRecord) {
        println!("[{}] {}", facility.name, facility.address);
    }

    fn hide_popup(&mut self, facility_id: &str) {
        tracing::debug!(facility = facility_id, "popup closed");
    }

    fn set_highlight(&mut self, facility_id: &str, highlighted: bool) {
        tracing::debug!(facility = facility_id, highlighted, "marker highlight");
    }

    fn place_user_marker(&mut self, at: Coordinate) {
        self.user_marker = Some(at);
        println!("Votre position: {at}");
    }

    fn remove_user_marker(&mut self) {
        self.user_marker = None;
    }

    fn draw_route(&mut self, facility: &FacilityRecord, route: &RouteResult) {
        println!();
        println!(
            "Itinéraire vers {}: {:.1} km, {:.0} min ({} points)",
            facility.name,
            route.distance_km(),
            route.duration_min(),
            route.path.len()
        );
    }

    fn clear_route(&mut self) {
        tracing::debug!("route cleared");
    }

    fn set_address_input(&mut self, address: &str) {
        println!("Recherche: {address}");
    }

    fn focus(&mut self, at: Coordinate) {
        tracing::debug!(%at, "map focused");
    }

    fn alert(&mut self, message: &str) {
        eprintln!("⚠ {message}");
    }
}
