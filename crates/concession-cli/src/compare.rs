//! `compare` command: closest catalog vehicle for the user's needs.

use concession_core::{find_best_match, score, SearchCriteria, VehicleCategory, VehicleRecord};

pub(crate) fn criteria(
    category: VehicleCategory,
    payload_kg: Option<f64>,
    volume_m3: Option<f64>,
    length_m: Option<f64>,
) -> SearchCriteria {
    SearchCriteria {
        category: Some(category),
        payload_kg,
        volume_m3,
        length_m,
    }
}

fn describe(vehicle: &VehicleRecord) -> String {
    let mut parts = vec![format!("{} kg", vehicle.payload_kg)];
    if let Some(volume) = vehicle.volume_m3 {
        parts.push(format!("{volume} m³"));
    }
    if let Some(length) = vehicle.length_m {
        parts.push(format!("{length} m"));
    }
    format!("{} ({}): {}", vehicle.name, vehicle.category, parts.join(", "))
}

pub(crate) fn run_compare(
    category: VehicleCategory,
    payload_kg: Option<f64>,
    volume_m3: Option<f64>,
    length_m: Option<f64>,
    json: bool,
) -> anyhow::Result<()> {
    let criteria = criteria(category, payload_kg, volume_m3, length_m);
    let Some(vehicle) = find_best_match(&criteria) else {
        println!("Aucun véhicule ne correspond: indiquez au moins une charge utile, un volume ou une longueur.");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(vehicle)?);
    } else {
        let distance = score(vehicle, &criteria).unwrap_or_default();
        println!("{}", describe(vehicle));
        tracing::debug!(vehicle = vehicle.id, score = distance, "best match");
    }
    Ok(())
}
