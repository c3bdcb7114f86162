//! Vehicle catalog and the comparator that matches user criteria against it.
//!
//! Matching is a weighted nearest-neighbour scan: the category must match
//! exactly, then each numeric criterion present on both sides contributes
//! `|wanted - actual| * weight`. The score is the mean contribution, lower is
//! closer. Weights bring each unit to a comparable magnitude:
//!
//! | Criterion | Unit | Weight |
//! |-----------|------|--------|
//! | payload   | kg   | ÷ 100  |
//! | volume    | m³   | × 10   |
//! | length    | m    | × 100  |

use std::str::FromStr;

use serde::{Deserialize, Serialize};

const PAYLOAD_WEIGHT: f64 = 1.0 / 100.0;
const VOLUME_WEIGHT: f64 = 10.0;
const LENGTH_WEIGHT: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleCategory {
    #[serde(rename = "utilitaire thermique")]
    UtilityCombustion,
    #[serde(rename = "utilitaire électrique")]
    UtilityElectric,
    #[serde(rename = "pickup thermique")]
    PickupCombustion,
    #[serde(rename = "pickup électrique")]
    PickupElectric,
}

impl VehicleCategory {
    pub const ALL: [VehicleCategory; 4] = [
        VehicleCategory::UtilityCombustion,
        VehicleCategory::UtilityElectric,
        VehicleCategory::PickupCombustion,
        VehicleCategory::PickupElectric,
    ];

    /// The label shown in the comparator dropdown.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            VehicleCategory::UtilityCombustion => "utilitaire thermique",
            VehicleCategory::UtilityElectric => "utilitaire électrique",
            VehicleCategory::PickupCombustion => "pickup thermique",
            VehicleCategory::PickupElectric => "pickup électrique",
        }
    }
}

impl std::fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown vehicle category \"{0}\"")]
pub struct UnknownCategory(String);

impl FromStr for VehicleCategory {
    type Err = UnknownCategory;

    /// Accepts the dropdown labels, case-insensitively, with or without the
    /// accent on "électrique".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('é', "e");
        Self::ALL
            .into_iter()
            .find(|c| c.label().replace('é', "e") == normalized)
            .ok_or_else(|| UnknownCategory(s.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleRecord {
    pub id: &'static str,
    pub name: &'static str,
    pub category: VehicleCategory,
    pub payload_kg: f64,
    pub volume_m3: Option<f64>,
    pub length_m: Option<f64>,
}

/// The fixed catalog, in dropdown order. Order is also the tie-break for
/// [`find_best_match`].
pub static CATALOG: [VehicleRecord; 10] = [
    VehicleRecord {
        id: "deliver7",
        name: "Deliver 7",
        category: VehicleCategory::UtilityCombustion,
        payload_kg: 1200.0,
        volume_m3: Some(6.7),
        length_m: Some(5.56),
    },
    VehicleRecord {
        id: "deliver9",
        name: "Deliver 9",
        category: VehicleCategory::UtilityCombustion,
        payload_kg: 1380.0,
        volume_m3: Some(9.7),
        length_m: Some(5.94),
    },
    VehicleRecord {
        id: "edeliver3",
        name: "eDeliver 3",
        category: VehicleCategory::UtilityElectric,
        payload_kg: 905.0,
        volume_m3: Some(6.3),
        length_m: Some(5.14),
    },
    VehicleRecord {
        id: "edeliver5",
        name: "eDeliver 5",
        category: VehicleCategory::UtilityElectric,
        payload_kg: 1165.0,
        volume_m3: Some(5.9),
        length_m: Some(4.97),
    },
    VehicleRecord {
        id: "edeliver7",
        name: "eDeliver 7",
        category: VehicleCategory::UtilityElectric,
        payload_kg: 1200.0,
        volume_m3: Some(6.7),
        length_m: Some(5.56),
    },
    VehicleRecord {
        id: "edeliver9",
        name: "eDeliver 9",
        category: VehicleCategory::UtilityElectric,
        payload_kg: 1200.0,
        volume_m3: Some(11.0),
        length_m: Some(5.94),
    },
    VehicleRecord {
        id: "edeliver9-chassis",
        name: "eDeliver 9 Châssis cabine",
        category: VehicleCategory::UtilityElectric,
        payload_kg: 1535.0,
        volume_m3: None,
        length_m: Some(6.19),
    },
    VehicleRecord {
        id: "t60max",
        name: "T60 Max",
        category: VehicleCategory::PickupCombustion,
        payload_kg: 1000.0,
        volume_m3: None,
        length_m: Some(5.37),
    },
    VehicleRecord {
        id: "eterron9",
        name: "eTerron 9",
        category: VehicleCategory::PickupElectric,
        payload_kg: 650.0,
        volume_m3: None,
        length_m: Some(5.52),
    },
    VehicleRecord {
        id: "et90",
        name: "eT90",
        category: VehicleCategory::PickupElectric,
        payload_kg: 1000.0,
        volume_m3: None,
        length_m: Some(5.37),
    },
];

/// Criteria entered in the comparator form. Every field is optional; a
/// request without a category never matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub category: Option<VehicleCategory>,
    pub payload_kg: Option<f64>,
    pub volume_m3: Option<f64>,
    pub length_m: Option<f64>,
}

/// Distance between `vehicle` and `criteria`, lower is closer.
///
/// Returns `None` when the category is unset or differs, or when no numeric
/// criterion could be compared.
#[must_use]
pub fn score(vehicle: &VehicleRecord, criteria: &SearchCriteria) -> Option<f64> {
    if criteria.category? != vehicle.category {
        return None;
    }

    let pairs = [
        (criteria.payload_kg, Some(vehicle.payload_kg), PAYLOAD_WEIGHT),
        (criteria.volume_m3, vehicle.volume_m3, VOLUME_WEIGHT),
        (criteria.length_m, vehicle.length_m, LENGTH_WEIGHT),
    ];

    let mut total = 0.0;
    let mut considered = 0u32;
    for (wanted, actual, weight) in pairs {
        if let (Some(wanted), Some(actual)) = (wanted, actual) {
            if actual > 0.0 {
                total += (wanted - actual).abs() * weight;
                considered += 1;
            }
        }
    }

    if considered == 0 {
        return None;
    }
    Some(total / f64::from(considered))
}

/// Best match from [`CATALOG`].
#[must_use]
pub fn find_best_match(criteria: &SearchCriteria) -> Option<&'static VehicleRecord> {
    find_best_match_in(&CATALOG, criteria)
}

/// Linear scan keeping the strictly lowest score; the first vehicle wins ties.
#[must_use]
pub fn find_best_match_in<'a>(
    catalog: &'a [VehicleRecord],
    criteria: &SearchCriteria,
) -> Option<&'a VehicleRecord> {
    let mut best: Option<(&VehicleRecord, f64)> = None;
    for vehicle in catalog {
        let Some(s) = score(vehicle, criteria) else {
            continue;
        };
        match best {
            Some((_, best_score)) if s >= best_score => {}
            _ => best = Some((vehicle, s)),
        }
    }
    best.map(|(vehicle, _)| vehicle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria(
        category: Option<VehicleCategory>,
        payload_kg: Option<f64>,
        volume_m3: Option<f64>,
        length_m: Option<f64>,
    ) -> SearchCriteria {
        SearchCriteria {
            category,
            payload_kg,
            volume_m3,
            length_m,
        }
    }

    #[test]
    fn score_is_none_without_category() {
        let c = criteria(None, Some(1000.0), Some(8.0), Some(5.5));
        for vehicle in &CATALOG {
            assert_eq!(score(vehicle, &c), None, "{}", vehicle.id);
        }
    }

    #[test]
    fn score_is_none_on_category_mismatch() {
        for category in VehicleCategory::ALL {
            let c = criteria(Some(category), Some(1000.0), Some(8.0), Some(5.5));
            for vehicle in CATALOG.iter().filter(|v| v.category != category) {
                assert_eq!(score(vehicle, &c), None, "{} vs {category}", vehicle.id);
            }
        }
    }

    #[test]
    fn score_is_none_when_no_criterion_applies() {
        // Pickups carry no volume, so a volume-only request has nothing to compare.
        let c = criteria(Some(VehicleCategory::PickupElectric), None, Some(3.0), None);
        assert_eq!(score(&CATALOG[8], &c), None);
    }

    #[test]
    fn score_is_mean_of_weighted_differences() {
        let c = criteria(
            Some(VehicleCategory::UtilityCombustion),
            Some(1300.0),
            Some(9.0),
            None,
        );
        let deliver7 = score(&CATALOG[0], &c).unwrap();
        // (100 / 100 + 2.3 * 10) / 2
        assert!((deliver7 - 12.0).abs() < 1e-9, "got {deliver7}");
    }

    #[test]
    fn exact_payload_match_picks_eterron9() {
        let c = criteria(Some(VehicleCategory::PickupElectric), Some(650.0), None, None);
        let best = find_best_match(&c).expect("a pickup should match");
        assert_eq!(best.id, "eterron9");
        assert_eq!(score(best, &c), Some(0.0));
    }

    #[test]
    fn closer_payload_and_volume_picks_deliver9() {
        let c = criteria(
            Some(VehicleCategory::UtilityCombustion),
            Some(1300.0),
            Some(9.0),
            None,
        );
        assert_eq!(find_best_match(&c).map(|v| v.id), Some("deliver9"));
    }

    #[test]
    fn ties_keep_catalog_order() {
        // eDeliver 7 and eDeliver 9 share a 1200 kg payload.
        let c = criteria(Some(VehicleCategory::UtilityElectric), Some(1200.0), None, None);
        assert_eq!(find_best_match(&c).map(|v| v.id), Some("edeliver7"));
    }

    #[test]
    fn no_match_without_category() {
        let c = criteria(None, Some(650.0), None, None);
        assert!(find_best_match(&c).is_none());
    }

    #[test]
    fn category_parses_with_or_without_accent() {
        assert_eq!(
            "Pickup Électrique".parse::<VehicleCategory>().unwrap(),
            VehicleCategory::PickupElectric
        );
        assert_eq!(
            "utilitaire electrique".parse::<VehicleCategory>().unwrap(),
            VehicleCategory::UtilityElectric
        );
        assert!("camion".parse::<VehicleCategory>().is_err());
    }

    #[test]
    fn category_serializes_to_dropdown_label() {
        let json = serde_json::to_string(&VehicleCategory::PickupElectric).unwrap();
        assert_eq!(json, "\"pickup électrique\"");
    }
}
