//! Rule-based recommendations.
//!
//! Each [`Rule`] is an independent predicate over the raw profile answers. Rules never
//! look at the prediction and never suppress each other: every rule that matches
//! contributes its message, in declaration order.

use footprint_features::profile::{
    AirTravelFrequency, Diet, EnergyEfficiency, LifestyleProfile, RecyclingMaterial, Transport,
    VehicleType,
};
use serde::Serialize;

/// Monthly distance above which the vehicle rule fires.
pub const VEHICLE_DISTANCE_LIMIT_KM: f64 = 1000.0;

pub const CONGRATULATION: &str = "Great job! You're already practicing many eco-friendly habits!";

pub const ESTIMATE_CAVEAT: &str = "This is an estimate based on machine learning predictions. \
     Actual carbon footprint may vary based on many factors.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    VehicleDistance,
    AirTravel,
    PetrolVehicle,
    Recycling,
    EnergyEfficiency,
    Diet,
}

impl Rule {
    pub const ALL: [Self; 6] = [
        Self::VehicleDistance,
        Self::AirTravel,
        Self::PetrolVehicle,
        Self::Recycling,
        Self::EnergyEfficiency,
        Self::Diet,
    ];

    #[must_use]
    pub fn matches(self, profile: &LifestyleProfile) -> bool {
        match self {
            Self::VehicleDistance => profile.vehicle_monthly_distance_km > VEHICLE_DISTANCE_LIMIT_KM,
            Self::AirTravel => matches!(
                profile.air_travel,
                AirTravelFrequency::Frequently | AirTravelFrequency::VeryFrequently
            ),
            Self::PetrolVehicle => {
                profile.transport == Transport::Private
                    && profile.vehicle_type == VehicleType::Petrol
            }
            Self::Recycling => {
                !profile.recycling.contains(RecyclingMaterial::Paper)
                    && !profile.recycling.contains(RecyclingMaterial::Plastic)
            }
            Self::EnergyEfficiency => profile.energy_efficiency == EnergyEfficiency::No,
            Self::Diet => profile.diet == Diet::Omnivore,
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::VehicleDistance => {
                "Consider using public transport or carpooling to reduce vehicle emissions."
            }
            Self::AirTravel => {
                "Air travel has a significant carbon footprint. Consider video calls or train travel when possible."
            }
            Self::PetrolVehicle => {
                "Switching to a hybrid or electric vehicle could significantly reduce your emissions."
            }
            Self::Recycling => {
                "Start recycling paper and plastic to reduce waste-related emissions."
            }
            Self::EnergyEfficiency => {
                "Invest in energy-efficient appliances and LED bulbs to reduce energy consumption."
            }
            Self::Diet => {
                "Reducing meat consumption, even by a few days per week, can lower your carbon footprint."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub rule: Rule,
    pub message: &'static str,
}

/// Every recommendation whose rule matches `profile`.
#[must_use]
pub fn recommend(profile: &LifestyleProfile) -> Vec<Recommendation> {
    Rule::ALL
        .into_iter()
        .filter(|rule| rule.matches(profile))
        .map(|rule| Recommendation {
            rule,
            message: rule.message(),
        })
        .collect()
}
