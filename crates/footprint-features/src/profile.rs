//! Typed lifestyle answers supplied by the form layer.
//!
//! [`LifestyleProfile`] is the single input record of the estimation pipeline. Every
//! categorical answer is a closed enum declared together with its encoding table (see
//! [`attribute`](crate::attribute)), and every numeric answer is bounded by the range the
//! form accepts ([`NumericInput::range`]).
//!
//! The core pipeline assumes a validated profile. Callers that build profiles from
//! untrusted documents should run [`LifestyleProfile::validate`] first.

use std::{fmt, fmt::Write as _, ops::RangeInclusive};

use serde::{Deserialize, Serialize, de};

use crate::attribute::{Categorical, LabelSet, MultiLabel, categorical, multi_label};

/// Gender, encoded as the binary `Sex` column.
///
/// Unlike the other single-choice answers there is no baseline fallback: any label other
/// than male or female is rejected.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub const COLUMN: &'static str = "Sex";
    pub const ALL: [Self; 2] = [Self::Male, Self::Female];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }

    /// Value of the `Sex` column: 0 for male, 1 for female.
    #[must_use]
    pub fn indicator(self) -> f64 {
        match self {
            Self::Male => 0.0,
            Self::Female => 1.0,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Gender {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        crate::attribute::serialize_label(self.label(), serializer)
    }
}

impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        match crate::attribute::normalize_label(&label).as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            _ => Err(de::Error::unknown_variant(&label, &["male", "female"])),
        }
    }
}

categorical! {
    pub enum BodyType: "Body Type" {
        Normal => "Normal";
        Obese => "Obese", "Body Type_obese";
        Overweight => "Overweight", "Body Type_overweight";
        Underweight => "Underweight", "Body Type_underweight";
    }
    baseline = Normal;
    default = Normal;
}

categorical! {
    pub enum Diet: "Diet" {
        Omnivore => "Omnivore";
        Pescatarian => "Pescatarian", "Diet_pescatarian";
        Vegan => "Vegan", "Diet_vegan";
        Vegetarian => "Vegetarian", "Diet_vegetarian";
    }
    baseline = Omnivore;
    default = Omnivore;
}

categorical! {
    pub enum ShowerFrequency: "How Often Shower" {
        Daily => "Daily";
        LessFrequently => "Less Frequently", "How Often Shower_less frequently";
        MoreFrequently => "More Frequently", "How Often Shower_more frequently";
        TwiceADay => "Twice a Day", "How Often Shower_twice a day";
    }
    baseline = Daily;
    default = Daily;
}

categorical! {
    pub enum SocialActivity: "Social Activity" {
        Never => "Never";
        Often => "Often", "Social Activity_often";
        Sometimes => "Sometimes", "Social Activity_sometimes";
    }
    baseline = Never;
    default = Never;
}

categorical! {
    pub enum HeatingSource: "Heating Energy Source" {
        Coal => "Coal";
        Electricity => "Electricity", "Heating Energy Source_electricity";
        NaturalGas => "Natural Gas", "Heating Energy Source_natural gas";
        Wood => "Wood", "Heating Energy Source_wood";
    }
    baseline = Coal;
    default = Coal;
}

categorical! {
    /// Whether the household buys energy-efficient appliances.
    ///
    /// The trained schema keeps the capitalized level names in these columns.
    pub enum EnergyEfficiency: "Energy efficiency" {
        No => "No";
        Sometimes => "Sometimes", "Energy efficiency_Sometimes";
        Yes => "Yes", "Energy efficiency_Yes";
    }
    baseline = No;
    default = No;
}

categorical! {
    pub enum Transport: "Transport" {
        Private => "Private";
        Public => "Public", "Transport_public";
        WalkBicycle => "Walk/Bicycle", "Transport_walk/bicycle";
    }
    baseline = Private;
    default = Private;
}

categorical! {
    pub enum VehicleType: "Vehicle Type" {
        NoVehicle => "None";
        Electric => "Electric", "Vehicle Type_electric";
        Hybrid => "Hybrid", "Vehicle Type_hybrid";
        Lpg => "LPG", "Vehicle Type_lpg";
        Petrol => "Petrol", "Vehicle Type_petrol";
        Unknown => "Unknown", "Vehicle Type_unknown";
    }
    baseline = NoVehicle;
    default = NoVehicle;
}

categorical! {
    /// How often the user travels by plane.
    ///
    /// `Frequently` is the dropped level of the trained schema, so the form default
    /// (`Never`) sets an indicator column.
    pub enum AirTravelFrequency: "Frequency of Traveling by Air" {
        Never => "Never", "Frequency of Traveling by Air_never";
        Rarely => "Rarely", "Frequency of Traveling by Air_rarely";
        Frequently => "Frequently";
        VeryFrequently => "Very Frequently", "Frequency of Traveling by Air_very frequently";
    }
    baseline = Frequently;
    default = Never;
}

categorical! {
    /// Size of the household's waste bags. `ExtraLarge` is the dropped level.
    pub enum WasteBagSize: "Waste Bag Size" {
        Small => "Small", "Waste Bag Size_small";
        Medium => "Medium", "Waste Bag Size_medium";
        Large => "Large", "Waste Bag Size_large";
        ExtraLarge => "Extra Large";
    }
    baseline = ExtraLarge;
    default = Small;
}

multi_label! {
    pub enum RecyclingMaterial: "Recycling" {
        Glass => "Glass", "Glass";
        Metal => "Metal", "Metal";
        Paper => "Paper", "Paper";
        Plastic => "Plastic", "Plastic";
    }
}

multi_label! {
    pub enum CookingMethod: "Cooking With" {
        Airfryer => "Airfryer", "Airfryer";
        Grill => "Grill", "Grill";
        Microwave => "Microwave", "Microwave";
        Oven => "Oven", "Oven";
        Stove => "Stove", "Stove";
    }
}

/// The six numeric answers, each written raw into its own column and later scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericInput {
    MonthlyGroceryBill,
    VehicleMonthlyDistanceKm,
    WasteBagWeeklyCount,
    TvPcDailyHours,
    NewClothesMonthly,
    InternetDailyHours,
}

impl NumericInput {
    pub const ALL: [Self; 6] = [
        Self::MonthlyGroceryBill,
        Self::VehicleMonthlyDistanceKm,
        Self::WasteBagWeeklyCount,
        Self::TvPcDailyHours,
        Self::NewClothesMonthly,
        Self::InternetDailyHours,
    ];

    /// Column name in the trained schema
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::MonthlyGroceryBill => "Monthly Grocery Bill",
            Self::VehicleMonthlyDistanceKm => "Vehicle Monthly Distance Km",
            Self::WasteBagWeeklyCount => "Waste Bag Weekly Count",
            Self::TvPcDailyHours => "How Long TV PC Daily Hour",
            Self::NewClothesMonthly => "How Many New Clothes Monthly",
            Self::InternetDailyHours => "How Long Internet Daily Hour",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::MonthlyGroceryBill => "Monthly Grocery Bill ($)",
            Self::VehicleMonthlyDistanceKm => "Vehicle Monthly Distance (Km)",
            Self::WasteBagWeeklyCount => "Waste Bag Weekly Count",
            Self::TvPcDailyHours => "TV/PC Daily Hours",
            Self::NewClothesMonthly => "New Clothes Monthly",
            Self::InternetDailyHours => "Internet Daily Hours",
        }
    }

    /// Inclusive range accepted by the form
    #[must_use]
    pub fn range(self) -> RangeInclusive<f64> {
        match self {
            Self::MonthlyGroceryBill => 0.0..=1000.0,
            Self::VehicleMonthlyDistanceKm => 0.0..=5000.0,
            Self::WasteBagWeeklyCount => 0.0..=20.0,
            Self::TvPcDailyHours | Self::InternetDailyHours => 0.0..=24.0,
            Self::NewClothesMonthly => 0.0..=50.0,
        }
    }

    /// Initial value shown by the form
    #[must_use]
    pub fn default_value(self) -> f64 {
        match self {
            Self::MonthlyGroceryBill => 200.0,
            Self::VehicleMonthlyDistanceKm => 500.0,
            Self::WasteBagWeeklyCount => 3.0,
            Self::TvPcDailyHours => 4.0,
            Self::NewClothesMonthly => 2.0,
            Self::InternetDailyHours => 3.0,
        }
    }
}

impl fmt::Display for NumericInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ProfileError {
    #[display("{input} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        input: NumericInput,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Lifestyle answers for one estimation request.
///
/// Missing fields in a serialized profile take the form defaults
/// ([`LifestyleProfile::default`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifestyleProfile {
    pub gender: Gender,
    pub body_type: BodyType,
    pub diet: Diet,
    pub shower_frequency: ShowerFrequency,
    pub social_activity: SocialActivity,
    pub heating_source: HeatingSource,
    pub energy_efficiency: EnergyEfficiency,
    pub transport: Transport,
    pub vehicle_type: VehicleType,
    pub air_travel: AirTravelFrequency,
    pub waste_bag_size: WasteBagSize,
    pub recycling: LabelSet<RecyclingMaterial>,
    pub cooking: LabelSet<CookingMethod>,
    pub monthly_grocery_bill: f64,
    pub vehicle_monthly_distance_km: f64,
    pub waste_bag_weekly_count: f64,
    pub tv_pc_daily_hours: f64,
    pub new_clothes_monthly: f64,
    pub internet_daily_hours: f64,
}

impl Default for LifestyleProfile {
    fn default() -> Self {
        Self {
            gender: Gender::default(),
            body_type: BodyType::default(),
            diet: Diet::default(),
            shower_frequency: ShowerFrequency::default(),
            social_activity: SocialActivity::default(),
            heating_source: HeatingSource::default(),
            energy_efficiency: EnergyEfficiency::default(),
            transport: Transport::default(),
            vehicle_type: VehicleType::default(),
            air_travel: AirTravelFrequency::default(),
            waste_bag_size: WasteBagSize::default(),
            recycling: LabelSet::new(),
            cooking: LabelSet::new(),
            monthly_grocery_bill: NumericInput::MonthlyGroceryBill.default_value(),
            vehicle_monthly_distance_km: NumericInput::VehicleMonthlyDistanceKm.default_value(),
            waste_bag_weekly_count: NumericInput::WasteBagWeeklyCount.default_value(),
            tv_pc_daily_hours: NumericInput::TvPcDailyHours.default_value(),
            new_clothes_monthly: NumericInput::NewClothesMonthly.default_value(),
            internet_daily_hours: NumericInput::InternetDailyHours.default_value(),
        }
    }
}

impl LifestyleProfile {
    #[must_use]
    pub fn numeric(&self, input: NumericInput) -> f64 {
        match input {
            NumericInput::MonthlyGroceryBill => self.monthly_grocery_bill,
            NumericInput::VehicleMonthlyDistanceKm => self.vehicle_monthly_distance_km,
            NumericInput::WasteBagWeeklyCount => self.waste_bag_weekly_count,
            NumericInput::TvPcDailyHours => self.tv_pc_daily_hours,
            NumericInput::NewClothesMonthly => self.new_clothes_monthly,
            NumericInput::InternetDailyHours => self.internet_daily_hours,
        }
    }

    pub fn set_numeric(&mut self, input: NumericInput, value: f64) {
        let slot = match input {
            NumericInput::MonthlyGroceryBill => &mut self.monthly_grocery_bill,
            NumericInput::VehicleMonthlyDistanceKm => &mut self.vehicle_monthly_distance_km,
            NumericInput::WasteBagWeeklyCount => &mut self.waste_bag_weekly_count,
            NumericInput::TvPcDailyHours => &mut self.tv_pc_daily_hours,
            NumericInput::NewClothesMonthly => &mut self.new_clothes_monthly,
            NumericInput::InternetDailyHours => &mut self.internet_daily_hours,
        };
        *slot = value;
    }

    /// Checks every numeric answer against its form range.
    ///
    /// Non-finite values are always out of range.
    pub fn validate(&self) -> Result<(), ProfileError> {
        for input in NumericInput::ALL {
            let value = self.numeric(input);
            let range = input.range();
            if !range.contains(&value) {
                return Err(ProfileError::OutOfRange {
                    input,
                    value,
                    min: *range.start(),
                    max: *range.end(),
                });
            }
        }
        Ok(())
    }

    /// Plain-text rendering of every answer, one `label: value` per line.
    ///
    /// Used as the free-form profile description sent to the insight generator.
    #[must_use]
    pub fn summary(&self) -> String {
        fn join<T: MultiLabel>(set: &LabelSet<T>) -> String {
            if set.is_empty() {
                "none".to_owned()
            } else {
                set.iter().map(T::label).collect::<Vec<_>>().join(", ")
            }
        }

        let mut out = String::new();
        let mut line = |label: &str, value: &dyn fmt::Display| {
            let _ = writeln!(out, "{label}: {value}");
        };
        line("Gender", &self.gender);
        line(BodyType::ATTRIBUTE, &self.body_type);
        line(Diet::ATTRIBUTE, &self.diet);
        line("Shower frequency", &self.shower_frequency);
        line(SocialActivity::ATTRIBUTE, &self.social_activity);
        line(HeatingSource::ATTRIBUTE, &self.heating_source);
        line("Energy efficiency", &self.energy_efficiency);
        line(Transport::ATTRIBUTE, &self.transport);
        line(VehicleType::ATTRIBUTE, &self.vehicle_type);
        line("Air travel", &self.air_travel);
        line(WasteBagSize::ATTRIBUTE, &self.waste_bag_size);
        line("Recycles", &join(&self.recycling));
        line("Cooks with", &join(&self.cooking));
        for input in NumericInput::ALL {
            line(input.label(), &self.numeric(input));
        }
        out
    }
}
