use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::BenchmarkError;

/// Closed set of canonical cost categories.
///
/// Serializes as its display name ("Water & Sewage"), which is also the
/// label the dashboards show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CanonicalCategory {
    #[serde(rename = "Internet & Communications")]
    InternetCommunications,
    #[serde(rename = "Waste Management")]
    WasteManagement,
    #[serde(rename = "Cleaning")]
    Cleaning,
    #[serde(rename = "Electricity")]
    Electricity,
    #[serde(rename = "Heating")]
    Heating,
    #[serde(rename = "Water & Sewage")]
    WaterSewage,
    #[serde(rename = "Property Maintenance")]
    PropertyMaintenance,
    #[serde(rename = "Repairs & Maintenance")]
    RepairsMaintenance,
    #[serde(rename = "Insurance")]
    Insurance,
    #[serde(rename = "Property Tax")]
    PropertyTax,
    #[serde(rename = "Elevator")]
    Elevator,
    #[serde(rename = "Snow Removal")]
    SnowRemoval,
    #[serde(rename = "Landscaping & Grounds")]
    LandscapingGrounds,
    #[serde(rename = "Land Lease")]
    LandLease,
    #[serde(rename = "Laundry & Mats")]
    LaundryMats,
    #[serde(rename = "Building Phone Systems")]
    BuildingPhoneSystems,
    #[serde(rename = "Service & Inspections")]
    ServiceInspections,
    #[serde(rename = "Other")]
    Other,
}

impl CanonicalCategory {
    /// Categories with a peer benchmark, in the order savings are evaluated.
    pub const BENCHMARKED: [CanonicalCategory; 14] = [
        CanonicalCategory::InternetCommunications,
        CanonicalCategory::WasteManagement,
        CanonicalCategory::Cleaning,
        CanonicalCategory::Electricity,
        CanonicalCategory::Heating,
        CanonicalCategory::WaterSewage,
        CanonicalCategory::PropertyMaintenance,
        CanonicalCategory::RepairsMaintenance,
        CanonicalCategory::Insurance,
        CanonicalCategory::PropertyTax,
        CanonicalCategory::Elevator,
        CanonicalCategory::SnowRemoval,
        CanonicalCategory::LandscapingGrounds,
        CanonicalCategory::LandLease,
    ];

    pub const ALL: [CanonicalCategory; 18] = [
        CanonicalCategory::InternetCommunications,
        CanonicalCategory::WasteManagement,
        CanonicalCategory::Cleaning,
        CanonicalCategory::Electricity,
        CanonicalCategory::Heating,
        CanonicalCategory::WaterSewage,
        CanonicalCategory::PropertyMaintenance,
        CanonicalCategory::RepairsMaintenance,
        CanonicalCategory::Insurance,
        CanonicalCategory::PropertyTax,
        CanonicalCategory::Elevator,
        CanonicalCategory::SnowRemoval,
        CanonicalCategory::LandscapingGrounds,
        CanonicalCategory::LandLease,
        CanonicalCategory::LaundryMats,
        CanonicalCategory::BuildingPhoneSystems,
        CanonicalCategory::ServiceInspections,
        CanonicalCategory::Other,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            CanonicalCategory::InternetCommunications => "Internet & Communications",
            CanonicalCategory::WasteManagement => "Waste Management",
            CanonicalCategory::Cleaning => "Cleaning",
            CanonicalCategory::Electricity => "Electricity",
            CanonicalCategory::Heating => "Heating",
            CanonicalCategory::WaterSewage => "Water & Sewage",
            CanonicalCategory::PropertyMaintenance => "Property Maintenance",
            CanonicalCategory::RepairsMaintenance => "Repairs & Maintenance",
            CanonicalCategory::Insurance => "Insurance",
            CanonicalCategory::PropertyTax => "Property Tax",
            CanonicalCategory::Elevator => "Elevator",
            CanonicalCategory::SnowRemoval => "Snow Removal",
            CanonicalCategory::LandscapingGrounds => "Landscaping & Grounds",
            CanonicalCategory::LandLease => "Land Lease",
            CanonicalCategory::LaundryMats => "Laundry & Mats",
            CanonicalCategory::BuildingPhoneSystems => "Building Phone Systems",
            CanonicalCategory::ServiceInspections => "Service & Inspections",
            CanonicalCategory::Other => "Other",
        }
    }

    /// The coarser group tag stored alongside each normalized label.
    pub fn group(self) -> &'static str {
        match self {
            CanonicalCategory::InternetCommunications => "internet",
            CanonicalCategory::WasteManagement => "waste",
            CanonicalCategory::Cleaning => "cleaning",
            CanonicalCategory::Electricity => "electricity",
            CanonicalCategory::Heating => "heating",
            CanonicalCategory::WaterSewage => "water",
            CanonicalCategory::PropertyMaintenance => "property",
            CanonicalCategory::RepairsMaintenance => "repairs",
            CanonicalCategory::Insurance => "insurance",
            CanonicalCategory::PropertyTax => "tax",
            CanonicalCategory::Elevator => "elevator",
            CanonicalCategory::SnowRemoval => "snow",
            CanonicalCategory::LandscapingGrounds => "landscaping",
            CanonicalCategory::LandLease => "land",
            CanonicalCategory::LaundryMats => "laundry",
            CanonicalCategory::BuildingPhoneSystems => "phone_systems",
            CanonicalCategory::ServiceInspections => "service",
            CanonicalCategory::Other => "other",
        }
    }

    pub fn is_benchmarked(self) -> bool {
        Self::BENCHMARKED.contains(&self)
    }
}

impl std::fmt::Display for CanonicalCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for CanonicalCategory {
    type Err = BenchmarkError;

    /// Accepts the display name or the group tag, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        CanonicalCategory::ALL
            .iter()
            .copied()
            .find(|c| c.display_name().to_lowercase() == wanted || c.group() == wanted)
            .ok_or_else(|| BenchmarkError::InvalidInput {
                field: "category".into(),
                reason: format!("'{s}' is not a canonical cost category"),
            })
    }
}
