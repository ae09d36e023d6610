//! Ordered cost-category rule table.
//!
//! Labels are matched case-insensitively after trimming and collapsing
//! whitespace. Matching runs in two passes over the same ordered table:
//!
//! 1. exact terms of every rule, in declaration order;
//! 2. substring terms of every rule, in declaration order, skipping a rule
//!    when the label contains one of its `except` terms.
//!
//! The first hit wins. Short abbreviations ("el", "ovk") live in the exact
//! pass so they never match inside unrelated words. Within the substring pass
//! the table runs from most specific to most general: "Mattvätt" contains the
//! telecom fragment "tv" and must reach the laundry rule first.

use serde::{Deserialize, Serialize};

use super::category::CanonicalCategory;

/// One entry of the rule table.
#[derive(Debug, Clone, Copy)]
pub struct NormalizationRule {
    pub category: CanonicalCategory,
    /// Whole-label matches, checked before any substring rule.
    pub exact: &'static [&'static str],
    /// Substring matches.
    pub contains: &'static [&'static str],
    /// Vetoes a substring match when any of these also occur.
    pub except: &'static [&'static str],
}

impl NormalizationRule {
    pub const fn new(
        category: CanonicalCategory,
        exact: &'static [&'static str],
        contains: &'static [&'static str],
        except: &'static [&'static str],
    ) -> Self {
        NormalizationRule {
            category,
            exact,
            contains,
            except,
        }
    }

    fn matches_exact(&self, label: &str) -> bool {
        self.exact.iter().any(|t| *t == label)
    }

    fn matches_substring(&self, label: &str) -> bool {
        self.contains.iter().any(|t| label.contains(t))
            && !self.except.iter().any(|t| label.contains(t))
    }
}

/// Waste vocabulary. Cleaning must not claim a label containing any of these.
const WASTE_TERMS: &[&str] = &[
    "sophämt",
    "avfall",
    "sophantering",
    "renhållning",
    "återvinning",
    "sopsug",
    "grovsopor",
];

use CanonicalCategory as C;

/// The rule table, most specific first.
pub static RULES: &[NormalizationRule] = &[
    NormalizationRule::new(C::LaundryMats, &["mattvätt", "mattvätt/hyrmattor"], &["mattvätt", "hyrmatt", "tvätt"], &[]),
    NormalizationRule::new(C::BuildingPhoneSystems, &[], &["porttelefon", "hisstelefon"], &[]),
    NormalizationRule::new(C::InternetCommunications, &[], &["bredband", "internet", "kabel", "tv", "telefoni"], &[]),
    NormalizationRule::new(
        C::Electricity,
        &["el", "el garage", "fastighetsel"],
        &["elavgift", "fastighetsels", "elförbrukning", "elkostnad", "elenergi"],
        &[],
    ),
    NormalizationRule::new(C::Heating, &[], &["värme", "fjarrvarme", "fjärrvärme", "uppvärmning"], &[]),
    NormalizationRule::new(C::WaterSewage, &[], &["vatten", "va-avgift", "avlopp"], &[]),
    NormalizationRule::new(C::WasteManagement, &[], WASTE_TERMS, &[]),
    NormalizationRule::new(C::Cleaning, &[], &["städ", "lokalvård"], WASTE_TERMS),
    NormalizationRule::new(
        C::PropertyMaintenance,
        &["drift"],
        &["fastighetsskötsel", "drift ", "driftkostnad", "serviceavtal", "förvaltningsarvode"],
        &[],
    ),
    NormalizationRule::new(C::RepairsMaintenance, &[], &["reparation", "underhåll"], &[]),
    NormalizationRule::new(C::Insurance, &[], &["försäkring"], &[]),
    NormalizationRule::new(C::LandLease, &[], &["tomträtt", "arrende"], &[]),
    NormalizationRule::new(C::PropertyTax, &[], &["fastighetsskatt", "fastighetsavgift", "kommunal avgift"], &[]),
    NormalizationRule::new(C::Elevator, &[], &["hiss"], &[]),
    NormalizationRule::new(C::SnowRemoval, &[], &["snöröj", "halkbekämp", "sandning"], &[]),
    NormalizationRule::new(C::LandscapingGrounds, &[], &["trädgård", "grönytor", "yttre skötsel"], &[]),
    NormalizationRule::new(C::ServiceInspections, &["ovk"], &["besiktning", "kontroll", "tillsyn"], &[]),
    NormalizationRule::new(
        C::Other,
        &["övrigt"],
        &["förbrukningsmaterial", "förbrukningsinventarier", "övrig", "gemensamhetsanläggning", "samfällighet"],
        &[],
    ),
];

/// Result of normalizing one raw label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Normalization {
    pub category: CanonicalCategory,
    pub category_group: String,
}

impl From<CanonicalCategory> for Normalization {
    fn from(category: CanonicalCategory) -> Self {
        Normalization {
            category,
            category_group: category.group().to_string(),
        }
    }
}

/// Evaluates an ordered rule slice. `Normalizer::default()` uses [`RULES`].
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'r> {
    rules: &'r [NormalizationRule],
}

impl Default for Normalizer<'static> {
    fn default() -> Self {
        Normalizer { rules: RULES }
    }
}

impl<'r> Normalizer<'r> {
    pub fn with_rules(rules: &'r [NormalizationRule]) -> Self {
        Normalizer { rules }
    }

    pub fn normalize(&self, raw_category: &str) -> Option<Normalization> {
        let label = canonical_label(raw_category);
        if label.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .find(|r| r.matches_exact(&label))
            .or_else(|| self.rules.iter().find(|r| r.matches_substring(&label)))
            .map(|r| Normalization::from(r.category))
    }
}

/// Normalize against the built-in rule table.
pub fn normalize(raw_category: &str) -> Option<Normalization> {
    Normalizer::default().normalize(raw_category)
}

/// Lower-cased, trimmed, single-spaced form used for matching.
pub fn canonical_label(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category_of(label: &str) -> Option<CanonicalCategory> {
        normalize(label).map(|n| n.category)
    }

    #[test]
    fn test_reference_labels() {
        let labels = [
            "El",
            "Fastighetsel",
            "Mattvätt",
            "Bredband",
            "Sophämtning",
            "Totally Unknown Label",
        ];
        let got: Vec<Option<CanonicalCategory>> = labels.iter().map(|l| category_of(l)).collect();
        assert_eq!(
            got,
            vec![
                Some(C::Electricity),
                Some(C::Electricity),
                Some(C::LaundryMats),
                Some(C::InternetCommunications),
                Some(C::WasteManagement),
                None,
            ]
        );
    }

    #[test]
    fn test_bare_el_only_matches_exactly() {
        // "el" occurs inside many unrelated words
        assert_eq!(category_of("Hotell"), None);
        assert_eq!(category_of("Kabel-TV"), Some(C::InternetCommunications));
        assert_eq!(category_of("  EL  "), Some(C::Electricity));
        assert_eq!(category_of("El garage"), Some(C::Electricity));
    }

    #[test]
    fn test_slash_compound_label() {
        assert_eq!(category_of("Mattvätt/Hyrmattor"), Some(C::LaundryMats));
    }

    #[test]
    fn test_cleaning_versus_waste() {
        assert_eq!(category_of("Städning"), Some(C::Cleaning));
        assert_eq!(category_of("Trappstädning"), Some(C::Cleaning));
        assert_eq!(category_of("Renhållning"), Some(C::WasteManagement));
        assert_eq!(category_of("Städ och renhållning"), Some(C::WasteManagement));
    }

    #[test]
    fn test_phone_systems_precede_elevator_and_internet() {
        assert_eq!(category_of("Hisstelefon"), Some(C::BuildingPhoneSystems));
        assert_eq!(category_of("Porttelefon"), Some(C::BuildingPhoneSystems));
        assert_eq!(category_of("Hiss service"), Some(C::Elevator));
    }

    #[test]
    fn test_group_tag_attached() {
        let n = normalize("Fjärrvärme").unwrap();
        assert_eq!(n.category, C::Heating);
        assert_eq!(n.category_group, "heating");
    }

    #[test]
    fn test_empty_label_is_uncategorized() {
        assert_eq!(normalize("   "), None);
    }

    #[test]
    fn test_ovk_exact_only() {
        assert_eq!(category_of("OVK"), Some(C::ServiceInspections));
        assert_eq!(category_of("Provkörning"), None);
    }
}
