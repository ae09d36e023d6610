use brf_benchmark_core::normalization::{
    normalize, CanonicalCategory, NormalizationRule, NormalizationTable, Normalizer, RULES,
};
use brf_benchmark_core::store::{CostStore, LabelUsage};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use CanonicalCategory as C;

fn category_of(label: &str) -> Option<C> {
    normalize(label).map(|n| n.category)
}

// ===========================================================================
// Reference labels
// ===========================================================================

#[test]
fn test_reference_batch() {
    let labels = ["El", "Fastighetsel", "Mattvätt", "Bredband", "Sophämtning", "Totally Unknown Label"];
    let got: Vec<_> = labels.iter().map(|l| normalize(l)).collect();

    assert_eq!(got[0].as_ref().map(|n| n.category), Some(C::Electricity));
    assert_eq!(got[0].as_ref().map(|n| n.category_group.as_str()), Some("electricity"));
    assert_eq!(got[1].as_ref().map(|n| n.category), Some(C::Electricity));
    assert_eq!(got[2].as_ref().map(|n| n.category), Some(C::LaundryMats));
    assert_eq!(got[2].as_ref().map(|n| n.category_group.as_str()), Some("laundry"));
    assert_eq!(got[3].as_ref().map(|n| n.category), Some(C::InternetCommunications));
    assert_eq!(got[3].as_ref().map(|n| n.category_group.as_str()), Some("internet"));
    assert_eq!(got[4].as_ref().map(|n| n.category), Some(C::WasteManagement));
    assert_eq!(got[4].as_ref().map(|n| n.category_group.as_str()), Some("waste"));
    assert_eq!(got[5], None);
}

#[test]
fn test_case_and_whitespace_insensitive() {
    for label in ["fjärrvärme", "FJÄRRVÄRME", "  Fjärrvärme\t", "Fjärr värme"] {
        // the last one only matches through "värme"
        assert_eq!(category_of(label), Some(C::Heating), "{label}");
    }
}

#[test]
fn test_common_swedish_labels() {
    let cases = [
        ("Vatten och avlopp", C::WaterSewage),
        ("Fastighetsskötsel", C::PropertyMaintenance),
        ("Drift", C::PropertyMaintenance),
        ("Reparationer", C::RepairsMaintenance),
        ("Planerat underhåll", C::RepairsMaintenance),
        ("Fastighetsförsäkring", C::Insurance),
        ("Tomträttsavgäld", C::LandLease),
        ("Fastighetsskatt", C::PropertyTax),
        ("Hiss", C::Elevator),
        ("Snöröjning", C::SnowRemoval),
        ("Trädgårdsskötsel", C::LandscapingGrounds),
        ("Kabel-TV", C::InternetCommunications),
        ("Porttelefon", C::BuildingPhoneSystems),
        ("OVK", C::ServiceInspections),
        ("Övrigt", C::Other),
    ];
    for (label, expected) in cases {
        assert_eq!(category_of(label), Some(expected), "{label}");
    }
}

// ===========================================================================
// Determinism
// ===========================================================================

#[test]
fn test_normalize_is_deterministic() {
    let labels = ["El", "Mattvätt", "Städ och sophämtning", "Kabel-TV", "Okänd", ""];
    let first: Vec<_> = labels.iter().map(|l| normalize(l)).collect();
    for _ in 0..50 {
        let again: Vec<_> = labels.iter().map(|l| normalize(l)).collect();
        assert_eq!(first, again);
    }
}

#[test]
fn test_table_independent_of_label_order() {
    let mut labels = vec![
        "El", "Fastighetsel", "Vatten", "Sophämtning", "Städning", "Mattvätt", "Bredband", "Okänd post",
    ];
    let reference = NormalizationTable::build(labels.iter().copied());
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        labels.shuffle(&mut rng);
        let table = NormalizationTable::build(labels.iter().copied());
        for label in &labels {
            assert_eq!(table.lookup(label), reference.lookup(label), "{label}");
        }
    }
}

// ===========================================================================
// Rule order
// ===========================================================================

#[test]
fn test_laundry_before_internet() {
    // "mattvätt" contains the telecom fragment "tv"
    assert_eq!(category_of("Mattvätt"), Some(C::LaundryMats));
    assert_eq!(category_of("Mattvätt entré"), Some(C::LaundryMats));
}

#[test]
fn test_reordered_table_changes_outcome() {
    let laundry = RULES
        .iter()
        .position(|r| r.category == C::LaundryMats)
        .unwrap();
    let internet = RULES
        .iter()
        .position(|r| r.category == C::InternetCommunications)
        .unwrap();
    assert!(laundry < internet);

    let mut reordered: Vec<NormalizationRule> = RULES.to_vec();
    reordered.swap(laundry, internet);
    let swapped = Normalizer::with_rules(&reordered);

    let label = "Mattvätt entré";
    assert_eq!(
        swapped.normalize(label).map(|n| n.category),
        Some(C::InternetCommunications)
    );
    assert_eq!(Normalizer::default().normalize(label).map(|n| n.category), Some(C::LaundryMats));
}

#[test]
fn test_two_rule_tables_first_match_wins() {
    let laundry = NormalizationRule::new(C::LaundryMats, &[], &["mattvätt"], &[]);
    let internet = NormalizationRule::new(C::InternetCommunications, &[], &["tv"], &[]);

    let laundry_first = [laundry, internet];
    let internet_first = [internet, laundry];
    assert_eq!(
        Normalizer::with_rules(&laundry_first).normalize("Mattvätt").map(|n| n.category),
        Some(C::LaundryMats)
    );
    assert_eq!(
        Normalizer::with_rules(&internet_first).normalize("Mattvätt").map(|n| n.category),
        Some(C::InternetCommunications)
    );
}

#[test]
fn test_exact_terms_beat_earlier_substrings() {
    // "el" alone is electricity even though no substring rule covers it
    assert_eq!(category_of("El"), Some(C::Electricity));
    // while words merely containing "el" are left alone
    assert_eq!(category_of("Hotell"), None);
    assert_eq!(category_of("Spel"), None);
}

// ===========================================================================
// Cleaning / waste overlap
// ===========================================================================

#[test]
fn test_cleaning_without_waste_terms() {
    assert_eq!(category_of("Städning"), Some(C::Cleaning));
    assert_eq!(category_of("Trappstädning"), Some(C::Cleaning));
    assert_eq!(category_of("Lokalvård"), Some(C::Cleaning));
}

#[test]
fn test_waste_terms_never_become_cleaning() {
    for label in ["Sophämtning", "Städ och sophämtning", "Renhållning städ", "Avfallshantering"] {
        assert_eq!(category_of(label), Some(C::WasteManagement), "{label}");
    }
}

#[test]
fn test_cleaning_veto_holds_regardless_of_order() {
    let cleaning = RULES.iter().position(|r| r.category == C::Cleaning).unwrap();
    let waste = RULES
        .iter()
        .position(|r| r.category == C::WasteManagement)
        .unwrap();
    let mut reordered: Vec<NormalizationRule> = RULES.to_vec();
    reordered.swap(cleaning, waste);
    let normalizer = Normalizer::with_rules(&reordered);

    assert_eq!(
        normalizer.normalize("Städ och sophämtning").map(|n| n.category),
        Some(C::WasteManagement)
    );
    assert_eq!(normalizer.normalize("Städning").map(|n| n.category), Some(C::Cleaning));
}

// ===========================================================================
// Table and gap report
// ===========================================================================

#[test]
fn test_every_benchmarked_category_reachable() {
    for category in C::BENCHMARKED {
        assert!(
            RULES.iter().any(|r| r.category == category),
            "{category} has no rule"
        );
    }
}

#[test]
fn test_gap_report_from_store_usage() {
    use brf_benchmark_core::store::{CostRecord, Dataset, EntityMetrics, EntityProfile, InMemoryStore};
    use rust_decimal_macros::dec;

    let entity = |id: &str| EntityProfile {
        entity_id: id.into(),
        name: String::new(),
        total_area: Some(dec!(1000)),
        peer_group: None,
        postal_code: None,
        address: None,
        metrics: EntityMetrics::default(),
    };
    let record = |id: &str, label: &str| CostRecord {
        entity_id: id.into(),
        raw_category: label.into(),
        amount: dec!(100),
        period: None,
    };
    let store = InMemoryStore::new(Dataset {
        snapshot_date: None,
        entities: vec![entity("a"), entity("b"), entity("c")],
        cost_records: vec![
            record("a", "El"),
            record("b", "El"),
            record("a", "Bilpool"),
            record("b", "Bilpool"),
            record("c", "Bilpool"),
            record("c", "Konstverk"),
        ],
    })
    .unwrap();

    let usage: Vec<LabelUsage> = store.label_usage().unwrap();
    let table = NormalizationTable::build(usage.iter().map(|u| u.label.as_str()));
    let report = table.gap_report(&usage, 2);

    assert_eq!(report.total_unclassified_labels, 2);
    assert_eq!(report.gaps.len(), 1);
    assert_eq!(report.gaps[0].label, "Bilpool");
    assert_eq!(report.gaps[0].entity_count, 3);
    assert_eq!(table.unclassified().collect::<Vec<_>>(), vec!["Bilpool", "Konstverk"]);
}
