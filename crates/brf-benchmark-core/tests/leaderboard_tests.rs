use brf_benchmark_core::leaderboard::{build_leaderboard, leaderboard_pair, rank_population, RankItem};
use brf_benchmark_core::peers::PeerFilter;
use brf_benchmark_core::population::{Metric, PeerPopulationIndex};
use brf_benchmark_core::store::{Dataset, EntityMetrics, EntityProfile, InMemoryStore};
use brf_benchmark_core::SortOrder;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn entity(id: &str, group: &str, metrics: EntityMetrics) -> EntityProfile {
    EntityProfile {
        entity_id: id.into(),
        name: format!("BRF {id}"),
        total_area: Some(dec!(1000)),
        peer_group: Some(group.into()),
        postal_code: None,
        address: None,
        metrics,
    }
}

fn with_debt(debt: Option<Decimal>) -> EntityMetrics {
    EntityMetrics {
        debt_per_sqm: debt,
        ..Default::default()
    }
}

fn store() -> InMemoryStore {
    InMemoryStore::new(Dataset {
        snapshot_date: None,
        entities: vec![
            entity("a", "Sickla", with_debt(Some(dec!(8500)))),
            entity("b", "Sickla", with_debt(None)),
            entity("c", "Sickla", with_debt(Some(dec!(2100)))),
            entity("d", "Hjorthagen", with_debt(Some(dec!(14000)))),
            entity("e", "Hjorthagen", with_debt(Some(dec!(0)))),
            entity(
                "f",
                "Hjorthagen",
                EntityMetrics {
                    debt_per_sqm: Some(dec!(5000)),
                    solidity_percent: Some(dec!(72.5)),
                    ..Default::default()
                },
            ),
        ],
        cost_records: vec![],
    })
    .unwrap()
}

fn ids(entries: &[brf_benchmark_core::leaderboard::LeaderboardEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.entity_id.as_str()).collect()
}

#[test]
fn test_lowest_debt_first() {
    let s = store();
    let index = PeerPopulationIndex::from_store(&s).unwrap();
    let out = build_leaderboard(&index, Metric::DebtPerSqm, SortOrder::Asc, None, None).unwrap();
    let board = &out.result;

    // b has no value; e is debt-free and ranks first
    assert_eq!(ids(&board.entries), vec!["e", "c", "f", "a", "d"]);
    assert_eq!(board.ranked_population, 5);
    assert_eq!(board.entries[0].rank, 1);
    assert_eq!(board.entries[0].value, Decimal::ZERO);
    assert_eq!(board.entries[1].value, dec!(2100));
    assert!(out.warnings.iter().any(|w| w.contains("1 of 6")));
}

#[test]
fn test_limit_applies_after_sort() {
    let s = store();
    let index = PeerPopulationIndex::from_store(&s).unwrap();
    let board = build_leaderboard(&index, Metric::DebtPerSqm, SortOrder::Desc, Some(2), None)
        .unwrap()
        .result;
    assert_eq!(ids(&board.entries), vec!["d", "a"]);
    assert_eq!(board.ranked_population, 5);
}

#[test]
fn test_peer_filtered_leaderboard() {
    let s = store();
    let index = PeerPopulationIndex::from_store(&s).unwrap();
    let filter = PeerFilter::new("Hjorthagen");
    let board = build_leaderboard(&index, Metric::DebtPerSqm, SortOrder::Asc, None, Some(&filter))
        .unwrap()
        .result;
    assert_eq!(ids(&board.entries), vec!["e", "f", "d"]);
    assert!(board
        .entries
        .iter()
        .all(|e| e.peer_group.as_deref() == Some("Hjorthagen")));
}

#[test]
fn test_zero_value_is_ranked_but_zero_interest_is_not() {
    let s = InMemoryStore::new(Dataset {
        snapshot_date: None,
        entities: vec![
            entity(
                "debtfree",
                "Sickla",
                EntityMetrics {
                    debt_per_sqm: Some(Decimal::ZERO),
                    interest_rate: Some(Decimal::ZERO),
                    ..Default::default()
                },
            ),
            entity(
                "b",
                "Sickla",
                EntityMetrics {
                    debt_per_sqm: Some(dec!(5000)),
                    interest_rate: Some(dec!(3.1)),
                    ..Default::default()
                },
            ),
            entity("c", "Sickla", with_debt(None)),
        ],
        cost_records: vec![],
    })
    .unwrap();
    let index = PeerPopulationIndex::from_store(&s).unwrap();

    let out = build_leaderboard(&index, Metric::DebtPerSqm, SortOrder::Asc, None, None).unwrap();
    assert_eq!(ids(&out.result.entries), vec!["debtfree", "b"]);
    assert!(out.warnings.iter().any(|w| w.starts_with("1 of 3")));

    // a zero interest rate is an unreported loan, not a free one
    let rates = build_leaderboard(&index, Metric::InterestRate, SortOrder::Asc, None, None)
        .unwrap()
        .result;
    assert_eq!(ids(&rates.entries), vec!["b"]);
}

#[test]
fn test_zero_limit_rejected() {
    let s = store();
    let index = PeerPopulationIndex::from_store(&s).unwrap();
    assert!(build_leaderboard(&index, Metric::DebtPerSqm, SortOrder::Asc, Some(0), None).is_err());
}

#[test]
fn test_metric_nobody_reports_is_empty_with_warning() {
    let s = store();
    let index = PeerPopulationIndex::from_store(&s).unwrap();
    let out = build_leaderboard(&index, Metric::InterestRate, SortOrder::Asc, Some(20), None).unwrap();
    assert!(out.result.entries.is_empty());
    assert!(out.warnings.iter().any(|w| w.contains("Insufficient data")));
}

#[test]
fn test_pair_top_and_bottom() {
    let s = store();
    let index = PeerPopulationIndex::from_store(&s).unwrap();
    let pair = leaderboard_pair(&index, Metric::DebtPerSqm, 2, None).unwrap().result;
    assert_eq!(ids(&pair.top), vec!["e", "c"]);
    assert_eq!(ids(&pair.bottom), vec!["d", "a"]);

    // solidity reads best-high
    let pair = leaderboard_pair(&index, Metric::SolidityPercent, 3, None).unwrap().result;
    assert_eq!(ids(&pair.top), vec!["f"]);
}

#[test]
fn test_rank_population_never_contains_nulls() {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..50 {
        let n = rng.gen_range(0..60);
        let items: Vec<RankItem> = (0..n)
            .map(|i| RankItem {
                entity_id: format!("e{i}"),
                name: String::new(),
                value: rng
                    .gen_bool(0.7)
                    .then(|| Decimal::new(rng.gen_range(-5_000..50_000i64), 1)),
                peer_group: None,
            })
            .collect();
        let with_values = items.iter().filter(|i| i.value.is_some()).count();
        let limit = rng.gen_range(1..30usize);

        let ranked = rank_population(items, SortOrder::Asc, Some(limit));
        assert_eq!(ranked.len(), with_values.min(limit));
        for (pos, entry) in ranked.iter().enumerate() {
            assert_eq!(entry.rank, pos + 1);
        }
        for pair in ranked.windows(2) {
            assert!(pair[0].value <= pair[1].value);
        }
    }
}
