use brf_benchmark_core::statistics::{compute_distribution, percentile_cont, rank};
use brf_benchmark_core::Direction;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use statrs::statistics::Statistics;

fn random_population(rng: &mut StdRng, n: usize) -> Vec<Decimal> {
    (0..n)
        // kr/m² with two decimals, like real cost lines
        .map(|_| Decimal::new(rng.gen_range(100..=90_000), 2))
        .collect()
}

// ===========================================================================
// Reference distribution
// ===========================================================================

#[test]
fn test_ten_to_fifty() {
    let d = compute_distribution(&[dec!(10), dec!(20), dec!(30), dec!(40), dec!(50)]);

    assert_eq!(d.sample_size, 5);
    assert_eq!(d.median, Some(dec!(30)));
    assert_eq!(d.p25, Some(dec!(20)));
    assert_eq!(d.p75, Some(dec!(40)));
    assert_eq!(d.p10, Some(dec!(14)));
    assert_eq!(d.p90, Some(dec!(46)));
    assert_eq!(d.mean, Some(dec!(30)));

    // population form: sqrt(200)
    let sd = d.std_dev.unwrap();
    assert!((sd - dec!(14.142135)).abs() < dec!(0.0001), "std dev {sd}");
}

#[test]
fn test_median_ranks_near_fiftieth_percentile() {
    let values: Vec<Decimal> = (1..=101).map(Decimal::from).collect();
    let d = compute_distribution(&values);
    let median = d.median.unwrap();
    assert_eq!(median, dec!(51));

    let s = rank(&values, median, Direction::HigherIsBetter);
    let pct = s.percentile.unwrap();
    assert!((pct - dec!(50)).abs() < dec!(1), "median ranks at {pct}");
}

#[test]
fn test_median_rank_property_random() {
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..50 {
        // odd sizes so the median is a member of the population
        let n = rng.gen_range(25..200) * 2 + 1;
        let values = random_population(&mut rng, n);
        let median = compute_distribution(&values).median.unwrap();
        let pct = rank(&values, median, Direction::HigherIsBetter)
            .percentile
            .unwrap();
        // share at or below the median: half plus the median itself and any ties
        assert!(pct >= dec!(50), "n={n}, pct={pct}");
        assert!(pct <= dec!(60), "n={n}, pct={pct}");
    }
}

// ===========================================================================
// Cross-checks against statrs
// ===========================================================================

#[test]
fn test_mean_and_std_dev_match_statrs() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..25 {
        let n = rng.gen_range(2..300);
        let values = random_population(&mut rng, n);
        let floats: Vec<f64> = values.iter().map(|v| v.to_f64().unwrap()).collect();

        let d = compute_distribution(&values);
        let mean = d.mean.unwrap().to_f64().unwrap();
        let sd = d.std_dev.unwrap().to_f64().unwrap();

        let expected_mean = floats.iter().mean();
        let expected_sd = floats.iter().population_std_dev();
        assert!((mean - expected_mean).abs() < 1e-6, "mean {mean} vs {expected_mean}");
        assert!((sd - expected_sd).abs() < 1e-6, "sd {sd} vs {expected_sd}");
    }
}

#[test]
fn test_percentiles_ordered_and_bounded() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..100 {
        let n = rng.gen_range(2..120);
        let values = random_population(&mut rng, n);
        let d = compute_distribution(&values);

        let chain = [d.min, d.p10, d.p25, d.median, d.p75, d.p90, d.max].map(|v| v.unwrap());
        for pair in chain.windows(2) {
            assert!(pair[0] <= pair[1], "{chain:?}");
        }
    }
}

#[test]
fn test_percentile_cont_hits_order_statistics() {
    let sorted: Vec<Decimal> = (0..11).map(|i| Decimal::from(i * 10)).collect();
    for i in 0..=10 {
        let p = Decimal::new(i, 1);
        assert_eq!(percentile_cont(&sorted, p), Some(Decimal::from(i * 10)));
    }
}

// ===========================================================================
// Degenerate populations
// ===========================================================================

#[test]
fn test_zero_variance_has_no_z_score() {
    let values = vec![dec!(42.5); 12];
    let d = compute_distribution(&values);
    assert_eq!(d.std_dev, Some(Decimal::ZERO));
    assert_eq!(d.median, Some(dec!(42.5)));

    let s = rank(&values, dec!(42.5), Direction::LowerIsBetter);
    assert_eq!(s.z_score, None);
    assert_eq!(s.percentile, Some(dec!(100)));
}

#[test]
fn test_single_value_population() {
    let d = compute_distribution(&[dec!(7)]);
    assert_eq!(d.sample_size, 1);
    assert_eq!((d.mean, d.min, d.max), (Some(dec!(7)), Some(dec!(7)), Some(dec!(7))));
    assert_eq!((d.median, d.p25, d.std_dev), (None, None, None));
    assert_eq!(rank(&[dec!(7)], dec!(7), Direction::LowerIsBetter).z_score, None);
}

#[test]
fn test_empty_population() {
    let d = compute_distribution(&[]);
    assert!(d.is_empty());
    assert_eq!(d.mean, None);
    assert_eq!(d.max, None);
}

// ===========================================================================
// Direction
// ===========================================================================

#[test]
fn test_direction_mirrors_standing() {
    let values = [dec!(10), dec!(20), dec!(30), dec!(40), dec!(50)];
    let cheap = rank(&values, dec!(10), Direction::LowerIsBetter);
    let solid = rank(&values, dec!(10), Direction::HigherIsBetter);

    // the raw percentile is direction-free
    assert_eq!(cheap.percentile, solid.percentile);
    assert_eq!(cheap.standing_percentile, Some(dec!(100)));
    assert_eq!(solid.standing_percentile, Some(dec!(20)));
    assert!(cheap.z_score.unwrap() < Decimal::ZERO);
}
