//! Descriptive statistics and ranking over a materialized population.
//!
//! Pure functions over `Decimal` slices; no storage access. Percentiles use
//! linear interpolation between the bracketing order statistics (the
//! `PERCENTILE_CONT` convention) and the standard deviation is the
//! population form.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Direction;

/// Descriptive statistics of one population.
///
/// With fewer than two observations only the point statistics (mean, min,
/// max) are defined; the rest stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationDistribution {
    pub sample_size: usize,
    pub mean: Option<Decimal>,
    pub median: Option<Decimal>,
    pub p10: Option<Decimal>,
    pub p25: Option<Decimal>,
    pub p75: Option<Decimal>,
    pub p90: Option<Decimal>,
    pub std_dev: Option<Decimal>,
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl PopulationDistribution {
    pub fn is_empty(&self) -> bool {
        self.sample_size == 0
    }

    /// Percentile and spread statistics are available.
    pub fn is_sufficient(&self) -> bool {
        self.sample_size >= 2
    }
}

/// Where one value stands within a population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub value: Decimal,
    pub sample_size: usize,
    /// Share of the population with a value less than or equal to `value`,
    /// 0–100.
    pub percentile: Option<Decimal>,
    /// Share of the population `value` is at least as good as, 0–100,
    /// honouring the metric direction.
    pub standing_percentile: Option<Decimal>,
    /// `(value - mean) / std_dev`; undefined for degenerate populations.
    pub z_score: Option<Decimal>,
}

/// Compute the descriptive statistics of `values` (any order).
pub fn compute_distribution(values: &[Decimal]) -> PopulationDistribution {
    let n = values.len();
    if n == 0 {
        return PopulationDistribution::default();
    }

    let mut sorted = values.to_vec();
    sorted.sort();
    let avg = mean(&sorted);

    if n < 2 {
        return PopulationDistribution {
            sample_size: n,
            mean: avg,
            min: Some(sorted[0]),
            max: Some(sorted[0]),
            ..Default::default()
        };
    }

    PopulationDistribution {
        sample_size: n,
        mean: avg,
        median: percentile_cont(&sorted, dec!(0.5)),
        p10: percentile_cont(&sorted, dec!(0.10)),
        p25: percentile_cont(&sorted, dec!(0.25)),
        p75: percentile_cont(&sorted, dec!(0.75)),
        p90: percentile_cont(&sorted, dec!(0.90)),
        std_dev: population_std_dev(&sorted),
        min: sorted.first().copied(),
        max: sorted.last().copied(),
    }
}

/// Linear-interpolation percentile of ascending `sorted` values, `p` in [0, 1].
///
/// Position `p * (n - 1)` is interpolated between its two bracketing order
/// statistics. Returns `None` for an empty slice or `p` outside [0, 1].
pub fn percentile_cont(sorted: &[Decimal], p: Decimal) -> Option<Decimal> {
    let n = sorted.len();
    if n == 0 || p < Decimal::ZERO || p > Decimal::ONE {
        return None;
    }
    if n == 1 {
        return Some(sorted[0]);
    }

    let pos = p * Decimal::from((n - 1) as u64);
    let lower = pos.floor();
    let frac = pos - lower;
    let lo = lower.to_usize()?.min(n - 1);
    let hi = (lo + 1).min(n - 1);

    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().copied().sum::<Decimal>() / Decimal::from(values.len() as u64))
}

/// Population standard deviation; `None` below two observations.
pub fn population_std_dev(values: &[Decimal]) -> Option<Decimal> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance = values
        .iter()
        .map(|v| (*v - m) * (*v - m))
        .sum::<Decimal>()
        / Decimal::from(n as u64);
    if variance.is_zero() {
        return Some(Decimal::ZERO);
    }
    variance.sqrt()
}

/// Rank `target` within `values`.
///
/// `target` does not have to be a member of `values`.
pub fn rank(values: &[Decimal], target: Decimal, direction: Direction) -> Standing {
    let n = values.len();
    if n == 0 {
        return Standing {
            value: target,
            sample_size: 0,
            percentile: None,
            standing_percentile: None,
            z_score: None,
        };
    }

    let n_dec = Decimal::from(n as u64);
    let at_or_below = values.iter().filter(|v| **v <= target).count();
    let at_or_above = values.iter().filter(|v| **v >= target).count();

    let percentile = Decimal::from(at_or_below as u64) / n_dec * dec!(100);
    let standing_percentile = match direction {
        Direction::LowerIsBetter => Decimal::from(at_or_above as u64) / n_dec * dec!(100),
        Direction::HigherIsBetter => percentile,
    };

    Standing {
        value: target,
        sample_size: n,
        percentile: Some(percentile),
        standing_percentile: Some(standing_percentile),
        z_score: z_score(values, target),
    }
}

/// `(target - mean) / std_dev`, or `None` when the spread is zero or
/// undefined.
pub fn z_score(values: &[Decimal], target: Decimal) -> Option<Decimal> {
    let sd = population_std_dev(values)?;
    if sd.is_zero() {
        return None;
    }
    Some((target - mean(values)?) / sd)
}
