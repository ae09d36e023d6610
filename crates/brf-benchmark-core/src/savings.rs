//! Savings potential: how much an entity would save per year if every
//! category it overpays in came down to the cheapest-quartile benchmark of
//! its peers.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::{EngineConfig, FanOutPolicy};
use crate::error::BenchmarkError;
use crate::normalization::CanonicalCategory;
use crate::peers::PeerFilter;
use crate::population::{cost_values, NormalizedCostObservation, PeerPopulationIndex};
use crate::statistics::{percentile_cont, rank};
use crate::types::{with_metadata, ComputationOutput, CostPerArea, Direction, EntityId, Money};
use crate::BenchmarkResult;

/// Savings in one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySavings {
    pub category: CanonicalCategory,
    pub your_cost: CostPerArea,
    /// Benchmark quantile of the peer population (p25 by default).
    pub p25_cost: CostPerArea,
    /// Never negative.
    pub savings_per_unit_area: CostPerArea,
    pub total_savings: Money,
    /// Share of peers paying at most `your_cost`, 0–100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentile: Option<Decimal>,
}

/// A benchmarked category left out of the estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCategory {
    pub category: CanonicalCategory,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsEstimate {
    pub entity_id: EntityId,
    pub total_area: Decimal,
    pub total_savings_per_year: Money,
    pub total_savings_per_month: Money,
    /// Considered categories, largest savings first.
    pub categories: Vec<CategorySavings>,
    pub categories_above_p25: usize,
    pub total_categories: usize,
    pub skipped: Vec<SkippedCategory>,
    pub already_top_quartile: bool,
}

#[derive(Serialize)]
struct SavingsAssumptions<'a> {
    entity_id: &'a str,
    peer_group: Option<&'a str>,
    benchmark_quantile: Decimal,
    fan_out: FanOutPolicy,
    period: Option<i32>,
    model: &'static str,
}

enum Outcome {
    Considered(CategorySavings),
    Skipped(SkippedCategory),
}

/// Estimate the annual savings for `entity_id` across every benchmarked
/// category.
pub fn estimate_savings(
    index: &PeerPopulationIndex<'_>,
    entity_id: &str,
    peer_filter: Option<&PeerFilter>,
    config: &EngineConfig,
) -> BenchmarkResult<ComputationOutput<SavingsEstimate>> {
    let start = Instant::now();
    config.validate()?;

    let entity = index
        .store()
        .entity(entity_id)?
        .ok_or_else(|| BenchmarkError::entity_not_found(entity_id))?;
    let area = entity
        .usable_area()
        .ok_or_else(|| BenchmarkError::entity_not_found(entity_id))?;

    let fetched = fetch_populations(index, peer_filter);

    let mut warnings: Vec<String> = Vec::new();
    let mut outcomes: Vec<Outcome> = Vec::with_capacity(fetched.len());
    for (category, result) in fetched {
        let population = match result {
            Ok(p) => p,
            Err(e) => match config.fan_out {
                FanOutPolicy::AllOrNothing => {
                    return Err(BenchmarkError::UpstreamUnavailable(format!(
                        "{category} population unavailable: {e}"
                    )));
                }
                FanOutPolicy::Isolated => {
                    tracing::warn!(%category, error = %e, "population fetch failed, skipping category");
                    warnings.push(format!("{category} skipped: {e}"));
                    outcomes.push(Outcome::Skipped(SkippedCategory {
                        category,
                        reason: format!("population unavailable: {e}"),
                    }));
                    continue;
                }
            },
        };
        outcomes.push(assess_category(
            category,
            &population,
            entity_id,
            area,
            config.benchmark_quantile,
        ));
    }

    let mut categories = Vec::new();
    let mut skipped = Vec::new();
    for outcome in outcomes {
        match outcome {
            Outcome::Considered(c) => categories.push(c),
            Outcome::Skipped(s) => skipped.push(s),
        }
    }
    // stable: equal savings keep the benchmarked category order
    categories.sort_by(|a, b| b.total_savings.cmp(&a.total_savings));

    let total_savings_per_year: Money = categories.iter().map(|c| c.total_savings).sum();
    let total_savings_per_month = total_savings_per_year / dec!(12);
    let categories_above_p25 = categories
        .iter()
        .filter(|c| c.savings_per_unit_area > Decimal::ZERO)
        .count();
    let total_categories = categories.len();
    let already_top_quartile = total_categories > 0 && categories_above_p25 == 0;

    if total_categories == 0 {
        warnings.push(format!(
            "Insufficient data: no benchmarked category has both a cost for {entity_id} and a peer population"
        ));
    }

    tracing::info!(
        entity_id,
        annual = %total_savings_per_year.round_dp(2),
        categories_above_p25,
        total_categories,
        skipped = skipped.len(),
        "savings potential estimated"
    );

    let assumptions = SavingsAssumptions {
        entity_id,
        peer_group: peer_filter.map(|f| f.group.as_str()),
        benchmark_quantile: config.benchmark_quantile,
        fan_out: config.fan_out,
        period: index.period(),
        model: "linear: (your cost/m² - benchmark cost/m²) x total area, floored at zero; \
                assumes costs scale with area and ignores structural differences between entities",
    };

    let estimate = SavingsEstimate {
        entity_id: entity_id.to_string(),
        total_area: area,
        total_savings_per_year,
        total_savings_per_month,
        categories,
        categories_above_p25,
        total_categories,
        skipped,
        already_top_quartile,
    };

    Ok(with_metadata(
        "Savings Potential vs Peer Benchmark Quantile (linear approximation)",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        estimate,
    ))
}

/// One population lookup per benchmarked category, run concurrently and
/// returned in category order.
fn fetch_populations(
    index: &PeerPopulationIndex<'_>,
    peer_filter: Option<&PeerFilter>,
) -> Vec<(CanonicalCategory, BenchmarkResult<Vec<NormalizedCostObservation>>)> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = CanonicalCategory::BENCHMARKED
            .iter()
            .map(|&category| {
                (
                    category,
                    scope.spawn(move || index.get_population(category, peer_filter)),
                )
            })
            .collect();

        handles
            .into_iter()
            .map(|(category, handle)| {
                let result = handle.join().unwrap_or_else(|_| {
                    Err(BenchmarkError::UpstreamUnavailable(format!(
                        "{category} population worker panicked"
                    )))
                });
                (category, result)
            })
            .collect()
    })
}

fn assess_category(
    category: CanonicalCategory,
    population: &[NormalizedCostObservation],
    entity_id: &str,
    area: Decimal,
    quantile: Decimal,
) -> Outcome {
    let skip = |reason: &str| {
        Outcome::Skipped(SkippedCategory {
            category,
            reason: reason.to_string(),
        })
    };

    if population.is_empty() {
        return skip("no peer data");
    }
    let Some(own) = population.iter().find(|o| o.entity_id == entity_id) else {
        return skip("entity reports no cost in this category");
    };

    // populations arrive sorted ascending
    let values = cost_values(population);
    let Some(benchmark) = percentile_cont(&values, quantile) else {
        return skip("benchmark quantile undefined");
    };

    let your_cost = own.cost_per_unit_area;
    let savings_per_unit_area = (your_cost - benchmark).max(Decimal::ZERO);

    Outcome::Considered(CategorySavings {
        category,
        your_cost,
        p25_cost: benchmark,
        savings_per_unit_area,
        total_savings: savings_per_unit_area * area,
        percentile: rank(&values, your_cost, Direction::LowerIsBetter).percentile,
    })
}
