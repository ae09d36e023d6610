//! "Where do we stand" distributions for one cost category or metric.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::EngineConfig;
use crate::error::BenchmarkError;
use crate::normalization::CanonicalCategory;
use crate::peers::PeerFilter;
use crate::population::{cost_values, Metric, PeerPopulationIndex};
use crate::statistics::{compute_distribution, rank, PopulationDistribution, Standing};
use crate::types::{with_metadata, ComputationOutput, Direction};
use crate::BenchmarkResult;

/// Distribution of one canonical category, optionally with one entity's standing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDistribution {
    pub category: CanonicalCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_group: Option<String>,
    pub distribution: PopulationDistribution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standing: Option<Standing>,
}

/// Distribution of one entity-level metric, optionally with one entity's standing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricDistribution {
    pub metric: Metric,
    pub direction: Direction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_group: Option<String>,
    pub distribution: PopulationDistribution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standing: Option<Standing>,
}

#[derive(Serialize)]
struct DistributionAssumptions<'a> {
    subject: String,
    peer_group: Option<&'a str>,
    entity_id: Option<&'a str>,
    period: Option<i32>,
    percentile_method: &'static str,
    std_dev: &'static str,
}

/// Cost-per-m² distribution for `category`. Costs rank lower-is-better.
pub fn category_distribution(
    index: &PeerPopulationIndex<'_>,
    category: CanonicalCategory,
    peer_filter: Option<&PeerFilter>,
    entity_id: Option<&str>,
    config: &EngineConfig,
) -> BenchmarkResult<ComputationOutput<CategoryDistribution>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    ensure_entity_exists(index, entity_id)?;

    let population = index.get_population(category, peer_filter)?;
    let values = cost_values(&population);
    let distribution = compute_distribution(&values);
    sample_warnings(&distribution, &category.to_string(), config, &mut warnings);

    let standing = match entity_id {
        Some(id) => match population.iter().find(|o| o.entity_id == id) {
            Some(own) => Some(rank(&values, own.cost_per_unit_area, Direction::LowerIsBetter)),
            None => {
                warnings.push(format!("{id} has no {category} cost reported for this population"));
                None
            }
        },
        None => None,
    };

    let assumptions = DistributionAssumptions {
        subject: category.to_string(),
        peer_group: peer_filter.map(|f| f.group.as_str()),
        entity_id,
        period: index.period(),
        percentile_method: "linear interpolation (PERCENTILE_CONT)",
        std_dev: "population",
    };

    let output = CategoryDistribution {
        category,
        peer_group: peer_filter.map(|f| f.group.clone()),
        distribution,
        standing,
    };

    Ok(with_metadata(
        "Category Cost Distribution (per m²)",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        output,
    ))
}

/// Distribution of an entity-level metric. `direction` says which end is good.
pub fn metric_distribution(
    index: &PeerPopulationIndex<'_>,
    metric: Metric,
    direction: Direction,
    peer_filter: Option<&PeerFilter>,
    entity_id: Option<&str>,
    config: &EngineConfig,
) -> BenchmarkResult<ComputationOutput<MetricDistribution>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    ensure_entity_exists(index, entity_id)?;

    let population = index.metric_population(metric, peer_filter)?;
    let values: Vec<_> = population.iter().map(|o| o.value).collect();
    let distribution = compute_distribution(&values);
    sample_warnings(&distribution, &metric.to_string(), config, &mut warnings);

    let standing = match entity_id {
        Some(id) => match population.iter().find(|o| o.entity_id == id) {
            Some(own) => Some(rank(&values, own.value, direction)),
            None => {
                warnings.push(format!("{id} has no {metric} value for this population"));
                None
            }
        },
        None => None,
    };

    let assumptions = DistributionAssumptions {
        subject: metric.to_string(),
        peer_group: peer_filter.map(|f| f.group.as_str()),
        entity_id,
        period: None,
        percentile_method: "linear interpolation (PERCENTILE_CONT)",
        std_dev: "population",
    };

    let output = MetricDistribution {
        metric,
        direction,
        peer_group: peer_filter.map(|f| f.group.clone()),
        distribution,
        standing,
    };

    Ok(with_metadata(
        "Entity Metric Distribution",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        output,
    ))
}

fn ensure_entity_exists(index: &PeerPopulationIndex<'_>, entity_id: Option<&str>) -> BenchmarkResult<()> {
    if let Some(id) = entity_id {
        if index.store().entity(id)?.is_none() {
            return Err(BenchmarkError::entity_not_found(id));
        }
    }
    Ok(())
}

fn sample_warnings(
    distribution: &PopulationDistribution,
    subject: &str,
    config: &EngineConfig,
    warnings: &mut Vec<String>,
) {
    if distribution.is_empty() {
        warnings.push(format!("Insufficient data: no entity reports {subject}"));
    } else if !distribution.is_sufficient() {
        warnings.push(format!(
            "Insufficient data: {subject} has a single observation; percentiles and spread are undefined"
        ));
    } else if distribution.sample_size < config.min_sample_warning {
        warnings.push(format!(
            "Only {} entities report {subject}; consider the benchmark indicative",
            distribution.sample_size
        ));
    }
}
