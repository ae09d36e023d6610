//! Ranked leaderboards over entity-level metrics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::BenchmarkError;
use crate::peers::PeerFilter;
use crate::population::{Metric, PeerPopulationIndex};
use crate::types::{with_metadata, ComputationOutput, EntityId, SortOrder};
use crate::BenchmarkResult;

/// An entity and its (possibly missing) metric value, ready to rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankItem {
    pub entity_id: EntityId,
    pub name: String,
    pub value: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer_group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based
    pub rank: usize,
    pub entity_id: EntityId,
    pub name: String,
    pub value: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_group: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaderboard {
    pub metric: Metric,
    pub order: SortOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_group: Option<String>,
    /// Entities with a value, before truncation.
    pub ranked_population: usize,
    pub entries: Vec<LeaderboardEntry>,
}

/// The best and worst ends of one metric, as shown side by side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardPair {
    pub metric: Metric,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_group: Option<String>,
    pub top: Vec<LeaderboardEntry>,
    pub bottom: Vec<LeaderboardEntry>,
}

/// Rank `items` by value.
///
/// Items without a value are dropped. The sort is stable, so ties keep
/// their input order, and `limit` truncates only after sorting.
pub fn rank_population(items: Vec<RankItem>, order: SortOrder, limit: Option<usize>) -> Vec<LeaderboardEntry> {
    let mut valued: Vec<(Decimal, RankItem)> = items
        .into_iter()
        .filter_map(|item| item.value.map(|v| (v, item)))
        .collect();

    match order {
        SortOrder::Asc => valued.sort_by(|a, b| a.0.cmp(&b.0)),
        SortOrder::Desc => valued.sort_by(|a, b| b.0.cmp(&a.0)),
    }

    if let Some(limit) = limit {
        valued.truncate(limit);
    }

    valued
        .into_iter()
        .enumerate()
        .map(|(i, (value, item))| LeaderboardEntry {
            rank: i + 1,
            entity_id: item.entity_id,
            name: item.name,
            value,
            peer_group: item.peer_group,
        })
        .collect()
}

fn metric_items(
    index: &PeerPopulationIndex<'_>,
    metric: Metric,
    peer_filter: Option<&PeerFilter>,
) -> BenchmarkResult<Vec<RankItem>> {
    Ok(index
        .peers(peer_filter)?
        .into_iter()
        .map(|m| {
            let value = metric
                .value_of(&m.profile.metrics)
                .filter(|v| !metric.requires_positive() || *v > Decimal::ZERO);
            RankItem {
                entity_id: m.profile.entity_id,
                name: m.profile.name,
                value,
                peer_group: m.peer_group,
            }
        })
        .collect())
}

fn check_limit(limit: Option<usize>) -> BenchmarkResult<()> {
    if limit == Some(0) {
        return Err(BenchmarkError::InvalidInput {
            field: "limit".into(),
            reason: "Limit must be at least 1".into(),
        });
    }
    Ok(())
}

#[derive(Serialize)]
struct LeaderboardAssumptions<'a> {
    metric: Metric,
    order: Option<SortOrder>,
    limit: Option<usize>,
    peer_group: Option<&'a str>,
}

/// Leaderboard for one metric over the (optionally filtered) population.
pub fn build_leaderboard(
    index: &PeerPopulationIndex<'_>,
    metric: Metric,
    order: SortOrder,
    limit: Option<usize>,
    peer_filter: Option<&PeerFilter>,
) -> BenchmarkResult<ComputationOutput<Leaderboard>> {
    let start = Instant::now();
    check_limit(limit)?;

    let items = metric_items(index, metric, peer_filter)?;
    let total = items.len();
    let ranked_population = items.iter().filter(|i| i.value.is_some()).count();
    let entries = rank_population(items, order, limit);

    let mut warnings = Vec::new();
    if ranked_population < total {
        warnings.push(format!(
            "{} of {total} entities have no {metric} and are not ranked",
            total - ranked_population
        ));
    }
    if ranked_population == 0 {
        warnings.push(format!("Insufficient data: no entity reports {metric}"));
    }

    tracing::debug!(metric = metric.key(), ranked_population, "built leaderboard");

    let assumptions = LeaderboardAssumptions {
        metric,
        order: Some(order),
        limit,
        peer_group: peer_filter.map(|f| f.group.as_str()),
    };
    let result = Leaderboard {
        metric,
        order,
        peer_group: peer_filter.map(|f| f.group.clone()),
        ranked_population,
        entries,
    };

    Ok(with_metadata(
        "Metric Leaderboard",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        result,
    ))
}

/// Top and bottom `limit` entities of one metric. "Top" follows the
/// metric's natural reading: ascending for costs, debt and rates,
/// descending for solidity.
pub fn leaderboard_pair(
    index: &PeerPopulationIndex<'_>,
    metric: Metric,
    limit: usize,
    peer_filter: Option<&PeerFilter>,
) -> BenchmarkResult<ComputationOutput<LeaderboardPair>> {
    let start = Instant::now();
    check_limit(Some(limit))?;

    let top_order = SortOrder::from(metric.natural_direction());
    let bottom_order = match top_order {
        SortOrder::Asc => SortOrder::Desc,
        SortOrder::Desc => SortOrder::Asc,
    };

    let items = metric_items(index, metric, peer_filter)?;
    let top = rank_population(items.clone(), top_order, Some(limit));
    let bottom = rank_population(items, bottom_order, Some(limit));

    let mut warnings = Vec::new();
    if top.is_empty() {
        warnings.push(format!("Insufficient data: no entity reports {metric}"));
    }

    let assumptions = LeaderboardAssumptions {
        metric,
        order: None,
        limit: Some(limit),
        peer_group: peer_filter.map(|f| f.group.as_str()),
    };
    let result = LeaderboardPair {
        metric,
        peer_group: peer_filter.map(|f| f.group.clone()),
        top,
        bottom,
    };

    Ok(with_metadata(
        "Metric Leaderboard (top and bottom)",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        result,
    ))
}
