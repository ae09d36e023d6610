use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use brf_benchmark_core::config::EngineConfig;
use brf_benchmark_core::peers::PeerFilter;
use brf_benchmark_core::population::{Metric, PeerPopulationIndex};
use brf_benchmark_core::store::{CostStore, Dataset, InMemoryStore};
use brf_benchmark_core::{BenchmarkResult, Direction, SortOrder};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Every data-backed call carries the dataset, an optional engine config
/// and its own parameters at the top level.
#[derive(Deserialize)]
struct Request<P> {
    dataset: Dataset,
    #[serde(default)]
    config: EngineConfig,
    #[serde(flatten)]
    params: P,
}

fn parse_request<P: serde::de::DeserializeOwned>(input_json: &str) -> NapiResult<(InMemoryStore, EngineConfig, P)> {
    let req: Request<P> = serde_json::from_str(input_json).map_err(to_napi_error)?;
    req.config.validate().map_err(to_napi_error)?;
    let store = InMemoryStore::new(req.dataset).map_err(to_napi_error)?;
    Ok((store, req.config, req.params))
}

fn index_for<'s>(store: &'s InMemoryStore, config: &EngineConfig) -> BenchmarkResult<PeerPopulationIndex<'s>> {
    let index = PeerPopulationIndex::from_store(store)?.with_classifier(config.peer_classifier());
    Ok(match config.period {
        Some(year) => index.with_period(year),
        None => index,
    })
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Returns `null` for labels no rule matches.
#[napi]
pub fn normalize_category(label: String) -> NapiResult<String> {
    let normalization = brf_benchmark_core::normalization::normalize(&label);
    serde_json::to_string(&normalization).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct GapParams {
    min_entities: Option<usize>,
}

#[napi]
pub fn classification_gaps(input_json: String) -> NapiResult<String> {
    let (store, config, params) = parse_request::<GapParams>(&input_json)?;
    let index = index_for(&store, &config).map_err(to_napi_error)?;
    let usage = store.label_usage().map_err(to_napi_error)?;
    let min_entities = params.min_entities.unwrap_or(config.gap_materiality).max(1);
    let report = index.table().gap_report(&usage, min_entities);
    serde_json::to_string(&report).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Distributions
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct DistributionParams {
    category: Option<String>,
    metric: Option<Metric>,
    entity_id: Option<String>,
    peer_group: Option<String>,
    direction: Option<Direction>,
}

#[napi]
pub fn category_distribution(input_json: String) -> NapiResult<String> {
    let (store, config, params) = parse_request::<DistributionParams>(&input_json)?;
    let index = index_for(&store, &config).map_err(to_napi_error)?;
    let filter = params.peer_group.map(PeerFilter::new);

    match (params.category, params.metric) {
        (Some(category), None) => {
            let category = category.parse().map_err(to_napi_error)?;
            let output = brf_benchmark_core::benchmarking::category_distribution(
                &index,
                category,
                filter.as_ref(),
                params.entity_id.as_deref(),
                &config,
            )
            .map_err(to_napi_error)?;
            serde_json::to_string(&output).map_err(to_napi_error)
        }
        (None, Some(metric)) => {
            let direction = params.direction.unwrap_or_else(|| metric.natural_direction());
            let output = brf_benchmark_core::benchmarking::metric_distribution(
                &index,
                metric,
                direction,
                filter.as_ref(),
                params.entity_id.as_deref(),
                &config,
            )
            .map_err(to_napi_error)?;
            serde_json::to_string(&output).map_err(to_napi_error)
        }
        _ => Err(to_napi_error("exactly one of 'category' or 'metric' is required")),
    }
}

// ---------------------------------------------------------------------------
// Savings
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct SavingsParams {
    entity_id: String,
    peer_group: Option<String>,
}

#[napi]
pub fn savings_potential(input_json: String) -> NapiResult<String> {
    let (store, config, params) = parse_request::<SavingsParams>(&input_json)?;
    let index = index_for(&store, &config).map_err(to_napi_error)?;
    let filter = params.peer_group.map(PeerFilter::new);
    let output =
        brf_benchmark_core::savings::estimate_savings(&index, &params.entity_id, filter.as_ref(), &config)
            .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Leaderboards
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct LeaderboardParams {
    metric: Metric,
    order: Option<SortOrder>,
    limit: Option<usize>,
    peer_group: Option<String>,
    #[serde(default)]
    both: bool,
}

#[napi]
pub fn leaderboard(input_json: String) -> NapiResult<String> {
    let (store, config, params) = parse_request::<LeaderboardParams>(&input_json)?;
    let index = index_for(&store, &config).map_err(to_napi_error)?;
    let filter = params.peer_group.map(PeerFilter::new);
    let limit = params.limit.unwrap_or(20);

    if params.both {
        let output = brf_benchmark_core::leaderboard::leaderboard_pair(&index, params.metric, limit, filter.as_ref())
            .map_err(to_napi_error)?;
        return serde_json::to_string(&output).map_err(to_napi_error);
    }

    let order = params
        .order
        .unwrap_or_else(|| SortOrder::from(params.metric.natural_direction()));
    let output =
        brf_benchmark_core::leaderboard::build_leaderboard(&index, params.metric, order, Some(limit), filter.as_ref())
            .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
