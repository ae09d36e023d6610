use clap::{Args, ValueEnum};
use serde_json::Value;

use brf_benchmark_core::leaderboard::{build_leaderboard, leaderboard_pair};
use brf_benchmark_core::population::Metric;
use brf_benchmark_core::SortOrder;

use super::{peer_filter, Context};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OrderArg {
    Asc,
    Desc,
}

impl From<OrderArg> for SortOrder {
    fn from(o: OrderArg) -> Self {
        match o {
            OrderArg::Asc => SortOrder::Asc,
            OrderArg::Desc => SortOrder::Desc,
        }
    }
}

/// Arguments for a metric leaderboard
#[derive(Args)]
pub struct LeaderboardArgs {
    /// Metric to rank by (e.g. debt-per-sqm, solidity-percent, interest-rate)
    #[arg(long)]
    pub metric: String,

    /// Sort order (defaults to best first for the metric)
    #[arg(long)]
    pub order: Option<OrderArg>,

    /// Number of entries to keep
    #[arg(long, default_value = "20")]
    pub limit: usize,

    /// Show the top and bottom `limit` entries side by side
    #[arg(long, conflicts_with = "order")]
    pub both: bool,

    /// Rank within one peer group only
    #[arg(long)]
    pub peer_group: Option<String>,
}

pub fn run_leaderboard(args: LeaderboardArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let index = ctx.index()?;
    let filter = peer_filter(args.peer_group.as_deref());
    let metric: Metric = args.metric.parse()?;

    if args.both {
        let output = leaderboard_pair(&index, metric, args.limit, filter.as_ref())?;
        return Ok(serde_json::to_value(output)?);
    }

    let order = args
        .order
        .map(SortOrder::from)
        .unwrap_or_else(|| SortOrder::from(metric.natural_direction()));
    let output = build_leaderboard(&index, metric, order, Some(args.limit), filter.as_ref())?;
    Ok(serde_json::to_value(output)?)
}
