use clap::{Args, ValueEnum};
use serde_json::Value;

use brf_benchmark_core::benchmarking::{category_distribution, metric_distribution};
use brf_benchmark_core::normalization::CanonicalCategory;
use brf_benchmark_core::population::Metric;
use brf_benchmark_core::Direction;

use super::{peer_filter, Context};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DirectionArg {
    Lower,
    Higher,
}

impl From<DirectionArg> for Direction {
    fn from(d: DirectionArg) -> Self {
        match d {
            DirectionArg::Lower => Direction::LowerIsBetter,
            DirectionArg::Higher => Direction::HigherIsBetter,
        }
    }
}

/// Arguments for a population distribution
#[derive(Args)]
#[command(group(clap::ArgGroup::new("subject").required(true).args(["category", "metric"])))]
pub struct DistributionArgs {
    /// Canonical category, by name or group tag (e.g. "heating")
    #[arg(long)]
    pub category: Option<String>,

    /// Entity-level metric (e.g. debt-per-sqm, solidity-percent)
    #[arg(long)]
    pub metric: Option<String>,

    /// Report where this entity stands
    #[arg(long)]
    pub entity: Option<String>,

    /// Restrict the population to one peer group
    #[arg(long)]
    pub peer_group: Option<String>,

    /// Which end of a metric is better (defaults to the metric's usual reading)
    #[arg(long)]
    pub direction: Option<DirectionArg>,
}

pub fn run_distribution(args: DistributionArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let index = ctx.index()?;
    let filter = peer_filter(args.peer_group.as_deref());

    if let Some(ref name) = args.category {
        let category: CanonicalCategory = name.parse()?;
        if args.direction.is_some() {
            return Err("--direction applies to --metric only; costs are always lower-is-better".into());
        }
        let output = category_distribution(
            &index,
            category,
            filter.as_ref(),
            args.entity.as_deref(),
            &ctx.config,
        )?;
        return Ok(serde_json::to_value(output)?);
    }

    let metric: Metric = args
        .metric
        .as_deref()
        .ok_or("--category or --metric is required")?
        .parse()?;
    let direction = args
        .direction
        .map(Direction::from)
        .unwrap_or_else(|| metric.natural_direction());
    let output = metric_distribution(
        &index,
        metric,
        direction,
        filter.as_ref(),
        args.entity.as_deref(),
        &ctx.config,
    )?;
    Ok(serde_json::to_value(output)?)
}
