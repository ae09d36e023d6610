use clap::Args;
use serde_json::Value;

use brf_benchmark_core::savings::estimate_savings;

use super::{peer_filter, Context};

/// Arguments for the savings-potential estimate
#[derive(Args)]
pub struct SavingsArgs {
    /// Entity to estimate savings for
    #[arg(long)]
    pub entity: String,

    /// Benchmark against one peer group instead of the whole population
    #[arg(long)]
    pub peer_group: Option<String>,
}

pub fn run_savings(args: SavingsArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let index = ctx.index()?;
    let filter = peer_filter(args.peer_group.as_deref());
    let output = estimate_savings(&index, &args.entity, filter.as_ref(), &ctx.config)?;
    Ok(serde_json::to_value(output)?)
}
