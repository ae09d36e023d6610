use clap::Args;
use serde_json::Value;
use std::time::Instant;

use brf_benchmark_core::store::CostStore;
use brf_benchmark_core::with_metadata;

use super::Context;

/// Arguments for the classification-gap audit
#[derive(Args)]
pub struct AuditArgs {
    /// Distinct entities an unclassified label needs to be reported
    /// (defaults to the configured materiality)
    #[arg(long)]
    pub min_entities: Option<usize>,
}

pub fn run_audit(args: AuditArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let min_entities = args.min_entities.unwrap_or(ctx.config.gap_materiality);
    if min_entities == 0 {
        return Err("--min-entities must be at least 1".into());
    }

    let index = ctx.index()?;
    let usage = ctx.store.label_usage()?;
    let report = index.table().gap_report(&usage, min_entities);

    let mut warnings = Vec::new();
    if !report.gaps.is_empty() {
        warnings.push(format!(
            "{} material label(s) are not benchmarked; extend the rule table",
            report.gaps.len()
        ));
    }

    let output = with_metadata(
        "Classification gap audit over distinct raw labels",
        &serde_json::json!({ "min_entities": min_entities }),
        warnings,
        start.elapsed().as_micros() as u64,
        report,
    );
    Ok(serde_json::to_value(output)?)
}
