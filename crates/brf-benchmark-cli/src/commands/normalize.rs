use clap::Args;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

use brf_benchmark_core::normalization::normalize;
use brf_benchmark_core::with_metadata;

use crate::input;

/// Arguments for label normalization
#[derive(Args)]
pub struct NormalizeArgs {
    /// Raw cost-category labels (e.g. "Fjärrvärme" "El")
    pub labels: Vec<String>,

    /// Path to a JSON array of labels (overrides positional labels)
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Serialize)]
struct NormalizedLabel {
    label: String,
    category: Option<String>,
    category_group: Option<String>,
}

pub fn run_normalize(args: NormalizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let labels: Vec<String> = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if !args.labels.is_empty() {
        args.labels
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("at least one label is required (or provide --input)".into());
    };

    let mut warnings = Vec::new();
    let rows: Vec<NormalizedLabel> = labels
        .into_iter()
        .map(|label| {
            let n = normalize(&label);
            if n.is_none() {
                warnings.push(format!("'{label}' matched no rule"));
            }
            NormalizedLabel {
                category: n.as_ref().map(|n| n.category.to_string()),
                category_group: n.map(|n| n.category_group),
                label,
            }
        })
        .collect();

    let output = with_metadata(
        "Ordered rule table, first match wins",
        &serde_json::json!({ "labels": rows.len() }),
        warnings,
        start.elapsed().as_micros() as u64,
        rows,
    );
    Ok(serde_json::to_value(output)?)
}
