use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::BenchmarkError;
use crate::peers::{DistrictRules, PeerClassifier, SuppliedLabel};
use crate::BenchmarkResult;

/// How a multi-category fan-out treats a failed population fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanOutPolicy {
    /// Skip the failed category and keep going.
    #[default]
    Isolated,
    /// Fail the whole request.
    AllOrNothing,
}

/// Tunables shared by every engine entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Quantile treated as the top-performer benchmark (0.25 = cheapest quartile).
    pub benchmark_quantile: Decimal,
    pub fan_out: FanOutPolicy,
    /// Distinct entities an unclassified label needs before it is reported.
    pub gap_materiality: usize,
    /// Populations smaller than this carry a warning.
    pub min_sample_warning: usize,
    /// Restrict cost records to one fiscal year.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<i32>,
    /// District heuristic; when absent the entity-supplied peer label is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub districts: Option<DistrictRules>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            benchmark_quantile: dec!(0.25),
            fan_out: FanOutPolicy::Isolated,
            gap_materiality: 2,
            min_sample_warning: 5,
            period: None,
            districts: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> BenchmarkResult<()> {
        if self.benchmark_quantile <= Decimal::ZERO || self.benchmark_quantile >= Decimal::ONE {
            return Err(BenchmarkError::InvalidInput {
                field: "benchmark_quantile".into(),
                reason: "Benchmark quantile must be between 0 and 1 (exclusive)".into(),
            });
        }
        if self.gap_materiality == 0 {
            return Err(BenchmarkError::InvalidInput {
                field: "gap_materiality".into(),
                reason: "Materiality threshold must be at least one entity".into(),
            });
        }
        if let Some(d) = &self.districts {
            if d.rules.iter().any(|r| r.district.trim().is_empty()) {
                return Err(BenchmarkError::InvalidInput {
                    field: "districts".into(),
                    reason: "Every district rule needs a name".into(),
                });
            }
        }
        Ok(())
    }

    pub fn peer_classifier(&self) -> Box<dyn PeerClassifier> {
        match &self.districts {
            Some(rules) => Box::new(rules.clone()),
            None => Box::new(SuppliedLabel),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.benchmark_quantile, dec!(0.25));
        assert_eq!(config.fan_out, FanOutPolicy::Isolated);
    }

    #[test]
    fn test_quantile_bounds() {
        let config = EngineConfig {
            benchmark_quantile: Decimal::ONE,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"fan_out": "all_or_nothing"}"#).unwrap();
        assert_eq!(config.fan_out, FanOutPolicy::AllOrNothing);
        assert_eq!(config.gap_materiality, 2);
    }
}
