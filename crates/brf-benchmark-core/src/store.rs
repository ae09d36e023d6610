//! Read-only access to the external data store.
//!
//! The engine never talks to a database directly; it reads the three shapes
//! below through [`CostStore`]. [`InMemoryStore`] serves a [`Dataset`]
//! snapshot (the CLI and bindings load one from JSON).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::error::BenchmarkError;
use crate::types::{EntityId, Money};
use crate::BenchmarkResult;

/// One observed cost line for one entity in one reporting period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    pub entity_id: EntityId,
    pub raw_category: String,
    pub amount: Money,
    /// Fiscal year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<i32>,
}

/// Entity-level figures that are not cost lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt_per_sqm: Option<Decimal>,
    /// Equity share of total assets, in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solidity_percent: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_kwh_per_sqm: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_fee_per_sqm: Option<Decimal>,
    /// Average loan interest rate, in percent (3.5 = 3.5%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<Decimal>,
}

/// A housing cooperative with its area and peer attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityProfile {
    pub entity_id: EntityId,
    #[serde(default)]
    pub name: String,
    /// Total area in m²
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_area: Option<Decimal>,
    /// Opaque peer label supplied with the entity (e.g. district)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub metrics: EntityMetrics,
}

impl EntityProfile {
    /// Area usable as a per-m² denominator.
    pub fn usable_area(&self) -> Option<Decimal> {
        self.total_area.filter(|a| *a > Decimal::ZERO)
    }
}

/// A distinct raw label and how many distinct entities use it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelUsage {
    pub label: String,
    pub entity_count: usize,
}

/// A static, periodically refreshed snapshot of the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_date: Option<NaiveDate>,
    #[serde(default)]
    pub entities: Vec<EntityProfile>,
    #[serde(default)]
    pub cost_records: Vec<CostRecord>,
}

/// Read-only source of cost records and entity profiles.
///
/// Implementations report transport failures as
/// [`BenchmarkError::UpstreamUnavailable`]; the engine does not retry.
pub trait CostStore: Sync {
    fn entities(&self) -> BenchmarkResult<Vec<EntityProfile>>;

    fn entity(&self, entity_id: &str) -> BenchmarkResult<Option<EntityProfile>> {
        Ok(self
            .entities()?
            .into_iter()
            .find(|e| e.entity_id == entity_id))
    }

    /// Every distinct raw category label with its distinct-entity count.
    fn label_usage(&self) -> BenchmarkResult<Vec<LabelUsage>>;

    /// Cost records whose raw label is one of `labels`, optionally limited
    /// to one fiscal year.
    fn cost_records(&self, labels: &[String], period: Option<i32>) -> BenchmarkResult<Vec<CostRecord>>;
}

/// [`CostStore`] over an in-memory [`Dataset`].
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    dataset: Dataset,
}

impl InMemoryStore {
    pub fn new(dataset: Dataset) -> BenchmarkResult<Self> {
        let mut seen = HashSet::new();
        for e in &dataset.entities {
            if e.entity_id.trim().is_empty() {
                return Err(BenchmarkError::InvalidInput {
                    field: "entities.entity_id".into(),
                    reason: "Entity id must not be empty".into(),
                });
            }
            if !seen.insert(e.entity_id.as_str()) {
                return Err(BenchmarkError::InvalidInput {
                    field: "entities".into(),
                    reason: format!("Duplicate entity id '{}'", e.entity_id),
                });
            }
        }
        Ok(InMemoryStore { dataset })
    }

    pub fn from_json(json: &str) -> BenchmarkResult<Self> {
        let dataset: Dataset = serde_json::from_str(json)?;
        Self::new(dataset)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

impl CostStore for InMemoryStore {
    fn entities(&self) -> BenchmarkResult<Vec<EntityProfile>> {
        Ok(self.dataset.entities.clone())
    }

    fn entity(&self, entity_id: &str) -> BenchmarkResult<Option<EntityProfile>> {
        Ok(self
            .dataset
            .entities
            .iter()
            .find(|e| e.entity_id == entity_id)
            .cloned())
    }

    fn label_usage(&self) -> BenchmarkResult<Vec<LabelUsage>> {
        let mut by_label: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for r in &self.dataset.cost_records {
            by_label
                .entry(r.raw_category.as_str())
                .or_default()
                .insert(r.entity_id.as_str());
        }
        let mut usage: Vec<LabelUsage> = by_label
            .into_iter()
            .map(|(label, ids)| LabelUsage {
                label: label.to_string(),
                entity_count: ids.len(),
            })
            .collect();
        usage.sort_by(|a, b| {
            b.entity_count
                .cmp(&a.entity_count)
                .then_with(|| a.label.cmp(&b.label))
        });
        Ok(usage)
    }

    fn cost_records(&self, labels: &[String], period: Option<i32>) -> BenchmarkResult<Vec<CostRecord>> {
        let wanted: HashSet<&str> = labels.iter().map(|l| l.as_str()).collect();
        Ok(self
            .dataset
            .cost_records
            .iter()
            .filter(|r| wanted.contains(r.raw_category.as_str()))
            .filter(|r| period.is_none() || r.period == period)
            .cloned()
            .collect())
    }
}
