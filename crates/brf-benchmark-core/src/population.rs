//! Peer Population Index: per-entity, per-m² values for one category or
//! entity-level metric, optionally restricted to a peer group.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use crate::error::BenchmarkError;
use crate::normalization::{CanonicalCategory, NormalizationTable};
use crate::peers::{PeerClassifier, PeerFilter, SuppliedLabel};
use crate::store::{CostStore, EntityMetrics, EntityProfile};
use crate::types::{CostPerArea, Direction, EntityId};
use crate::BenchmarkResult;

/// One entity's cost per m² in one canonical category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedCostObservation {
    pub entity_id: EntityId,
    pub entity_name: String,
    pub category: CanonicalCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_group: Option<String>,
    pub cost_per_unit_area: CostPerArea,
}

/// Entity-level metrics available for distributions and leaderboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    DebtPerSqm,
    SolidityPercent,
    EnergyPerformance,
    MonthlyFeePerSqm,
    InterestRate,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::DebtPerSqm,
        Metric::SolidityPercent,
        Metric::EnergyPerformance,
        Metric::MonthlyFeePerSqm,
        Metric::InterestRate,
    ];

    pub fn value_of(self, m: &EntityMetrics) -> Option<Decimal> {
        match self {
            Metric::DebtPerSqm => m.debt_per_sqm,
            Metric::SolidityPercent => m.solidity_percent,
            Metric::EnergyPerformance => m.energy_kwh_per_sqm,
            Metric::MonthlyFeePerSqm => m.monthly_fee_per_sqm,
            Metric::InterestRate => m.interest_rate,
        }
    }

    /// Zero and negative readings of interest rate and monthly fee are
    /// reporting gaps. Other metrics take their value as reported.
    pub fn requires_positive(self) -> bool {
        matches!(self, Metric::InterestRate | Metric::MonthlyFeePerSqm)
    }

    /// Default reading of the metric: solidity is better high, the rest low.
    pub fn natural_direction(self) -> Direction {
        match self {
            Metric::SolidityPercent => Direction::HigherIsBetter,
            _ => Direction::LowerIsBetter,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Metric::DebtPerSqm => "debt_per_sqm",
            Metric::SolidityPercent => "solidity_percent",
            Metric::EnergyPerformance => "energy_performance",
            Metric::MonthlyFeePerSqm => "monthly_fee_per_sqm",
            Metric::InterestRate => "interest_rate",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::DebtPerSqm => write!(f, "Debt per m²"),
            Metric::SolidityPercent => write!(f, "Solidity (%)"),
            Metric::EnergyPerformance => write!(f, "Energy performance (kWh/m²)"),
            Metric::MonthlyFeePerSqm => write!(f, "Monthly fee per m²"),
            Metric::InterestRate => write!(f, "Interest rate (%)"),
        }
    }
}

impl FromStr for Metric {
    type Err = BenchmarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.key() == wanted)
            .ok_or_else(|| BenchmarkError::InvalidInput {
                field: "metric".into(),
                reason: format!(
                    "'{s}' is not a known metric (expected one of: {})",
                    Metric::ALL.map(|m| m.key()).join(", ")
                ),
            })
    }
}

/// One entity's value for an entity-level metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricObservation {
    pub entity_id: EntityId,
    pub entity_name: String,
    pub metric: Metric,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_group: Option<String>,
    pub value: Decimal,
}

/// An entity together with its classified peer group.
#[derive(Debug, Clone)]
pub struct PeerMember {
    pub profile: EntityProfile,
    pub peer_group: Option<String>,
}

/// Builds category and metric populations from a [`CostStore`].
///
/// Category membership comes only from the [`NormalizationTable`]; the index
/// asks the store for exactly the raw labels that normalize to the requested
/// category.
pub struct PeerPopulationIndex<'s> {
    store: &'s dyn CostStore,
    table: NormalizationTable,
    classifier: Box<dyn PeerClassifier>,
    period: Option<i32>,
}

impl<'s> PeerPopulationIndex<'s> {
    pub fn new(store: &'s dyn CostStore, table: NormalizationTable) -> Self {
        PeerPopulationIndex {
            store,
            table,
            classifier: Box::new(SuppliedLabel),
            period: None,
        }
    }

    /// Materialize the normalization table from every raw label in the store.
    pub fn from_store(store: &'s dyn CostStore) -> BenchmarkResult<Self> {
        let usage = store.label_usage()?;
        let table = NormalizationTable::build(usage.iter().map(|u| u.label.as_str()));
        Ok(Self::new(store, table))
    }

    pub fn with_classifier(mut self, classifier: impl PeerClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    /// Limit cost records to one fiscal year.
    pub fn with_period(mut self, period: i32) -> Self {
        self.period = Some(period);
        self
    }

    pub fn store(&self) -> &dyn CostStore {
        self.store
    }

    pub fn table(&self) -> &NormalizationTable {
        &self.table
    }

    pub fn period(&self) -> Option<i32> {
        self.period
    }

    pub fn peer_group_of(&self, entity: &EntityProfile) -> Option<String> {
        self.classifier.classify(entity)
    }

    /// Entities passing the peer filter, in store order.
    pub fn peers(&self, peer_filter: Option<&PeerFilter>) -> BenchmarkResult<Vec<PeerMember>> {
        Ok(self
            .store
            .entities()?
            .into_iter()
            .map(|profile| {
                let peer_group = self.classifier.classify(&profile);
                PeerMember {
                    profile,
                    peer_group,
                }
            })
            .filter(|m| peer_filter.map_or(true, |f| f.matches(m.peer_group.as_deref())))
            .collect())
    }

    /// Every entity's cost per m² for `category`, ascending.
    ///
    /// Positive cost lines of one entity are summed within one fiscal year
    /// before dividing by its area. Without a configured period each entity
    /// contributes its latest year only. Entities without a positive area are
    /// left out. An empty result means no benchmark is available.
    pub fn get_population(
        &self,
        category: CanonicalCategory,
        peer_filter: Option<&PeerFilter>,
    ) -> BenchmarkResult<Vec<NormalizedCostObservation>> {
        let labels = self.table.labels_for(category);
        if labels.is_empty() {
            tracing::debug!(%category, "no raw labels normalize to category");
            return Ok(Vec::new());
        }

        let records = self.store.cost_records(&labels, self.period)?;
        // entity -> (period, total); undated lines rank below any dated year
        let mut totals: BTreeMap<String, (Option<i32>, Decimal)> = BTreeMap::new();
        for r in records {
            if r.amount <= Decimal::ZERO {
                continue;
            }
            if self.table.lookup(&r.raw_category).map(|n| n.category) != Some(category) {
                continue;
            }
            let slot = totals.entry(r.entity_id).or_insert((r.period, Decimal::ZERO));
            if slot.0 < r.period {
                *slot = (r.period, Decimal::ZERO);
            }
            if slot.0 == r.period {
                slot.1 += r.amount;
            }
        }

        let members: HashMap<String, PeerMember> = self
            .peers(peer_filter)?
            .into_iter()
            .map(|m| (m.profile.entity_id.clone(), m))
            .collect();

        let mut population: Vec<NormalizedCostObservation> = totals
            .into_iter()
            .filter_map(|(entity_id, (_, total))| {
                let member = members.get(&entity_id)?;
                let area = member.profile.usable_area()?;
                Some(NormalizedCostObservation {
                    entity_name: member.profile.name.clone(),
                    category,
                    peer_group: member.peer_group.clone(),
                    cost_per_unit_area: total / area,
                    entity_id,
                })
            })
            .collect();

        population.sort_by(|a, b| {
            a.cost_per_unit_area
                .cmp(&b.cost_per_unit_area)
                .then_with(|| a.entity_id.cmp(&b.entity_id))
        });

        tracing::debug!(
            %category,
            sample_size = population.len(),
            peer_group = peer_filter.map(|f| f.group.as_str()).unwrap_or("all"),
            "built category population"
        );
        Ok(population)
    }

    /// Every entity's value for an entity-level metric, ascending.
    pub fn metric_population(
        &self,
        metric: Metric,
        peer_filter: Option<&PeerFilter>,
    ) -> BenchmarkResult<Vec<MetricObservation>> {
        let mut population: Vec<MetricObservation> = self
            .peers(peer_filter)?
            .into_iter()
            .filter_map(|m| {
                let value = metric.value_of(&m.profile.metrics)?;
                if metric.requires_positive() && value <= Decimal::ZERO {
                    return None;
                }
                Some(MetricObservation {
                    entity_id: m.profile.entity_id,
                    entity_name: m.profile.name,
                    metric,
                    peer_group: m.peer_group,
                    value,
                })
            })
            .collect();

        population.sort_by(|a, b| {
            a.value
                .cmp(&b.value)
                .then_with(|| a.entity_id.cmp(&b.entity_id))
        });
        Ok(population)
    }
}

/// Values of a category population, in population order.
pub fn cost_values(population: &[NormalizedCostObservation]) -> Vec<Decimal> {
    population.iter().map(|o| o.cost_per_unit_area).collect()
}
