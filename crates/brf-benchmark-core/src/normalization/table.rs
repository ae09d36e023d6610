use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::category::CanonicalCategory;
use super::rules::{Normalization, Normalizer};
use crate::store::LabelUsage;

/// Raw label → normalization, computed once per distinct label.
///
/// This is the only classification path the population index uses; it never
/// re-derives category membership from its own pattern list.
#[derive(Debug, Clone, Default)]
pub struct NormalizationTable {
    entries: BTreeMap<String, Option<Normalization>>,
}

/// A raw label that matched no rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationGap {
    pub label: String,
    pub entity_count: usize,
}

/// How many raw variants and entities fed each canonical category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCoverage {
    pub category: CanonicalCategory,
    pub category_group: String,
    pub variants: usize,
    pub entity_mentions: usize,
}

/// Data-quality signal for curators. Never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationGapReport {
    /// Unclassified labels seen in at least `material_threshold` entities,
    /// most widespread first.
    pub gaps: Vec<ClassificationGap>,
    pub total_unclassified_labels: usize,
    pub total_labels: usize,
    pub material_threshold: usize,
    pub coverage: Vec<CategoryCoverage>,
}

impl NormalizationTable {
    pub fn build<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build_with(&Normalizer::default(), labels)
    }

    pub fn build_with<I, S>(normalizer: &Normalizer<'_>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = BTreeMap::new();
        for label in labels {
            let label = label.as_ref();
            if !entries.contains_key(label) {
                entries.insert(label.to_string(), normalizer.normalize(label));
            }
        }
        NormalizationTable { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Normalization of a label the table was built from. Unknown labels and
    /// uncategorized labels both yield `None`.
    pub fn lookup(&self, raw_category: &str) -> Option<&Normalization> {
        self.entries.get(raw_category).and_then(|n| n.as_ref())
    }

    /// Raw labels that normalize to `category`, in sorted order.
    pub fn labels_for(&self, category: CanonicalCategory) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, n)| n.as_ref().map(|n| n.category) == Some(category))
            .map(|(label, _)| label.clone())
            .collect()
    }

    pub fn unclassified(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, n)| n.is_none())
            .map(|(label, _)| label.as_str())
    }

    /// Summarize labels that failed to normalize, weighting each by the
    /// number of distinct entities using it.
    pub fn gap_report(&self, usage: &[LabelUsage], min_entities: usize) -> ClassificationGapReport {
        let mut gaps = Vec::new();
        let mut total_unclassified = 0usize;
        let mut coverage: BTreeMap<CanonicalCategory, (usize, usize)> = BTreeMap::new();

        for u in usage {
            match self.lookup(&u.label) {
                Some(n) => {
                    let entry = coverage.entry(n.category).or_insert((0, 0));
                    entry.0 += 1;
                    entry.1 += u.entity_count;
                }
                None => {
                    total_unclassified += 1;
                    if u.entity_count >= min_entities {
                        tracing::warn!(
                            label = %u.label,
                            entities = u.entity_count,
                            "uncategorized cost label"
                        );
                        gaps.push(ClassificationGap {
                            label: u.label.clone(),
                            entity_count: u.entity_count,
                        });
                    } else {
                        tracing::debug!(label = %u.label, entities = u.entity_count, "uncategorized cost label below materiality");
                    }
                }
            }
        }

        gaps.sort_by(|a, b| {
            b.entity_count
                .cmp(&a.entity_count)
                .then_with(|| a.label.cmp(&b.label))
        });

        ClassificationGapReport {
            gaps,
            total_unclassified_labels: total_unclassified,
            total_labels: usage.len(),
            material_threshold: min_entities,
            coverage: coverage
                .into_iter()
                .map(|(category, (variants, entity_mentions))| CategoryCoverage {
                    category,
                    category_group: category.group().to_string(),
                    variants,
                    entity_mentions,
                })
                .collect(),
        }
    }
}
