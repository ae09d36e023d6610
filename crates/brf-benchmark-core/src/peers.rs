//! Peer-group classification and filtering.
//!
//! Which entities count as peers is policy, so the classifier is injected
//! into the population index rather than hardcoded in queries.

use serde::{Deserialize, Serialize};

use crate::store::EntityProfile;

/// Restricts a population to one peer group. Matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerFilter {
    pub group: String,
}

impl PeerFilter {
    pub fn new(group: impl Into<String>) -> Self {
        PeerFilter {
            group: group.into(),
        }
    }

    pub fn matches(&self, peer_group: Option<&str>) -> bool {
        peer_group
            .map(|g| g.trim().to_lowercase() == self.group.trim().to_lowercase())
            .unwrap_or(false)
    }
}

/// Assigns an entity to a peer group.
pub trait PeerClassifier: Sync {
    fn classify(&self, entity: &EntityProfile) -> Option<String>;
}

impl<T: PeerClassifier + ?Sized> PeerClassifier for Box<T> {
    fn classify(&self, entity: &EntityProfile) -> Option<String> {
        (**self).classify(entity)
    }
}

/// Uses the label supplied alongside each entity, untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuppliedLabel;

impl PeerClassifier for SuppliedLabel {
    fn classify(&self, entity: &EntityProfile) -> Option<String> {
        entity
            .peer_group
            .as_ref()
            .map(|g| g.trim())
            .filter(|g| !g.is_empty())
            .map(str::to_string)
    }
}

/// One district: postal-code prefixes and address/area keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictRule {
    pub district: String,
    #[serde(default)]
    pub postal_prefixes: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl DistrictRule {
    fn matches(&self, postal: Option<&str>, text: &str) -> bool {
        let by_postal = postal
            .map(|p| self.postal_prefixes.iter().any(|pre| p.starts_with(pre.as_str())))
            .unwrap_or(false);
        by_postal || self.keywords.iter().any(|k| text.contains(&k.to_lowercase()))
    }
}

/// Ordered district heuristic: first matching rule wins, unmatched entities
/// fall into `fallback` (or no group at all).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictRules {
    pub rules: Vec<DistrictRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

impl DistrictRules {
    pub fn new(rules: Vec<DistrictRule>) -> Self {
        DistrictRules {
            rules,
            fallback: None,
        }
    }

    /// The Stockholm districts the dashboards were first built for.
    pub fn stockholm() -> Self {
        fn rule(district: &str, prefixes: &[&str], keywords: &[&str]) -> DistrictRule {
            DistrictRule {
                district: district.to_string(),
                postal_prefixes: prefixes.iter().map(|s| s.to_string()).collect(),
                keywords: keywords.iter().map(|s| s.to_string()).collect(),
            }
        }
        DistrictRules {
            rules: vec![
                rule("Hjorthagen", &["1153", "1154"], &["hjorthagen"]),
                rule("Norra Djurgårdsstaden", &["1152"], &["norra djurgård", "djurgårdsstaden"]),
                rule("Hammarby Sjöstad", &["120"], &["hammarby", "sjöstad"]),
                rule("Sickla", &[], &["sickla"]),
                rule("Henriksdal", &[], &["henriksdal"]),
            ],
            fallback: Some("Other".to_string()),
        }
    }
}

impl PeerClassifier for DistrictRules {
    fn classify(&self, entity: &EntityProfile) -> Option<String> {
        let postal: Option<String> = entity
            .postal_code
            .as_ref()
            .map(|p| p.chars().filter(|c| !c.is_whitespace()).collect());
        let text = [entity.address.as_deref(), entity.peer_group.as_deref()]
            .iter()
            .flatten()
            .map(|s| s.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");

        self.rules
            .iter()
            .find(|r| r.matches(postal.as_deref(), &text))
            .map(|r| r.district.clone())
            .or_else(|| self.fallback.clone())
    }
}
