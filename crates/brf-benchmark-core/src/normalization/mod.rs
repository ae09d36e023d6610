//! Cost-category normalization: free-text labels to canonical categories.

pub mod category;
pub mod rules;
pub mod table;

pub use category::CanonicalCategory;
pub use rules::{normalize, Normalization, NormalizationRule, Normalizer, RULES};
pub use table::{CategoryCoverage, ClassificationGap, ClassificationGapReport, NormalizationTable};
