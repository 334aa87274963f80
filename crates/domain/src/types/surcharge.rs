//! Surcharge lookup tables consumed by pricing policies

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Nested mapping category -> variant label -> numeric surcharge.
///
/// Loaded from a policy input file; consumed, never produced, by the core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurchargeTable(BTreeMap<String, BTreeMap<String, f64>>);

impl SurchargeTable {
    /// Surcharge for a label within a category; missing entries are zero.
    pub fn amount(&self, category: &str, label: &str) -> f64 {
        self.0.get(category).and_then(|labels| labels.get(label)).copied().unwrap_or(0.0)
    }

    /// True when the label is listed under the category at all.
    pub fn contains(&self, category: &str, label: &str) -> bool {
        self.0.get(category).is_some_and(|labels| labels.contains_key(label))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}
