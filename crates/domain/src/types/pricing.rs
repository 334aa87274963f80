//! Price updates, batches, and dispatch reporting

use serde::{Deserialize, Serialize};

use crate::errors::{PriceloomError, Result};

/// An exact-precision decimal price kept in string form.
///
/// Prices are never represented as floats inside the core; they are carried
/// verbatim between the catalog read and the mutation write so that repeated
/// submissions converge on the same value. Construction validates the string
/// is a plain, non-negative decimal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(String);

impl Price {
    /// Validate and wrap a decimal string such as `"120"` or `"89.90"`.
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PriceloomError::InvalidInput("price must not be empty".into()));
        }

        let mut dots = 0usize;
        let mut digits = 0usize;
        for ch in trimmed.chars() {
            match ch {
                '0'..='9' => digits += 1,
                '.' => dots += 1,
                _ => {
                    return Err(PriceloomError::InvalidInput(format!(
                        "price '{trimmed}' contains invalid character '{ch}'"
                    )));
                }
            }
        }

        if digits == 0 || dots > 1 {
            return Err(PriceloomError::InvalidInput(format!(
                "price '{trimmed}' is not a decimal number"
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the canonical string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Default for Price {
    fn default() -> Self {
        Self("0.00".to_string())
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The atomic unit submitted to the dispatcher. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub variant_id: String,
    pub new_price: Price,
}

impl PriceUpdate {
    pub fn new(variant_id: impl Into<String>, new_price: Price) -> Self {
        Self { variant_id: variant_id.into(), new_price }
    }
}

/// An ordered, size-bounded group of price updates.
///
/// `product_id` is present when the remote mutation is scoped per catalog
/// item; unscoped batches (aliased mutations) leave it `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub product_id: Option<String>,
    pub updates: Vec<PriceUpdate>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

/// A per-item user error returned by the remote alongside a 2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteUserError {
    /// Field path reported by the remote, e.g. `variants.0.price`.
    pub field: Option<String>,
    pub message: String,
    /// Index of the originating update within the submitted batch, when the
    /// adapter could correlate it (positional, see DESIGN notes).
    pub update_index: Option<usize>,
}

/// Outcome of submitting a single batch: accepted, possibly with item errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub user_errors: Vec<RemoteUserError>,
}

/// A batch the remote rejected wholesale, preserved for manual retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedBatch {
    pub batch: Batch,
    pub error: String,
}

/// Aggregated result of a dispatch run.
///
/// Item-level and batch-level failures are collected rather than raised; the
/// caller branches on the report after the run completes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Updates submitted in batches the remote accepted (2xx), including any
    /// that came back with item-level user errors.
    pub submitted: usize,
    /// Item-level user errors, across all accepted batches.
    pub item_errors: Vec<RemoteUserError>,
    /// Batches that failed wholesale, contents intact.
    pub failed_batches: Vec<FailedBatch>,
    /// Number of batches issued.
    pub batches: usize,
}

impl DispatchReport {
    /// True when every update was accepted without any error.
    pub fn is_clean(&self) -> bool {
        self.item_errors.is_empty() && self.failed_batches.is_empty()
    }
}
