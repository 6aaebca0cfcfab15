use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A catalog entry available for adding to the cart. The server assigns `id`;
/// `content` is the display label and may carry an incidental trailing `x`
/// marker that [`clean_content`] strips.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryItem {
    pub id: i64,
    pub content: String,
}

/// A quantity of one inventory item staged for checkout. `id` equals the
/// originating inventory item's id and is the cart's identity: the cart never
/// holds two entries with the same id, and `amount` is always >= 1 (an amount
/// of 0 means the entry is deleted, never stored).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartItem {
    pub id: i64,
    pub content: String,
    pub amount: i64,
}

static TRAILING_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*x$").expect("valid regex"));

/// Normalize a label: trim whitespace, then strip a trailing quantity marker
/// (optional whitespace + literal `x`), then strip a single ` x` once more so
/// doubled markers clean down in one pass. Idempotent.
pub fn clean_content(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = TRAILING_MARKER.replace(trimmed, "");
    stripped
        .strip_suffix(" x")
        .unwrap_or(&stripped)
        .to_string()
}
