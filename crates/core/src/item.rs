//! Stock items and their naming rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Actor recorded on restock history entries.
///
/// Additions are always attributed to this fixed system identity, never to a
/// caller-supplied name.
pub const SYSTEM_ACTOR: &str = "SYSTEM";

/// Category assigned when a new item is created without one.
pub const DEFAULT_CATEGORY: &str = "General";

/// Validated stock item name: the unique, case-sensitive identity of an item.
///
/// Construction trims surrounding whitespace and rejects the empty result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemName(String);

impl ItemName {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl core::fmt::Display for ItemName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Current state of one stock item.
///
/// At most one item exists per distinct name, and `quantity` never goes
/// negative. The row persists once created; withdrawing down to zero does not
/// remove it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub name: String,
    pub quantity: i64,
    pub category: String,
    pub updated_at: DateTime<Utc>,
}

impl StockItem {
    /// A freshly created item. A missing or blank category falls back to
    /// [`DEFAULT_CATEGORY`].
    pub fn new(
        name: ItemName,
        quantity: i64,
        category: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let category = match category.map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => DEFAULT_CATEGORY.to_string(),
        };

        Self {
            name: name.into_string(),
            quantity,
            category,
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_name_is_trimmed() {
        let name = ItemName::parse("  Pens  ").unwrap();
        assert_eq!(name.as_str(), "Pens");
    }

    #[test]
    fn empty_and_whitespace_names_are_rejected() {
        assert!(ItemName::parse("").is_err());
        assert!(ItemName::parse("   \t ").is_err());
    }

    #[test]
    fn item_names_are_case_sensitive() {
        let lower = ItemName::parse("pens").unwrap();
        let upper = ItemName::parse("Pens").unwrap();
        assert_ne!(lower, upper);
    }

    #[test]
    fn missing_or_blank_category_defaults() {
        let now = Utc::now();
        let a = StockItem::new(ItemName::parse("Pens").unwrap(), 10, None, now);
        let b = StockItem::new(ItemName::parse("Clips").unwrap(), 3, Some("  "), now);
        let c = StockItem::new(ItemName::parse("Paper").unwrap(), 5, Some("Stationery"), now);

        assert_eq!(a.category, DEFAULT_CATEGORY);
        assert_eq!(b.category, DEFAULT_CATEGORY);
        assert_eq!(c.category, "Stationery");
    }

    #[test]
    fn stock_item_serializes_with_wire_field_names() {
        let item = StockItem::new(ItemName::parse("Pens").unwrap(), 10, None, Utc::now());
        let json = serde_json::to_value(&item).unwrap();

        assert!(json.get("updatedAt").is_some());
        assert_eq!(json["name"], "Pens");
        assert_eq!(json["quantity"], 10);
    }
}
