//! Item codes and the canonical inventory representation.
//!
//! Persisted inventories exist in two legacy shapes:
//!
//! - a code-keyed object: `{"WOOD": 10, "stone": 4}`
//! - an array of item objects: `[{"code": "wood", "quantity": 10}, ...]`
//!   (older records use `id`/`name`/`type` for the code and
//!   `amount`/`count` for the quantity)
//!
//! Both are read transparently into [`Inventory`], a map from uppercase
//! [`ItemCode`] to quantity. Writes always emit the code-keyed object.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// An uppercase item code such as `WOODEN_STICKS`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct ItemCode(String);

impl ItemCode {
    /// Normalise a raw code: trimmed and uppercased.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_ascii_uppercase())
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ItemCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemCode {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// A single entry of the legacy array inventory shape.
#[derive(Debug, Clone, Deserialize)]
struct LegacyItem {
    #[serde(alias = "id", alias = "name", alias = "type")]
    code: String,
    #[serde(default, alias = "amount", alias = "count")]
    quantity: u32,
}

/// Every shape an inventory has been persisted in.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum InventoryRepr {
    Map(BTreeMap<String, u32>),
    List(Vec<LegacyItem>),
}

/// A canonical inventory: item code to quantity, zero entries omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "InventoryRepr", into = "BTreeMap<ItemCode, u32>")]
pub struct Inventory {
    items: BTreeMap<ItemCode, u32>,
}

impl From<InventoryRepr> for Inventory {
    fn from(repr: InventoryRepr) -> Self {
        let mut inventory = Self::new();
        match repr {
            InventoryRepr::Map(map) => {
                for (code, qty) in map {
                    inventory.add(ItemCode::new(&code), qty);
                }
            }
            InventoryRepr::List(list) => {
                for item in list {
                    inventory.add(ItemCode::new(&item.code), item.quantity);
                }
            }
        }
        inventory
    }
}

impl From<Inventory> for BTreeMap<ItemCode, u32> {
    fn from(inventory: Inventory) -> Self {
        inventory.items
    }
}

impl FromIterator<(ItemCode, u32)> for Inventory {
    fn from_iter<I: IntoIterator<Item = (ItemCode, u32)>>(iter: I) -> Self {
        let mut inventory = Self::new();
        for (code, qty) in iter {
            inventory.add(code, qty);
        }
        inventory
    }
}

impl Inventory {
    /// An empty inventory.
    pub const fn new() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }

    /// Quantity held of `code` (zero if absent).
    pub fn quantity(&self, code: &ItemCode) -> u32 {
        self.items.get(code).copied().unwrap_or(0)
    }

    /// Add `qty` of `code`, saturating at `u32::MAX`. Zero is a no-op.
    pub fn add(&mut self, code: ItemCode, qty: u32) {
        if qty == 0 {
            return;
        }
        let entry = self.items.entry(code).or_insert(0);
        *entry = entry.saturating_add(qty);
    }

    /// Remove up to `qty` of `code`, returning how much was removed.
    pub fn take(&mut self, code: &ItemCode, qty: u32) -> u32 {
        let held = self.quantity(code);
        let removed = held.min(qty);
        let remaining = held.saturating_sub(removed);
        if remaining == 0 {
            self.items.remove(code);
        } else {
            self.items.insert(code.clone(), remaining);
        }
        removed
    }

    /// Whether at least `qty` of `code` is held.
    pub fn has(&self, code: &ItemCode, qty: u32) -> bool {
        self.quantity(code) >= qty
    }

    /// Whether every requirement is covered.
    pub fn covers(&self, required: &BTreeMap<ItemCode, u32>) -> bool {
        required.iter().all(|(code, qty)| self.has(code, *qty))
    }

    /// Move everything from `other` into this inventory.
    pub fn absorb(&mut self, other: Self) {
        for (code, qty) in other.items {
            self.add(code, qty);
        }
    }

    /// Total quantity across all codes, saturating.
    pub fn total(&self) -> u32 {
        self.items.values().fold(0_u32, |acc, q| acc.saturating_add(*q))
    }

    /// Whether nothing is held.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct codes held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterate `(code, quantity)` pairs in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemCode, u32)> {
        self.items.iter().map(|(c, q)| (c, *q))
    }
}
