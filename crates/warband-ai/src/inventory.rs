//! All-or-nothing resource consumption.
//!
//! Requirements are checked in full before anything is removed, so a
//! failed payment leaves the inventory untouched.

use std::collections::BTreeMap;

use warband_types::{Inventory, ItemCode};

use crate::error::AiError;

/// First requirement the inventory cannot cover, if any.
pub fn shortfall(inventory: &Inventory, required: &BTreeMap<ItemCode, u32>) -> Option<AiError> {
    required.iter().find_map(|(item, requested)| {
        let available = inventory.quantity(item);
        (available < *requested).then(|| AiError::InsufficientResource {
            item: item.clone(),
            requested: *requested,
            available,
        })
    })
}

/// Deduct every requirement from `inventory`.
///
/// Fails with [`AiError::InsufficientResource`] and changes nothing if any
/// single requirement is short.
pub fn consume_resources(
    inventory: &mut Inventory,
    required: &BTreeMap<ItemCode, u32>,
) -> Result<(), AiError> {
    if let Some(err) = shortfall(inventory, required) {
        return Err(err);
    }
    for (item, qty) in required {
        inventory.take(item, *qty);
    }
    Ok(())
}

/// Whether the inventory holds fewer than `threshold` items in total.
pub fn is_resource_poor(inventory: &Inventory, threshold: u32) -> bool {
    inventory.total() < threshold
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn req(entries: &[(&str, u32)]) -> BTreeMap<ItemCode, u32> {
        entries.iter().map(|(c, q)| (ItemCode::new(c), *q)).collect()
    }

    #[test]
    fn success_deducts_everything() {
        let mut inv: Inventory = serde_json::from_str(r#"{"WOOD": 5, "STONE": 3}"#).unwrap();
        consume_resources(&mut inv, &req(&[("wood", 5), ("stone", 1)])).unwrap();
        assert_eq!(inv.quantity(&ItemCode::new("WOOD")), 0);
        assert_eq!(inv.quantity(&ItemCode::new("STONE")), 2);
        assert_eq!(inv.total(), 2);
    }

    #[test]
    fn failure_changes_nothing() {
        let mut inv: Inventory = serde_json::from_str(r#"{"WOOD": 5, "STONE": 3}"#).unwrap();
        let before = inv.clone();
        let err = consume_resources(&mut inv, &req(&[("wood", 2), ("stone", 4)])).unwrap_err();
        assert_eq!(
            err,
            AiError::InsufficientResource {
                item: ItemCode::new("STONE"),
                requested: 4,
                available: 3,
            }
        );
        assert_eq!(inv, before);
    }
}
