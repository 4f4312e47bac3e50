//! Deterministic identifiers for new elements.
//!
//! Ids have the form `<prefix>_<n>` in model space and `sym_<prefix>_<n>` in
//! symbol space, where the prefix comes from [`ElementType::id_prefix`]. New
//! ids continue after the highest suffix already taken for that prefix, so
//! the output depends only on the inputs.

use crate::symbol::ElementType;
use std::collections::{BTreeMap, BTreeSet};

pub const SYMBOL_ID_PREFIX: &str = "sym_";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeneratedIds {
    pub symbol_id: String,
    pub element_id: String,
}

/// Numeric suffix of `id` if it is `<prefix>_<n>` or `sym_<prefix>_<n>`
fn suffix_for(id: &str, prefix: &str) -> Option<u64> {
    let id = id.strip_prefix(SYMBOL_ID_PREFIX).unwrap_or(id);
    let digits = id.strip_prefix(prefix)?.strip_prefix('_')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn highest_suffix(existing_ids: &BTreeSet<String>, prefix: &str) -> u64 {
    existing_ids
        .iter()
        .filter_map(|id| suffix_for(id, prefix))
        .max()
        .unwrap_or(0)
}

/// Produce one pair of ids per entry of `types_in_order`, in that order.
///
/// Pure: the same inputs always give the same output, and no generated id
/// collides with `existing_ids` or with another id from the same call.
pub fn generate(existing_ids: &BTreeSet<String>, types_in_order: &[ElementType]) -> Vec<GeneratedIds> {
    let mut next_suffix: BTreeMap<ElementType, u64> = BTreeMap::new();
    let mut generated = Vec::with_capacity(types_in_order.len());

    for &element_type in types_in_order {
        let prefix = element_type.id_prefix();
        let counter = next_suffix
            .entry(element_type)
            .or_insert_with(|| highest_suffix(existing_ids, prefix));

        // Never hand out an id that is already taken, whatever the scan found.
        // Past u64::MAX the search restarts at 1 and walks up to the first free suffix.
        loop {
            *counter = counter.checked_add(1).unwrap_or(1);
            let element_id = format!("{prefix}_{counter}");
            let symbol_id = format!("{SYMBOL_ID_PREFIX}{element_id}");
            if !existing_ids.contains(&element_id) && !existing_ids.contains(&symbol_id) {
                generated.push(GeneratedIds {
                    symbol_id,
                    element_id,
                });
                break;
            }
        }
    }

    generated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_parsing() {
        assert_eq!(suffix_for("bus_12", "bus"), Some(12));
        assert_eq!(suffix_for("sym_bus_3", "bus"), Some(3));
        assert_eq!(suffix_for("busbar_3", "bus"), None);
        assert_eq!(suffix_for("bus_", "bus"), None);
        assert_eq!(suffix_for("bus_x1", "bus"), None);
        assert_eq!(suffix_for("line_4", "bus"), None);
    }

    #[test]
    fn largest_suffix_does_not_overflow() {
        let existing: BTreeSet<String> = ["bus_18446744073709551615", "bus_1"].map(String::from).into();
        let ids = generate(&existing, &[ElementType::Bus, ElementType::Bus]);
        assert_eq!(ids[0].element_id, "bus_2");
        assert_eq!(ids[1].element_id, "bus_3");
    }
}
