//! Cart merging and row partitioning

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use std::collections::BTreeMap;

// Internal
use crate::topo::Topology;
use comms_if::store::{Cart, ProductId};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A cart partitioned into per-row visit lists.
#[derive(Debug, Default)]
pub struct RowPartition {
    /// Products to visit per row, ordered by node id within each row. Only
    /// rows with at least one product appear.
    pub by_row: BTreeMap<u8, Vec<ProductId>>,

    /// Products without a row assignment, excluded from the trip.
    pub skipped: Vec<ProductId>,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Merge a request's cart delta into the persisted cart.
///
/// Quantities are additive per product, so several partial list submissions
/// accumulate into one cart. Entries that end up non-positive are dropped.
pub fn merge(mut existing: Cart, delta: &Cart) -> Cart {
    for (id, qty) in delta.iter() {
        *existing.entry(id.clone()).or_insert(0) += qty;
    }

    existing.retain(|_, qty| *qty > 0);

    existing
}

/// Partition a cart's products by their assigned rows.
///
/// Products with no row assignment are a data error in the catalogue: they
/// are logged and skipped, the trip continues without them.
pub fn partition_by_row(cart: &Cart, topo: &Topology) -> RowPartition {
    let mut partition = RowPartition::default();

    for id in cart.keys() {
        match topo.row_for_product(id) {
            Some(row) => partition.by_row.entry(row).or_default().push(id.clone()),
            None => {
                warn!("Product {} has no assigned row, skipping", id);
                partition.skipped.push(id.clone());
            }
        }
    }

    // Visit products in node order along each aisle
    for ids in partition.by_row.values_mut() {
        ids.sort_by_key(|id| {
            topo.node_for_product(id)
                .map(|node| topo.node_id(node))
                .unwrap_or(u16::MAX)
        });
    }

    partition
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::topo::{Params as TopoParams, ProductDef};

    fn topo() -> Topology {
        let products = (1..=9u8)
            .map(|n| ProductDef {
                id: ProductId::new(format!("pdt{}", n)),
                row: (n - 1) / 3 + 1,
                slot: (n - 1) % 3 + 1,
            })
            .collect();

        Topology::from_params(TopoParams {
            rows: 3,
            slots_per_row: 3,
            products,
        })
        .unwrap()
    }

    fn cart(entries: &[(&str, i64)]) -> Cart {
        entries
            .iter()
            .map(|(id, qty)| (ProductId::new(id), *qty))
            .collect()
    }

    #[test]
    fn test_merge_is_additive() {
        let merged = merge(cart(&[("pdt1", 2)]), &cart(&[("pdt1", 3)]));
        assert_eq!(merged, cart(&[("pdt1", 5)]));
    }

    #[test]
    fn test_merge_empty_delta_is_identity() {
        let existing = cart(&[("pdt1", 2), ("pdt4", 1)]);
        assert_eq!(merge(existing.clone(), &Cart::new()), existing);
    }

    #[test]
    fn test_merge_drops_non_positive_quantities() {
        let merged = merge(
            cart(&[("pdt1", 2), ("pdt2", 1)]),
            &cart(&[("pdt1", -2), ("pdt3", 0), ("pdt4", -1)]),
        );

        assert_eq!(merged, cart(&[("pdt2", 1)]));
    }

    #[test]
    fn test_partition_covers_all_rows() {
        let topo = topo();
        let partition = partition_by_row(&cart(&[("pdt1", 1), ("pdt4", 1), ("pdt7", 1)]), &topo);

        assert_eq!(partition.by_row.len(), 3);
        assert_eq!(partition.by_row[&1], vec![ProductId::new("pdt1")]);
        assert_eq!(partition.by_row[&2], vec![ProductId::new("pdt4")]);
        assert_eq!(partition.by_row[&3], vec![ProductId::new("pdt7")]);
        assert!(partition.skipped.is_empty());

        // Highest stocked row drives the last-row turn logic
        assert_eq!(partition.by_row.keys().next_back(), Some(&3));
    }

    #[test]
    fn test_partition_orders_products_along_aisle() {
        let topo = topo();
        let partition = partition_by_row(&cart(&[("pdt6", 1), ("pdt4", 2), ("pdt5", 1)]), &topo);

        assert_eq!(
            partition.by_row[&2],
            vec![
                ProductId::new("pdt4"),
                ProductId::new("pdt5"),
                ProductId::new("pdt6")
            ]
        );
    }

    #[test]
    fn test_partition_skips_unassigned_products() {
        let topo = topo();
        let partition = partition_by_row(&cart(&[("pdt99", 1)]), &topo);

        assert!(partition.by_row.is_empty());
        assert_eq!(partition.skipped, vec![ProductId::new("pdt99")]);
    }
}
