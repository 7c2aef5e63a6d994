//! Store topology module
//!
//! The store floor is a fixed, small graph: a home dock, one front junction
//! and one back junction per product row, and a number of product slots along
//! each row. Every waypoint carries an RFID tag; the tag UID registry lives
//! in the request store, keyed by the node names produced here.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use thiserror::Error;

// Internal
use comms_if::eqpt::mech::TurnDirection;
use comms_if::store::ProductId;

// Re-exports
pub use params::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A waypoint in the store topology.
///
/// Rows and slots are numbered from 1.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Node {
    /// The charging/dispatch dock the trolley starts trips from
    Home,

    /// Junction where the main path meets the entrance of a row
    FrontJunction(u8),

    /// Junction at the far end of a row, opposite the front junction
    BackJunction(u8),

    /// A product slot within a row
    Product { row: u8, slot: u8 },
}

/// Errors raised while building a topology from parameters.
#[derive(Debug, Error)]
pub enum TopoError {
    #[error("A topology must have at least one row and one slot per row")]
    NoRows,

    #[error("Product {0} is assigned to row {1}, which does not exist")]
    RowOutOfRange(ProductId, u8),

    #[error("Product {0} is assigned to slot {1}, which does not exist")]
    SlotOutOfRange(ProductId, u8),

    #[error("Product {0} is defined more than once")]
    DuplicateProduct(ProductId),

    #[error("Products {0} and {1} are both assigned to row {2} slot {3}")]
    DuplicateSlot(ProductId, ProductId, u8, u8),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The store topology: layout dimensions plus the product catalogue.
#[derive(Debug, Clone)]
pub struct Topology {
    rows: u8,
    slots_per_row: u8,
    products: Vec<ProductDef>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Node {
    /// The row this node belongs to, or `None` for the home node.
    pub fn row(&self) -> Option<u8> {
        match self {
            Node::Home => None,
            Node::FrontJunction(row) => Some(*row),
            Node::BackJunction(row) => Some(*row),
            Node::Product { row, .. } => Some(*row),
        }
    }

}

impl Topology {
    /// Build and validate a topology from its parameters.
    pub fn from_params(params: Params) -> Result<Self, TopoError> {
        if params.rows == 0 || params.slots_per_row == 0 {
            return Err(TopoError::NoRows);
        }

        for (i, def) in params.products.iter().enumerate() {
            if def.row < 1 || def.row > params.rows {
                return Err(TopoError::RowOutOfRange(def.id.clone(), def.row));
            }

            if def.slot < 1 || def.slot > params.slots_per_row {
                return Err(TopoError::SlotOutOfRange(def.id.clone(), def.slot));
            }

            for other in params.products[..i].iter() {
                if other.id == def.id {
                    return Err(TopoError::DuplicateProduct(def.id.clone()));
                }

                if other.row == def.row && other.slot == def.slot {
                    return Err(TopoError::DuplicateSlot(
                        other.id.clone(),
                        def.id.clone(),
                        def.row,
                        def.slot,
                    ));
                }
            }
        }

        Ok(Topology {
            rows: params.rows,
            slots_per_row: params.slots_per_row,
            products: params.products,
        })
    }

    /// Number of rows in the store.
    pub fn num_rows(&self) -> u8 {
        self.rows
    }

    /// The product node for a product id, or `None` if the product has no
    /// slot assignment.
    pub fn node_for_product(&self, id: &ProductId) -> Option<Node> {
        self.products.iter().find(|def| &def.id == id).map(|def| {
            Node::Product {
                row: def.row,
                slot: def.slot,
            }
        })
    }

    /// The row a product is assigned to, or `None` if unassigned.
    pub fn row_for_product(&self, id: &ProductId) -> Option<u8> {
        self.node_for_product(id).and_then(|n| n.row())
    }

    /// The product stocked at a node, if the node is an assigned product slot.
    pub fn product_at(&self, node: Node) -> Option<&ProductId> {
        match node {
            Node::Product { row, slot } => self
                .products
                .iter()
                .find(|def| def.row == row && def.slot == slot)
                .map(|def| &def.id),
            _ => None,
        }
    }

    /// Name of a node as used in the tag registry and in status strings.
    pub fn name_of(&self, node: Node) -> String {
        match node {
            Node::Home => String::from("home"),
            Node::FrontJunction(row) => format!("RFJ{}", row),
            Node::BackJunction(row) => format!("RBJ{}", row),
            Node::Product { row, slot } => match self.product_at(node) {
                Some(id) => id.to_string(),
                None => format!("slot:{}:{}", row, slot),
            },
        }
    }

    /// Stable integer id of a node.
    ///
    /// Used for human-readable logging and for ordering products within a
    /// row, never for graph logic. Home is 0, front junctions follow, then
    /// back junctions, then product slots row-major.
    pub fn node_id(&self, node: Node) -> u16 {
        let rows = self.rows as u16;

        match node {
            Node::Home => 0,
            Node::FrontJunction(row) => row as u16,
            Node::BackJunction(row) => rows + row as u16,
            Node::Product { row, slot } => {
                2 * rows + (row as u16 - 1) * self.slots_per_row as u16 + slot as u16
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initial turn to issue for a transition between two nodes.
///
/// This is a hand-coded lookup over the small set of transitions the physical
/// layout permits, not a graph search. The directions are calibrated against
/// the store floor, matching the turns the sequencer issues at junctions.
pub fn initial_turn(from: Node, to: Node) -> Option<TurnDirection> {
    match (from, to) {
        (Node::Home, Node::FrontJunction(_)) => None,
        (Node::FrontJunction(_), Node::Product { .. }) => Some(TurnDirection::Right),
        (Node::BackJunction(_), Node::FrontJunction(_)) => Some(TurnDirection::Right),
        (Node::BackJunction(_), Node::BackJunction(_)) => Some(TurnDirection::Left),
        (Node::FrontJunction(_), Node::Home) => Some(TurnDirection::Right),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn three_by_three() -> Topology {
        let products = (1..=9u8)
            .map(|n| ProductDef {
                id: ProductId::new(format!("pdt{}", n)),
                row: (n - 1) / 3 + 1,
                slot: (n - 1) % 3 + 1,
            })
            .collect();

        Topology::from_params(Params {
            rows: 3,
            slots_per_row: 3,
            products,
        })
        .unwrap()
    }

    #[test]
    fn test_node_ids_match_deployed_map() {
        let topo = three_by_three();

        // The deployed store numbers its 16 waypoints 0..15
        assert_eq!(topo.node_id(Node::Home), 0);
        assert_eq!(topo.node_id(Node::FrontJunction(1)), 1);
        assert_eq!(topo.node_id(Node::FrontJunction(3)), 3);
        assert_eq!(topo.node_id(Node::BackJunction(1)), 4);
        assert_eq!(topo.node_id(Node::BackJunction(3)), 6);
        assert_eq!(topo.node_id(Node::Product { row: 1, slot: 1 }), 7);
        assert_eq!(topo.node_id(Node::Product { row: 2, slot: 1 }), 10);
        assert_eq!(topo.node_id(Node::Product { row: 3, slot: 3 }), 15);
    }

    #[test]
    fn test_names() {
        let topo = three_by_three();

        assert_eq!(topo.name_of(Node::Home), "home");
        assert_eq!(topo.name_of(Node::FrontJunction(2)), "RFJ2");
        assert_eq!(topo.name_of(Node::BackJunction(3)), "RBJ3");
        assert_eq!(topo.name_of(Node::Product { row: 2, slot: 1 }), "pdt4");
    }

    #[test]
    fn test_product_lookups() {
        let topo = three_by_three();

        assert_eq!(
            topo.node_for_product(&ProductId::new("pdt5")),
            Some(Node::Product { row: 2, slot: 2 })
        );
        assert_eq!(topo.row_for_product(&ProductId::new("pdt9")), Some(3));

        // Unassigned products have no node and no row
        assert_eq!(topo.node_for_product(&ProductId::new("pdt99")), None);
        assert_eq!(topo.row_for_product(&ProductId::new("pdt99")), None);
    }

    #[test]
    fn test_transition_table() {
        assert_eq!(initial_turn(Node::Home, Node::FrontJunction(2)), None);
        assert_eq!(
            initial_turn(Node::FrontJunction(2), Node::Product { row: 2, slot: 1 }),
            Some(TurnDirection::Right)
        );
        assert_eq!(
            initial_turn(Node::BackJunction(2), Node::FrontJunction(2)),
            Some(TurnDirection::Right)
        );
        assert_eq!(
            initial_turn(Node::BackJunction(1), Node::BackJunction(2)),
            Some(TurnDirection::Left)
        );
        assert_eq!(
            initial_turn(Node::FrontJunction(1), Node::Home),
            Some(TurnDirection::Right)
        );

        // Straight-line transits within an aisle
        assert_eq!(
            initial_turn(
                Node::Product { row: 1, slot: 1 },
                Node::Product { row: 1, slot: 2 }
            ),
            None
        );
        assert_eq!(
            initial_turn(Node::Product { row: 1, slot: 3 }, Node::BackJunction(1)),
            None
        );
    }

    #[test]
    fn test_validation() {
        let bad_row = Params {
            rows: 2,
            slots_per_row: 3,
            products: vec![ProductDef {
                id: ProductId::new("pdt1"),
                row: 3,
                slot: 1,
            }],
        };
        assert!(matches!(
            Topology::from_params(bad_row),
            Err(TopoError::RowOutOfRange(_, 3))
        ));

        let dup_slot = Params {
            rows: 1,
            slots_per_row: 2,
            products: vec![
                ProductDef {
                    id: ProductId::new("a"),
                    row: 1,
                    slot: 1,
                },
                ProductDef {
                    id: ProductId::new("b"),
                    row: 1,
                    slot: 1,
                },
            ],
        };
        assert!(matches!(
            Topology::from_params(dup_slot),
            Err(TopoError::DuplicateSlot(_, _, 1, 1))
        ));
    }
}
