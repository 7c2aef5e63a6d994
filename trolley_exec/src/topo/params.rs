//! Parameters structure for the store topology

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::store::ProductId;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters describing the store layout.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// Number of product rows.
    pub rows: u8,

    /// Number of product slots along each row.
    pub slots_per_row: u8,

    /// The product catalogue with slot assignments.
    pub products: Vec<ProductDef>,
}

/// A product's position in the store.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductDef {
    /// Inventory id of the product.
    pub id: ProductId,

    /// Row the product is stocked in (1-based).
    pub row: u8,

    /// Slot along the row (1-based, counted from the front junction).
    pub slot: u8,
}
