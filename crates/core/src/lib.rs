//! Catalog domain logic with no I/O.
//!
//! Shared by the repository layer and the HTTP layer: error types, id and
//! timestamp aliases, entity status, slug derivation, price formatting,
//! pagination math, form validation and image upload checks.

pub mod error;
pub mod forms;
pub mod pagination;
pub mod price;
pub mod slug;
pub mod status;
pub mod types;
pub mod upload;
