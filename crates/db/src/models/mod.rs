//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A listing row that adds the joined display name
//! - `Create*` / `Update*` DTOs built from validated form input

pub mod category;
pub mod product;

/// Outcome of emptying a trash bin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Purged {
    /// Rows permanently removed.
    pub count: u64,
    /// Stored image references of the removed rows, for file cleanup.
    pub image_paths: Vec<String>,
}
