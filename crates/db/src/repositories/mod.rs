//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Reads take an explicit
//! [`Visibility`](crate::scope::Visibility).

pub mod category_repo;
pub mod product_repo;

pub use category_repo::CategoryRepo;
pub use product_repo::ProductRepo;
