//! Product entity model and DTOs.

use catalog_core::status::EntityStatus;
use catalog_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub category_id: DbId,
    pub image_path: Option<String>,
    /// `active` or `inactive`; see [`Product::status`].
    pub status: String,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Product {
    pub fn status(&self) -> EntityStatus {
        self.status.parse().unwrap_or_default()
    }

    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A product joined with the name of its category.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductListRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub product: Product,
    pub category_name: String,
}

/// DTO for inserting a product. The slug and image are resolved by the caller.
#[derive(Debug, Clone)]
pub struct CreateProduct {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub category_id: DbId,
    pub image_path: Option<String>,
    pub status: EntityStatus,
}

/// DTO for updating a product. Every column is replaced except `image_path`,
/// which is kept when `None`.
#[derive(Debug, Clone)]
pub struct UpdateProduct {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub category_id: DbId,
    pub image_path: Option<String>,
    pub status: EntityStatus,
}
