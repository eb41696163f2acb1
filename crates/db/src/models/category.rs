//! Category entity model and DTOs.

use catalog_core::status::EntityStatus;
use catalog_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<DbId>,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub status: String,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Category {
    pub fn status(&self) -> EntityStatus {
        self.status.parse().unwrap_or_default()
    }

    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A category joined with the name of its parent, if any.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryListRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub category: Category,
    pub parent_name: Option<String>,
}

/// `id`/`name` pair for category dropdowns.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct CategoryOption {
    pub id: DbId,
    pub name: String,
}

/// DTO for inserting a category.
#[derive(Debug, Clone)]
pub struct CreateCategory {
    pub name: String,
    pub slug: String,
    pub parent_id: Option<DbId>,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub status: EntityStatus,
}

/// DTO for updating a category. `parent_id` is replaced (so it can be
/// cleared); `image_path` is kept when `None`.
#[derive(Debug, Clone)]
pub struct UpdateCategory {
    pub name: String,
    pub slug: String,
    pub parent_id: Option<DbId>,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub status: EntityStatus,
}
