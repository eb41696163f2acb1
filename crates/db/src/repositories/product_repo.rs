//! Repository for the `products` table.

use catalog_core::pagination::{clamp_page, page_offset, Page, PAGE_SIZE};
use catalog_core::slug::{next_free_slug, slug_base, suffix_stem};
use catalog_core::types::DbId;
use sqlx::PgPool;

use crate::models::product::{CreateProduct, Product, ProductListRow, UpdateProduct};
use crate::models::Purged;
use crate::scope::Visibility;

/// Column list shared across queries, qualified by the `p` alias.
const COLUMNS: &str = "p.id, p.name, p.slug, p.description, p.price, p.quantity, p.category_id, \
     p.image_path, p.status, p.deleted_at, p.created_at, p.updated_at";

/// Provides CRUD, trash and slug operations for products.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a new product, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProduct) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products AS p
                (name, slug, description, price, quantity, category_id, image_path, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.description)
            .bind(input.price)
            .bind(input.quantity)
            .bind(input.category_id)
            .bind(&input.image_path)
            .bind(input.status.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find a product by id under the given scope.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        visibility: Visibility,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM products p WHERE p.id = $1 AND {}",
            visibility.predicate("p")
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a product with its category name. The category is joined
    /// regardless of its own status or trash marker.
    pub async fn find_with_category(
        pool: &PgPool,
        id: DbId,
        visibility: Visibility,
    ) -> Result<Option<ProductListRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS}, c.name AS category_name
             FROM products p
             JOIN categories c ON c.id = p.category_id
             WHERE p.id = $1 AND {}",
            visibility.predicate("p")
        );
        sqlx::query_as::<_, ProductListRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of products under the given scope, joined with category names.
    pub async fn list(
        pool: &PgPool,
        visibility: Visibility,
        page: i64,
    ) -> Result<Page<ProductListRow>, sqlx::Error> {
        let page = clamp_page(Some(page));
        let predicate = visibility.predicate("p");

        let count_query = format!("SELECT COUNT(*) FROM products p WHERE {predicate}");
        let (total,): (i64,) = sqlx::query_as(&count_query).fetch_one(pool).await?;

        let query = format!(
            "SELECT {COLUMNS}, c.name AS category_name
             FROM products p
             JOIN categories c ON c.id = p.category_id
             WHERE {predicate}
             ORDER BY {}
             LIMIT $1 OFFSET $2",
            visibility.order_by("p")
        );
        let items = sqlx::query_as::<_, ProductListRow>(&query)
            .bind(PAGE_SIZE)
            .bind(page_offset(page, PAGE_SIZE))
            .fetch_all(pool)
            .await?;

        Ok(Page::new(items, total, page, PAGE_SIZE))
    }

    /// Update a product by id, whatever its status or trash marker.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProduct,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products AS p SET
                name = $2,
                slug = $3,
                description = $4,
                price = $5,
                quantity = $6,
                category_id = $7,
                image_path = COALESCE($8, p.image_path),
                status = $9
             WHERE p.id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.description)
            .bind(input.price)
            .bind(input.quantity)
            .bind(input.category_id)
            .bind(&input.image_path)
            .bind(input.status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a product by id. An already trashed product keeps its
    /// original `deleted_at`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products AS p SET deleted_at = COALESCE(p.deleted_at, NOW())
             WHERE p.id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Restore one trashed product. Returns `None` if the id is absent or
    /// not trashed.
    pub async fn restore(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products AS p SET deleted_at = NULL
             WHERE p.id = $1 AND p.deleted_at IS NOT NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Restore every trashed product. Returns the number of rows restored.
    pub async fn restore_all(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE products SET deleted_at = NULL WHERE deleted_at IS NOT NULL")
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// Permanently delete one trashed product. Returns `None` if the id is
    /// absent or not trashed.
    pub async fn force_delete(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "DELETE FROM products AS p
             WHERE p.id = $1 AND p.deleted_at IS NOT NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete every trashed product in a single statement.
    pub async fn force_delete_all(pool: &PgPool) -> Result<Purged, sqlx::Error> {
        let removed: Vec<(Option<String>,)> = sqlx::query_as(
            "DELETE FROM products WHERE deleted_at IS NOT NULL RETURNING image_path",
        )
        .fetch_all(pool)
        .await?;

        Ok(Purged {
            count: removed.len() as u64,
            image_paths: removed.into_iter().filter_map(|(path,)| path).collect(),
        })
    }

    /// Slugs equal to `base` or of the form `{stem}-*`, trashed rows included.
    pub async fn slugs_with_prefix(
        pool: &PgPool,
        base: &str,
        exclude_id: Option<DbId>,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT slug FROM products
             WHERE (slug = $1 OR slug LIKE $2 || '-%')
               AND ($3::BIGINT IS NULL OR id <> $3)",
        )
        .bind(base)
        .bind(suffix_stem(base))
        .bind(exclude_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(slug,)| slug).collect())
    }

    /// First free slug for `name`, ignoring the row `exclude_id` itself.
    ///
    /// Names with nothing to transliterate fall back to `product`.
    pub async fn unique_slug(
        pool: &PgPool,
        name: &str,
        exclude_id: Option<DbId>,
    ) -> Result<String, sqlx::Error> {
        let base = slug_base(name, "product");
        let taken = Self::slugs_with_prefix(pool, &base, exclude_id).await?;
        let slug = next_free_slug(&base, &taken);
        if slug != base {
            tracing::debug!(table = "products", %base, %slug, "Slug taken, using suffix");
        }
        Ok(slug)
    }
}
