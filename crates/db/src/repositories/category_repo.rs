//! Repository for the `categories` table.
//!
//! Categories form a tree through the nullable `parent_id` column. Parent
//! changes are checked with [`CategoryRepo::is_descendant_or_self`] before
//! they are written so the tree never gains a cycle.

use catalog_core::pagination::{clamp_page, page_offset, Page, PAGE_SIZE};
use catalog_core::slug::{next_free_slug, slug_base, suffix_stem};
use catalog_core::types::DbId;
use sqlx::PgPool;

use crate::models::category::{
    Category, CategoryListRow, CategoryOption, CreateCategory, UpdateCategory,
};
use crate::models::Purged;
use crate::scope::Visibility;

/// Column list shared across queries, qualified by the `c` alias.
const COLUMNS: &str = "c.id, c.name, c.slug, c.parent_id, c.description, c.image_path, \
     c.status, c.deleted_at, c.created_at, c.updated_at";

/// Ids of a category and all of its descendants; binds the root id as `$1`.
const SUBTREE_CTE: &str = "WITH RECURSIVE subtree AS (
        SELECT id FROM categories WHERE id = $1
        UNION
        SELECT child.id FROM categories child JOIN subtree s ON child.parent_id = s.id
     )";

/// Provides CRUD, tree, trash and slug operations for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Insert a new category, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCategory) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories AS c
                (name, slug, parent_id, description, image_path, status)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(input.parent_id)
            .bind(&input.description)
            .bind(&input.image_path)
            .bind(input.status.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find a category by id under the given scope.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        visibility: Visibility,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories c WHERE c.id = $1 AND {}",
            visibility.predicate("c")
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a category with the name of its parent.
    pub async fn find_with_parent(
        pool: &PgPool,
        id: DbId,
        visibility: Visibility,
    ) -> Result<Option<CategoryListRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS}, parent.name AS parent_name
             FROM categories c
             LEFT JOIN categories parent ON parent.id = c.parent_id
             WHERE c.id = $1 AND {}",
            visibility.predicate("c")
        );
        sqlx::query_as::<_, CategoryListRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a category with this id exists under the given scope.
    pub async fn exists(
        pool: &PgPool,
        id: DbId,
        visibility: Visibility,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "SELECT EXISTS (SELECT 1 FROM categories c WHERE c.id = $1 AND {})",
            visibility.predicate("c")
        );
        let (exists,): (bool,) = sqlx::query_as(&query).bind(id).fetch_one(pool).await?;
        Ok(exists)
    }

    /// One page of categories under the given scope, joined with parent names.
    pub async fn list(
        pool: &PgPool,
        visibility: Visibility,
        page: i64,
    ) -> Result<Page<CategoryListRow>, sqlx::Error> {
        let page = clamp_page(Some(page));
        let predicate = visibility.predicate("c");

        let count_query = format!("SELECT COUNT(*) FROM categories c WHERE {predicate}");
        let (total,): (i64,) = sqlx::query_as(&count_query).fetch_one(pool).await?;

        let query = format!(
            "SELECT {COLUMNS}, parent.name AS parent_name
             FROM categories c
             LEFT JOIN categories parent ON parent.id = c.parent_id
             WHERE {predicate}
             ORDER BY {}
             LIMIT $1 OFFSET $2",
            visibility.order_by("c")
        );
        let items = sqlx::query_as::<_, CategoryListRow>(&query)
            .bind(PAGE_SIZE)
            .bind(page_offset(page, PAGE_SIZE))
            .fetch_all(pool)
            .await?;

        Ok(Page::new(items, total, page, PAGE_SIZE))
    }

    /// Dropdown options ordered by name.
    ///
    /// When `exclude_subtree_of` is set, that category and all of its
    /// descendants are left out so they cannot be chosen as its parent.
    pub async fn options(
        pool: &PgPool,
        visibility: Visibility,
        exclude_subtree_of: Option<DbId>,
    ) -> Result<Vec<CategoryOption>, sqlx::Error> {
        let predicate = visibility.predicate("c");
        match exclude_subtree_of {
            Some(root) => {
                let query = format!(
                    "{SUBTREE_CTE}
                     SELECT c.id, c.name FROM categories c
                     WHERE {predicate} AND c.id NOT IN (SELECT id FROM subtree)
                     ORDER BY c.name ASC, c.id ASC"
                );
                sqlx::query_as::<_, CategoryOption>(&query)
                    .bind(root)
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query = format!(
                    "SELECT c.id, c.name FROM categories c
                     WHERE {predicate}
                     ORDER BY c.name ASC, c.id ASC"
                );
                sqlx::query_as::<_, CategoryOption>(&query)
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// Direct children of a category under the given scope, ordered by name.
    pub async fn children(
        pool: &PgPool,
        parent_id: DbId,
        visibility: Visibility,
    ) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories c
             WHERE c.parent_id = $1 AND {}
             ORDER BY c.name ASC, c.id ASC",
            visibility.predicate("c")
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(parent_id)
            .fetch_all(pool)
            .await
    }

    /// Whether `candidate` is `id` itself or one of its descendants, i.e.
    /// whether making `candidate` the parent of `id` would close a cycle.
    pub async fn is_descendant_or_self(
        pool: &PgPool,
        id: DbId,
        candidate: DbId,
    ) -> Result<bool, sqlx::Error> {
        let query = format!("{SUBTREE_CTE} SELECT EXISTS (SELECT 1 FROM subtree WHERE id = $2)");
        let (found,): (bool,) = sqlx::query_as(&query)
            .bind(id)
            .bind(candidate)
            .fetch_one(pool)
            .await?;
        Ok(found)
    }

    /// Number of products in a category, trashed ones included.
    pub async fn product_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM products WHERE category_id = $1")
                .bind(id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// Update a category by id, whatever its status or trash marker.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories AS c SET
                name = $2,
                slug = $3,
                parent_id = $4,
                description = $5,
                image_path = COALESCE($6, c.image_path),
                status = $7
             WHERE c.id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(input.parent_id)
            .bind(&input.description)
            .bind(&input.image_path)
            .bind(input.status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a category by id. An already trashed category keeps its
    /// original `deleted_at`. Child categories and products are untouched.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories AS c SET deleted_at = COALESCE(c.deleted_at, NOW())
             WHERE c.id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Restore one trashed category. Returns `None` if the id is absent or
    /// not trashed.
    pub async fn restore(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories AS c SET deleted_at = NULL
             WHERE c.id = $1 AND c.deleted_at IS NOT NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Restore every trashed category. Returns the number of rows restored.
    pub async fn restore_all(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE categories SET deleted_at = NULL WHERE deleted_at IS NOT NULL")
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// Permanently delete one trashed category. Returns `None` if the id is
    /// absent or not trashed.
    ///
    /// Fails with a foreign-key violation while products still reference it.
    pub async fn force_delete(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "DELETE FROM categories AS c
             WHERE c.id = $1 AND c.deleted_at IS NOT NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete every trashed category in a single statement.
    ///
    /// Either every trashed category goes or, when any of them is still
    /// referenced by a product, none does.
    pub async fn force_delete_all(pool: &PgPool) -> Result<Purged, sqlx::Error> {
        let removed: Vec<(Option<String>,)> = sqlx::query_as(
            "DELETE FROM categories WHERE deleted_at IS NOT NULL RETURNING image_path",
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
            "SELECT slug FROM categories
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
    /// Names with nothing to transliterate fall back to `category`.
    pub async fn unique_slug(
        pool: &PgPool,
        name: &str,
        exclude_id: Option<DbId>,
    ) -> Result<String, sqlx::Error> {
        let base = slug_base(name, "category");
        let taken = Self::slugs_with_prefix(pool, &base, exclude_id).await?;
        let slug = next_free_slug(&base, &taken);
        if slug != base {
            tracing::debug!(table = "categories", %base, %slug, "Slug taken, using suffix");
        }
        Ok(slug)
    }
}
