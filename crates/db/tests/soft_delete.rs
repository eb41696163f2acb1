//! Integration tests for soft-delete, restore, and force-delete behaviour.
//!
//! Exercises the repository layer against a real database to verify that:
//! - Soft-deleted rows are hidden from default listings and lookups
//! - Only the trash scope lists them, until restored
//! - Restore-all and force-delete-all touch trashed rows and nothing else
//! - A force-deleted row is gone under every scope
//! - Soft delete keeps the original `deleted_at`

use std::str::FromStr;

use catalog_core::status::EntityStatus;
use catalog_db::models::category::{Category, CreateCategory};
use catalog_db::models::product::{CreateProduct, Product};
use catalog_db::repositories::{CategoryRepo, ProductRepo};
use catalog_db::scope::Visibility;
use rust_decimal::Decimal;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_category(pool: &PgPool, name: &str) -> Category {
    let slug = CategoryRepo::unique_slug(pool, name, None).await.unwrap();
    CategoryRepo::create(
        pool,
        &CreateCategory {
            name: name.to_string(),
            slug,
            parent_id: None,
            description: None,
            image_path: None,
            status: EntityStatus::Active,
        },
    )
    .await
    .unwrap()
}

async fn seed_product(pool: &PgPool, category_id: i64, name: &str) -> Product {
    let slug = ProductRepo::unique_slug(pool, name, None).await.unwrap();
    ProductRepo::create(
        pool,
        &CreateProduct {
            name: name.to_string(),
            slug,
            description: None,
            price: Decimal::from_str("19.99").unwrap(),
            quantity: 3,
            category_id,
            image_path: Some(format!("products/{name}.png")),
            status: EntityStatus::Active,
        },
    )
    .await
    .unwrap()
}

async fn listed_ids(pool: &PgPool, visibility: Visibility) -> Vec<i64> {
    ProductRepo::list(pool, visibility, 1)
        .await
        .unwrap()
        .items
        .into_iter()
        .map(|row| row.product.id)
        .collect()
}

// ---------------------------------------------------------------------------
// Test: soft delete moves a product from the listing to the trash
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_soft_delete_moves_product_to_trash(pool: PgPool) {
    let shoes = seed_category(&pool, "Shoes").await;
    let product = seed_product(&pool, shoes.id, "Red Shoe").await;

    assert_eq!(listed_ids(&pool, Visibility::Active).await, vec![product.id]);
    assert!(listed_ids(&pool, Visibility::OnlyTrashed).await.is_empty());

    let deleted = ProductRepo::soft_delete(&pool, product.id).await.unwrap();
    assert!(deleted.unwrap().is_trashed());

    assert!(listed_ids(&pool, Visibility::Active).await.is_empty());
    assert!(listed_ids(&pool, Visibility::IncludeInactive).await.is_empty());
    assert_eq!(listed_ids(&pool, Visibility::OnlyTrashed).await, vec![product.id]);
}

// ---------------------------------------------------------------------------
// Test: trashed rows are still reachable by id when the scope is bypassed
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_trashed_product_found_only_with_trashed_scope(pool: PgPool) {
    let shoes = seed_category(&pool, "Shoes").await;
    let product = seed_product(&pool, shoes.id, "Red Shoe").await;
    ProductRepo::soft_delete(&pool, product.id).await.unwrap();

    let default_scope = ProductRepo::find_by_id(&pool, product.id, Visibility::Active)
        .await
        .unwrap();
    assert!(default_scope.is_none(), "default scope should hide trashed row");

    let bypassed = ProductRepo::find_by_id(&pool, product.id, Visibility::WithTrashed)
        .await
        .unwrap();
    assert_eq!(bypassed.unwrap().name, "Red Shoe");
}

// ---------------------------------------------------------------------------
// Test: soft delete is idempotent and keeps the first deletion time
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_soft_delete_keeps_original_deleted_at(pool: PgPool) {
    let shoes = seed_category(&pool, "Shoes").await;
    let product = seed_product(&pool, shoes.id, "Red Shoe").await;

    let first = ProductRepo::soft_delete(&pool, product.id)
        .await
        .unwrap()
        .unwrap();
    let second = ProductRepo::soft_delete(&pool, product.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.deleted_at, second.deleted_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_soft_delete_missing_id_returns_none(pool: PgPool) {
    let result = ProductRepo::soft_delete(&pool, 999_999).await.unwrap();
    assert!(result.is_none());
}

// ---------------------------------------------------------------------------
// Test: restore one
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_restore_returns_product_to_listing(pool: PgPool) {
    let shoes = seed_category(&pool, "Shoes").await;
    let product = seed_product(&pool, shoes.id, "Red Shoe").await;
    ProductRepo::soft_delete(&pool, product.id).await.unwrap();

    let restored = ProductRepo::restore(&pool, product.id).await.unwrap();
    assert!(!restored.unwrap().is_trashed());

    assert_eq!(listed_ids(&pool, Visibility::Active).await, vec![product.id]);
    assert!(listed_ids(&pool, Visibility::OnlyTrashed).await.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_restore_requires_trashed_row(pool: PgPool) {
    let shoes = seed_category(&pool, "Shoes").await;
    let product = seed_product(&pool, shoes.id, "Red Shoe").await;

    let live = ProductRepo::restore(&pool, product.id).await.unwrap();
    assert!(live.is_none(), "restoring a live row should find nothing");

    let missing = ProductRepo::restore(&pool, 999_999).await.unwrap();
    assert!(missing.is_none());
}

// ---------------------------------------------------------------------------
// Test: restore all touches trashed rows only
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_restore_all_counts_trashed_rows_only(pool: PgPool) {
    let shoes = seed_category(&pool, "Shoes").await;
    let a = seed_product(&pool, shoes.id, "A").await;
    let b = seed_product(&pool, shoes.id, "B").await;
    let c = seed_product(&pool, shoes.id, "C").await;
    ProductRepo::soft_delete(&pool, a.id).await.unwrap();
    ProductRepo::soft_delete(&pool, b.id).await.unwrap();

    let before = ProductRepo::find_by_id(&pool, c.id, Visibility::WithTrashed)
        .await
        .unwrap()
        .unwrap();

    let restored = ProductRepo::restore_all(&pool).await.unwrap();
    assert_eq!(restored, 2);

    let mut ids = listed_ids(&pool, Visibility::Active).await;
    ids.sort();
    assert_eq!(ids, vec![a.id, b.id, c.id]);

    let after = ProductRepo::find_by_id(&pool, c.id, Visibility::WithTrashed)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(before.updated_at, after.updated_at, "live row must not be touched");

    assert_eq!(ProductRepo::restore_all(&pool).await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Test: force delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_force_delete_removes_under_every_scope(pool: PgPool) {
    let shoes = seed_category(&pool, "Shoes").await;
    let product = seed_product(&pool, shoes.id, "Red Shoe").await;
    ProductRepo::soft_delete(&pool, product.id).await.unwrap();

    let removed = ProductRepo::force_delete(&pool, product.id).await.unwrap();
    assert_eq!(removed.unwrap().id, product.id);

    for visibility in [
        Visibility::Active,
        Visibility::IncludeInactive,
        Visibility::WithTrashed,
        Visibility::OnlyTrashed,
    ] {
        let found = ProductRepo::find_by_id(&pool, product.id, visibility)
            .await
            .unwrap();
        assert!(found.is_none(), "{visibility:?} should not find a purged row");
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_force_delete_refuses_live_row(pool: PgPool) {
    let shoes = seed_category(&pool, "Shoes").await;
    let product = seed_product(&pool, shoes.id, "Red Shoe").await;

    let removed = ProductRepo::force_delete(&pool, product.id).await.unwrap();
    assert!(removed.is_none());
    assert!(ProductRepo::find_by_id(&pool, product.id, Visibility::Active)
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_force_delete_all_returns_image_paths(pool: PgPool) {
    let shoes = seed_category(&pool, "Shoes").await;
    let a = seed_product(&pool, shoes.id, "a").await;
    let b = seed_product(&pool, shoes.id, "b").await;
    let keep = seed_product(&pool, shoes.id, "keep").await;
    ProductRepo::soft_delete(&pool, a.id).await.unwrap();
    ProductRepo::soft_delete(&pool, b.id).await.unwrap();

    let purged = ProductRepo::force_delete_all(&pool).await.unwrap();
    assert_eq!(purged.count, 2);
    let mut paths = purged.image_paths;
    paths.sort();
    assert_eq!(paths, vec!["products/a.png", "products/b.png"]);

    assert_eq!(listed_ids(&pool, Visibility::WithTrashed).await, vec![keep.id]);
}

// ---------------------------------------------------------------------------
// Test: categories follow the same lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_category_trash_lifecycle(pool: PgPool) {
    let shoes = seed_category(&pool, "Shoes").await;

    CategoryRepo::soft_delete(&pool, shoes.id).await.unwrap();
    let listed = CategoryRepo::list(&pool, Visibility::Active, 1).await.unwrap();
    assert_eq!(listed.total, 0);
    let trash = CategoryRepo::list(&pool, Visibility::OnlyTrashed, 1)
        .await
        .unwrap();
    assert_eq!(trash.total, 1);

    assert_eq!(CategoryRepo::restore_all(&pool).await.unwrap(), 1);
    let listed = CategoryRepo::list(&pool, Visibility::Active, 1).await.unwrap();
    assert_eq!(listed.items[0].category.id, shoes.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_force_delete_category_in_use_is_rejected(pool: PgPool) {
    let shoes = seed_category(&pool, "Shoes").await;
    seed_product(&pool, shoes.id, "Red Shoe").await;
    CategoryRepo::soft_delete(&pool, shoes.id).await.unwrap();

    let err = CategoryRepo::force_delete(&pool, shoes.id).await.unwrap_err();
    let code = err
        .as_database_error()
        .and_then(|db| db.code())
        .map(|c| c.to_string());
    assert_eq!(code.as_deref(), Some("23503"));

    let still_there = CategoryRepo::find_by_id(&pool, shoes.id, Visibility::OnlyTrashed)
        .await
        .unwrap();
    assert!(still_there.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_force_delete_parent_detaches_children(pool: PgPool) {
    let shoes = seed_category(&pool, "Shoes").await;
    let slug = CategoryRepo::unique_slug(&pool, "Boots", None).await.unwrap();
    let boots = CategoryRepo::create(
        &pool,
        &CreateCategory {
            name: "Boots".into(),
            slug,
            parent_id: Some(shoes.id),
            description: None,
            image_path: None,
            status: EntityStatus::Active,
        },
    )
    .await
    .unwrap();

    CategoryRepo::soft_delete(&pool, shoes.id).await.unwrap();
    let purged = CategoryRepo::force_delete_all(&pool).await.unwrap();
    assert_eq!(purged.count, 1);

    let boots = CategoryRepo::find_by_id(&pool, boots.id, Visibility::Active)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(boots.parent_id, None);
}
