//! Handlers for the `/admin/products` resource.

use axum::extract::{Multipart, Path, Query, State};
use axum::response::{Html, Response};
use catalog_core::forms::{FieldErrors, ProductForm, ProductInput};
use catalog_core::pagination::clamp_page;
use catalog_core::types::DbId;
use catalog_db::models::product::{CreateProduct, Product, UpdateProduct};
use catalog_db::repositories::{CategoryRepo, ProductRepo};
use catalog_db::scope::Visibility;

use super::{prepare_upload, redirect_with_notice, storage_error, unprocessable};
use crate::error::{AppError, AppResult};
use crate::forms::SubmittedForm;
use crate::query::ListParams;
use crate::state::AppState;
use crate::storage::ImageDirectory;
use crate::views::product::{self as view, BASE_PATH};

const ENTITY: &str = "Product";

/// GET /admin/products
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Html<String>> {
    let visibility = Visibility::from_include_inactive(params.include_inactive);
    let page = ProductRepo::list(&state.pool, visibility, clamp_page(params.page)).await?;
    view::index(&page, params.include_inactive, params.success.as_deref())
}

/// GET /admin/products/create
pub async fn create(State(state): State<AppState>) -> AppResult<Html<String>> {
    let categories = CategoryRepo::options(&state.pool, Visibility::Active, None).await?;
    view::form(None, &ProductForm::default(), &FieldErrors::new(), &categories)
}

/// POST /admin/products
///
/// Nothing is written unless every field and the image pass validation.
/// The image is stored before the row; if the insert fails it is removed
/// again.
pub async fn store(State(state): State<AppState>, multipart: Multipart) -> AppResult<Response> {
    let mut submitted = SubmittedForm::read(multipart).await?;
    let values = submitted.product_form();

    let mut errors = FieldErrors::new();
    let input = check_input(&state, &values, &mut errors).await?;
    let image = prepare_upload(&state.images, submitted.image.take(), true, &mut errors).await;

    let (input, image) = match (input, image) {
        (Some(input), Some(image)) if errors.is_empty() => (input, image),
        _ => {
            let categories = CategoryRepo::options(&state.pool, Visibility::Active, None).await?;
            return Ok(unprocessable(view::form(None, &values, &errors, &categories)?));
        }
    };

    let slug = ProductRepo::unique_slug(&state.pool, &input.name, None).await?;
    let image_path = state
        .images
        .save(ImageDirectory::Products, &image)
        .await
        .map_err(storage_error)?;

    let create = CreateProduct {
        name: input.name,
        slug,
        description: input.description,
        price: input.price,
        quantity: input.quantity,
        category_id: input.category_id,
        image_path: Some(image_path.clone()),
        status: input.status,
    };
    let product = match ProductRepo::create(&state.pool, &create).await {
        Ok(product) => product,
        Err(e) => {
            state.images.remove(&image_path).await;
            return Err(e.into());
        }
    };

    tracing::info!(product_id = product.id, slug = %product.slug, "Product created");
    Ok(redirect_with_notice(
        BASE_PATH,
        &format!("Product ({}) created.", product.name),
    ))
}

/// GET /admin/products/{id}
///
/// Inactive and trashed products are viewable.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Html<String>> {
    let row = ProductRepo::find_with_category(&state.pool, id, Visibility::WithTrashed)
        .await?
        .ok_or(AppError::not_found(ENTITY, id))?;
    view::show(&row)
}

/// GET /admin/products/{id}/edit
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Html<String>> {
    let product = find_any(&state, id).await?;
    let categories = CategoryRepo::options(&state.pool, Visibility::WithTrashed, None).await?;
    view::form(
        Some(&product),
        &view::form_values(&product),
        &FieldErrors::new(),
        &categories,
    )
}

/// PUT /admin/products/{id}
///
/// The image is optional here. A new image replaces the old one, which is
/// deleted only once the row points at the new file.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Response> {
    let product = find_any(&state, id).await?;
    let mut submitted = SubmittedForm::read(multipart).await?;
    let values = submitted.product_form();

    let mut errors = FieldErrors::new();
    let input = check_input(&state, &values, &mut errors).await?;
    let image = prepare_upload(&state.images, submitted.image.take(), false, &mut errors).await;

    let input = match input {
        Some(input) if errors.is_empty() => input,
        _ => {
            let categories =
                CategoryRepo::options(&state.pool, Visibility::WithTrashed, None).await?;
            return Ok(unprocessable(view::form(
                Some(&product),
                &values,
                &errors,
                &categories,
            )?));
        }
    };

    let slug = if input.name == product.name {
        product.slug.clone()
    } else {
        ProductRepo::unique_slug(&state.pool, &input.name, Some(id)).await?
    };
    let new_image = match &image {
        Some(image) => Some(
            state
                .images
                .save(ImageDirectory::Products, image)
                .await
                .map_err(storage_error)?,
        ),
        None => None,
    };

    let update = UpdateProduct {
        name: input.name,
        slug,
        description: input.description,
        price: input.price,
        quantity: input.quantity,
        category_id: input.category_id,
        image_path: new_image.clone(),
        status: input.status,
    };
    let updated = match ProductRepo::update(&state.pool, id, &update).await {
        Ok(Some(updated)) => updated,
        outcome => {
            if let Some(path) = &new_image {
                state.images.remove(path).await;
            }
            return Err(match outcome {
                Err(e) => e.into(),
                _ => AppError::not_found(ENTITY, id),
            });
        }
    };

    if let (Some(_), Some(old)) = (&new_image, &product.image_path) {
        state.images.remove(old).await;
    }

    tracing::info!(product_id = id, image_replaced = new_image.is_some(), "Product updated");
    Ok(redirect_with_notice(
        BASE_PATH,
        &format!("Product ({}) updated.", updated.name),
    ))
}

/// DELETE /admin/products/{id}
///
/// Moves the product to the trash. Deleting a trashed product again keeps
/// its original `deleted_at`.
pub async fn destroy(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<Response> {
    let product = ProductRepo::soft_delete(&state.pool, id)
        .await?
        .ok_or(AppError::not_found(ENTITY, id))?;

    tracing::info!(product_id = id, "Product moved to trash");
    Ok(redirect_with_notice(
        BASE_PATH,
        &format!("Product ({}) deleted.", product.name),
    ))
}

// ---------------------------------------------------------------------------
// Trash
// ---------------------------------------------------------------------------

/// GET /admin/products/trash
pub async fn trash(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Html<String>> {
    let page = ProductRepo::list(&state.pool, Visibility::OnlyTrashed, clamp_page(params.page))
        .await?;
    view::trash(&page, params.success.as_deref())
}

/// PUT /admin/products/trash/{id}
pub async fn restore(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<Response> {
    let product = ProductRepo::restore(&state.pool, id)
        .await?
        .ok_or(AppError::not_found(ENTITY, id))?;

    tracing::info!(product_id = id, "Product restored");
    Ok(redirect_with_notice(
        BASE_PATH,
        &format!("Product ({}) restored.", product.name),
    ))
}

/// PUT /admin/products/trash
pub async fn restore_all(State(state): State<AppState>) -> AppResult<Response> {
    let count = ProductRepo::restore_all(&state.pool).await?;

    tracing::info!(count, "Restored all trashed products");
    Ok(redirect_with_notice(BASE_PATH, "All trashed products restored."))
}

/// DELETE /admin/products/trash/{id}
pub async fn force_delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let product = ProductRepo::force_delete(&state.pool, id)
        .await?
        .ok_or(AppError::not_found(ENTITY, id))?;

    if let Some(path) = &product.image_path {
        state.images.remove(path).await;
    }

    tracing::info!(product_id = id, "Product permanently deleted");
    Ok(redirect_with_notice(
        BASE_PATH,
        &format!("Product ({}) deleted forever.", product.name),
    ))
}

/// DELETE /admin/products/trash
pub async fn force_delete_all(State(state): State<AppState>) -> AppResult<Response> {
    let purged = ProductRepo::force_delete_all(&state.pool).await?;
    state.images.remove_all(&purged.image_paths).await;

    tracing::info!(count = purged.count, "Permanently deleted all trashed products");
    Ok(redirect_with_notice(
        BASE_PATH,
        "All trashed products deleted forever.",
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Scope-bypassing lookup used by edit and update.
async fn find_any(state: &AppState, id: DbId) -> AppResult<Product> {
    ProductRepo::find_by_id(&state.pool, id, Visibility::WithTrashed)
        .await?
        .ok_or(AppError::not_found(ENTITY, id))
}

/// Parse the text fields and check the chosen category exists.
///
/// Trashed categories are accepted so an edit does not force moving a
/// product out of a category that was deleted in the meantime.
async fn check_input(
    state: &AppState,
    values: &ProductForm,
    errors: &mut FieldErrors,
) -> AppResult<Option<ProductInput>> {
    let input = match values.parse() {
        Ok(input) => input,
        Err(e) => {
            errors.merge(e);
            return Ok(None);
        }
    };

    if !CategoryRepo::exists(&state.pool, input.category_id, Visibility::WithTrashed).await? {
        errors.add("category_id", "The selected category is invalid.");
        return Ok(None);
    }
    Ok(Some(input))
}
