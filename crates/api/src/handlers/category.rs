//! Handlers for the `/admin/categories` resource.
//!
//! Categories may nest through `parent_id`. A parent must exist, and on
//! update it may not be the category itself or one of its descendants.

use axum::extract::{Multipart, Path, Query, State};
use axum::response::{Html, Response};
use catalog_core::forms::{CategoryForm, CategoryInput, FieldErrors};
use catalog_core::pagination::clamp_page;
use catalog_core::types::DbId;
use catalog_db::models::category::{Category, CreateCategory, UpdateCategory};
use catalog_db::repositories::CategoryRepo;
use catalog_db::scope::Visibility;

use super::{prepare_upload, redirect_with_notice, storage_error, unprocessable};
use crate::error::{AppError, AppResult};
use crate::forms::SubmittedForm;
use crate::query::ListParams;
use crate::state::AppState;
use crate::storage::ImageDirectory;
use crate::views::category::{self as view, BASE_PATH};

const ENTITY: &str = "Category";

/// GET /admin/categories
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Html<String>> {
    let visibility = Visibility::from_include_inactive(params.include_inactive);
    let page = CategoryRepo::list(&state.pool, visibility, clamp_page(params.page)).await?;
    view::index(&page, params.include_inactive, params.success.as_deref())
}

/// GET /admin/categories/create
pub async fn create(State(state): State<AppState>) -> AppResult<Html<String>> {
    let parents = CategoryRepo::options(&state.pool, Visibility::Active, None).await?;
    view::form(None, &CategoryForm::default(), &FieldErrors::new(), &parents)
}

/// POST /admin/categories
pub async fn store(State(state): State<AppState>, multipart: Multipart) -> AppResult<Response> {
    let mut submitted = SubmittedForm::read(multipart).await?;
    let values = submitted.category_form();

    let mut errors = FieldErrors::new();
    let input = check_input(&state, None, &values, &mut errors).await?;
    let image = prepare_upload(&state.images, submitted.image.take(), false, &mut errors).await;

    let input = match input {
        Some(input) if errors.is_empty() => input,
        _ => {
            let parents = CategoryRepo::options(&state.pool, Visibility::Active, None).await?;
            return Ok(unprocessable(view::form(None, &values, &errors, &parents)?));
        }
    };

    let slug = CategoryRepo::unique_slug(&state.pool, &input.name, None).await?;
    let image_path = match &image {
        Some(image) => Some(
            state
                .images
                .save(ImageDirectory::Categories, image)
                .await
                .map_err(storage_error)?,
        ),
        None => None,
    };

    let create = CreateCategory {
        name: input.name,
        slug,
        parent_id: input.parent_id,
        description: input.description,
        image_path: image_path.clone(),
        status: input.status,
    };
    let category = match CategoryRepo::create(&state.pool, &create).await {
        Ok(category) => category,
        Err(e) => {
            if let Some(path) = &image_path {
                state.images.remove(path).await;
            }
            return Err(e.into());
        }
    };

    tracing::info!(category_id = category.id, slug = %category.slug, "Category created");
    Ok(redirect_with_notice(
        BASE_PATH,
        &format!("Category ({}) created.", category.name),
    ))
}

/// GET /admin/categories/{id}
///
/// Shows the category, its direct subcategories and how many products it
/// holds. Inactive and trashed categories are viewable.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Html<String>> {
    let row = CategoryRepo::find_with_parent(&state.pool, id, Visibility::WithTrashed)
        .await?
        .ok_or(AppError::not_found(ENTITY, id))?;
    let children = CategoryRepo::children(&state.pool, id, Visibility::WithTrashed).await?;
    let product_count = CategoryRepo::product_count(&state.pool, id).await?;
    view::show(&row, &children, product_count)
}

/// GET /admin/categories/{id}/edit
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Html<String>> {
    let category = find_any(&state, id).await?;
    let parents = CategoryRepo::options(&state.pool, Visibility::WithTrashed, Some(id)).await?;
    view::form(
        Some(&category),
        &view::form_values(&category),
        &FieldErrors::new(),
        &parents,
    )
}

/// PUT /admin/categories/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Response> {
    let category = find_any(&state, id).await?;
    let mut submitted = SubmittedForm::read(multipart).await?;
    let values = submitted.category_form();

    let mut errors = FieldErrors::new();
    let input = check_input(&state, Some(id), &values, &mut errors).await?;
    let image = prepare_upload(&state.images, submitted.image.take(), false, &mut errors).await;

    let input = match input {
        Some(input) if errors.is_empty() => input,
        _ => {
            let parents =
                CategoryRepo::options(&state.pool, Visibility::WithTrashed, Some(id)).await?;
            return Ok(unprocessable(view::form(
                Some(&category),
                &values,
                &errors,
                &parents,
            )?));
        }
    };

    let slug = if input.name == category.name {
        category.slug.clone()
    } else {
        CategoryRepo::unique_slug(&state.pool, &input.name, Some(id)).await?
    };
    let new_image = match &image {
        Some(image) => Some(
            state
                .images
                .save(ImageDirectory::Categories, image)
                .await
                .map_err(storage_error)?,
        ),
        None => None,
    };

    let update = UpdateCategory {
        name: input.name,
        slug,
        parent_id: input.parent_id,
        description: input.description,
        image_path: new_image.clone(),
        status: input.status,
    };
    let updated = match CategoryRepo::update(&state.pool, id, &update).await {
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

    if let (Some(_), Some(old)) = (&new_image, &category.image_path) {
        state.images.remove(old).await;
    }

    tracing::info!(category_id = id, image_replaced = new_image.is_some(), "Category updated");
    Ok(redirect_with_notice(
        BASE_PATH,
        &format!("Category ({}) updated.", updated.name),
    ))
}

/// DELETE /admin/categories/{id}
///
/// Products in the category are left untouched.
pub async fn destroy(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<Response> {
    let category = CategoryRepo::soft_delete(&state.pool, id)
        .await?
        .ok_or(AppError::not_found(ENTITY, id))?;

    tracing::info!(category_id = id, "Category moved to trash");
    Ok(redirect_with_notice(
        BASE_PATH,
        &format!("Category ({}) deleted.", category.name),
    ))
}

// ---------------------------------------------------------------------------
// Trash
// ---------------------------------------------------------------------------

/// GET /admin/categories/trash
pub async fn trash(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Html<String>> {
    let page = CategoryRepo::list(&state.pool, Visibility::OnlyTrashed, clamp_page(params.page))
        .await?;
    view::trash(&page, params.success.as_deref())
}

/// PUT /admin/categories/trash/{id}
pub async fn restore(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<Response> {
    let category = CategoryRepo::restore(&state.pool, id)
        .await?
        .ok_or(AppError::not_found(ENTITY, id))?;

    tracing::info!(category_id = id, "Category restored");
    Ok(redirect_with_notice(
        BASE_PATH,
        &format!("Category ({}) restored.", category.name),
    ))
}

/// PUT /admin/categories/trash
pub async fn restore_all(State(state): State<AppState>) -> AppResult<Response> {
    let count = CategoryRepo::restore_all(&state.pool).await?;

    tracing::info!(count, "Restored all trashed categories");
    Ok(redirect_with_notice(BASE_PATH, "All trashed categories restored."))
}

/// DELETE /admin/categories/trash/{id}
///
/// Fails with 409 while products still reference the category.
/// Subcategories are detached, not deleted.
pub async fn force_delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let category = CategoryRepo::force_delete(&state.pool, id)
        .await?
        .ok_or(AppError::not_found(ENTITY, id))?;

    if let Some(path) = &category.image_path {
        state.images.remove(path).await;
    }

    tracing::info!(category_id = id, "Category permanently deleted");
    Ok(redirect_with_notice(
        BASE_PATH,
        &format!("Category ({}) deleted forever.", category.name),
    ))
}

/// DELETE /admin/categories/trash
pub async fn force_delete_all(State(state): State<AppState>) -> AppResult<Response> {
    let purged = CategoryRepo::force_delete_all(&state.pool).await?;
    state.images.remove_all(&purged.image_paths).await;

    tracing::info!(count = purged.count, "Permanently deleted all trashed categories");
    Ok(redirect_with_notice(
        BASE_PATH,
        "All trashed categories deleted forever.",
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_any(state: &AppState, id: DbId) -> AppResult<Category> {
    CategoryRepo::find_by_id(&state.pool, id, Visibility::WithTrashed)
        .await?
        .ok_or(AppError::not_found(ENTITY, id))
}

/// Parse the text fields and check the chosen parent.
///
/// `id` is the category being edited, `None` on create.
async fn check_input(
    state: &AppState,
    id: Option<DbId>,
    values: &CategoryForm,
    errors: &mut FieldErrors,
) -> AppResult<Option<CategoryInput>> {
    let input = match values.parse() {
        Ok(input) => input,
        Err(e) => {
            errors.merge(e);
            return Ok(None);
        }
    };

    let Some(parent_id) = input.parent_id else {
        return Ok(Some(input));
    };

    if !CategoryRepo::exists(&state.pool, parent_id, Visibility::WithTrashed).await? {
        errors.add("parent_id", "The selected parent is invalid.");
        return Ok(None);
    }
    if let Some(id) = id {
        if CategoryRepo::is_descendant_or_self(&state.pool, id, parent_id).await? {
            errors.add(
                "parent_id",
                "A category cannot be nested under itself or one of its subcategories.",
            );
            return Ok(None);
        }
    }
    Ok(Some(input))
}
