//! Request handlers for the admin pages.
//!
//! Each submodule provides the resource handlers (index, create, store,
//! show, edit, update, destroy, trash, restore, force_delete) for a single
//! entity type. Handlers delegate to the corresponding repository in
//! `catalog_db`, render pages through [`crate::views`] and map errors via
//! [`AppError`].

pub mod category;
pub mod product;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use catalog_core::forms::FieldErrors;
use catalog_core::upload::{PreparedImage, UploadError, UploadedFile};

use crate::error::AppError;
use crate::forms::IMAGE_FIELD;
use crate::storage::ImageStore;

/// Redirect to a listing page carrying a one-shot notice.
pub fn redirect_with_notice(base: &str, notice: &str) -> Response {
    Redirect::to(&format!("{base}?success={}", urlencoding::encode(notice))).into_response()
}

/// A form page re-rendered after failed validation.
pub fn unprocessable(page: Html<String>) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, page).into_response()
}

/// Validate an optional upload, recording any rejection under `image`.
///
/// A missing file is an error only when `required` is set.
pub async fn prepare_upload(
    images: &ImageStore,
    file: Option<UploadedFile>,
    required: bool,
    errors: &mut FieldErrors,
) -> Option<PreparedImage> {
    let Some(file) = file else {
        if required {
            errors.add(IMAGE_FIELD, UploadError::Missing.to_string());
        }
        return None;
    };

    match images.prepare(file).await {
        Ok(image) => Some(image),
        Err(e) => {
            tracing::debug!(error = %e, "Rejected image upload");
            errors.add(IMAGE_FIELD, e.to_string());
            None
        }
    }
}

pub(crate) fn storage_error(err: std::io::Error) -> AppError {
    AppError::InternalError(format!("Failed to store image: {err}"))
}
