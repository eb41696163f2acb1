//! Route definitions for `/admin/products`.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, put};
use axum::Router;

use crate::handlers::product;
use crate::state::AppState;

/// Routes mounted at `/admin/products`.
///
/// ```text
/// GET    /                -> index
/// POST   /                -> store
/// GET    /create          -> create
/// GET    /trash           -> trash
/// PUT    /trash           -> restore_all
/// DELETE /trash           -> force_delete_all
/// PUT    /trash/{id}      -> restore
/// DELETE /trash/{id}      -> force_delete
/// GET    /{id}            -> show
/// PUT    /{id}            -> update
/// PATCH  /{id}            -> update
/// DELETE /{id}            -> destroy
/// GET    /{id}/edit       -> edit
/// ```
pub fn router(upload_body_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(product::index).post(product::store))
        .route("/create", get(product::create))
        .route(
            "/trash",
            get(product::trash)
                .put(product::restore_all)
                .delete(product::force_delete_all),
        )
        .route(
            "/trash/{id}",
            put(product::restore).delete(product::force_delete),
        )
        .route(
            "/{id}",
            get(product::show)
                .put(product::update)
                .patch(product::update)
                .delete(product::destroy),
        )
        .route("/{id}/edit", get(product::edit))
        .layer(DefaultBodyLimit::max(upload_body_limit))
}
