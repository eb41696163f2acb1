//! Route definitions for `/admin/categories`.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, put};
use axum::Router;

use crate::handlers::category;
use crate::state::AppState;

/// Routes mounted at `/admin/categories`.
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
        .route("/", get(category::index).post(category::store))
        .route("/create", get(category::create))
        .route(
            "/trash",
            get(category::trash)
                .put(category::restore_all)
                .delete(category::force_delete_all),
        )
        .route(
            "/trash/{id}",
            put(category::restore).delete(category::force_delete),
        )
        .route(
            "/{id}",
            get(category::show)
                .put(category::update)
                .patch(category::update)
                .delete(category::destroy),
        )
        .route("/{id}/edit", get(category::edit))
        .layer(DefaultBodyLimit::max(upload_body_limit))
}
