pub mod category;
pub mod health;
pub mod product;

use axum::response::Redirect;
use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Build the `/admin` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /products                      index, store
/// /products/create               create form
/// /products/trash                trash, restore all, empty trash
/// /products/trash/{id}           restore, force delete
/// /products/{id}                 show, update, destroy
/// /products/{id}/edit            edit form
///
/// /categories/...                same shape as /products
/// ```
///
/// Update and delete routes are reached from HTML forms through the
/// `_method` override applied in [`crate::router`].
pub fn admin_routes(upload_body_limit: usize) -> Router<AppState> {
    Router::new()
        .nest("/products", product::router(upload_body_limit))
        .nest("/categories", category::router(upload_body_limit))
}

/// `GET /` sends visitors to the product listing.
pub fn root_redirect() -> Router<AppState> {
    Router::new().route("/", get(|| async { Redirect::to("/admin/products") }))
}
