//! Server-rendered admin pages.
//!
//! Templates are compiled into the binary and loaded once into a shared
//! minijinja [`Environment`]. Handlers never pass database rows straight to a
//! template; the per-resource modules build display structs with prices,
//! dates and image URLs already formatted.

pub mod category;
pub mod product;

use std::sync::OnceLock;

use axum::http::StatusCode;
use axum::response::Html;
use catalog_core::pagination::Page;
use catalog_core::status::EntityStatus;
use minijinja::{context, Environment};
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Global template environment.
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// Template name and source, relative to `crates/api/templates`.
const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../../templates/layout.html")),
    ("error.html", include_str!("../../templates/error.html")),
    ("pagination.html", include_str!("../../templates/pagination.html")),
    ("products/index.html", include_str!("../../templates/products/index.html")),
    ("products/trash.html", include_str!("../../templates/products/trash.html")),
    ("products/show.html", include_str!("../../templates/products/show.html")),
    ("products/form.html", include_str!("../../templates/products/form.html")),
    ("categories/index.html", include_str!("../../templates/categories/index.html")),
    ("categories/trash.html", include_str!("../../templates/categories/trash.html")),
    ("categories/show.html", include_str!("../../templates/categories/show.html")),
    ("categories/form.html", include_str!("../../templates/categories/form.html")),
];

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();
    for &(name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::error!(template = name, error = %e, "Failed to load template");
        }
    }
    env
}

fn environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a template with the given context.
pub fn render<S: Serialize>(name: &str, ctx: S) -> Result<Html<String>, minijinja::Error> {
    let template = environment().get_template(name)?;
    Ok(Html(template.render(ctx)?))
}

/// [`render`] for handlers: template failures become a 500.
pub fn render_page<S: Serialize>(name: &str, ctx: S) -> AppResult<Html<String>> {
    render(name, ctx).map_err(|e| AppError::InternalError(format!("template {name}: {e:#}")))
}

/// The error page for a status code and user-facing message.
pub fn error_page(status: StatusCode, message: &str) -> Result<Html<String>, minijinja::Error> {
    render(
        "error.html",
        context! {
            title => status.canonical_reason().unwrap_or("Error"),
            status => status.as_u16(),
            message => message,
        },
    )
}

/// Status choices for the form dropdowns.
pub fn status_options() -> Vec<&'static str> {
    EntityStatus::ALL.iter().map(|s| s.as_str()).collect()
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Pages linked on each side of the current one.
const PAGE_LINK_WINDOW: i64 = 3;

/// One numbered pagination link.
#[derive(Debug, Serialize)]
pub struct PageLink {
    pub number: i64,
    pub url: String,
    pub current: bool,
}

/// Everything the pagination partial needs.
#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub last_page: i64,
    pub total: i64,
    pub first_item: i64,
    pub last_item: i64,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
    pub links: Vec<PageLink>,
}

impl Pagination {
    /// Build links to `base` keeping `keep` query parameters on every URL.
    pub fn new<T>(page: &Page<T>, base: &str, keep: &[(&str, &str)]) -> Self {
        let url = |number: i64| {
            let mut query: Vec<String> = keep
                .iter()
                .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
                .collect();
            query.push(format!("page={number}"));
            format!("{base}?{}", query.join("&"))
        };

        let last_page = page.last_page();
        // `page.page` comes straight from the query string.
        let from = page.page.saturating_sub(PAGE_LINK_WINDOW).max(1);
        let to = page.page.saturating_add(PAGE_LINK_WINDOW).min(last_page);
        let links = (from..=to)
            .map(|number| PageLink {
                number,
                url: url(number),
                current: number == page.page,
            })
            .collect();

        Self {
            page: page.page,
            last_page,
            total: page.total,
            first_item: page.first_item(),
            last_item: page.last_item(),
            prev_url: page.has_prev().then(|| url(page.page - 1)),
            next_url: page.has_next().then(|| url(page.page + 1)),
            links,
        }
    }
}
