//! Product pages: listing, trash, detail and the create/edit form.

use axum::response::Html;
use catalog_core::forms::{FieldErrors, ProductForm};
use catalog_core::pagination::Page;
use catalog_core::price::format_price;
use catalog_core::types::display_timestamp;
use catalog_db::models::category::CategoryOption;
use catalog_db::models::product::{Product, ProductListRow};
use minijinja::context;
use serde::Serialize;

use super::{render_page, status_options, Pagination};
use crate::error::AppResult;
use crate::storage::image_url;

pub const BASE_PATH: &str = "/admin/products";

/// A product formatted for display.
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub category_id: i64,
    pub category_name: Option<String>,
    pub price: String,
    pub quantity: i32,
    pub status: &'static str,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

impl ProductView {
    pub fn new(product: &Product, category_name: Option<&str>) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            description: product.description.clone(),
            category_id: product.category_id,
            category_name: category_name.map(str::to_string),
            price: format_price(&product.price),
            quantity: product.quantity,
            status: product.status().as_str(),
            image_url: product.image_path.as_deref().map(image_url),
            created_at: display_timestamp(&product.created_at),
            updated_at: display_timestamp(&product.updated_at),
            deleted_at: product.deleted_at.as_ref().map(display_timestamp),
        }
    }
}

impl From<&ProductListRow> for ProductView {
    fn from(row: &ProductListRow) -> Self {
        ProductView::new(&row.product, Some(&row.category_name))
    }
}

/// Form values for editing an existing product.
pub fn form_values(product: &Product) -> ProductForm {
    ProductForm {
        name: product.name.clone(),
        description: product.description.clone().unwrap_or_default(),
        price: product.price.to_string(),
        quantity: product.quantity.to_string(),
        category_id: product.category_id.to_string(),
        status: product.status().as_str().to_string(),
    }
}

pub fn index(
    page: &Page<ProductListRow>,
    include_inactive: bool,
    notice: Option<&str>,
) -> AppResult<Html<String>> {
    let keep: &[(&str, &str)] = if include_inactive {
        &[("include_inactive", "true")]
    } else {
        &[]
    };
    let products: Vec<ProductView> = page.items.iter().map(ProductView::from).collect();

    render_page(
        "products/index.html",
        context! {
            title => "Products",
            notice => notice,
            include_inactive => include_inactive,
            products => products,
            pagination => Pagination::new(page, BASE_PATH, keep),
        },
    )
}

pub fn trash(page: &Page<ProductListRow>, notice: Option<&str>) -> AppResult<Html<String>> {
    let products: Vec<ProductView> = page.items.iter().map(ProductView::from).collect();

    render_page(
        "products/trash.html",
        context! {
            title => "Trashed Products",
            notice => notice,
            products => products,
            pagination => Pagination::new(page, &format!("{BASE_PATH}/trash"), &[]),
        },
    )
}

pub fn show(row: &ProductListRow) -> AppResult<Html<String>> {
    render_page(
        "products/show.html",
        context! {
            title => row.product.name.clone(),
            product => ProductView::from(row),
        },
    )
}

/// Create form when `product` is `None`, edit form otherwise.
pub fn form(
    product: Option<&Product>,
    values: &ProductForm,
    errors: &FieldErrors,
    categories: &[CategoryOption],
) -> AppResult<Html<String>> {
    let (title, action) = match product {
        Some(p) => (
            format!("Edit Product ({})", p.name),
            format!("{BASE_PATH}/{}?_method=PUT", p.id),
        ),
        None => ("Create Product".to_string(), BASE_PATH.to_string()),
    };
    let current_image = product.and_then(|p| p.image_path.as_deref()).map(image_url);

    render_page(
        "products/form.html",
        context! {
            title => title,
            action => action,
            editing => product.is_some(),
            form => values,
            errors => errors,
            categories => categories,
            statuses => status_options(),
            current_image => current_image,
        },
    )
}
