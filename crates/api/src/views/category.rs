//! Category pages.

use axum::response::Html;
use catalog_core::forms::{CategoryForm, FieldErrors};
use catalog_core::pagination::Page;
use catalog_core::types::display_timestamp;
use catalog_db::models::category::{Category, CategoryListRow, CategoryOption};
use minijinja::context;
use serde::Serialize;

use super::{render_page, status_options, Pagination};
use crate::error::AppResult;
use crate::storage::image_url;

pub const BASE_PATH: &str = "/admin/categories";

/// A category formatted for display.
#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<i64>,
    pub parent_name: Option<String>,
    pub description: Option<String>,
    pub status: &'static str,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

impl CategoryView {
    pub fn new(category: &Category, parent_name: Option<&str>) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            slug: category.slug.clone(),
            parent_id: category.parent_id,
            parent_name: parent_name.map(str::to_string),
            description: category.description.clone(),
            status: category.status().as_str(),
            image_url: category.image_path.as_deref().map(image_url),
            created_at: display_timestamp(&category.created_at),
            updated_at: display_timestamp(&category.updated_at),
            deleted_at: category.deleted_at.as_ref().map(display_timestamp),
        }
    }
}

impl From<&CategoryListRow> for CategoryView {
    fn from(row: &CategoryListRow) -> Self {
        CategoryView::new(&row.category, row.parent_name.as_deref())
    }
}

/// Form values for editing an existing category.
pub fn form_values(category: &Category) -> CategoryForm {
    CategoryForm {
        name: category.name.clone(),
        description: category.description.clone().unwrap_or_default(),
        parent_id: category.parent_id.map(|id| id.to_string()).unwrap_or_default(),
        status: category.status().as_str().to_string(),
    }
}

pub fn index(
    page: &Page<CategoryListRow>,
    include_inactive: bool,
    notice: Option<&str>,
) -> AppResult<Html<String>> {
    let keep: &[(&str, &str)] = if include_inactive {
        &[("include_inactive", "true")]
    } else {
        &[]
    };
    let categories: Vec<CategoryView> = page.items.iter().map(CategoryView::from).collect();

    render_page(
        "categories/index.html",
        context! {
            title => "Categories",
            notice => notice,
            include_inactive => include_inactive,
            categories => categories,
            pagination => Pagination::new(page, BASE_PATH, keep),
        },
    )
}

pub fn trash(page: &Page<CategoryListRow>, notice: Option<&str>) -> AppResult<Html<String>> {
    let categories: Vec<CategoryView> = page.items.iter().map(CategoryView::from).collect();

    render_page(
        "categories/trash.html",
        context! {
            title => "Trashed Categories",
            notice => notice,
            categories => categories,
            pagination => Pagination::new(page, &format!("{BASE_PATH}/trash"), &[]),
        },
    )
}

pub fn show(
    row: &CategoryListRow,
    children: &[Category],
    product_count: i64,
) -> AppResult<Html<String>> {
    let children: Vec<CategoryView> = children
        .iter()
        .map(|child| CategoryView::new(child, Some(&row.category.name)))
        .collect();

    render_page(
        "categories/show.html",
        context! {
            title => row.category.name.clone(),
            category => CategoryView::from(row),
            children => children,
            product_count => product_count,
        },
    )
}

/// Create form when `category` is `None`, edit form otherwise.
pub fn form(
    category: Option<&Category>,
    values: &CategoryForm,
    errors: &FieldErrors,
    parents: &[CategoryOption],
) -> AppResult<Html<String>> {
    let (title, action) = match category {
        Some(c) => (
            format!("Edit Category ({})", c.name),
            format!("{BASE_PATH}/{}?_method=PUT", c.id),
        ),
        None => ("Create Category".to_string(), BASE_PATH.to_string()),
    };
    let current_image = category.and_then(|c| c.image_path.as_deref()).map(image_url);

    render_page(
        "categories/form.html",
        context! {
            title => title,
            action => action,
            editing => category.is_some(),
            form => values,
            errors => errors,
            parents => parents,
            statuses => status_options(),
            current_image => current_image,
        },
    )
}
