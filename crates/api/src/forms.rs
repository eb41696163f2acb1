//! Multipart form decoding for the create and update pages.

use std::collections::HashMap;

use axum::extract::Multipart;
use catalog_core::forms::{CategoryForm, ProductForm};
use catalog_core::upload::UploadedFile;

use crate::error::{AppError, AppResult};

/// Name of the file input on both resource forms.
pub const IMAGE_FIELD: &str = "image";

/// Text fields and the optional image part of a submitted form.
#[derive(Debug, Default)]
pub struct SubmittedForm {
    fields: HashMap<String, String>,
    /// `None` when no file was chosen.
    pub image: Option<UploadedFile>,
}

impl SubmittedForm {
    /// Drain a multipart body. Unknown fields are kept but ignored later.
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = SubmittedForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();
            if name == IMAGE_FIELD {
                let file_name = field.file_name().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                let file = UploadedFile {
                    file_name,
                    bytes: bytes.to_vec(),
                };
                form.image = (!file.is_empty()).then_some(file);
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.fields.insert(name, text);
            }
        }

        Ok(form)
    }

    #[cfg(test)]
    fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }

    fn take(&mut self, name: &str) -> String {
        self.fields.remove(name).unwrap_or_default()
    }

    pub fn product_form(&mut self) -> ProductForm {
        ProductForm {
            name: self.take("name"),
            description: self.take("description"),
            price: self.take("price"),
            quantity: self.take("quantity"),
            category_id: self.take("category_id"),
            status: self.take("status"),
        }
    }

    pub fn category_form(&mut self) -> CategoryForm {
        CategoryForm {
            name: self.take("name"),
            description: self.take("description"),
            parent_id: self.take("parent_id"),
            status: self.take("status"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_form_reads_known_fields() {
        let mut submitted = SubmittedForm::default()
            .with_field("name", "Red Shoe")
            .with_field("price", "19.99")
            .with_field("category_id", "4")
            .with_field("_token", "ignored");
        let form = submitted.product_form();
        assert_eq!(form.name, "Red Shoe");
        assert_eq!(form.price, "19.99");
        assert_eq!(form.category_id, "4");
        assert_eq!(form.quantity, "");
    }

    #[test]
    fn category_form_defaults_missing_fields_to_empty() {
        let mut submitted = SubmittedForm::default().with_field("name", "Shoes");
        let form = submitted.category_form();
        assert_eq!(form.name, "Shoes");
        assert_eq!(form.parent_id, "");
        assert_eq!(form.status, "");
    }
}
