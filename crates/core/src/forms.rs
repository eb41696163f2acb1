//! Product and category form validation.
//!
//! Forms arrive as raw strings (multipart text fields) so that a failed
//! submission can be re-rendered with exactly what the user typed. `parse`
//! validates the whole form and converts it into typed input for the
//! repositories, or returns every field error at once.
//!
//! Checks that need the database (category existence, parent cycles) and the
//! image upload itself are performed by the caller, which merges its own
//! errors into the same [`FieldErrors`].

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::status::EntityStatus;
use crate::types::DbId;

/// Maximum length of a product or category name.
pub const MAX_NAME_LEN: usize = 255;

/// Maximum length of a description.
pub const MAX_DESCRIPTION_LEN: usize = 5000;

/// Largest price that fits `NUMERIC(12,2)`.
pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

// ---------------------------------------------------------------------------
// Field errors
// ---------------------------------------------------------------------------

/// Validation messages keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages for one field, empty when the field is valid.
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `Ok(())` when no errors were collected.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("The {field} field is invalid."));
                out.add(&field, message);
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Field parsers
// ---------------------------------------------------------------------------

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::from(message))
}

fn validate_name(value: &str) -> Result<(), ValidationError> {
    let name = value.trim();
    if name.is_empty() {
        return Err(invalid("required", "The name field is required."));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(invalid(
            "length",
            "The name may not be greater than 255 characters.",
        ));
    }
    Ok(())
}

fn validate_description(value: &str) -> Result<(), ValidationError> {
    if value.trim().chars().count() > MAX_DESCRIPTION_LEN {
        return Err(invalid(
            "length",
            "The description may not be greater than 5000 characters.",
        ));
    }
    Ok(())
}

fn validate_price(value: &str) -> Result<(), ValidationError> {
    parse_price(value).map(|_| ()).map_err(|m| invalid("price", m))
}

fn validate_quantity(value: &str) -> Result<(), ValidationError> {
    parse_quantity(value)
        .map(|_| ())
        .map_err(|m| invalid("quantity", m))
}

fn validate_category_id(value: &str) -> Result<(), ValidationError> {
    match parse_optional_id(value) {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(invalid("required", "The category field is required.")),
        Err(m) => Err(invalid("category_id", m)),
    }
}

fn validate_parent_id(value: &str) -> Result<(), ValidationError> {
    parse_optional_id(value)
        .map(|_| ())
        .map_err(|m| invalid("parent_id", m))
}

fn validate_status(value: &str) -> Result<(), ValidationError> {
    parse_status(value)
        .map(|_| ())
        .map_err(|m| invalid("status", m))
}

fn parse_price(value: &str) -> Result<Decimal, &'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Err("The price field is required.");
    }
    let price = Decimal::from_str(value).map_err(|_| "The price must be a number.")?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err("The price must be at least 0.");
    }
    if price.normalize().scale() > 2 {
        return Err("The price may not have more than 2 decimal places.");
    }
    if price > MAX_PRICE {
        return Err("The price is too large.");
    }
    Ok(price.round_dp(2))
}

fn parse_quantity(value: &str) -> Result<i32, &'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0);
    }
    let quantity: i32 = value
        .parse()
        .map_err(|_| "The quantity must be a whole number.")?;
    if quantity < 0 {
        return Err("The quantity must be at least 0.");
    }
    Ok(quantity)
}

fn parse_optional_id(value: &str) -> Result<Option<DbId>, &'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<DbId>() {
        Ok(id) if id > 0 => Ok(Some(id)),
        _ => Err("The selected category is invalid."),
    }
}

fn parse_status(value: &str) -> Result<EntityStatus, &'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(EntityStatus::default());
    }
    EntityStatus::from_str(value).map_err(|_| "The selected status is invalid.")
}

fn optional_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Re-run a parser whose input already passed validation.
fn reparse<T>(field: &str, parsed: Result<T, &'static str>) -> Result<T, FieldErrors> {
    parsed.map_err(|m| FieldErrors::single(field, m))
}

// ---------------------------------------------------------------------------
// Product form
// ---------------------------------------------------------------------------

/// Raw product form fields as submitted.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct ProductForm {
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    #[validate(custom(function = "validate_description"))]
    pub description: String,
    #[validate(custom(function = "validate_price"))]
    pub price: String,
    #[validate(custom(function = "validate_quantity"))]
    pub quantity: String,
    #[validate(custom(function = "validate_category_id"))]
    pub category_id: String,
    #[validate(custom(function = "validate_status"))]
    pub status: String,
}

/// Validated product fields ready to persist. The image is handled apart.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub category_id: DbId,
    pub status: EntityStatus,
}

impl ProductForm {
    pub fn parse(&self) -> Result<ProductInput, FieldErrors> {
        self.validate()?;

        let category_id = reparse("category_id", parse_optional_id(&self.category_id))?
            .ok_or_else(|| FieldErrors::single("category_id", "The category field is required."))?;

        Ok(ProductInput {
            name: self.name.trim().to_string(),
            description: optional_text(&self.description),
            price: reparse("price", parse_price(&self.price))?,
            quantity: reparse("quantity", parse_quantity(&self.quantity))?,
            category_id,
            status: reparse("status", parse_status(&self.status))?,
        })
    }
}

// ---------------------------------------------------------------------------
// Category form
// ---------------------------------------------------------------------------

/// Raw category form fields as submitted.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct CategoryForm {
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    #[validate(custom(function = "validate_description"))]
    pub description: String,
    #[validate(custom(function = "validate_parent_id"))]
    pub parent_id: String,
    #[validate(custom(function = "validate_status"))]
    pub status: String,
}

/// Validated category fields ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<DbId>,
    pub status: EntityStatus,
}

impl CategoryForm {
    pub fn parse(&self) -> Result<CategoryInput, FieldErrors> {
        self.validate()?;

        Ok(CategoryInput {
            name: self.name.trim().to_string(),
            description: optional_text(&self.description),
            parent_id: reparse("parent_id", parse_optional_id(&self.parent_id))?,
            status: reparse("status", parse_status(&self.status))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_form() -> ProductForm {
        ProductForm {
            name: "Red Shoe".into(),
            description: "".into(),
            price: "19.99".into(),
            quantity: "".into(),
            category_id: "1".into(),
            status: "".into(),
        }
    }

    // -- product -------------------------------------------------------------

    #[test]
    fn valid_product_form_parses_with_defaults() {
        let input = product_form().parse().unwrap();
        assert_eq!(input.name, "Red Shoe");
        assert_eq!(input.description, None);
        assert_eq!(input.price, Decimal::from_str("19.99").unwrap());
        assert_eq!(input.quantity, 0);
        assert_eq!(input.category_id, 1);
        assert_eq!(input.status, EntityStatus::Active);
    }

    #[test]
    fn name_is_trimmed() {
        let form = ProductForm {
            name: "  Red Shoe  ".into(),
            ..product_form()
        };
        assert_eq!(form.parse().unwrap().name, "Red Shoe");
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let form = ProductForm {
            name: " ".into(),
            price: "".into(),
            category_id: "".into(),
            ..product_form()
        };
        let errors = form.parse().unwrap_err();
        assert_eq!(errors.get("name"), ["The name field is required."]);
        assert_eq!(errors.get("price"), ["The price field is required."]);
        assert_eq!(errors.get("category_id"), ["The category field is required."]);
        assert!(!errors.contains("quantity"));
    }

    #[test]
    fn non_latin_name_is_accepted() {
        let form = ProductForm {
            name: "حذاء أحمر".into(),
            ..product_form()
        };
        assert_eq!(form.parse().unwrap().name, "حذاء أحمر");
    }

    #[test]
    fn overlong_name_is_rejected() {
        let form = ProductForm {
            name: "a".repeat(MAX_NAME_LEN + 1),
            ..product_form()
        };
        assert!(form.parse().unwrap_err().contains("name"));
    }

    #[test]
    fn negative_price_is_rejected() {
        let form = ProductForm {
            price: "-1".into(),
            ..product_form()
        };
        assert_eq!(
            form.parse().unwrap_err().get("price"),
            ["The price must be at least 0."]
        );
    }

    #[test]
    fn price_with_three_decimals_is_rejected() {
        let form = ProductForm {
            price: "1.999".into(),
            ..product_form()
        };
        assert!(form.parse().unwrap_err().contains("price"));
    }

    #[test]
    fn price_with_trailing_zeros_is_accepted() {
        let form = ProductForm {
            price: "1.500".into(),
            ..product_form()
        };
        assert_eq!(form.parse().unwrap().price, Decimal::from_str("1.50").unwrap());
    }

    #[test]
    fn price_above_column_limit_is_rejected() {
        let form = ProductForm {
            price: "10000000000".into(),
            ..product_form()
        };
        assert!(form.parse().unwrap_err().contains("price"));
    }

    #[test]
    fn max_price_fits_the_column() {
        assert_eq!(MAX_PRICE, Decimal::from_str("9999999999.99").unwrap());
    }

    #[test]
    fn quantity_must_be_non_negative_integer() {
        for bad in ["-1", "1.5", "many"] {
            let form = ProductForm {
                quantity: bad.into(),
                ..product_form()
            };
            assert!(form.parse().unwrap_err().contains("quantity"), "{bad}");
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        let form = ProductForm {
            status: "archived".into(),
            ..product_form()
        };
        assert!(form.parse().unwrap_err().contains("status"));
    }

    #[test]
    fn inactive_status_is_kept() {
        let form = ProductForm {
            status: "inactive".into(),
            ..product_form()
        };
        assert_eq!(form.parse().unwrap().status, EntityStatus::Inactive);
    }

    // -- category ------------------------------------------------------------

    #[test]
    fn category_without_parent_parses() {
        let form = CategoryForm {
            name: "Shoes".into(),
            description: "All footwear".into(),
            ..Default::default()
        };
        let input = form.parse().unwrap();
        assert_eq!(input.parent_id, None);
        assert_eq!(input.description.as_deref(), Some("All footwear"));
        assert_eq!(input.status, EntityStatus::Active);
    }

    #[test]
    fn category_parent_must_be_positive_id() {
        let form = CategoryForm {
            name: "Boots".into(),
            parent_id: "0".into(),
            ..Default::default()
        };
        assert!(form.parse().unwrap_err().contains("parent_id"));

        let form = CategoryForm {
            name: "Boots".into(),
            parent_id: "3".into(),
            ..Default::default()
        };
        assert_eq!(form.parse().unwrap().parent_id, Some(3));
    }

    // -- field errors --------------------------------------------------------

    #[test]
    fn merge_appends_messages() {
        let mut errors = FieldErrors::single("name", "first");
        errors.merge(FieldErrors::single("name", "second"));
        errors.merge(FieldErrors::single("image", "bad image"));
        assert_eq!(errors.get("name"), ["first", "second"]);
        assert_eq!(errors.get("image"), ["bad image"]);
    }

    #[test]
    fn empty_errors_into_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
        assert!(FieldErrors::single("x", "y").into_result().is_err());
    }
}
