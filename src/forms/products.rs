use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::attribute::{AttributeType, RawAttributeValue};
use crate::domain::product::{NewProduct, UpdateProduct};
use crate::forms::{SLUG_MAX_LEN, parse_optional_i32, resolve_slug, sanitize_optional};
use crate::repository::unique_ids;

/// Maximum allowed length for a product title.
const TITLE_MAX_LEN: usize = 255;
const TITLE_MAX_LEN_VALIDATOR: u64 = TITLE_MAX_LEN as u64;

const SLUG_MAX_LEN_VALIDATOR: u64 = SLUG_MAX_LEN as u64;

const META_DESCRIPTION_MAX_LEN_VALIDATOR: u64 = 1024;

/// Maximum length of a submitted attribute value.
const VALUE_MAX_LEN: usize = 4096;
const VALUE_MAX_LEN_VALIDATOR: u64 = VALUE_MAX_LEN as u64;

/// Result type returned by the product form helpers.
pub type ProductFormResult<T> = Result<T, ProductFormError>;

/// Errors that can occur while processing product forms.
#[derive(Debug, Error)]
pub enum ProductFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// Standalone and parent products need a title; only variants may omit it.
    #[error("product title cannot be empty")]
    EmptyTitle,
    #[error("invalid slug `{0}`: use letters, digits, `-` or `_`")]
    InvalidSlug(String),
    /// Supplied identifier field could not be parsed.
    #[error("invalid {field} `{value}`")]
    InvalidIdentifier { field: &'static str, value: String },
}

fn parse_identifier(value: Option<&str>, field: &'static str) -> ProductFormResult<Option<i32>> {
    parse_optional_i32(value).map_err(|value| ProductFormError::InvalidIdentifier { field, value })
}

/// Form payload emitted when submitting the "Add product" form.
#[derive(Debug, Deserialize, Validate)]
pub struct AddProductForm {
    #[validate(length(max = TITLE_MAX_LEN_VALIDATOR))]
    #[serde(default)]
    pub title: Option<String>,
    /// Optional slug; derived from the title when blank.
    #[validate(length(max = SLUG_MAX_LEN_VALIDATOR))]
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub product_class_id: Option<String>,
    /// Parent product identifier when creating a variant.
    #[serde(default)]
    pub parent_id: Option<String>,
    #[validate(length(max = TITLE_MAX_LEN_VALIDATOR))]
    #[serde(default)]
    pub meta_title: Option<String>,
    #[validate(length(max = META_DESCRIPTION_MAX_LEN_VALIDATOR))]
    #[serde(default)]
    pub meta_description: Option<String>,
    /// Categories the product is listed in.
    #[serde(default)]
    pub category_ids: Vec<i32>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub not_discountable: bool,
}

/// Normalized payload produced by the "Add product" form.
#[derive(Debug)]
pub struct NewProductPayload {
    pub product: NewProduct,
    /// Unique, positive category identifiers in submitted order.
    pub category_ids: Vec<i32>,
}

impl AddProductForm {
    /// Validates and sanitizes the payload into a domain `NewProduct`.
    pub fn into_new_product(self) -> ProductFormResult<NewProductPayload> {
        self.validate()?;

        let parent_id = parse_identifier(self.parent_id.as_deref(), "parent product")?;
        let product_class_id = parse_identifier(self.product_class_id.as_deref(), "product class")?;

        let title = sanitize_optional(self.title.as_deref(), false);
        if title.is_none() && parent_id.is_none() {
            return Err(ProductFormError::EmptyTitle);
        }

        let slug = resolve_slug(self.slug.as_deref(), title.as_deref().unwrap_or_default())
            .map_err(ProductFormError::InvalidSlug)?;

        let mut product = NewProduct::new(slug);
        if let Some(title) = title {
            product = product.with_title(title);
        }
        if let Some(parent_id) = parent_id {
            product = product.with_parent(parent_id);
        }
        if let Some(product_class_id) = product_class_id {
            product = product.with_product_class(product_class_id);
        }
        product.meta_title = sanitize_optional(self.meta_title.as_deref(), false);
        product.meta_description = sanitize_optional(self.meta_description.as_deref(), true);
        if self.hidden {
            product = product.inactive();
        }
        if self.not_discountable {
            product = product.not_discountable();
        }

        let category_ids = unique_ids(&self.category_ids)
            .into_iter()
            .filter(|id| *id > 0)
            .collect();

        Ok(NewProductPayload {
            product,
            category_ids,
        })
    }
}

/// Form payload emitted when editing an existing product.
#[derive(Debug, Deserialize, Validate)]
pub struct EditProductForm {
    #[validate(range(min = 1))]
    pub product_id: i32,
    /// New title; blank clears it.
    #[validate(length(max = TITLE_MAX_LEN_VALIDATOR))]
    #[serde(default)]
    pub title: Option<String>,
    /// New slug; blank keeps the stored one.
    #[validate(length(max = SLUG_MAX_LEN_VALIDATOR))]
    #[serde(default)]
    pub slug: Option<String>,
    #[validate(length(max = TITLE_MAX_LEN_VALIDATOR))]
    #[serde(default)]
    pub meta_title: Option<String>,
    #[validate(length(max = META_DESCRIPTION_MAX_LEN_VALIDATOR))]
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_discountable: bool,
}

/// Normalized payload produced by the "Edit product" form.
#[derive(Debug)]
pub struct EditProductPayload {
    pub product_id: i32,
    pub update: UpdateProduct,
}

impl EditProductForm {
    pub fn into_update_product(self) -> ProductFormResult<EditProductPayload> {
        self.validate()?;

        let mut update = UpdateProduct::new()
            .title(sanitize_optional(self.title.as_deref(), false))
            .meta_title(sanitize_optional(self.meta_title.as_deref(), false))
            .meta_description(sanitize_optional(self.meta_description.as_deref(), true))
            .active(self.is_active)
            .discountable(self.is_discountable);

        if let Some(slug) = self.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let slug = resolve_slug(Some(slug), "").map_err(ProductFormError::InvalidSlug)?;
            update = update.slug(slug);
        }

        Ok(EditProductPayload {
            product_id: self.product_id,
            update,
        })
    }
}

/// Value submitted for one attribute. Scalar types and single options use
/// `value`; multi option attributes use `option_ids`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AttributeValueForm {
    #[validate(range(min = 1))]
    pub attribute_id: i32,
    #[validate(length(max = VALUE_MAX_LEN_VALIDATOR))]
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub option_ids: Vec<i32>,
}

impl AttributeValueForm {
    /// Translate the submitted text into a raw value for an attribute of
    /// type `kind`. Numbers stay text here and are parsed during coercion.
    pub fn into_raw(self, kind: AttributeType) -> ProductFormResult<RawAttributeValue> {
        let raw = match kind {
            AttributeType::Text => sanitize_optional(self.value.as_deref(), true)
                .map(RawAttributeValue::Text)
                .unwrap_or_default(),
            AttributeType::Integer | AttributeType::Float => self
                .value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(|value| RawAttributeValue::Text(value.to_string()))
                .unwrap_or_default(),
            AttributeType::Option | AttributeType::MultiOption => {
                match parse_identifier(self.value.as_deref(), "option value")? {
                    Some(id) if self.option_ids.is_empty() => RawAttributeValue::Option(id),
                    Some(id) => {
                        let mut ids = vec![id];
                        ids.extend(self.option_ids);
                        RawAttributeValue::MultiOption(ids)
                    }
                    None if self.option_ids.is_empty() => RawAttributeValue::Null,
                    None if kind == AttributeType::Option && self.option_ids.len() == 1 => {
                        RawAttributeValue::Option(self.option_ids[0])
                    }
                    None => RawAttributeValue::MultiOption(self.option_ids),
                }
            }
        };

        Ok(raw)
    }
}

/// Form payload carrying the attribute values of one product.
#[derive(Debug, Deserialize, Validate)]
pub struct AttributeValuesForm {
    #[validate(nested)]
    #[serde(default)]
    pub values: Vec<AttributeValueForm>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_form(title: Option<&str>) -> AddProductForm {
        AddProductForm {
            title: title.map(str::to_string),
            slug: None,
            product_class_id: None,
            parent_id: None,
            meta_title: None,
            meta_description: None,
            category_ids: Vec::new(),
            hidden: false,
            not_discountable: false,
        }
    }

    fn value_form(value: Option<&str>, option_ids: Vec<i32>) -> AttributeValueForm {
        AttributeValueForm {
            attribute_id: 1,
            value: value.map(str::to_string),
            option_ids,
        }
    }

    #[test]
    fn add_product_form_builds_payload() {
        let mut form = add_form(Some("  The   Hobbit "));
        form.product_class_id = Some("3".to_string());
        form.meta_description = Some(" A tale \n\n\n of a hobbit ".to_string());
        form.category_ids = vec![4, 4, -1, 5];
        form.not_discountable = true;

        let payload = form.into_new_product().expect("expected success");

        let product = payload.product;
        assert_eq!(product.title.as_deref(), Some("The Hobbit"));
        assert_eq!(product.slug, "the-hobbit");
        assert_eq!(product.product_class_id, Some(3));
        assert_eq!(product.meta_description.as_deref(), Some("A tale\n\nof a hobbit"));
        assert!(!product.is_discountable);
        assert!(product.is_active);
        assert_eq!(payload.category_ids, vec![4, 5]);
    }

    #[test]
    fn standalone_product_needs_title() {
        let result = add_form(Some("   ")).into_new_product();

        assert!(matches!(result, Err(ProductFormError::EmptyTitle)));
    }

    #[test]
    fn variant_may_omit_title_but_needs_slug() {
        let mut form = add_form(None);
        form.parent_id = Some("8".to_string());
        form.slug = Some("hobbit-hardcover".to_string());

        let payload = form.into_new_product().expect("expected success");
        assert_eq!(payload.product.parent_id, Some(8));
        assert!(payload.product.title.is_none());

        let mut form = add_form(None);
        form.parent_id = Some("8".to_string());
        assert!(matches!(
            form.into_new_product(),
            Err(ProductFormError::InvalidSlug(slug)) if slug.is_empty()
        ));
    }

    #[test]
    fn add_product_form_rejects_bad_class_id() {
        let mut form = add_form(Some("Book"));
        form.product_class_id = Some("x1".to_string());

        assert!(matches!(
            form.into_new_product(),
            Err(ProductFormError::InvalidIdentifier { field: "product class", .. })
        ));
    }

    #[test]
    fn edit_product_form_keeps_slug_when_blank() {
        let form = EditProductForm {
            product_id: 5,
            title: Some(" ".to_string()),
            slug: Some("  ".to_string()),
            meta_title: None,
            meta_description: None,
            is_active: true,
            is_discountable: false,
        };

        let payload = form.into_update_product().expect("expected success");

        assert_eq!(payload.product_id, 5);
        assert_eq!(payload.update.title, Some(None));
        assert!(payload.update.slug.is_none());
        assert_eq!(payload.update.is_active, Some(true));
        assert_eq!(payload.update.is_discountable, Some(false));
    }

    #[test]
    fn scalar_values_become_text_for_coercion() {
        assert_eq!(
            value_form(Some(" Tolkien "), vec![])
                .into_raw(AttributeType::Text)
                .expect("expected success"),
            RawAttributeValue::Text("Tolkien".to_string())
        );
        assert_eq!(
            value_form(Some(" 42 "), vec![])
                .into_raw(AttributeType::Integer)
                .expect("expected success"),
            RawAttributeValue::Text("42".to_string())
        );
        assert_eq!(
            value_form(Some("   "), vec![])
                .into_raw(AttributeType::Float)
                .expect("expected success"),
            RawAttributeValue::Null
        );
    }

    #[test]
    fn option_values_are_parsed_as_identifiers() {
        assert_eq!(
            value_form(Some("7"), vec![])
                .into_raw(AttributeType::Option)
                .expect("expected success"),
            RawAttributeValue::Option(7)
        );
        assert_eq!(
            value_form(None, vec![3, 1])
                .into_raw(AttributeType::MultiOption)
                .expect("expected success"),
            RawAttributeValue::MultiOption(vec![3, 1])
        );
        assert_eq!(
            value_form(None, vec![])
                .into_raw(AttributeType::MultiOption)
                .expect("expected success"),
            RawAttributeValue::Null
        );
        assert!(matches!(
            value_form(Some("English"), vec![]).into_raw(AttributeType::Option),
            Err(ProductFormError::InvalidIdentifier { .. })
        ));
    }
}
