use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::category::{DeletePolicy, NewCategory, UpdateCategory};
use crate::forms::{
    SLUG_MAX_LEN, parse_optional_i32, resolve_slug, sanitize_inline_text, sanitize_optional,
};

/// Maximum length allowed for a category title.
const TITLE_MAX_LEN: usize = 255;
const TITLE_MAX_LEN_VALIDATOR: u64 = TITLE_MAX_LEN as u64;

/// Maximum length allowed for a category description.
const DESCRIPTION_MAX_LEN: usize = 2048;
const DESCRIPTION_MAX_LEN_VALIDATOR: u64 = DESCRIPTION_MAX_LEN as u64;

const SLUG_MAX_LEN_VALIDATOR: u64 = SLUG_MAX_LEN as u64;

/// Result type returned by the category form helpers.
pub type CategoryFormResult<T> = Result<T, CategoryFormError>;

/// Errors that can occur while processing category forms.
#[derive(Debug, Error)]
pub enum CategoryFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// The provided title is empty after sanitization.
    #[error("category title cannot be empty")]
    EmptyTitle,
    #[error("invalid slug `{0}`: use letters, digits, `-` or `_`")]
    InvalidSlug(String),
    /// Supplied identifier field could not be parsed.
    #[error("invalid {field} `{value}`")]
    InvalidIdentifier { field: &'static str, value: String },
}

/// Form payload emitted when submitting the "Add category" form.
#[derive(Debug, Deserialize, Validate)]
pub struct AddCategoryForm {
    #[validate(length(min = 1, max = TITLE_MAX_LEN_VALIDATOR))]
    pub title: String,
    /// Optional slug; derived from the title when blank.
    #[validate(length(max = SLUG_MAX_LEN_VALIDATOR))]
    #[serde(default)]
    pub slug: Option<String>,
    #[validate(length(max = DESCRIPTION_MAX_LEN_VALIDATOR))]
    #[serde(default)]
    pub description: Option<String>,
    /// Optional parent category identifier in string form. Blank creates a root.
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Keep the category out of public listings.
    #[serde(default)]
    pub hidden: bool,
}

/// Normalized payload produced by the "Add category" form.
#[derive(Debug)]
pub struct NewCategoryPayload {
    /// Parent to attach the category to, `None` for a new root.
    pub parent_id: Option<i32>,
    pub category: NewCategory,
}

impl AddCategoryForm {
    /// Validates and sanitizes the payload into a domain `NewCategory`.
    pub fn into_new_category(self) -> CategoryFormResult<NewCategoryPayload> {
        self.validate()?;

        let title = sanitize_inline_text(&self.title);
        if title.is_empty() {
            return Err(CategoryFormError::EmptyTitle);
        }

        let slug = resolve_slug(self.slug.as_deref(), &title).map_err(CategoryFormError::InvalidSlug)?;

        let parent_id = parse_optional_i32(self.parent_id.as_deref()).map_err(|value| {
            CategoryFormError::InvalidIdentifier {
                field: "parent category",
                value,
            }
        })?;

        let mut category = NewCategory::new(title, slug);
        if let Some(description) = sanitize_optional(self.description.as_deref(), true) {
            category = category.with_description(description);
        }
        if self.hidden {
            category = category.inactive();
        }

        Ok(NewCategoryPayload {
            parent_id,
            category,
        })
    }
}

/// Normalized payload produced by the "Edit category" form.
#[derive(Debug)]
pub struct EditCategoryPayload {
    /// Identifier of the category to update.
    pub category_id: i32,
    /// Patch data that should be applied to the category.
    pub update: UpdateCategory,
}

/// Form payload emitted when editing an existing category.
#[derive(Debug, Deserialize, Validate)]
pub struct EditCategoryForm {
    #[validate(range(min = 1))]
    pub category_id: i32,
    #[validate(length(min = 1, max = TITLE_MAX_LEN_VALIDATOR))]
    pub title: String,
    #[validate(length(max = SLUG_MAX_LEN_VALIDATOR))]
    #[serde(default)]
    pub slug: Option<String>,
    /// New description; blank clears it.
    #[validate(length(max = DESCRIPTION_MAX_LEN_VALIDATOR))]
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

impl EditCategoryForm {
    /// Validates and sanitizes the payload into a domain `UpdateCategory`.
    pub fn into_update_category(self) -> CategoryFormResult<EditCategoryPayload> {
        self.validate()?;

        let EditCategoryForm {
            category_id,
            title,
            slug,
            description,
            is_active,
        } = self;

        let title = sanitize_inline_text(&title);
        if title.is_empty() {
            return Err(CategoryFormError::EmptyTitle);
        }

        let slug = resolve_slug(slug.as_deref(), &title).map_err(CategoryFormError::InvalidSlug)?;
        let description = sanitize_optional(description.as_deref(), true);

        Ok(EditCategoryPayload {
            category_id,
            update: UpdateCategory::new(title, slug, description, is_active),
        })
    }
}

/// Form payload emitted when moving a category to another parent.
#[derive(Debug, Deserialize, Validate)]
pub struct MoveCategoryForm {
    #[validate(range(min = 1))]
    pub category_id: i32,
    /// New parent identifier in string form. Blank makes the category a root.
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// Normalized payload produced by the "Move category" form.
#[derive(Debug, PartialEq, Eq)]
pub struct MoveCategoryPayload {
    pub category_id: i32,
    pub parent_id: Option<i32>,
}

impl MoveCategoryForm {
    pub fn into_payload(self) -> CategoryFormResult<MoveCategoryPayload> {
        self.validate()?;

        let parent_id = parse_optional_i32(self.parent_id.as_deref()).map_err(|value| {
            CategoryFormError::InvalidIdentifier {
                field: "parent category",
                value,
            }
        })?;

        Ok(MoveCategoryPayload {
            category_id: self.category_id,
            parent_id,
        })
    }
}

/// Form payload emitted when deleting a category.
#[derive(Debug, Deserialize, Validate)]
pub struct DeleteCategoryForm {
    #[validate(range(min = 1))]
    pub category_id: i32,
    /// What happens to the children; refuses to delete parents by default.
    #[serde(default)]
    pub policy: DeletePolicy,
}
