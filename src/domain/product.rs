use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::pagination::Pagination;

/// Domain representation of a catalog product. Products with a `parent_id`
/// are variants of the parent product.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Product {
    /// Unique identifier of the product.
    pub id: i32,
    /// Parent product when this product is a variant.
    pub parent_id: Option<i32>,
    /// Class that declares the product's attributes.
    pub product_class_id: Option<i32>,
    /// Optional title; variants often inherit their parent's.
    pub title: Option<String>,
    /// Unique URL-friendly identifier.
    pub slug: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    /// Whether offers may apply to this product.
    pub is_discountable: bool,
    /// Whether the product is shown in search results.
    pub is_active: bool,
    /// Timestamp for when the product record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the product record.
    pub updated_at: NaiveDateTime,
}

impl Product {
    pub fn is_variant(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// Payload required to insert a new product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub parent_id: Option<i32>,
    pub product_class_id: Option<i32>,
    pub title: Option<String>,
    pub slug: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub is_discountable: bool,
    pub is_active: bool,
    /// Timestamp captured when the product payload was created.
    pub updated_at: NaiveDateTime,
}

impl NewProduct {
    /// Build an active, discountable product payload with the current timestamp.
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            parent_id: None,
            product_class_id: None,
            title: None,
            slug: slug.into(),
            meta_title: None,
            meta_description: None,
            is_discountable: true,
            is_active: true,
            updated_at: Local::now().naive_utc(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_product_class(mut self, product_class_id: i32) -> Self {
        self.product_class_id = Some(product_class_id);
        self
    }

    /// Create the product as a variant of `parent_id`.
    pub fn with_parent(mut self, parent_id: i32) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_meta(
        mut self,
        meta_title: impl Into<String>,
        meta_description: impl Into<String>,
    ) -> Self {
        self.meta_title = Some(meta_title.into());
        self.meta_description = Some(meta_description.into());
        self
    }

    pub fn not_discountable(mut self) -> Self {
        self.is_discountable = false;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// Patch data applied when updating an existing product. Unset fields keep
/// their stored value.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateProduct {
    /// Optional title update, `Some(None)` clears it.
    pub title: Option<Option<String>>,
    pub slug: Option<String>,
    pub product_class_id: Option<Option<i32>>,
    pub meta_title: Option<Option<String>>,
    pub meta_description: Option<Option<String>>,
    pub is_discountable: Option<bool>,
    pub is_active: Option<bool>,
    /// Timestamp captured when the patch was created.
    pub updated_at: NaiveDateTime,
}

impl Default for UpdateProduct {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateProduct {
    /// Create a new patch object with no changes applied yet.
    pub fn new() -> Self {
        Self {
            title: None,
            slug: None,
            product_class_id: None,
            meta_title: None,
            meta_description: None,
            is_discountable: None,
            is_active: None,
            updated_at: Local::now().naive_utc(),
        }
    }

    /// Update the title, using `None` to clear an existing value.
    pub fn title(mut self, title: Option<impl Into<String>>) -> Self {
        self.title = Some(title.map(|value| value.into()));
        self
    }

    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Change the product class, using `None` to detach it.
    pub fn product_class(mut self, product_class_id: Option<i32>) -> Self {
        self.product_class_id = Some(product_class_id);
        self
    }

    pub fn meta_title(mut self, meta_title: Option<impl Into<String>>) -> Self {
        self.meta_title = Some(meta_title.map(|value| value.into()));
        self
    }

    pub fn meta_description(mut self, meta_description: Option<impl Into<String>>) -> Self {
        self.meta_description = Some(meta_description.map(|value| value.into()));
        self
    }

    pub fn discountable(mut self, is_discountable: bool) -> Self {
        self.is_discountable = Some(is_discountable);
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }
}

/// Query definition used to list products.
#[derive(Debug, Clone, Default)]
pub struct ProductListQuery {
    /// Only products linked to this category.
    pub category_id: Option<i32>,
    /// Only products of this class.
    pub product_class_id: Option<i32>,
    /// Only variants of this parent product.
    pub parent_id: Option<i32>,
    /// Whether inactive products should be excluded.
    pub active_only: bool,
    /// Optional title or slug search term.
    pub search: Option<String>,
    /// Optional pagination options applied to the query.
    pub pagination: Option<Pagination>,
}

impl ProductListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category_id: i32) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn product_class(mut self, product_class_id: i32) -> Self {
        self.product_class_id = Some(product_class_id);
        self
    }

    pub fn variants_of(mut self, parent_id: i32) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn active_only(mut self) -> Self {
        self.active_only = true;
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Apply pagination to the query with the given page number and page size.
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
