use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product::{
    NewProduct as DomainNewProduct, Product as DomainProduct, UpdateProduct as DomainUpdateProduct,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: i32,
    pub parent_id: Option<i32>,
    pub product_class_id: Option<i32>,
    pub title: Option<String>,
    pub slug: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub is_discountable: bool,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProduct<'a> {
    pub parent_id: Option<i32>,
    pub product_class_id: Option<i32>,
    pub title: Option<&'a str>,
    pub slug: &'a str,
    pub meta_title: Option<&'a str>,
    pub meta_description: Option<&'a str>,
    pub is_discountable: bool,
    pub is_active: bool,
    pub updated_at: NaiveDateTime,
}

/// Fully resolved product row written back on update.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::products)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateProduct<'a> {
    pub title: Option<&'a str>,
    pub slug: &'a str,
    pub product_class_id: Option<i32>,
    pub meta_title: Option<&'a str>,
    pub meta_description: Option<&'a str>,
    pub is_discountable: bool,
    pub is_active: bool,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_categories)]
pub struct NewProductCategory {
    pub product_id: i32,
    pub category_id: i32,
}

impl From<Product> for DomainProduct {
    fn from(value: Product) -> Self {
        Self {
            id: value.id,
            parent_id: value.parent_id,
            product_class_id: value.product_class_id,
            title: value.title,
            slug: value.slug,
            meta_title: value.meta_title,
            meta_description: value.meta_description,
            is_discountable: value.is_discountable,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewProduct> for NewProduct<'a> {
    fn from(value: &'a DomainNewProduct) -> Self {
        Self {
            parent_id: value.parent_id,
            product_class_id: value.product_class_id,
            title: value.title.as_deref(),
            slug: value.slug.as_str(),
            meta_title: value.meta_title.as_deref(),
            meta_description: value.meta_description.as_deref(),
            is_discountable: value.is_discountable,
            is_active: value.is_active,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> UpdateProduct<'a> {
    /// Merge the patch over the current row.
    pub fn merge(current: &'a Product, patch: &'a DomainUpdateProduct) -> Self {
        Self {
            title: match &patch.title {
                Some(title) => title.as_deref(),
                None => current.title.as_deref(),
            },
            slug: patch.slug.as_deref().unwrap_or(current.slug.as_str()),
            product_class_id: patch.product_class_id.unwrap_or(current.product_class_id),
            meta_title: match &patch.meta_title {
                Some(meta_title) => meta_title.as_deref(),
                None => current.meta_title.as_deref(),
            },
            meta_description: match &patch.meta_description {
                Some(meta_description) => meta_description.as_deref(),
                None => current.meta_description.as_deref(),
            },
            is_discountable: patch.is_discountable.unwrap_or(current.is_discountable),
            is_active: patch.is_active.unwrap_or(current.is_active),
            updated_at: patch.updated_at,
        }
    }
}
