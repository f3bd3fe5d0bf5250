use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product_class::{
    NewProductClass as DomainNewProductClass, ProductClass as DomainProductClass,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::product_classes)]
pub struct ProductClass {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub track_stock: bool,
    pub require_shipping: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_classes)]
pub struct NewProductClass<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub description: Option<&'a str>,
    pub track_stock: bool,
    pub require_shipping: bool,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_class_options)]
pub struct NewProductClassOption {
    pub product_class_id: i32,
    pub option_id: i32,
}

impl From<ProductClass> for DomainProductClass {
    fn from(value: ProductClass) -> Self {
        Self {
            id: value.id,
            title: value.title,
            slug: value.slug,
            description: value.description,
            track_stock: value.track_stock,
            require_shipping: value.require_shipping,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewProductClass> for NewProductClass<'a> {
    fn from(value: &'a DomainNewProductClass) -> Self {
        Self {
            title: value.title.as_str(),
            slug: value.slug.as_str(),
            description: value.description.as_deref(),
            track_stock: value.track_stock,
            require_shipping: value.require_shipping,
            updated_at: value.updated_at,
        }
    }
}
