use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product_image::{
    NewProductImage as DomainNewProductImage, ProductImage as DomainProductImage,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::product_images)]
pub struct ProductImage {
    pub id: i32,
    pub product_id: i32,
    pub image: String,
    pub width: i32,
    pub height: i32,
    pub display_order: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_images)]
pub struct NewProductImage<'a> {
    pub product_id: i32,
    pub image: &'a str,
    pub width: i32,
    pub height: i32,
    pub display_order: i32,
}

impl<'a> NewProductImage<'a> {
    pub fn at_position(value: &'a DomainNewProductImage, display_order: i32) -> Self {
        Self {
            product_id: value.product_id,
            image: value.image.as_str(),
            width: value.width,
            height: value.height,
            display_order,
        }
    }
}

impl From<ProductImage> for DomainProductImage {
    fn from(value: ProductImage) -> Self {
        Self {
            id: value.id,
            product_id: value.product_id,
            image: value.image,
            width: value.width,
            height: value.height,
            display_order: value.display_order,
            created_at: value.created_at,
        }
    }
}
