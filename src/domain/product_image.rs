use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Image reference attached to a product. The binary lives in the media
/// store; only its location and dimensions are kept here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: i32,
    pub product_id: i32,
    /// Media store location of the image.
    pub image: String,
    pub width: i32,
    pub height: i32,
    /// Position among the product's images, dense from zero.
    pub display_order: i32,
    pub created_at: NaiveDateTime,
}

/// Payload for appending an image to a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProductImage {
    pub product_id: i32,
    pub image: String,
    pub width: i32,
    pub height: i32,
}

impl NewProductImage {
    pub fn new(product_id: i32, image: impl Into<String>, width: i32, height: i32) -> Self {
        Self {
            product_id,
            image: image.into(),
            width,
            height,
        }
    }
}
