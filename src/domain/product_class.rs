use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Grouping of products sharing attribute declarations, e.g. Books or DVDs.
/// A product belongs to at most one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductClass {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    /// Digital products usually don't track stock.
    pub track_stock: bool,
    /// Digital products usually don't need shipping.
    pub require_shipping: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload required to insert a new product class.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProductClass {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub track_stock: bool,
    pub require_shipping: bool,
    pub updated_at: NaiveDateTime,
}

impl NewProductClass {
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            description: None,
            track_stock: true,
            require_shipping: true,
            updated_at: Local::now().naive_utc(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the class as digital: no stock tracking and no shipping.
    pub fn digital(mut self) -> Self {
        self.track_stock = false;
        self.require_shipping = false;
        self
    }
}
