use serde::{Deserialize, Serialize};

/// Ranked recommendation of one product from another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecommendation {
    pub id: i32,
    pub primary_id: i32,
    pub recommendation_id: i32,
    /// Higher ranks are listed first.
    pub ranking: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProductRecommendation {
    pub primary_id: i32,
    pub recommendation_id: i32,
    pub ranking: i32,
}

impl NewProductRecommendation {
    pub fn new(primary_id: i32, recommendation_id: i32, ranking: i32) -> Self {
        Self {
            primary_id,
            recommendation_id,
            ranking,
        }
    }
}
