use diesel::prelude::*;

use crate::domain::recommendation::{
    NewProductRecommendation as DomainNewProductRecommendation,
    ProductRecommendation as DomainProductRecommendation,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::product_recommendations)]
pub struct ProductRecommendation {
    pub id: i32,
    pub primary_id: i32,
    pub recommendation_id: i32,
    pub ranking: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_recommendations)]
pub struct NewProductRecommendation {
    pub primary_id: i32,
    pub recommendation_id: i32,
    pub ranking: i32,
}

impl From<ProductRecommendation> for DomainProductRecommendation {
    fn from(value: ProductRecommendation) -> Self {
        Self {
            id: value.id,
            primary_id: value.primary_id,
            recommendation_id: value.recommendation_id,
            ranking: value.ranking,
        }
    }
}

impl From<&DomainNewProductRecommendation> for NewProductRecommendation {
    fn from(value: &DomainNewProductRecommendation) -> Self {
        Self {
            primary_id: value.primary_id,
            recommendation_id: value.recommendation_id,
            ranking: value.ranking,
        }
    }
}
