use diesel::prelude::*;

use crate::domain::recommendation::{
    NewProductRecommendation as DomainNewProductRecommendation,
    ProductRecommendation as DomainProductRecommendation,
};
use crate::models::recommendation::{
    NewProductRecommendation as DbNewProductRecommendation,
    ProductRecommendation as DbProductRecommendation,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, RecommendationReader, RecommendationWriter};

impl RecommendationReader for DieselRepository {
    fn list_recommendations(
        &self,
        primary_id: i32,
    ) -> RepositoryResult<Vec<DomainProductRecommendation>> {
        use crate::schema::product_recommendations;

        let mut conn = self.conn()?;

        let rows = product_recommendations::table
            .filter(product_recommendations::primary_id.eq(primary_id))
            .order((
                product_recommendations::ranking.desc(),
                product_recommendations::id.asc(),
            ))
            .load::<DbProductRecommendation>(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

impl RecommendationWriter for DieselRepository {
    fn upsert_recommendation(
        &self,
        recommendation: &DomainNewProductRecommendation,
    ) -> RepositoryResult<DomainProductRecommendation> {
        use crate::schema::product_recommendations;

        let mut conn = self.conn()?;

        conn.transaction::<DomainProductRecommendation, RepositoryError, _>(|conn| {
            diesel::insert_into(product_recommendations::table)
                .values(&DbNewProductRecommendation::from(recommendation))
                .on_conflict((
                    product_recommendations::primary_id,
                    product_recommendations::recommendation_id,
                ))
                .do_update()
                .set(product_recommendations::ranking.eq(recommendation.ranking))
                .execute(conn)?;

            let stored = product_recommendations::table
                .filter(product_recommendations::primary_id.eq(recommendation.primary_id))
                .filter(
                    product_recommendations::recommendation_id
                        .eq(recommendation.recommendation_id),
                )
                .first::<DbProductRecommendation>(conn)?;

            Ok(stored.into())
        })
    }

    fn delete_recommendation(&self, primary_id: i32, recommendation_id: i32) -> RepositoryResult<()> {
        use crate::schema::product_recommendations;

        let mut conn = self.conn()?;

        let deleted = diesel::delete(
            product_recommendations::table
                .filter(product_recommendations::primary_id.eq(primary_id))
                .filter(product_recommendations::recommendation_id.eq(recommendation_id)),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
