use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::product_image::{
    NewProductImage as DomainNewProductImage, ProductImage as DomainProductImage,
};
use crate::models::product_image::{
    NewProductImage as DbNewProductImage, ProductImage as DbProductImage,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, ProductImageReader, ProductImageWriter};

impl ProductImageReader for DieselRepository {
    fn list_product_images(&self, product_id: i32) -> RepositoryResult<Vec<DomainProductImage>> {
        let mut conn = self.conn()?;

        let images = load_images(&mut conn, product_id)?;

        Ok(images.into_iter().map(Into::into).collect())
    }

    fn get_main_image(&self, product_id: i32) -> RepositoryResult<Option<DomainProductImage>> {
        use crate::schema::product_images;

        let mut conn = self.conn()?;

        let image = product_images::table
            .filter(product_images::product_id.eq(product_id))
            .order((product_images::display_order.asc(), product_images::id.asc()))
            .first::<DbProductImage>(&mut conn)
            .optional()?;

        Ok(image.map(Into::into))
    }
}

impl ProductImageWriter for DieselRepository {
    fn add_product_image(
        &self,
        new_image: &DomainNewProductImage,
    ) -> RepositoryResult<DomainProductImage> {
        use crate::schema::product_images;

        let mut conn = self.conn()?;

        conn.immediate_transaction::<DomainProductImage, RepositoryError, _>(|conn| {
            let count = product_images::table
                .filter(product_images::product_id.eq(new_image.product_id))
                .count()
                .get_result::<i64>(conn)?;

            let created = diesel::insert_into(product_images::table)
                .values(&DbNewProductImage::at_position(new_image, count as i32))
                .get_result::<DbProductImage>(conn)?;

            Ok(created.into())
        })
    }

    fn delete_product_image(&self, image_id: i32) -> RepositoryResult<()> {
        use crate::schema::product_images;

        let mut conn = self.conn()?;

        conn.immediate_transaction::<(), RepositoryError, _>(|conn| {
            let image = product_images::table
                .find(image_id)
                .first::<DbProductImage>(conn)?;

            diesel::delete(product_images::table.find(image_id)).execute(conn)?;

            let renumbered = renumber_images(conn, image.product_id)?;
            log::debug!(
                "Deleted image {image_id} of product {}, renumbered {renumbered}",
                image.product_id
            );

            Ok(())
        })
    }
}

fn load_images(
    conn: &mut SqliteConnection,
    product_id: i32,
) -> RepositoryResult<Vec<DbProductImage>> {
    use crate::schema::product_images;

    let images = product_images::table
        .filter(product_images::product_id.eq(product_id))
        .order((product_images::display_order.asc(), product_images::id.asc()))
        .load::<DbProductImage>(conn)?;

    Ok(images)
}

/// Close gaps so display orders run `0..n-1`. Returns the rows that moved.
fn renumber_images(conn: &mut SqliteConnection, product_id: i32) -> RepositoryResult<usize> {
    use crate::schema::product_images;

    let mut moved = 0;
    for (position, image) in load_images(conn, product_id)?.into_iter().enumerate() {
        let position = position as i32;
        if image.display_order != position {
            diesel::update(product_images::table.find(image.id))
                .set(product_images::display_order.eq(position))
                .execute(conn)?;
            moved += 1;
        }
    }

    Ok(moved)
}
