use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};

use crate::domain::category::Category as DomainCategory;
use crate::domain::product::{
    NewProduct as DomainNewProduct, Product as DomainProduct, ProductListQuery,
    UpdateProduct as DomainUpdateProduct,
};
use crate::models::category::Category as DbCategory;
use crate::models::product::{
    NewProduct as DbNewProduct, NewProductCategory, Product as DbProduct,
    UpdateProduct as DbUpdateProduct,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::attribute_value::prune_undeclared_values;
use crate::repository::{
    DieselRepository, ProductReader, ProductWriter, like_pattern, unique_ids,
};
use crate::schema::{product_categories, products};

type BoxedProductQuery<'a> = products::BoxedQuery<'a, Sqlite>;

/// Apply the filters of `query` to a boxed products query.
fn filter_products<'a>(
    mut items: BoxedProductQuery<'a>,
    query: &ProductListQuery,
) -> BoxedProductQuery<'a> {
    if let Some(category_id) = query.category_id {
        let linked = product_categories::table
            .filter(product_categories::category_id.eq(category_id))
            .select(product_categories::product_id);
        items = items.filter(products::id.eq_any(linked));
    }

    if let Some(product_class_id) = query.product_class_id {
        items = items.filter(products::product_class_id.eq(product_class_id));
    }

    if let Some(parent_id) = query.parent_id {
        items = items.filter(products::parent_id.eq(parent_id));
    }

    if query.active_only {
        items = items.filter(products::is_active.eq(true));
    }

    if let Some(term) = query.search.as_ref() {
        let pattern = like_pattern(term);
        items = items.filter(
            products::slug
                .like(pattern.clone())
                .escape('\\')
                .or(products::title.like(pattern).escape('\\')),
        );
    }

    items
}

impl ProductReader for DieselRepository {
    fn get_product_by_id(&self, id: i32) -> RepositoryResult<Option<DomainProduct>> {
        let mut conn = self.conn()?;

        let product = products::table
            .find(id)
            .first::<DbProduct>(&mut conn)
            .optional()?;

        Ok(product.map(Into::into))
    }

    fn get_product_by_slug(&self, slug: &str) -> RepositoryResult<Option<DomainProduct>> {
        let mut conn = self.conn()?;

        let product = products::table
            .filter(products::slug.eq(slug))
            .first::<DbProduct>(&mut conn)
            .optional()?;

        Ok(product.map(Into::into))
    }

    fn list_products(
        &self,
        query: ProductListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainProduct>)> {
        let mut conn = self.conn()?;

        let total = filter_products(products::table.into_boxed(), &query)
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        let mut items = filter_products(products::table.into_boxed(), &query)
            .order((products::created_at.desc(), products::id.desc()));

        if let Some(pagination) = &query.pagination {
            items = items
                .offset(pagination.offset())
                .limit(pagination.limit());
        }

        let db_products = items.load::<DbProduct>(&mut conn)?;

        Ok((total, db_products.into_iter().map(Into::into).collect()))
    }

    fn list_product_categories(&self, product_id: i32) -> RepositoryResult<Vec<DomainCategory>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let rows = product_categories::table
            .inner_join(categories::table)
            .filter(product_categories::product_id.eq(product_id))
            .order(categories::path.asc())
            .select(DbCategory::as_select())
            .load::<DbCategory>(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(&self, new_product: &DomainNewProduct) -> RepositoryResult<DomainProduct> {
        self.create_product_in_categories(new_product, &[])
    }

    fn create_product_in_categories(
        &self,
        new_product: &DomainNewProduct,
        category_ids: &[i32],
    ) -> RepositoryResult<DomainProduct> {
        let mut conn = self.conn()?;

        conn.transaction::<DomainProduct, RepositoryError, _>(|conn| {
            let db_new = DbNewProduct::from(new_product);

            let created = diesel::insert_into(products::table)
                .values(&db_new)
                .get_result::<DbProduct>(conn)?;

            replace_categories(conn, created.id, category_ids)?;

            Ok(created.into())
        })
    }

    fn update_product(
        &self,
        product_id: i32,
        updates: &DomainUpdateProduct,
    ) -> RepositoryResult<DomainProduct> {
        let mut conn = self.conn()?;

        conn.transaction::<DomainProduct, RepositoryError, _>(|conn| {
            let current = products::table.find(product_id).first::<DbProduct>(conn)?;
            let db_updates = DbUpdateProduct::merge(&current, updates);

            let updated = diesel::update(products::table.find(product_id))
                .set(&db_updates)
                .get_result::<DbProduct>(conn)?;

            if updated.product_class_id != current.product_class_id {
                prune_undeclared_values(conn, product_id)?;
            }

            Ok(updated.into())
        })
    }

    fn delete_product(&self, product_id: i32) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        let deleted = diesel::delete(products::table.find(product_id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    fn set_product_categories(
        &self,
        product_id: i32,
        category_ids: &[i32],
    ) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        conn.transaction::<(), RepositoryError, _>(|conn| {
            products::table
                .find(product_id)
                .select(products::id)
                .first::<i32>(conn)?;

            replace_categories(conn, product_id, category_ids)
        })
    }
}

fn replace_categories(
    conn: &mut SqliteConnection,
    product_id: i32,
    category_ids: &[i32],
) -> RepositoryResult<()> {
    diesel::delete(product_categories::table.filter(product_categories::product_id.eq(product_id)))
        .execute(conn)?;

    let links: Vec<NewProductCategory> = unique_ids(category_ids)
        .into_iter()
        .map(|category_id| NewProductCategory {
            product_id,
            category_id,
        })
        .collect();

    if !links.is_empty() {
        diesel::insert_into(product_categories::table)
            .values(&links)
            .execute(conn)?;
    }

    Ok(())
}
