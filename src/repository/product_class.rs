use diesel::prelude::*;

use crate::domain::attribute::{
    NewProductAttribute as DomainNewProductAttribute, ProductAttribute as DomainProductAttribute,
};
use crate::domain::option::ProductOption as DomainProductOption;
use crate::domain::product_class::{
    NewProductClass as DomainNewProductClass, ProductClass as DomainProductClass,
};
use crate::models::attribute::{
    NewProductAttribute as DbNewProductAttribute, ProductAttribute as DbProductAttribute,
};
use crate::models::option::ProductOption as DbProductOption;
use crate::models::product_class::{
    NewProductClass as DbNewProductClass, NewProductClassOption, ProductClass as DbProductClass,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, ProductClassReader, ProductClassWriter, unique_ids};

impl ProductClassReader for DieselRepository {
    fn get_product_class_by_id(&self, id: i32) -> RepositoryResult<Option<DomainProductClass>> {
        use crate::schema::product_classes;

        let mut conn = self.conn()?;

        let product_class = product_classes::table
            .find(id)
            .first::<DbProductClass>(&mut conn)
            .optional()?;

        Ok(product_class.map(Into::into))
    }

    fn list_product_classes(&self) -> RepositoryResult<Vec<DomainProductClass>> {
        use crate::schema::product_classes;

        let mut conn = self.conn()?;

        let classes = product_classes::table
            .order(product_classes::title.asc())
            .load::<DbProductClass>(&mut conn)?;

        Ok(classes.into_iter().map(Into::into).collect())
    }

    fn get_attribute_by_id(
        &self,
        attribute_id: i32,
    ) -> RepositoryResult<Option<DomainProductAttribute>> {
        use crate::schema::product_attributes;

        let mut conn = self.conn()?;

        let attribute = product_attributes::table
            .find(attribute_id)
            .first::<DbProductAttribute>(&mut conn)
            .optional()?;

        Ok(attribute.map(DomainProductAttribute::try_from).transpose()?)
    }

    fn list_class_attributes(
        &self,
        product_class_id: i32,
    ) -> RepositoryResult<Vec<DomainProductAttribute>> {
        use crate::schema::product_attributes;

        let mut conn = self.conn()?;

        let attributes = product_attributes::table
            .filter(product_attributes::product_class_id.eq(product_class_id))
            .order(product_attributes::id.asc())
            .load::<DbProductAttribute>(&mut conn)?;

        attributes
            .into_iter()
            .map(|attribute| DomainProductAttribute::try_from(attribute).map_err(Into::into))
            .collect()
    }

    fn list_class_options(
        &self,
        product_class_id: i32,
    ) -> RepositoryResult<Vec<DomainProductOption>> {
        use crate::schema::{options, product_class_options};

        let mut conn = self.conn()?;

        let class_options = product_class_options::table
            .inner_join(options::table)
            .filter(product_class_options::product_class_id.eq(product_class_id))
            .order(options::title.asc())
            .select(DbProductOption::as_select())
            .load::<DbProductOption>(&mut conn)?;

        class_options
            .into_iter()
            .map(|option| DomainProductOption::try_from(option).map_err(Into::into))
            .collect()
    }
}

impl ProductClassWriter for DieselRepository {
    fn create_product_class(
        &self,
        new_class: &DomainNewProductClass,
    ) -> RepositoryResult<DomainProductClass> {
        use crate::schema::product_classes;

        let mut conn = self.conn()?;

        let db_new = DbNewProductClass::from(new_class);

        let created = diesel::insert_into(product_classes::table)
            .values(&db_new)
            .get_result::<DbProductClass>(&mut conn)?;

        Ok(created.into())
    }

    fn delete_product_class(&self, product_class_id: i32) -> RepositoryResult<()> {
        use crate::schema::product_classes;

        let mut conn = self.conn()?;

        let deleted =
            diesel::delete(product_classes::table.find(product_class_id)).execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    fn create_attribute(
        &self,
        new_attribute: &DomainNewProductAttribute,
    ) -> RepositoryResult<DomainProductAttribute> {
        use crate::schema::product_attributes;

        new_attribute.check()?;

        let mut conn = self.conn()?;

        let db_new = DbNewProductAttribute::from(new_attribute);

        let created = diesel::insert_into(product_attributes::table)
            .values(&db_new)
            .get_result::<DbProductAttribute>(&mut conn)?;

        Ok(DomainProductAttribute::try_from(created)?)
    }

    fn delete_attribute(&self, attribute_id: i32) -> RepositoryResult<()> {
        use crate::schema::product_attributes;

        let mut conn = self.conn()?;

        let deleted =
            diesel::delete(product_attributes::table.find(attribute_id)).execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    fn set_class_options(&self, product_class_id: i32, option_ids: &[i32]) -> RepositoryResult<()> {
        use crate::schema::{product_class_options, product_classes};

        let mut conn = self.conn()?;

        conn.transaction::<(), RepositoryError, _>(|conn| {
            product_classes::table
                .find(product_class_id)
                .select(product_classes::id)
                .first::<i32>(conn)?;

            diesel::delete(
                product_class_options::table
                    .filter(product_class_options::product_class_id.eq(product_class_id)),
            )
            .execute(conn)?;

            let links: Vec<NewProductClassOption> = unique_ids(option_ids)
                .into_iter()
                .map(|option_id| NewProductClassOption {
                    product_class_id,
                    option_id,
                })
                .collect();

            if !links.is_empty() {
                diesel::insert_into(product_class_options::table)
                    .values(&links)
                    .execute(conn)?;
            }

            Ok(())
        })
    }
}
