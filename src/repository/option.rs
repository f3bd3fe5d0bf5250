use diesel::prelude::*;

use crate::domain::option::{
    NewOptionGroup as DomainNewOptionGroup, NewProductOption as DomainNewProductOption,
    OptionGroup as DomainOptionGroup, OptionGroupValue as DomainOptionGroupValue,
    ProductOption as DomainProductOption,
};
use crate::models::option::{
    NewOptionGroup as DbNewOptionGroup, NewOptionGroupValue as DbNewOptionGroupValue,
    NewProductOption as DbNewProductOption, NewProductOptionLink,
    OptionGroup as DbOptionGroup, OptionGroupValue as DbOptionGroupValue,
    ProductOption as DbProductOption,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, OptionReader, OptionWriter, unique_ids};

impl OptionReader for DieselRepository {
    fn get_option_group_by_id(&self, group_id: i32) -> RepositoryResult<Option<DomainOptionGroup>> {
        use crate::schema::option_groups;

        let mut conn = self.conn()?;

        let group = option_groups::table
            .find(group_id)
            .first::<DbOptionGroup>(&mut conn)
            .optional()?;

        Ok(group.map(Into::into))
    }

    fn list_option_groups(&self) -> RepositoryResult<Vec<DomainOptionGroup>> {
        use crate::schema::option_groups;

        let mut conn = self.conn()?;

        let groups = option_groups::table
            .order(option_groups::title.asc())
            .load::<DbOptionGroup>(&mut conn)?;

        Ok(groups.into_iter().map(Into::into).collect())
    }

    fn list_option_group_values(
        &self,
        group_id: i32,
    ) -> RepositoryResult<Vec<DomainOptionGroupValue>> {
        use crate::schema::option_group_values;

        let mut conn = self.conn()?;

        let values = option_group_values::table
            .filter(option_group_values::group_id.eq(group_id))
            .order(option_group_values::id.asc())
            .load::<DbOptionGroupValue>(&mut conn)?;

        Ok(values.into_iter().map(Into::into).collect())
    }

    fn list_options(&self) -> RepositoryResult<Vec<DomainProductOption>> {
        use crate::schema::options;

        let mut conn = self.conn()?;

        let rows = options::table
            .order(options::title.asc())
            .load::<DbProductOption>(&mut conn)?;

        rows.into_iter()
            .map(|option| DomainProductOption::try_from(option).map_err(Into::into))
            .collect()
    }

    fn list_product_options(&self, product_id: i32) -> RepositoryResult<Vec<DomainProductOption>> {
        use crate::schema::{options, product_options};

        let mut conn = self.conn()?;

        let rows = product_options::table
            .inner_join(options::table)
            .filter(product_options::product_id.eq(product_id))
            .order(options::title.asc())
            .select(DbProductOption::as_select())
            .load::<DbProductOption>(&mut conn)?;

        rows.into_iter()
            .map(|option| DomainProductOption::try_from(option).map_err(Into::into))
            .collect()
    }
}

impl OptionWriter for DieselRepository {
    fn create_option_group(
        &self,
        new_group: &DomainNewOptionGroup,
    ) -> RepositoryResult<DomainOptionGroup> {
        use crate::schema::{option_group_values, option_groups};

        let mut conn = self.conn()?;

        conn.transaction::<DomainOptionGroup, RepositoryError, _>(|conn| {
            let group = diesel::insert_into(option_groups::table)
                .values(&DbNewOptionGroup {
                    title: new_group.title.as_str(),
                })
                .get_result::<DbOptionGroup>(conn)?;

            for title in &new_group.values {
                diesel::insert_into(option_group_values::table)
                    .values(&DbNewOptionGroupValue {
                        group_id: group.id,
                        title: title.as_str(),
                    })
                    .execute(conn)?;
            }

            Ok(group.into())
        })
    }

    fn add_option_group_value(
        &self,
        group_id: i32,
        title: &str,
    ) -> RepositoryResult<DomainOptionGroupValue> {
        use crate::schema::option_group_values;

        let mut conn = self.conn()?;

        let value = diesel::insert_into(option_group_values::table)
            .values(&DbNewOptionGroupValue { group_id, title })
            .get_result::<DbOptionGroupValue>(&mut conn)?;

        Ok(value.into())
    }

    fn create_option(
        &self,
        new_option: &DomainNewProductOption,
    ) -> RepositoryResult<DomainProductOption> {
        use crate::schema::options;

        new_option.check()?;

        let mut conn = self.conn()?;

        let created = diesel::insert_into(options::table)
            .values(&DbNewProductOption::from(new_option))
            .get_result::<DbProductOption>(&mut conn)?;

        Ok(DomainProductOption::try_from(created)?)
    }

    fn set_product_options(&self, product_id: i32, option_ids: &[i32]) -> RepositoryResult<()> {
        use crate::schema::{product_options, products};

        let mut conn = self.conn()?;

        conn.transaction::<(), RepositoryError, _>(|conn| {
            products::table
                .find(product_id)
                .select(products::id)
                .first::<i32>(conn)?;

            diesel::delete(product_options::table.filter(product_options::product_id.eq(product_id)))
                .execute(conn)?;

            let links: Vec<NewProductOptionLink> = unique_ids(option_ids)
                .into_iter()
                .map(|option_id| NewProductOptionLink {
                    product_id,
                    option_id,
                })
                .collect();

            if !links.is_empty() {
                diesel::insert_into(product_options::table)
                    .values(&links)
                    .execute(conn)?;
            }

            Ok(())
        })
    }
}
