use std::collections::{HashMap, HashSet};

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::attribute::{
    AttributeValue, AttributeValueError, ProductAttribute as DomainProductAttribute,
    ProductAttributeValue as DomainProductAttributeValue, RawAttributeValue, check_required,
    coerce_value,
};
use crate::domain::option::OptionGroupValue as DomainOptionGroupValue;
use crate::models::attribute::{
    AttributeValueChangeset, NewAttributeValueOption, NewProductAttributeValue,
    ProductAttribute as DbProductAttribute, ProductAttributeValue as DbProductAttributeValue,
};
use crate::models::option::OptionGroupValue as DbOptionGroupValue;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{AttributeValueReader, AttributeValueWriter, DieselRepository};

impl AttributeValueReader for DieselRepository {
    fn list_product_attributes(
        &self,
        product_id: i32,
    ) -> RepositoryResult<Vec<DomainProductAttribute>> {
        let mut conn = self.conn()?;

        load_product_attributes(&mut conn, product_id)
    }

    fn get_attribute_value(
        &self,
        product_id: i32,
        attribute_id: i32,
    ) -> RepositoryResult<Option<AttributeValue>> {
        use crate::schema::product_attribute_values as pav;

        let mut conn = self.conn()?;

        let attribute = load_product_attribute(&mut conn, product_id, attribute_id)?;

        let row = pav::table
            .filter(pav::product_id.eq(product_id))
            .filter(pav::attribute_id.eq(attribute_id))
            .first::<DbProductAttributeValue>(&mut conn)
            .optional()?;

        let value = match row {
            Some(row) => {
                let mut options = load_value_options(&mut conn, std::slice::from_ref(&row))?;
                decode_row(&row, &attribute, options.remove(&row.id).unwrap_or_default())
            }
            None => None,
        };

        if value.is_none() && attribute.required {
            return Err(AttributeValueError::MissingRequiredValue(vec![attribute.title]).into());
        }

        Ok(value)
    }

    fn list_attribute_values(
        &self,
        product_id: i32,
    ) -> RepositoryResult<Vec<DomainProductAttributeValue>> {
        let mut conn = self.conn()?;

        let (_, values) = load_product_values(&mut conn, product_id)?;

        Ok(values)
    }

    fn validate_product(&self, product_id: i32) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        let (attributes, values) = load_product_values(&mut conn, product_id)?;
        let present: HashSet<i32> = values.iter().map(|value| value.attribute.id).collect();

        check_required(&attributes, &present)?;

        Ok(())
    }
}

impl AttributeValueWriter for DieselRepository {
    fn set_attribute_value(
        &self,
        product_id: i32,
        attribute_id: i32,
        raw: RawAttributeValue,
    ) -> RepositoryResult<Option<AttributeValue>> {
        let mut conn = self.conn()?;

        conn.immediate_transaction::<Option<AttributeValue>, RepositoryError, _>(|conn| {
            store_value(conn, product_id, attribute_id, raw)
        })
    }

    fn set_attribute_values(
        &self,
        product_id: i32,
        values: Vec<(i32, RawAttributeValue)>,
    ) -> RepositoryResult<Vec<DomainProductAttributeValue>> {
        let mut conn = self.conn()?;

        conn.immediate_transaction::<Vec<DomainProductAttributeValue>, RepositoryError, _>(
            |conn| {
                for (attribute_id, raw) in values {
                    store_value(conn, product_id, attribute_id, raw)?;
                }

                let (attributes, stored) = load_product_values(conn, product_id)?;
                let present: HashSet<i32> = stored.iter().map(|value| value.attribute.id).collect();
                check_required(&attributes, &present)?;

                Ok(stored)
            },
        )
    }
}

/// Check `raw` against the attribute and write it, replacing any previous
/// value. An empty optional value removes the row.
fn store_value(
    conn: &mut SqliteConnection,
    product_id: i32,
    attribute_id: i32,
    raw: RawAttributeValue,
) -> RepositoryResult<Option<AttributeValue>> {
    use crate::schema::{option_group_values, product_attribute_value_options as pavo};
    use crate::schema::product_attribute_values as pav;

    let attribute = load_product_attribute(conn, product_id, attribute_id)?;

    let group_values: Vec<DomainOptionGroupValue> = match attribute.option_group_id {
        Some(group_id) => option_group_values::table
            .filter(option_group_values::group_id.eq(group_id))
            .order(option_group_values::id.asc())
            .load::<DbOptionGroupValue>(conn)?
            .into_iter()
            .map(Into::into)
            .collect(),
        None => Vec::new(),
    };

    let Some(value) = coerce_value(&attribute, raw, &group_values)? else {
        let cleared = diesel::delete(
            pav::table
                .filter(pav::product_id.eq(product_id))
                .filter(pav::attribute_id.eq(attribute_id)),
        )
        .execute(conn)?;
        if cleared > 0 {
            log::debug!("Cleared `{}` of product {product_id}", attribute.title);
        }
        return Ok(None);
    };

    diesel::insert_into(pav::table)
        .values(&NewProductAttributeValue::new(product_id, attribute_id, &value))
        .on_conflict((pav::product_id, pav::attribute_id))
        .do_update()
        .set(&AttributeValueChangeset::from(&value))
        .execute(conn)?;

    let value_id = pav::table
        .filter(pav::product_id.eq(product_id))
        .filter(pav::attribute_id.eq(attribute_id))
        .select(pav::id)
        .first::<i32>(conn)?;

    // Multi option members are replaced as a whole, never merged.
    diesel::delete(pavo::table.filter(pavo::attribute_value_id.eq(value_id))).execute(conn)?;

    if let AttributeValue::MultiOption(members) = &value {
        let links: Vec<NewAttributeValueOption> = members
            .iter()
            .enumerate()
            .map(|(position, member)| NewAttributeValueOption {
                attribute_value_id: value_id,
                option_value_id: member.id,
                position: position as i32,
            })
            .collect();

        if !links.is_empty() {
            diesel::insert_into(pavo::table)
                .values(&links)
                .execute(conn)?;
        }
    }

    Ok(Some(value))
}

/// Delete the values of the product, and of its variants that inherit its
/// class, whose attribute the effective class no longer declares. Returns
/// the number of removed rows.
pub(super) fn prune_undeclared_values(
    conn: &mut SqliteConnection,
    product_id: i32,
) -> RepositoryResult<usize> {
    use crate::schema::product_attribute_values as pav;
    use crate::schema::{product_attributes, products};

    let mut affected = vec![product_id];
    affected.extend(
        products::table
            .filter(products::parent_id.eq(product_id))
            .filter(products::product_class_id.is_null())
            .select(products::id)
            .load::<i32>(conn)?,
    );

    let mut pruned = 0;
    for id in affected {
        pruned += match effective_class_id(conn, id)? {
            Some(class_id) => {
                let declared = product_attributes::table
                    .filter(product_attributes::product_class_id.eq(class_id))
                    .select(product_attributes::id)
                    .load::<i32>(conn)?;
                diesel::delete(
                    pav::table
                        .filter(pav::product_id.eq(id))
                        .filter(pav::attribute_id.ne_all(declared)),
                )
                .execute(conn)?
            }
            None => diesel::delete(pav::table.filter(pav::product_id.eq(id))).execute(conn)?,
        };
    }

    if pruned > 0 {
        log::debug!("Removed {pruned} values left by the previous class of product {product_id}");
    }

    Ok(pruned)
}

/// Class whose attributes apply to the product: its own, or its parent's
/// when the product is a variant without one.
fn effective_class_id(conn: &mut SqliteConnection, product_id: i32) -> RepositoryResult<Option<i32>> {
    use crate::schema::products;

    let (class_id, parent_id) = products::table
        .find(product_id)
        .select((products::product_class_id, products::parent_id))
        .first::<(Option<i32>, Option<i32>)>(conn)?;

    match (class_id, parent_id) {
        (Some(class_id), _) => Ok(Some(class_id)),
        (None, Some(parent_id)) => {
            let parent_class = products::table
                .find(parent_id)
                .select(products::product_class_id)
                .first::<Option<i32>>(conn)?;
            Ok(parent_class)
        }
        (None, None) => Ok(None),
    }
}

fn load_product_attributes(
    conn: &mut SqliteConnection,
    product_id: i32,
) -> RepositoryResult<Vec<DomainProductAttribute>> {
    use crate::schema::product_attributes;

    let Some(class_id) = effective_class_id(conn, product_id)? else {
        return Ok(Vec::new());
    };

    let rows = product_attributes::table
        .filter(product_attributes::product_class_id.eq(class_id))
        .order(product_attributes::id.asc())
        .load::<DbProductAttribute>(conn)?;

    rows.into_iter()
        .map(|row| DomainProductAttribute::try_from(row).map_err(Into::into))
        .collect()
}

/// Load the attribute, failing with `NotFound` unless it is declared by the
/// product's effective class.
fn load_product_attribute(
    conn: &mut SqliteConnection,
    product_id: i32,
    attribute_id: i32,
) -> RepositoryResult<DomainProductAttribute> {
    use crate::schema::product_attributes;

    let class_id = effective_class_id(conn, product_id)?;

    let row = product_attributes::table
        .find(attribute_id)
        .first::<DbProductAttribute>(conn)?;

    if class_id != Some(row.product_class_id) {
        return Err(RepositoryError::NotFound);
    }

    Ok(DomainProductAttribute::try_from(row)?)
}

/// Option values referenced by each value row, keyed by row id. Multi
/// option members come back in stored position order.
fn load_value_options(
    conn: &mut SqliteConnection,
    rows: &[DbProductAttributeValue],
) -> RepositoryResult<HashMap<i32, Vec<DomainOptionGroupValue>>> {
    use crate::schema::{option_group_values, product_attribute_value_options as pavo};

    let mut by_row: HashMap<i32, Vec<DomainOptionGroupValue>> = HashMap::new();

    let option_ids: Vec<i32> = rows.iter().filter_map(|row| row.value_option_id).collect();
    if !option_ids.is_empty() {
        let values: HashMap<i32, DomainOptionGroupValue> = option_group_values::table
            .filter(option_group_values::id.eq_any(option_ids))
            .load::<DbOptionGroupValue>(conn)?
            .into_iter()
            .map(|value| (value.id, value.into()))
            .collect();
        for row in rows {
            if let Some(value) = row.value_option_id.and_then(|id| values.get(&id)) {
                by_row.entry(row.id).or_default().push(value.clone());
            }
        }
    }

    let row_ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
    let members = pavo::table
        .inner_join(option_group_values::table)
        .filter(pavo::attribute_value_id.eq_any(row_ids))
        .order((pavo::attribute_value_id.asc(), pavo::position.asc()))
        .select((pavo::attribute_value_id, DbOptionGroupValue::as_select()))
        .load::<(i32, DbOptionGroupValue)>(conn)?;
    for (row_id, value) in members {
        by_row.entry(row_id).or_default().push(value.into());
    }

    Ok(by_row)
}

fn decode_row(
    row: &DbProductAttributeValue,
    attribute: &DomainProductAttribute,
    options: Vec<DomainOptionGroupValue>,
) -> Option<AttributeValue> {
    let value = row.decode(attribute, options);
    if value.is_none() {
        log::warn!(
            "Stored value {} does not match the {} type of `{}`",
            row.id,
            attribute.attribute_type,
            attribute.title
        );
    }
    value
}

/// Attributes of the effective class and every decodable value the product
/// holds for them, in attribute order.
fn load_product_values(
    conn: &mut SqliteConnection,
    product_id: i32,
) -> RepositoryResult<(Vec<DomainProductAttribute>, Vec<DomainProductAttributeValue>)> {
    use crate::schema::product_attribute_values as pav;

    let attributes = load_product_attributes(conn, product_id)?;

    let rows = pav::table
        .filter(pav::product_id.eq(product_id))
        .load::<DbProductAttributeValue>(conn)?;
    let mut options = load_value_options(conn, &rows)?;
    let mut rows: HashMap<i32, DbProductAttributeValue> =
        rows.into_iter().map(|row| (row.attribute_id, row)).collect();

    let mut values = Vec::with_capacity(rows.len());
    for attribute in &attributes {
        let Some(row) = rows.remove(&attribute.id) else {
            continue;
        };
        let members = options.remove(&row.id).unwrap_or_default();
        if let Some(value) = decode_row(&row, attribute, members) {
            values.push(DomainProductAttributeValue {
                id: row.id,
                product_id,
                attribute: attribute.clone(),
                value,
            });
        }
    }

    for row in rows.values() {
        log::warn!(
            "Product {product_id} holds value {} for attribute {} outside its class",
            row.id,
            row.attribute_id
        );
    }

    Ok((attributes, values))
}
