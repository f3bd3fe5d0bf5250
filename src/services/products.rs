use std::collections::HashMap;

use serde::Deserialize;
use validator::Validate;

use crate::domain::attribute::{ProductAttribute, ProductAttributeValue};
use crate::domain::product::{Product, ProductListQuery};
use crate::forms::products::{AddProductForm, AttributeValuesForm, EditProductForm};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{AttributeValueReader, AttributeValueWriter, ProductReader, ProductWriter};
use crate::services::{ServiceError, ServiceResult};

/// Query parameters accepted by the product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    pub search: Option<String>,
    pub category_id: Option<i32>,
    /// Page requested by the caller (1-based).
    pub page: Option<usize>,
    /// Whether inactive products should be included.
    #[serde(default)]
    pub show_inactive: bool,
}

/// Loads one page of products.
pub fn load_products<R>(repo: &R, query: ProductsQuery) -> ServiceResult<Paginated<Product>>
where
    R: ProductReader + ?Sized,
{
    let page = query.page.unwrap_or(1);
    let mut list_query = ProductListQuery::new().paginate(page, DEFAULT_ITEMS_PER_PAGE);

    if let Some(search) = query.search.as_ref() {
        list_query = list_query.search(search);
    }
    if let Some(category_id) = query.category_id {
        list_query = list_query.category(category_id);
    }
    if !query.show_inactive {
        list_query = list_query.active_only();
    }

    let (total, items) = repo.list_products(list_query).map_err(ServiceError::from)?;

    Ok(Paginated::new(items, page, DEFAULT_ITEMS_PER_PAGE, total))
}

/// Creates a product and links it to the submitted categories.
pub fn create_product<R>(repo: &R, form: AddProductForm) -> ServiceResult<Product>
where
    R: ProductWriter + ?Sized,
{
    let payload = form
        .into_new_product()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let product = repo
        .create_product_in_categories(&payload.product, &payload.category_ids)
        .map_err(ServiceError::from)?;

    log::info!("Created product {} ({})", product.id, product.slug);

    Ok(product)
}

pub fn modify_product<R>(repo: &R, form: EditProductForm) -> ServiceResult<Product>
where
    R: ProductWriter + ?Sized,
{
    let payload = form
        .into_update_product()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.update_product(payload.product_id, &payload.update)
        .map_err(ServiceError::from)
}

/// Applies every submitted value to the product, then checks that all
/// required attributes hold a value. Either every value is stored or none
/// is. Returns the product's stored values.
pub fn assign_attribute_values<R>(
    repo: &R,
    product_id: i32,
    form: AttributeValuesForm,
) -> ServiceResult<Vec<ProductAttributeValue>>
where
    R: AttributeValueReader + AttributeValueWriter + ?Sized,
{
    form.validate()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let attributes: HashMap<i32, ProductAttribute> = repo
        .list_product_attributes(product_id)
        .map_err(ServiceError::from)?
        .into_iter()
        .map(|attribute| (attribute.id, attribute))
        .collect();

    let mut entries = Vec::with_capacity(form.values.len());
    for entry in form.values {
        let attribute = attributes
            .get(&entry.attribute_id)
            .ok_or(ServiceError::NotFound)?;
        let raw = entry
            .into_raw(attribute.attribute_type)
            .map_err(|err| ServiceError::Form(err.to_string()))?;

        entries.push((attribute.id, raw));
    }

    repo.set_attribute_values(product_id, entries)
        .map_err(ServiceError::from)
}
