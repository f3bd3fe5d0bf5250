use std::collections::HashSet;

use crate::db::{DbConnection, DbPool};
use crate::domain::attribute::{
    AttributeValue, NewProductAttribute, ProductAttribute, ProductAttributeValue,
    RawAttributeValue,
};
use crate::domain::category::{
    Category, CategoryListQuery, DeletePolicy, NewCategory, TreeProblem, UpdateCategory,
};
use crate::domain::option::{
    NewOptionGroup, NewProductOption, OptionGroup, OptionGroupValue, ProductOption,
};
use crate::domain::path::PathScheme;
use crate::domain::product::{NewProduct, Product, ProductListQuery, UpdateProduct};
use crate::domain::product_class::{NewProductClass, ProductClass};
use crate::domain::product_image::{NewProductImage, ProductImage};
use crate::domain::recommendation::{NewProductRecommendation, ProductRecommendation};
use crate::repository::errors::RepositoryResult;

pub mod attribute_value;
pub mod category;
pub mod errors;
pub mod option;
pub mod product;
pub mod product_class;
pub mod product_image;
pub mod recommendation;

#[cfg(test)]
pub mod mock;

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
    scheme: PathScheme,
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool and the
    /// default category path scheme.
    pub fn new(pool: DbPool) -> Self {
        Self::with_path_scheme(pool, PathScheme::default())
    }

    /// Create a repository that encodes category paths with `scheme`.
    pub fn with_path_scheme(pool: DbPool, scheme: PathScheme) -> Self {
        Self { pool, scheme }
    }

    pub fn path_scheme(&self) -> &PathScheme {
        &self.scheme
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// `LIKE` pattern matching `term` anywhere, with `\`, `%` and `_` escaped
/// by `\`. Use together with `.escape('\\')`.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Identifiers in first-seen order with duplicates removed.
pub(crate) fn unique_ids(ids: &[i32]) -> Vec<i32> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Read-only operations over the category tree.
pub trait CategoryReader {
    fn get_category_by_id(&self, category_id: i32) -> RepositoryResult<Option<Category>>;
    fn get_category_by_slug(&self, slug: &str) -> RepositoryResult<Option<Category>>;
    /// Flattened categories in tree order (pre-order, siblings by path).
    fn list_categories(&self, query: CategoryListQuery)
    -> RepositoryResult<(usize, Vec<Category>)>;
    fn list_root_categories(&self) -> RepositoryResult<Vec<Category>>;
    fn list_children(&self, category_id: i32) -> RepositoryResult<Vec<Category>>;
    fn list_descendants(&self, category_id: i32) -> RepositoryResult<Vec<Category>>;
    /// Ancestors of the category, root first, excluding the category itself.
    fn list_ancestors(&self, category_id: i32) -> RepositoryResult<Vec<Category>>;
    fn find_tree_problems(&self) -> RepositoryResult<Vec<TreeProblem>>;
}

/// Structural and field updates of the category tree.
pub trait CategoryWriter {
    fn create_root_category(&self, new_category: &NewCategory) -> RepositoryResult<Category>;
    fn create_child_category(
        &self,
        parent_id: i32,
        new_category: &NewCategory,
    ) -> RepositoryResult<Category>;
    fn update_category(
        &self,
        category_id: i32,
        updates: &UpdateCategory,
    ) -> RepositoryResult<Category>;
    /// Move the category and its subtree under `new_parent_id`, or make it
    /// the last root when `None`.
    fn move_category(
        &self,
        category_id: i32,
        new_parent_id: Option<i32>,
    ) -> RepositoryResult<Category>;
    fn delete_category(&self, category_id: i32, policy: DeletePolicy) -> RepositoryResult<()>;
    /// Recompute depth and child counts from paths; returns repaired rows.
    fn fix_tree(&self) -> RepositoryResult<usize>;
}

pub trait ProductClassReader {
    fn get_product_class_by_id(&self, id: i32) -> RepositoryResult<Option<ProductClass>>;
    fn list_product_classes(&self) -> RepositoryResult<Vec<ProductClass>>;
    fn get_attribute_by_id(&self, attribute_id: i32) -> RepositoryResult<Option<ProductAttribute>>;
    fn list_class_attributes(&self, product_class_id: i32)
    -> RepositoryResult<Vec<ProductAttribute>>;
    fn list_class_options(&self, product_class_id: i32) -> RepositoryResult<Vec<ProductOption>>;
}

pub trait ProductClassWriter {
    fn create_product_class(&self, new_class: &NewProductClass) -> RepositoryResult<ProductClass>;
    fn delete_product_class(&self, product_class_id: i32) -> RepositoryResult<()>;
    fn create_attribute(
        &self,
        new_attribute: &NewProductAttribute,
    ) -> RepositoryResult<ProductAttribute>;
    fn delete_attribute(&self, attribute_id: i32) -> RepositoryResult<()>;
    /// Replace the options selectable for every product of the class.
    fn set_class_options(&self, product_class_id: i32, option_ids: &[i32])
    -> RepositoryResult<()>;
}

pub trait OptionReader {
    fn get_option_group_by_id(&self, group_id: i32) -> RepositoryResult<Option<OptionGroup>>;
    fn list_option_groups(&self) -> RepositoryResult<Vec<OptionGroup>>;
    fn list_option_group_values(&self, group_id: i32) -> RepositoryResult<Vec<OptionGroupValue>>;
    fn list_options(&self) -> RepositoryResult<Vec<ProductOption>>;
    fn list_product_options(&self, product_id: i32) -> RepositoryResult<Vec<ProductOption>>;
}

pub trait OptionWriter {
    fn create_option_group(&self, new_group: &NewOptionGroup) -> RepositoryResult<OptionGroup>;
    fn add_option_group_value(
        &self,
        group_id: i32,
        title: &str,
    ) -> RepositoryResult<OptionGroupValue>;
    fn create_option(&self, new_option: &NewProductOption) -> RepositoryResult<ProductOption>;
    fn set_product_options(&self, product_id: i32, option_ids: &[i32]) -> RepositoryResult<()>;
}

pub trait ProductReader {
    fn get_product_by_id(&self, id: i32) -> RepositoryResult<Option<Product>>;
    fn get_product_by_slug(&self, slug: &str) -> RepositoryResult<Option<Product>>;
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
    fn list_product_categories(&self, product_id: i32) -> RepositoryResult<Vec<Category>>;
}

pub trait ProductWriter {
    fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product>;
    /// Create the product and link it to `category_ids` in one transaction.
    fn create_product_in_categories(
        &self,
        new_product: &NewProduct,
        category_ids: &[i32],
    ) -> RepositoryResult<Product>;
    /// Apply the patch. Changing the class drops the values of attributes
    /// the new effective class does not declare.
    fn update_product(&self, product_id: i32, updates: &UpdateProduct)
    -> RepositoryResult<Product>;
    fn delete_product(&self, product_id: i32) -> RepositoryResult<()>;
    /// Replace the set of categories the product is listed in.
    fn set_product_categories(&self, product_id: i32, category_ids: &[i32])
    -> RepositoryResult<()>;
}

/// Read access to the typed attribute values of products.
pub trait AttributeValueReader {
    /// Attributes declared by the product's effective class.
    fn list_product_attributes(&self, product_id: i32) -> RepositoryResult<Vec<ProductAttribute>>;
    /// `None` when the optional attribute has no value.
    fn get_attribute_value(
        &self,
        product_id: i32,
        attribute_id: i32,
    ) -> RepositoryResult<Option<AttributeValue>>;
    fn list_attribute_values(&self, product_id: i32)
    -> RepositoryResult<Vec<ProductAttributeValue>>;
    /// Fail with every required attribute that has no value.
    fn validate_product(&self, product_id: i32) -> RepositoryResult<()>;
}

pub trait AttributeValueWriter {
    /// Insert or replace the value; an empty optional value clears it.
    fn set_attribute_value(
        &self,
        product_id: i32,
        attribute_id: i32,
        raw: RawAttributeValue,
    ) -> RepositoryResult<Option<AttributeValue>>;
    /// Apply every `(attribute_id, value)` pair, then require each required
    /// attribute to hold a value. Nothing is stored unless all of it holds.
    fn set_attribute_values(
        &self,
        product_id: i32,
        values: Vec<(i32, RawAttributeValue)>,
    ) -> RepositoryResult<Vec<ProductAttributeValue>>;
}

pub trait RecommendationReader {
    /// Recommendations of the product, highest rank first.
    fn list_recommendations(&self, primary_id: i32)
    -> RepositoryResult<Vec<ProductRecommendation>>;
}

pub trait RecommendationWriter {
    fn upsert_recommendation(
        &self,
        recommendation: &NewProductRecommendation,
    ) -> RepositoryResult<ProductRecommendation>;
    fn delete_recommendation(&self, primary_id: i32, recommendation_id: i32)
    -> RepositoryResult<()>;
}

pub trait ProductImageReader {
    fn list_product_images(&self, product_id: i32) -> RepositoryResult<Vec<ProductImage>>;
    /// First image in display order.
    fn get_main_image(&self, product_id: i32) -> RepositoryResult<Option<ProductImage>>;
}

pub trait ProductImageWriter {
    /// Append the image after the product's existing images.
    fn add_product_image(&self, new_image: &NewProductImage) -> RepositoryResult<ProductImage>;
    /// Delete the image and close the gap in display order.
    fn delete_product_image(&self, image_id: i32) -> RepositoryResult<()>;
}
