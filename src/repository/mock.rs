use mockall::mock;

use super::{
    AttributeValueReader, AttributeValueWriter, CategoryReader, CategoryWriter, ProductReader,
    ProductWriter,
};
use crate::domain::{
    attribute::{AttributeValue, ProductAttribute, ProductAttributeValue, RawAttributeValue},
    category::{
        Category, CategoryListQuery, DeletePolicy, NewCategory, TreeProblem, UpdateCategory,
    },
    product::{NewProduct, Product, ProductListQuery, UpdateProduct},
};
use crate::repository::errors::RepositoryResult;

mock! {
    pub CategoryReader {}

    impl CategoryReader for CategoryReader {
        fn get_category_by_id(&self, category_id: i32) -> RepositoryResult<Option<Category>>;
        fn get_category_by_slug(&self, slug: &str) -> RepositoryResult<Option<Category>>;
        fn list_categories(&self, query: CategoryListQuery) -> RepositoryResult<(usize, Vec<Category>)>;
        fn list_root_categories(&self) -> RepositoryResult<Vec<Category>>;
        fn list_children(&self, category_id: i32) -> RepositoryResult<Vec<Category>>;
        fn list_descendants(&self, category_id: i32) -> RepositoryResult<Vec<Category>>;
        fn list_ancestors(&self, category_id: i32) -> RepositoryResult<Vec<Category>>;
        fn find_tree_problems(&self) -> RepositoryResult<Vec<TreeProblem>>;
    }
}

mock! {
    pub CategoryWriter {}

    impl CategoryWriter for CategoryWriter {
        fn create_root_category(&self, new_category: &NewCategory) -> RepositoryResult<Category>;
        fn create_child_category(&self, parent_id: i32, new_category: &NewCategory) -> RepositoryResult<Category>;
        fn update_category(&self, category_id: i32, updates: &UpdateCategory) -> RepositoryResult<Category>;
        fn move_category(&self, category_id: i32, new_parent_id: Option<i32>) -> RepositoryResult<Category>;
        fn delete_category(&self, category_id: i32, policy: DeletePolicy) -> RepositoryResult<()>;
        fn fix_tree(&self) -> RepositoryResult<usize>;
    }
}

mock! {
    pub ProductReader {}

    impl ProductReader for ProductReader {
        fn get_product_by_id(&self, id: i32) -> RepositoryResult<Option<Product>>;
        fn get_product_by_slug(&self, slug: &str) -> RepositoryResult<Option<Product>>;
        fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
        fn list_product_categories(&self, product_id: i32) -> RepositoryResult<Vec<Category>>;
    }
}

mock! {
    pub ProductWriter {}

    impl ProductWriter for ProductWriter {
        fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product>;
        fn create_product_in_categories(&self, new_product: &NewProduct, category_ids: &[i32]) -> RepositoryResult<Product>;
        fn update_product(&self, product_id: i32, updates: &UpdateProduct) -> RepositoryResult<Product>;
        fn delete_product(&self, product_id: i32) -> RepositoryResult<()>;
        fn set_product_categories(&self, product_id: i32, category_ids: &[i32]) -> RepositoryResult<()>;
    }
}

mock! {
    pub AttributeValues {}

    impl AttributeValueReader for AttributeValues {
        fn list_product_attributes(&self, product_id: i32) -> RepositoryResult<Vec<ProductAttribute>>;
        fn get_attribute_value(&self, product_id: i32, attribute_id: i32) -> RepositoryResult<Option<AttributeValue>>;
        fn list_attribute_values(&self, product_id: i32) -> RepositoryResult<Vec<ProductAttributeValue>>;
        fn validate_product(&self, product_id: i32) -> RepositoryResult<()>;
    }

    impl AttributeValueWriter for AttributeValues {
        fn set_attribute_value(&self, product_id: i32, attribute_id: i32, raw: RawAttributeValue) -> RepositoryResult<Option<AttributeValue>>;
        fn set_attribute_values(&self, product_id: i32, values: Vec<(i32, RawAttributeValue)>) -> RepositoryResult<Vec<ProductAttributeValue>>;
    }
}
