use diesel::prelude::*;

use crate::domain::attribute::UnknownAttributeType;
use crate::domain::option::{
    NewProductOption as DomainNewProductOption, OptionGroup as DomainOptionGroup,
    OptionGroupValue as DomainOptionGroupValue, ProductOption as DomainProductOption,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::option_groups)]
pub struct OptionGroup {
    pub id: i32,
    pub title: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::option_groups)]
pub struct NewOptionGroup<'a> {
    pub title: &'a str,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::option_group_values)]
pub struct OptionGroupValue {
    pub id: i32,
    pub group_id: i32,
    pub title: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::option_group_values)]
pub struct NewOptionGroupValue<'a> {
    pub group_id: i32,
    pub title: &'a str,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::options)]
pub struct ProductOption {
    pub id: i32,
    pub title: String,
    pub option_type: String,
    pub option_group_id: Option<i32>,
    pub required: bool,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::options)]
pub struct NewProductOption<'a> {
    pub title: &'a str,
    pub option_type: &'static str,
    pub option_group_id: Option<i32>,
    pub required: bool,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_options)]
pub struct NewProductOptionLink {
    pub product_id: i32,
    pub option_id: i32,
}

impl From<OptionGroup> for DomainOptionGroup {
    fn from(value: OptionGroup) -> Self {
        Self {
            id: value.id,
            title: value.title,
        }
    }
}

impl From<OptionGroupValue> for DomainOptionGroupValue {
    fn from(value: OptionGroupValue) -> Self {
        Self {
            id: value.id,
            group_id: value.group_id,
            title: value.title,
        }
    }
}

impl TryFrom<ProductOption> for DomainProductOption {
    type Error = UnknownAttributeType;

    fn try_from(value: ProductOption) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            title: value.title,
            option_type: value.option_type.parse()?,
            option_group_id: value.option_group_id,
            required: value.required,
        })
    }
}

impl<'a> From<&'a DomainNewProductOption> for NewProductOption<'a> {
    fn from(value: &'a DomainNewProductOption) -> Self {
        Self {
            title: value.title.as_str(),
            option_type: value.option_type.as_str(),
            option_group_id: value.option_group_id,
            required: value.required,
        }
    }
}
