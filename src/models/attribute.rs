use diesel::prelude::*;

use crate::domain::attribute::{
    AttributeValue, NewProductAttribute as DomainNewProductAttribute,
    ProductAttribute as DomainProductAttribute, UnknownAttributeType,
};
use crate::domain::option::OptionGroupValue as DomainOptionGroupValue;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::product_attributes)]
pub struct ProductAttribute {
    pub id: i32,
    pub product_class_id: i32,
    pub title: String,
    pub attribute_type: String,
    pub option_group_id: Option<i32>,
    pub required: bool,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_attributes)]
pub struct NewProductAttribute<'a> {
    pub product_class_id: i32,
    pub title: &'a str,
    pub attribute_type: &'static str,
    pub option_group_id: Option<i32>,
    pub required: bool,
}

/// Stored value row. At most one of the scalar columns is populated; the
/// members of a multi option value live in `product_attribute_value_options`.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::product_attribute_values)]
pub struct ProductAttributeValue {
    pub id: i32,
    pub product_id: i32,
    pub attribute_id: i32,
    pub value_text: Option<String>,
    pub value_integer: Option<i64>,
    pub value_float: Option<f64>,
    pub value_option_id: Option<i32>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_attribute_values)]
pub struct NewProductAttributeValue<'a> {
    pub product_id: i32,
    pub attribute_id: i32,
    pub value_text: Option<&'a str>,
    pub value_integer: Option<i64>,
    pub value_float: Option<f64>,
    pub value_option_id: Option<i32>,
}

/// Replacement for the value columns; unused columns are written as NULL.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::product_attribute_values)]
#[diesel(treat_none_as_null = true)]
pub struct AttributeValueChangeset<'a> {
    pub value_text: Option<&'a str>,
    pub value_integer: Option<i64>,
    pub value_float: Option<f64>,
    pub value_option_id: Option<i32>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::product_attribute_value_options)]
pub struct AttributeValueOption {
    pub attribute_value_id: i32,
    pub option_value_id: i32,
    pub position: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_attribute_value_options)]
pub struct NewAttributeValueOption {
    pub attribute_value_id: i32,
    pub option_value_id: i32,
    pub position: i32,
}

impl<'a> From<&'a AttributeValue> for AttributeValueChangeset<'a> {
    fn from(value: &'a AttributeValue) -> Self {
        let mut columns = Self {
            value_text: None,
            value_integer: None,
            value_float: None,
            value_option_id: None,
        };
        match value {
            AttributeValue::Text(text) => columns.value_text = Some(text.as_str()),
            AttributeValue::Integer(number) => columns.value_integer = Some(*number),
            AttributeValue::Float(number) => columns.value_float = Some(*number),
            AttributeValue::Option(option) => columns.value_option_id = Some(option.id),
            AttributeValue::MultiOption(_) => {}
        }
        columns
    }
}

impl<'a> NewProductAttributeValue<'a> {
    pub fn new(product_id: i32, attribute_id: i32, value: &'a AttributeValue) -> Self {
        let columns = AttributeValueChangeset::from(value);
        Self {
            product_id,
            attribute_id,
            value_text: columns.value_text,
            value_integer: columns.value_integer,
            value_float: columns.value_float,
            value_option_id: columns.value_option_id,
        }
    }
}

impl ProductAttributeValue {
    /// Rebuild the typed value from the column selected by `attribute`.
    ///
    /// `options` holds the referenced option values: the single value for
    /// option attributes, or the ordered members for multi option ones.
    /// Returns `None` when the column for the declared type is empty.
    pub fn decode(
        &self,
        attribute: &DomainProductAttribute,
        options: Vec<DomainOptionGroupValue>,
    ) -> Option<AttributeValue> {
        use crate::domain::attribute::AttributeType;

        match attribute.attribute_type {
            AttributeType::Text => self.value_text.clone().map(AttributeValue::Text),
            AttributeType::Integer => self.value_integer.map(AttributeValue::Integer),
            AttributeType::Float => self.value_float.map(AttributeValue::Float),
            AttributeType::Option => {
                let option_id = self.value_option_id?;
                options
                    .into_iter()
                    .find(|option| option.id == option_id)
                    .map(AttributeValue::Option)
            }
            AttributeType::MultiOption => {
                (!options.is_empty()).then_some(AttributeValue::MultiOption(options))
            }
        }
    }
}

impl TryFrom<ProductAttribute> for DomainProductAttribute {
    type Error = UnknownAttributeType;

    fn try_from(value: ProductAttribute) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            product_class_id: value.product_class_id,
            title: value.title,
            attribute_type: value.attribute_type.parse()?,
            option_group_id: value.option_group_id,
            required: value.required,
        })
    }
}

impl<'a> From<&'a DomainNewProductAttribute> for NewProductAttribute<'a> {
    fn from(value: &'a DomainNewProductAttribute) -> Self {
        Self {
            product_class_id: value.product_class_id,
            title: value.title.as_str(),
            attribute_type: value.attribute_type.as_str(),
            option_group_id: value.option_group_id,
            required: value.required,
        }
    }
}
