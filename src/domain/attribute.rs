//! Typed attribute declarations and the values products hold for them.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::option::OptionGroupValue;

/// Storage type of an attribute or option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    #[default]
    Text,
    Integer,
    Float,
    Option,
    MultiOption,
}

impl AttributeType {
    pub const ALL: [AttributeType; 5] = [
        AttributeType::Text,
        AttributeType::Integer,
        AttributeType::Float,
        AttributeType::Option,
        AttributeType::MultiOption,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::Text => "text",
            AttributeType::Integer => "integer",
            AttributeType::Float => "float",
            AttributeType::Option => "option",
            AttributeType::MultiOption => "multi_option",
        }
    }

    /// Whether values of this type reference an option group.
    pub fn uses_option_group(&self) -> bool {
        matches!(self, AttributeType::Option | AttributeType::MultiOption)
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown attribute type `{0}`")]
pub struct UnknownAttributeType(pub String);

impl FromStr for AttributeType {
    type Err = UnknownAttributeType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        AttributeType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| UnknownAttributeType(value.to_string()))
    }
}

/// Errors produced while declaring attributes or coercing values for them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AttributeValueError {
    #[error("attribute `{attribute}` expects a {expected} value, got {found}")]
    TypeMismatch {
        attribute: String,
        expected: AttributeType,
        found: &'static str,
    },
    #[error("option value {option_value_id} is not part of the option group of `{attribute}`")]
    InvalidOption {
        attribute: String,
        option_value_id: i32,
    },
    #[error("missing required value for: {}", .0.join(", "))]
    MissingRequiredValue(Vec<String>),
    #[error("`{attribute}` is an option type and needs an option group")]
    MissingOptionGroup { attribute: String },
    #[error("`{attribute}` is a {kind} type and cannot reference an option group")]
    UnexpectedOptionGroup {
        attribute: String,
        kind: AttributeType,
    },
}

/// Check that option types reference an option group and scalar types don't.
pub fn check_declaration(
    title: &str,
    kind: AttributeType,
    option_group_id: Option<i32>,
) -> Result<(), AttributeValueError> {
    match (kind.uses_option_group(), option_group_id) {
        (true, None) => Err(AttributeValueError::MissingOptionGroup {
            attribute: title.to_string(),
        }),
        (false, Some(_)) => Err(AttributeValueError::UnexpectedOptionGroup {
            attribute: title.to_string(),
            kind,
        }),
        _ => Ok(()),
    }
}

/// Attribute declared by a product class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAttribute {
    pub id: i32,
    pub product_class_id: i32,
    pub title: String,
    pub attribute_type: AttributeType,
    /// Option group the values are drawn from, for option types.
    pub option_group_id: Option<i32>,
    pub required: bool,
}

/// Payload required to declare a new attribute on a product class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProductAttribute {
    pub product_class_id: i32,
    pub title: String,
    pub attribute_type: AttributeType,
    pub option_group_id: Option<i32>,
    pub required: bool,
}

impl NewProductAttribute {
    pub fn new(product_class_id: i32, title: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            product_class_id,
            title: title.into(),
            attribute_type,
            option_group_id: None,
            required: false,
        }
    }

    pub fn with_option_group(mut self, option_group_id: i32) -> Self {
        self.option_group_id = Some(option_group_id);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn check(&self) -> Result<(), AttributeValueError> {
        check_declaration(&self.title, self.attribute_type, self.option_group_id)
    }
}

/// Value supplied by an author before it is checked against the attribute.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RawAttributeValue {
    #[default]
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    /// Identifier of an option group value.
    Option(i32),
    /// Identifiers of option group values.
    MultiOption(Vec<i32>),
}

impl RawAttributeValue {
    /// Null, blank text and empty sets count as no value.
    pub fn is_empty(&self) -> bool {
        match self {
            RawAttributeValue::Null => true,
            RawAttributeValue::Text(text) => text.trim().is_empty(),
            RawAttributeValue::MultiOption(ids) => ids.is_empty(),
            _ => false,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            RawAttributeValue::Null => "null",
            RawAttributeValue::Text(_) => "text",
            RawAttributeValue::Integer(_) => "integer",
            RawAttributeValue::Float(_) => "float",
            RawAttributeValue::Option(_) => "option",
            RawAttributeValue::MultiOption(_) => "multi_option",
        }
    }
}

/// Typed value held by a product for one attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Option(OptionGroupValue),
    MultiOption(Vec<OptionGroupValue>),
}

impl AttributeValue {
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            AttributeValue::Text(_) => AttributeType::Text,
            AttributeValue::Integer(_) => AttributeType::Integer,
            AttributeValue::Float(_) => AttributeType::Float,
            AttributeValue::Option(_) => AttributeType::Option,
            AttributeValue::MultiOption(_) => AttributeType::MultiOption,
        }
    }

    /// Identifiers of the referenced option values, in stored order.
    pub fn option_value_ids(&self) -> Vec<i32> {
        match self {
            AttributeValue::Option(value) => vec![value.id],
            AttributeValue::MultiOption(values) => values.iter().map(|value| value.id).collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(text) => f.write_str(text),
            AttributeValue::Integer(number) => write!(f, "{number}"),
            AttributeValue::Float(number) => write!(f, "{number}"),
            AttributeValue::Option(value) => f.write_str(&value.title),
            AttributeValue::MultiOption(values) => {
                let titles: Vec<&str> = values.iter().map(|value| value.title.as_str()).collect();
                f.write_str(&titles.join(", "))
            }
        }
    }
}

/// A stored attribute value together with its declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductAttributeValue {
    pub id: i32,
    pub product_id: i32,
    pub attribute: ProductAttribute,
    pub value: AttributeValue,
}

/// Check `raw` against the declaration of `attribute`.
///
/// `group_values` must hold the members of the attribute's option group for
/// option types. Returns `Ok(None)` when the value is empty and the attribute
/// is optional, meaning the stored value should be cleared.
pub fn coerce_value(
    attribute: &ProductAttribute,
    raw: RawAttributeValue,
    group_values: &[OptionGroupValue],
) -> Result<Option<AttributeValue>, AttributeValueError> {
    if raw.is_empty() {
        if attribute.required {
            return Err(AttributeValueError::MissingRequiredValue(vec![
                attribute.title.clone(),
            ]));
        }
        return Ok(None);
    }

    let mismatch = |raw: &RawAttributeValue| AttributeValueError::TypeMismatch {
        attribute: attribute.title.clone(),
        expected: attribute.attribute_type,
        found: raw.kind(),
    };

    let value = match attribute.attribute_type {
        AttributeType::Text => match raw {
            RawAttributeValue::Text(text) => AttributeValue::Text(text),
            RawAttributeValue::Integer(number) => AttributeValue::Text(number.to_string()),
            RawAttributeValue::Float(number) => AttributeValue::Text(number.to_string()),
            other => return Err(mismatch(&other)),
        },
        AttributeType::Integer => match raw {
            RawAttributeValue::Integer(number) => AttributeValue::Integer(number),
            RawAttributeValue::Float(number) if is_integral(number) => {
                AttributeValue::Integer(number as i64)
            }
            RawAttributeValue::Text(ref text) => match text.trim().parse::<i64>() {
                Ok(number) => AttributeValue::Integer(number),
                Err(_) => return Err(mismatch(&raw)),
            },
            other => return Err(mismatch(&other)),
        },
        AttributeType::Float => match raw {
            RawAttributeValue::Float(number) if number.is_finite() => AttributeValue::Float(number),
            RawAttributeValue::Integer(number) => AttributeValue::Float(number as f64),
            RawAttributeValue::Text(ref text) => match text.trim().parse::<f64>() {
                Ok(number) if number.is_finite() => AttributeValue::Float(number),
                _ => return Err(mismatch(&raw)),
            },
            other => return Err(mismatch(&other)),
        },
        AttributeType::Option => match raw {
            RawAttributeValue::Option(id) => {
                AttributeValue::Option(find_group_value(attribute, id, group_values)?)
            }
            other => return Err(mismatch(&other)),
        },
        AttributeType::MultiOption => {
            let ids = match raw {
                RawAttributeValue::MultiOption(ids) => ids,
                RawAttributeValue::Option(id) => vec![id],
                other => return Err(mismatch(&other)),
            };

            let mut seen = HashSet::new();
            let mut members = Vec::with_capacity(ids.len());
            for id in ids {
                if seen.insert(id) {
                    members.push(find_group_value(attribute, id, group_values)?);
                }
            }
            AttributeValue::MultiOption(members)
        }
    };

    Ok(Some(value))
}

/// `i64::MAX as f64` rounds up to 2^63, which does not fit, hence `<`.
fn is_integral(number: f64) -> bool {
    number.is_finite()
        && number.fract() == 0.0
        && number >= i64::MIN as f64
        && number < i64::MAX as f64
}

fn find_group_value(
    attribute: &ProductAttribute,
    option_value_id: i32,
    group_values: &[OptionGroupValue],
) -> Result<OptionGroupValue, AttributeValueError> {
    let group_id = attribute
        .option_group_id
        .ok_or_else(|| AttributeValueError::MissingOptionGroup {
            attribute: attribute.title.clone(),
        })?;

    group_values
        .iter()
        .find(|value| value.id == option_value_id && value.group_id == group_id)
        .cloned()
        .ok_or_else(|| AttributeValueError::InvalidOption {
            attribute: attribute.title.clone(),
            option_value_id,
        })
}

/// Fail with every required attribute whose id is missing from `present`.
pub fn check_required(
    attributes: &[ProductAttribute],
    present: &HashSet<i32>,
) -> Result<(), AttributeValueError> {
    let missing: Vec<String> = attributes
        .iter()
        .filter(|attribute| attribute.required && !present.contains(&attribute.id))
        .map(|attribute| attribute.title.clone())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AttributeValueError::MissingRequiredValue(missing))
    }
}
