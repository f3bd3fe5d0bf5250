use serde::{Deserialize, Serialize};

use crate::domain::attribute::{AttributeType, AttributeValueError, check_declaration};

/// Named enumeration of selectable values, for example "Language".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionGroup {
    pub id: i32,
    pub title: String,
}

/// Member of an option group, for example "English".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionGroupValue {
    pub id: i32,
    pub group_id: i32,
    pub title: String,
}

/// Payload required to create an option group together with its values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOptionGroup {
    pub title: String,
    pub values: Vec<String>,
}

impl NewOptionGroup {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            values: Vec::new(),
        }
    }

    /// Append a value title; values keep the order they were added in.
    pub fn with_value(mut self, title: impl Into<String>) -> Self {
        self.values.push(title.into());
        self
    }
}

/// Option that can be selected for an item when it is added to a cart, for
/// example a personalised message printed on a T-shirt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    pub id: i32,
    pub title: String,
    pub option_type: AttributeType,
    pub option_group_id: Option<i32>,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProductOption {
    pub title: String,
    pub option_type: AttributeType,
    pub option_group_id: Option<i32>,
    pub required: bool,
}

impl NewProductOption {
    pub fn new(title: impl Into<String>, option_type: AttributeType) -> Self {
        Self {
            title: title.into(),
            option_type,
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
        check_declaration(&self.title, self.option_type, self.option_group_id)
    }
}
