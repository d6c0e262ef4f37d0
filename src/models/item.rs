//! Storage Item
//!
//! The plain record the global cache holds.

use serde::{Deserialize, Serialize};

/// A descriptor/value pair for one numbered field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageItem {
    pub fldno: i32,
    pub descriptor: String,
    pub value: String,
}

impl StorageItem {
    pub fn new(fldno: i32, descriptor: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            fldno,
            descriptor: descriptor.into(),
            value: value.into(),
        }
    }
}
