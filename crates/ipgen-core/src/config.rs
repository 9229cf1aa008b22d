//! Resolved configurations.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error::{GenError, Result};
use crate::schema::Value;

/// Unvalidated field → value mapping, as supplied by a caller or document.
pub type RawConfig = BTreeMap<String, Value>;

/// A validated configuration.
///
/// Only produced by validation (or by [`ParameterSchema::defaults`](crate::ParameterSchema::defaults)),
/// so every schema field is present and every active field lies in its domain.
/// Fields whose `enabled_when` flag is false are *inert*: they keep their value
/// for reporting, but [`Configuration::active`] hides them from generators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Configuration {
    values: BTreeMap<String, Value>,
    inert: BTreeSet<String>,
}

impl Configuration {
    pub(crate) fn from_parts(values: BTreeMap<String, Value>, inert: BTreeSet<String>) -> Self {
        Self { values, inert }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.get(name).copied()
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(|v| v.as_int())
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(|v| v.as_bool())
    }

    pub fn require_int(&self, name: &str) -> Result<i64> {
        self.int(name).ok_or_else(|| GenError::MissingField {
            field: name.to_string(),
            expected: "integer",
        })
    }

    pub fn require_flag(&self, name: &str) -> Result<bool> {
        self.flag(name).ok_or_else(|| GenError::MissingField {
            field: name.to_string(),
            expected: "boolean",
        })
    }

    /// An integer field used as a signal width or count.
    pub fn require_width(&self, name: &str) -> Result<u32> {
        self.int(name)
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| GenError::MissingField {
                field: name.to_string(),
                expected: "width",
            })
    }

    pub fn is_inert(&self, name: &str) -> bool {
        self.inert.contains(name)
    }

    /// The value of `name`, or `None` if the field is unknown or inert.
    pub fn active(&self, name: &str) -> Option<Value> {
        if self.is_inert(name) {
            None
        } else {
            self.get(name)
        }
    }

    pub fn active_int(&self, name: &str) -> Option<i64> {
        self.active(name).and_then(|v| v.as_int())
    }

    /// Fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The values as an unvalidated mapping, e.g. to overlay further edits.
    pub fn to_raw(&self) -> RawConfig {
        self.values.clone()
    }
}
