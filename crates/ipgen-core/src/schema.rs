//! Declarative parameter schemas.
//!
//! A [`ParameterSchema`] lists every configurable field of a generator together
//! with its kind, allowed domain, default value, and an optional dependency on a
//! boolean flag (`enabled_when`). Schemas are checked once at construction so a
//! default outside its own domain, or a dependency on a missing flag, is caught
//! before any configuration is looked at.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{Configuration, RawConfig};
use crate::error::{GenError, Result};

/// The kind of value a parameter holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Integer,
    Boolean,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Integer => write!(f, "integer"),
            ParamKind::Boolean => write!(f, "boolean"),
        }
    }
}

/// A resolved parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
}

impl Value {
    pub fn kind(&self) -> ParamKind {
        match self {
            Value::Bool(_) => ParamKind::Boolean,
            Value::Int(_) => ParamKind::Integer,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// The set of values a parameter accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    /// Inclusive integer range.
    Range { min: i64, max: i64 },
    /// Explicit finite set of values.
    Choices(Vec<Value>),
}

impl Domain {
    /// The `{false, true}` domain used by boolean fields.
    pub fn boolean() -> Self {
        Domain::Choices(vec![Value::Bool(false), Value::Bool(true)])
    }

    /// Whether `value` is a member of this domain.
    pub fn contains(&self, value: &Value) -> bool {
        match self {
            Domain::Range { min, max } => value
                .as_int()
                .is_some_and(|v| (*min..=*max).contains(&v)),
            Domain::Choices(choices) => choices.contains(value),
        }
    }

    /// The kind of every member, or `None` for an empty or mixed domain.
    fn kind(&self) -> Option<ParamKind> {
        match self {
            Domain::Range { min, max } if min <= max => Some(ParamKind::Integer),
            Domain::Range { .. } => None,
            Domain::Choices(choices) => {
                let first = choices.first()?.kind();
                choices.iter().all(|c| c.kind() == first).then_some(first)
            }
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Range { min, max } => write!(f, "{min}..={max}"),
            Domain::Choices(choices) => {
                write!(f, "{{")?;
                for (i, c) in choices.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Declarative description of one configurable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSpec {
    pub name: String,
    pub kind: ParamKind,
    pub domain: Domain,
    pub default: Value,
    /// Boolean field that must be `true` for this field to take effect.
    pub enabled_when: Option<String>,
    pub help: String,
}

impl ParameterSpec {
    /// An integer field accepting `min..=max`.
    pub fn range(name: impl Into<String>, min: i64, max: i64, default: i64) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Integer,
            domain: Domain::Range { min, max },
            default: Value::Int(default),
            enabled_when: None,
            help: String::new(),
        }
    }

    /// An integer field accepting an explicit set of values.
    pub fn choice(name: impl Into<String>, choices: &[i64], default: i64) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Integer,
            domain: Domain::Choices(choices.iter().copied().map(Value::Int).collect()),
            default: Value::Int(default),
            enabled_when: None,
            help: String::new(),
        }
    }

    /// A boolean field.
    pub fn flag(name: impl Into<String>, default: bool) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Boolean,
            domain: Domain::boolean(),
            default: Value::Bool(default),
            enabled_when: None,
            help: String::new(),
        }
    }

    /// Make this field depend on the boolean field `flag`.
    pub fn enabled_when(mut self, flag: impl Into<String>) -> Self {
        self.enabled_when = Some(flag.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Display group, mirroring how generators present their parameters.
    pub fn group(&self) -> &'static str {
        match (&self.kind, &self.domain) {
            (ParamKind::Boolean, _) => "Core bool parameters",
            (_, Domain::Range { .. }) => "Core range parameters",
            (_, Domain::Choices(_)) => "Core fix parameters",
        }
    }
}

/// The complete parameter schema of one generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSchema {
    name: String,
    params: Vec<ParameterSpec>,
}

impl ParameterSchema {
    /// Build a schema, checking every field definition.
    pub fn new(name: impl Into<String>, params: Vec<ParameterSpec>) -> Result<Self> {
        let name = name.into();
        let invalid = |detail: String| GenError::Schema {
            schema: name.clone(),
            detail,
        };

        let mut seen = BTreeSet::new();
        for p in &params {
            if !is_identifier(&p.name) {
                return Err(invalid(format!("'{}' is not a valid field name", p.name)));
            }
            if !seen.insert(p.name.as_str()) {
                return Err(invalid(format!("field '{}' is declared twice", p.name)));
            }
            match p.domain.kind() {
                Some(kind) if kind == p.kind => {}
                Some(kind) => {
                    return Err(invalid(format!(
                        "field '{}' is {} but its domain {} holds {kind} values",
                        p.name, p.kind, p.domain
                    )))
                }
                None => {
                    return Err(invalid(format!(
                        "field '{}' has an empty or mixed domain {}",
                        p.name, p.domain
                    )))
                }
            }
            if !p.domain.contains(&p.default) {
                return Err(invalid(format!(
                    "default {} of '{}' is outside {}",
                    p.default, p.name, p.domain
                )));
            }
        }

        for p in &params {
            let Some(flag) = &p.enabled_when else {
                continue;
            };
            if flag == &p.name {
                return Err(invalid(format!("field '{}' depends on itself", p.name)));
            }
            match params.iter().find(|q| &q.name == flag) {
                Some(q) if q.kind == ParamKind::Boolean => {}
                Some(_) => {
                    return Err(invalid(format!(
                        "field '{}' depends on '{flag}', which is not boolean",
                        p.name
                    )))
                }
                None => {
                    return Err(invalid(format!(
                        "field '{}' depends on unknown field '{flag}'",
                        p.name
                    )))
                }
            }
        }

        Ok(Self { name, params })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn params(&self) -> &[ParameterSpec] {
        &self.params
    }

    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Field → governing flag, for every dependent field.
    pub fn dependencies(&self) -> BTreeMap<String, String> {
        self.params
            .iter()
            .filter_map(|p| Some((p.name.clone(), p.enabled_when.clone()?)))
            .collect()
    }

    /// The configuration made of every field's default.
    ///
    /// Defaults are members of their domains by construction, so this never
    /// fails validation.
    pub fn defaults(&self) -> Configuration {
        let values: BTreeMap<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.clone(), p.default))
            .collect();
        let inert = self
            .params
            .iter()
            .filter(|p| {
                p.enabled_when
                    .as_ref()
                    .is_some_and(|flag| values.get(flag) == Some(&Value::Bool(false)))
            })
            .map(|p| p.name.clone())
            .collect();
        Configuration::from_parts(values, inert)
    }

    /// The defaults with `edits` applied on top, not yet validated.
    pub fn overlay(&self, edits: impl IntoIterator<Item = (String, Value)>) -> RawConfig {
        let mut raw = self.defaults().to_raw();
        raw.extend(edits);
        raw
    }
}

/// Whether `name` is a plain HDL identifier (`[A-Za-z_][A-Za-z0-9_]*`).
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
