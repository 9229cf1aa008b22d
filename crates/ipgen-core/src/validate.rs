//! Whole-configuration validation against a [`ParameterSchema`].
//!
//! Every field is checked and every violation is collected, so a single run
//! reports the complete list of offending fields and their allowed domains.
//! Domain violations on inert fields (whose `enabled_when` flag is false) are
//! downgraded to warnings; type mismatches are always errors.

use std::collections::BTreeSet;
use std::fmt;

use crate::config::{Configuration, RawConfig};
use crate::error::{GenError, Result};
use crate::schema::{Domain, ParamKind, ParameterSchema, Value};

/// What is wrong with a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// The field was not supplied at all.
    Missing,
    /// The value has the wrong kind.
    TypeMismatch { expected: ParamKind },
    /// The value is not a member of the field's domain.
    OutOfDomain,
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub value: Option<Value>,
    pub domain: Domain,
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.value) {
            (ViolationKind::Missing, _) | (_, None) => {
                write!(f, "'{}' is missing (allowed: {})", self.field, self.domain)
            }
            (ViolationKind::TypeMismatch { expected }, Some(v)) => write!(
                f,
                "'{}' = {v} is not {} (allowed: {})",
                self.field,
                article(*expected),
                self.domain
            ),
            (ViolationKind::OutOfDomain, Some(v)) => {
                write!(f, "'{}' = {v} (allowed: {})", self.field, self.domain)
            }
        }
    }
}

fn article(kind: ParamKind) -> &'static str {
    match kind {
        ParamKind::Integer => "an integer",
        ParamKind::Boolean => "a boolean",
    }
}

/// Every error-level violation found in one configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub schema: String,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Names of the offending fields, in schema order.
    pub fn fields(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.field.as_str()).collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} invalid parameter value(s) for '{}':",
            self.violations.len(),
            self.schema
        )?;
        for v in &self.violations {
            write!(f, "\n  - {v}")?;
        }
        Ok(())
    }
}

/// A configuration that passed validation, plus any non-fatal findings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    pub config: Configuration,
    /// Domain violations on inert fields.
    pub warnings: Vec<Violation>,
}

/// Check `raw` against `schema`.
///
/// Unknown keys fail immediately with [`GenError::UnknownField`]. Otherwise
/// all field violations are aggregated into one [`GenError::Configuration`].
pub fn validate(schema: &ParameterSchema, raw: &RawConfig) -> Result<Validated> {
    if let Some(unknown) = raw.keys().find(|k| !schema.contains(k)) {
        return Err(GenError::UnknownField {
            schema: schema.name().to_string(),
            field: unknown.clone(),
        });
    }

    // A missing or ill-typed flag leaves its dependents active, so their
    // violations stay fatal.
    let inert: BTreeSet<String> = schema
        .params()
        .iter()
        .filter(|p| {
            p.enabled_when
                .as_ref()
                .is_some_and(|flag| raw.get(flag) == Some(&Value::Bool(false)))
        })
        .map(|p| p.name.clone())
        .collect();

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    for p in schema.params() {
        let violation = |value: Option<Value>, kind: ViolationKind| Violation {
            field: p.name.clone(),
            value,
            domain: p.domain.clone(),
            kind,
        };
        match raw.get(&p.name) {
            None => errors.push(violation(None, ViolationKind::Missing)),
            Some(v) if v.kind() != p.kind => errors.push(violation(
                Some(*v),
                ViolationKind::TypeMismatch { expected: p.kind },
            )),
            Some(v) if !p.domain.contains(v) => {
                let found = violation(Some(*v), ViolationKind::OutOfDomain);
                if inert.contains(&p.name) {
                    warnings.push(found);
                } else {
                    errors.push(found);
                }
            }
            Some(_) => {}
        }
    }

    if !errors.is_empty() {
        return Err(GenError::Configuration(ValidationReport {
            schema: schema.name().to_string(),
            violations: errors,
        }));
    }

    Ok(Validated {
        config: Configuration::from_parts(raw.clone(), inert),
        warnings,
    })
}
