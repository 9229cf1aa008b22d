//! JSON configuration documents: template export and import.
//!
//! A document is a flat JSON object with one key per schema field and native
//! JSON numbers/booleans as values. Field dependencies are attached out-of-band
//! under the reserved [`DEPENDENCIES_KEY`], which can never collide with a
//! field name and is skipped on import.
//!
//! ```json
//! {
//!   "$dependencies": { "id_width": "id_en" },
//!   "id_en": true,
//!   "id_width": 8
//! }
//! ```

use std::collections::BTreeMap;

use serde_json::{Map, Value as JsonValue};

use crate::config::{Configuration, RawConfig};
use crate::error::{GenError, Result};
use crate::schema::{ParameterSchema, Value};
use crate::validate::{validate, Validated};

/// Reserved key holding the `field → governing flag` annotations.
pub const DEPENDENCIES_KEY: &str = "$dependencies";

/// A parsed or exported configuration document.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    values: Map<String, JsonValue>,
    dependencies: BTreeMap<String, String>,
}

impl ConfigDocument {
    /// Parse a document from JSON text.
    pub fn parse(text: &str) -> Result<Self> {
        let json: JsonValue = serde_json::from_str(text).map_err(|e| GenError::Document {
            detail: e.to_string(),
        })?;
        let JsonValue::Object(mut values) = json else {
            return Err(GenError::Document {
                detail: "top level must be a JSON object".into(),
            });
        };

        let dependencies = match values.remove(DEPENDENCIES_KEY) {
            None => BTreeMap::new(),
            Some(JsonValue::Object(deps)) => deps
                .into_iter()
                .map(|(field, flag)| match flag {
                    JsonValue::String(flag) => Ok((field, flag)),
                    other => Err(GenError::Document {
                        detail: format!("'{DEPENDENCIES_KEY}.{field}' must be a string, found {other}"),
                    }),
                })
                .collect::<Result<_>>()?,
            Some(other) => {
                return Err(GenError::Document {
                    detail: format!("'{DEPENDENCIES_KEY}' must be an object, found {other}"),
                })
            }
        };

        Ok(Self {
            values,
            dependencies,
        })
    }

    /// Field values, excluding annotations.
    pub fn values(&self) -> &Map<String, JsonValue> {
        &self.values
    }

    /// `field → governing flag` annotations.
    pub fn dependencies(&self) -> &BTreeMap<String, String> {
        &self.dependencies
    }

    /// The document as a single JSON object.
    pub fn to_json(&self) -> JsonValue {
        let mut object = self.values.clone();
        if !self.dependencies.is_empty() {
            let deps = self
                .dependencies
                .iter()
                .map(|(k, v)| (k.clone(), JsonValue::String(v.clone())))
                .collect();
            object.insert(DEPENDENCIES_KEY.to_string(), JsonValue::Object(deps));
        }
        JsonValue::Object(object)
    }

    /// Pretty-printed JSON with a trailing newline. Key order is stable.
    pub fn to_pretty_string(&self) -> Result<String> {
        let mut text =
            serde_json::to_string_pretty(&self.to_json()).map_err(|e| GenError::Document {
                detail: e.to_string(),
            })?;
        text.push('\n');
        Ok(text)
    }
}

/// Export every field's default, annotated with the schema's dependencies.
pub fn export_template(schema: &ParameterSchema) -> ConfigDocument {
    export_config(schema, &schema.defaults())
}

/// Export the values of an existing configuration.
pub fn export_config(schema: &ParameterSchema, config: &Configuration) -> ConfigDocument {
    let values = schema
        .params()
        .iter()
        .filter_map(|p| Some((p.name.clone(), to_json(config.get(&p.name)?))))
        .collect();
    ConfigDocument {
        values,
        dependencies: schema.dependencies(),
    }
}

/// Overlay the document's values onto the schema defaults, without validating.
///
/// Unknown keys are rejected. Values that are neither integers nor booleans
/// cannot be represented and are rejected as malformed documents.
pub fn overlay_document(schema: &ParameterSchema, document: &ConfigDocument) -> Result<RawConfig> {
    let mut raw = schema.defaults().to_raw();
    for (key, json) in &document.values {
        if !schema.contains(key) {
            return Err(GenError::UnknownField {
                schema: schema.name().to_string(),
                field: key.clone(),
            });
        }
        raw.insert(key.clone(), from_json(key, json)?);
    }
    Ok(raw)
}

/// Import a document: overlay onto defaults, then validate.
pub fn import_config(schema: &ParameterSchema, document: &ConfigDocument) -> Result<Validated> {
    let raw = overlay_document(schema, document)?;
    validate(schema, &raw)
}

fn to_json(value: Value) -> JsonValue {
    match value {
        Value::Bool(b) => JsonValue::Bool(b),
        Value::Int(v) => JsonValue::from(v),
    }
}

fn from_json(key: &str, json: &JsonValue) -> Result<Value> {
    match json {
        JsonValue::Bool(b) => Ok(Value::Bool(*b)),
        JsonValue::Number(n) => n.as_i64().map(Value::Int).ok_or_else(|| GenError::Document {
            detail: format!("'{key}' = {n} is not an integer"),
        }),
        other => Err(GenError::Document {
            detail: format!("'{key}' must be a number or boolean, found {other}"),
        }),
    }
}
