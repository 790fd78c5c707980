//! Schema generation and validation.

use jsonschema::{Draft, JSONSchema};
use serde_json::json;

/// JSON schema for `T`, trimmed to what a tool `parameters` field needs.
pub fn json_schema_from_type<T: schemars::JsonSchema>() -> serde_json::Value {
    let schema = schemars::schema_for!(T);
    let mut value = serde_json::to_value(&schema).unwrap_or_else(|_| json!({}));
    if let Some(obj) = value.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
        obj.entry("properties").or_insert_with(|| json!({}));
    }
    value
}

/// Compiled schema used to check tool arguments.
pub struct SchemaValidator {
    schema: JSONSchema,
}

impl SchemaValidator {
    pub fn compile(schema: &serde_json::Value) -> Result<Self, String> {
        let schema = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(schema)
            .map_err(|e| format!("Failed to compile schema: {}", e))?;
        Ok(Self { schema })
    }

    /// All violations, joined into one message.
    pub fn validate(&self, instance: &serde_json::Value) -> Result<(), String> {
        self.schema.validate(instance).map_err(|errors| {
            errors
                .map(|e| {
                    let path = e.instance_path.to_string();
                    if path.is_empty() {
                        e.to_string()
                    } else {
                        format!("{}: {}", path, e)
                    }
                })
                .collect::<Vec<_>>()
                .join("; ")
        })
    }
}
