use serde_json::Value;

/// Tool schema builder.
///
/// Produces the plain JSON-schema subset that every supported backend
/// accepts (no `$schema`, no `$ref`).
#[derive(Debug, Clone)]
pub struct ToolSchema {
    pub type_: String,
    pub properties: serde_json::Map<String, Value>,
    pub required: Vec<String>,
}

impl ToolSchema {
    pub fn new() -> Self {
        Self {
            type_: "object".to_string(),
            properties: serde_json::Map::new(),
            required: Vec::new(),
        }
    }

    pub fn property(
        self,
        name: impl Into<String>,
        type_: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.property_with(name, type_, description, None)
    }

    /// Add a property with an advertised default value
    pub fn property_with_default(
        self,
        name: impl Into<String>,
        type_: impl Into<String>,
        description: impl Into<String>,
        default: impl Into<Value>,
    ) -> Self {
        self.property_with(name, type_, description, Some(default.into()))
    }

    fn property_with(
        mut self,
        name: impl Into<String>,
        type_: impl Into<String>,
        description: impl Into<String>,
        default: Option<Value>,
    ) -> Self {
        let mut prop = serde_json::Map::new();
        prop.insert("type".to_string(), Value::String(type_.into()));
        prop.insert("description".to_string(), Value::String(description.into()));
        if let Some(default) = default {
            prop.insert("default".to_string(), default);
        }

        self.properties.insert(name.into(), Value::Object(prop));
        self
    }

    pub fn required(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    pub fn build(self) -> Value {
        let mut schema = serde_json::Map::new();
        schema.insert("type".to_string(), Value::String(self.type_));
        schema.insert("properties".to_string(), Value::Object(self.properties));
        if !self.required.is_empty() {
            schema.insert(
                "required".to_string(),
                Value::Array(self.required.into_iter().map(Value::String).collect()),
            );
        }

        Value::Object(schema)
    }
}

impl Default for ToolSchema {
    fn default() -> Self {
        Self::new()
    }
}
