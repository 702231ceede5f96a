//! Static tool declarations.
//!
//! A [`ToolSchema`] is built once at startup from [`ParameterSpec`] values and
//! never changes afterwards. It is the single source for both argument
//! coercion and the JSON Schema advertised in `tools/list`.

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;

use rmcp::model::{JsonObject, Tool as McpTool, ToolAnnotations};
use serde_json::{Value, json};

use super::coerce::ArgValue;
use super::error::RegistryError;
use super::registry::MutationClass;
use crate::types::{ParameterName, ToolName};

/// Largest integer a JSON number can carry without losing precision.
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Representation a parameter must have in the argument map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    String,
    Number,
    Boolean,
    NumberArray,
    StringArray,
}

impl ParameterKind {
    /// Value used when an optional parameter without a default is omitted.
    pub fn zero_value(self) -> ArgValue {
        match self {
            Self::String => ArgValue::String(String::new()),
            Self::Number => ArgValue::Number(0.0),
            Self::Boolean => ArgValue::Boolean(false),
            Self::NumberArray => ArgValue::NumberArray(Vec::new()),
            Self::StringArray => ArgValue::StringArray(Vec::new()),
        }
    }

    pub fn is_array(self) -> bool {
        matches!(self, Self::NumberArray | Self::StringArray)
    }

    /// Human-readable expectation used in error messages.
    pub fn expected(self, integral: bool) -> &'static str {
        match (self, integral) {
            (Self::String, _) => "a string",
            (Self::Number, false) => "a number",
            (Self::Number, true) => "a non-negative integer",
            (Self::Boolean, _) => "a boolean",
            (Self::NumberArray, false) => "an array of numbers",
            (Self::NumberArray, true) => "an array of non-negative integers",
            (Self::StringArray, _) => "an array of strings",
        }
    }

    /// Expectation for a single array element.
    pub fn expected_item(self, integral: bool) -> &'static str {
        match (self, integral) {
            (Self::StringArray, _) => "a string",
            (_, true) => "a non-negative integer",
            _ => "a number",
        }
    }

    fn json_type(self, integral: bool) -> &'static str {
        match (self, integral) {
            (Self::String, _) => "string",
            (Self::Number, false) => "number",
            (Self::Number, true) => "integer",
            (Self::Boolean, _) => "boolean",
            (Self::NumberArray, _) | (Self::StringArray, _) => "array",
        }
    }
}

/// Declaration of a single tool parameter.
///
/// ```ignore
/// ParameterSpec::integer("index").required().describe("issue index")
/// ```
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    name: ParameterName,
    kind: ParameterKind,
    required: bool,
    integral: bool,
    default: Option<ArgValue>,
    allowed: Option<Vec<String>>,
    description: String,
}

impl ParameterSpec {
    fn new(name: &str, kind: ParameterKind) -> Self {
        Self {
            name: ParameterName::new(name),
            kind,
            required: false,
            integral: false,
            default: None,
            allowed: None,
            description: String::new(),
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, ParameterKind::String)
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, ParameterKind::Number)
    }

    /// A number that must be a non-negative whole value (IDs, indexes, pages).
    pub fn integer(name: &str) -> Self {
        Self::new(name, ParameterKind::Number).integral()
    }

    pub fn boolean(name: &str) -> Self {
        Self::new(name, ParameterKind::Boolean)
    }

    pub fn number_array(name: &str) -> Self {
        Self::new(name, ParameterKind::NumberArray)
    }

    /// An array whose elements must all be non-negative whole numbers.
    pub fn integer_array(name: &str) -> Self {
        Self::new(name, ParameterKind::NumberArray).integral()
    }

    pub fn string_array(name: &str) -> Self {
        Self::new(name, ParameterKind::StringArray)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn integral(mut self) -> Self {
        self.integral = true;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn default_string(mut self, value: impl Into<String>) -> Self {
        self.default = Some(ArgValue::String(value.into()));
        self
    }

    pub fn default_number(mut self, value: f64) -> Self {
        self.default = Some(ArgValue::Number(value));
        self
    }

    pub fn default_bool(mut self, value: bool) -> Self {
        self.default = Some(ArgValue::Boolean(value));
        self
    }

    /// Restrict a string parameter to a fixed set of values.
    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn name(&self) -> &ParameterName {
        &self.name
    }

    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_integral(&self) -> bool {
        self.integral
    }

    pub fn default_value(&self) -> Option<&ArgValue> {
        self.default.as_ref()
    }

    pub fn allowed_values(&self) -> Option<&[String]> {
        self.allowed.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Check the declaration invariants, returning the violated rule.
    fn check(&self) -> Result<(), String> {
        if self.required && self.default.is_some() {
            return Err("a required parameter cannot carry a default".to_string());
        }
        if self.integral && !matches!(self.kind, ParameterKind::Number | ParameterKind::NumberArray) {
            return Err("only numeric parameters can be integral".to_string());
        }
        if let Some(default) = &self.default {
            if default.kind() != self.kind {
                return Err(format!(
                    "default must be {}",
                    self.kind.expected(self.integral)
                ));
            }
            if self.integral {
                if let ArgValue::Number(n) = default {
                    if !is_non_negative_integer(*n) {
                        return Err("default must be a non-negative integer".to_string());
                    }
                }
            }
        }
        if let Some(allowed) = &self.allowed {
            if self.kind != ParameterKind::String {
                return Err("enum constraints are only supported on strings".to_string());
            }
            if allowed.is_empty() {
                return Err("enum constraint must allow at least one value".to_string());
            }
            if let Some(ArgValue::String(default)) = &self.default {
                if !allowed.contains(default) {
                    return Err(format!("default `{}` is not an allowed value", default));
                }
            }
        }
        Ok(())
    }

    /// JSON Schema fragment for this parameter.
    fn json_schema(&self) -> Value {
        let mut property = serde_json::Map::new();
        property.insert(
            "type".to_string(),
            json!(self.kind.json_type(self.integral)),
        );
        if !self.description.is_empty() {
            property.insert("description".to_string(), json!(self.description));
        }
        if self.kind.is_array() {
            let item_type = match (self.kind, self.integral) {
                (ParameterKind::StringArray, _) => "string",
                (_, true) => "integer",
                _ => "number",
            };
            property.insert("items".to_string(), json!({ "type": item_type }));
        }
        if let Some(allowed) = &self.allowed {
            property.insert("enum".to_string(), json!(allowed));
        }
        if let Some(default) = &self.default {
            property.insert("default".to_string(), default.to_json());
        }
        Value::Object(property)
    }
}

/// Whole, finite, non-negative and exactly representable as an integer.
pub(crate) fn is_non_negative_integer(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0 && (0.0..=MAX_SAFE_INTEGER).contains(&value)
}

/// Immutable description of one tool.
#[derive(Debug, Clone)]
pub struct ToolSchema {
    name: ToolName,
    description: String,
    parameters: Vec<ParameterSpec>,
}

impl ToolSchema {
    pub fn new(name: impl Into<ToolName>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    /// Append a parameter; declaration order is coercion order.
    pub fn param(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    pub fn params(mut self, specs: impl IntoIterator<Item = ParameterSpec>) -> Self {
        self.parameters.extend(specs);
        self
    }

    pub fn name(&self) -> &ToolName {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name.as_str() == name)
    }

    /// Validate every parameter declaration and name uniqueness.
    pub fn validate(&self) -> Result<(), RegistryError> {
        let mut seen = HashSet::new();
        for spec in &self.parameters {
            if !seen.insert(spec.name.as_str()) {
                return Err(self.invalid(spec, "parameter declared twice".to_string()));
            }
            spec.check().map_err(|reason| self.invalid(spec, reason))?;
        }
        Ok(())
    }

    fn invalid(&self, spec: &ParameterSpec, reason: String) -> RegistryError {
        RegistryError::InvalidSchema {
            tool: self.name.clone(),
            parameter: spec.name.clone(),
            reason,
        }
    }

    /// Build the `inputSchema` object for this tool.
    pub fn input_schema(&self) -> JsonObject {
        let mut schema = JsonObject::new();
        schema.insert("type".to_string(), json!("object"));

        let mut properties = serde_json::Map::new();
        for spec in &self.parameters {
            properties.insert(spec.name.to_string(), spec.json_schema());
        }
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        schema.insert("properties".to_string(), Value::Object(properties));
        schema.insert("required".to_string(), json!(required));
        schema
    }

    /// Converts this schema to an `McpTool` for use in `list_tools`.
    pub fn to_mcp_tool(&self, class: MutationClass) -> McpTool {
        let read_only = class == MutationClass::Read;
        McpTool {
            name: Cow::Owned(self.name.to_string()),
            title: None,
            description: Some(Cow::Owned(self.description.clone())),
            input_schema: Arc::new(self.input_schema()),
            output_schema: None,
            annotations: Some(ToolAnnotations {
                title: None,
                read_only_hint: Some(read_only),
                destructive_hint: Some(!read_only),
                idempotent_hint: None,
                open_world_hint: Some(true),
            }),
            icons: None,
            meta: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels_schema() -> ToolSchema {
        ToolSchema::new("list_repo_labels", "Lists all labels for a given repository")
            .param(ParameterSpec::string("owner").required().describe("repository owner"))
            .param(ParameterSpec::string("repo").required().describe("repository name"))
            .param(ParameterSpec::integer("page").default_number(1.0))
            .param(ParameterSpec::integer("pageSize").default_number(100.0))
    }

    #[test]
    fn test_valid_schema() {
        assert!(labels_schema().validate().is_ok());
    }

    #[test]
    fn test_required_with_default_is_rejected() {
        let schema = ToolSchema::new("t", "d")
            .param(ParameterSpec::integer("page").required().default_number(1.0));
        let err = schema.validate().unwrap_err();
        assert!(matches!(err, RegistryError::InvalidSchema { .. }));
        assert!(err.to_string().contains("cannot carry a default"));
    }

    #[test]
    fn test_default_kind_mismatch_is_rejected() {
        let schema =
            ToolSchema::new("t", "d").param(ParameterSpec::string("state").default_number(1.0));
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_enum_rules() {
        let on_number = ToolSchema::new("t", "d")
            .param(ParameterSpec::number("n").one_of(["1", "2"]));
        assert!(on_number.validate().is_err());

        let bad_default = ToolSchema::new("t", "d").param(
            ParameterSpec::string("state")
                .one_of(["open", "closed"])
                .default_string("all"),
        );
        assert!(bad_default.validate().is_err());

        let good = ToolSchema::new("t", "d").param(
            ParameterSpec::string("state")
                .one_of(["open", "closed", "all"])
                .default_string("all"),
        );
        assert!(good.validate().is_ok());
    }

    #[test]
    fn test_duplicate_parameter_is_rejected() {
        let schema = ToolSchema::new("t", "d")
            .param(ParameterSpec::string("owner"))
            .param(ParameterSpec::string("owner"));
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_fractional_integral_default_is_rejected() {
        let schema = ToolSchema::new("t", "d").param(ParameterSpec::integer("page").default_number(1.5));
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_input_schema_shape() {
        let schema = labels_schema().input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["owner", "repo"]));
        assert_eq!(schema["properties"]["owner"]["type"], "string");
        assert_eq!(schema["properties"]["owner"]["description"], "repository owner");
        assert_eq!(schema["properties"]["page"]["type"], "integer");
        assert_eq!(schema["properties"]["page"]["default"], json!(1.0));
    }

    #[test]
    fn test_array_and_enum_schema() {
        let schema = ToolSchema::new("t", "d")
            .param(ParameterSpec::integer_array("labels").required())
            .param(ParameterSpec::string("sort").one_of(["oldest", "priority"]))
            .input_schema();
        assert_eq!(schema["properties"]["labels"]["type"], "array");
        assert_eq!(schema["properties"]["labels"]["items"]["type"], "integer");
        assert_eq!(schema["properties"]["sort"]["enum"], json!(["oldest", "priority"]));
    }

    #[test]
    fn test_to_mcp_tool_carries_mutation_hint() {
        let read = labels_schema().to_mcp_tool(MutationClass::Read);
        assert_eq!(read.name, "list_repo_labels");
        assert_eq!(read.annotations.as_ref().unwrap().read_only_hint, Some(true));

        let write = labels_schema().to_mcp_tool(MutationClass::Write);
        assert_eq!(write.annotations.as_ref().unwrap().read_only_hint, Some(false));
        assert_eq!(write.annotations.as_ref().unwrap().destructive_hint, Some(true));
    }

    #[test]
    fn test_is_non_negative_integer() {
        assert!(is_non_negative_integer(0.0));
        assert!(is_non_negative_integer(42.0));
        assert!(!is_non_negative_integer(-1.0));
        assert!(!is_non_negative_integer(1.5));
        assert!(!is_non_negative_integer(f64::NAN));
        assert!(!is_non_negative_integer(f64::INFINITY));
    }
}
