//! Argument coercion.
//!
//! The raw `arguments` object of a `tools/call` request is only ever touched
//! here. [`coerce`] walks a tool's parameters in declaration order and
//! produces a typed [`ToolArgs`] record, or the first error it meets.

use std::collections::{BTreeMap, BTreeSet};

use rmcp::model::JsonObject;
use serde_json::{Value, json};

use super::error::ToolError;
use super::schema::{ParameterKind, ParameterSpec, ToolSchema, is_non_negative_integer};

/// Untyped arguments as delivered by the transport.
pub type ArgumentMap = JsonObject;

/// A coerced parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    String(String),
    Number(f64),
    Boolean(bool),
    NumberArray(Vec<f64>),
    StringArray(Vec<String>),
}

impl ArgValue {
    pub fn kind(&self) -> ParameterKind {
        match self {
            Self::String(_) => ParameterKind::String,
            Self::Number(_) => ParameterKind::Number,
            Self::Boolean(_) => ParameterKind::Boolean,
            Self::NumberArray(_) => ParameterKind::NumberArray,
            Self::StringArray(_) => ParameterKind::StringArray,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::String(s) => json!(s),
            Self::Number(n) => json!(n),
            Self::Boolean(b) => json!(b),
            Self::NumberArray(items) => json!(items),
            Self::StringArray(items) => json!(items),
        }
    }
}

/// Typed arguments handed to a tool handler.
///
/// Every declared parameter has a value (supplied, defaulted, or the kind's
/// zero value). `explicit` remembers which ones did not come from the zero
/// value, so handlers can tell "omitted" apart from "set to empty".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArgs {
    values: BTreeMap<String, ArgValue>,
    explicit: BTreeSet<String>,
}

impl ToolArgs {
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    /// Whether the caller supplied the parameter or a default filled it in.
    pub fn is_set(&self, name: &str) -> bool {
        self.explicit.contains(name)
    }

    /// String value, `""` when omitted without a default.
    pub fn str(&self, name: &str) -> &str {
        match self.values.get(name) {
            Some(ArgValue::String(s)) => s,
            _ => "",
        }
    }

    /// String value, `None` when omitted without a default.
    pub fn opt_str(&self, name: &str) -> Option<&str> {
        if self.is_set(name) {
            Some(self.str(name))
        } else {
            None
        }
    }

    pub fn number(&self, name: &str) -> f64 {
        match self.values.get(name) {
            Some(ArgValue::Number(n)) => *n,
            _ => 0.0,
        }
    }

    /// Integral parameter as `i64`. Coercion has already checked the range.
    pub fn int(&self, name: &str) -> i64 {
        self.number(name) as i64
    }

    pub fn opt_int(&self, name: &str) -> Option<i64> {
        if self.is_set(name) {
            Some(self.int(name))
        } else {
            None
        }
    }

    pub fn bool(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(ArgValue::Boolean(true)))
    }

    pub fn numbers(&self, name: &str) -> &[f64] {
        match self.values.get(name) {
            Some(ArgValue::NumberArray(items)) => items,
            _ => &[],
        }
    }

    pub fn ints(&self, name: &str) -> Vec<i64> {
        self.numbers(name).iter().map(|n| *n as i64).collect()
    }

    pub fn strings(&self, name: &str) -> &[String] {
        match self.values.get(name) {
            Some(ArgValue::StringArray(items)) => items,
            _ => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All coerced values as a JSON object (for logging and tests).
    pub fn to_json(&self) -> Value {
        let map: serde_json::Map<String, Value> = self
            .values
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        Value::Object(map)
    }

    fn insert(&mut self, spec: &ParameterSpec, value: ArgValue, explicit: bool) {
        let name = spec.name().to_string();
        if explicit {
            self.explicit.insert(name.clone());
        }
        self.values.insert(name, value);
    }
}

/// Coerce `args` against every parameter of `schema`.
///
/// Keys the schema does not declare are ignored.
pub fn coerce(schema: &ToolSchema, args: &ArgumentMap) -> Result<ToolArgs, ToolError> {
    let mut out = ToolArgs::default();
    for spec in schema.parameters() {
        // JSON null counts as "not supplied".
        match args.get(spec.name().as_str()).filter(|v| !v.is_null()) {
            Some(raw) => {
                let value = coerce_present(spec, raw)?;
                out.insert(spec, value, true);
            }
            None if spec.is_required() => {
                return Err(ToolError::MissingParameter {
                    name: spec.name().clone(),
                });
            }
            None => match spec.default_value() {
                Some(default) => out.insert(spec, default.clone(), true),
                None => out.insert(spec, spec.kind().zero_value(), false),
            },
        }
    }
    Ok(out)
}

fn coerce_present(spec: &ParameterSpec, raw: &Value) -> Result<ArgValue, ToolError> {
    let wrong_type = || ToolError::InvalidParameterType {
        name: spec.name().clone(),
        expected: spec.kind().expected(spec.is_integral()),
    };

    match spec.kind() {
        ParameterKind::String => {
            let s = raw.as_str().ok_or_else(wrong_type)?;
            if let Some(allowed) = spec.allowed_values() {
                if !allowed.iter().any(|a| a == s) {
                    return Err(ToolError::InvalidParameterValue {
                        name: spec.name().clone(),
                        allowed: allowed.to_vec(),
                    });
                }
            }
            Ok(ArgValue::String(s.to_string()))
        }
        ParameterKind::Number => {
            let n = raw.as_f64().ok_or_else(wrong_type)?;
            if spec.is_integral() && !is_non_negative_integer(n) {
                return Err(wrong_type());
            }
            Ok(ArgValue::Number(n))
        }
        ParameterKind::Boolean => raw.as_bool().map(ArgValue::Boolean).ok_or_else(wrong_type),
        ParameterKind::NumberArray => {
            let items = raw.as_array().ok_or_else(wrong_type)?;
            let mut numbers = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let n = item
                    .as_f64()
                    .filter(|n| !spec.is_integral() || is_non_negative_integer(*n))
                    .ok_or_else(|| bad_element(spec, index))?;
                numbers.push(n);
            }
            Ok(ArgValue::NumberArray(numbers))
        }
        ParameterKind::StringArray => {
            let items = raw.as_array().ok_or_else(wrong_type)?;
            let mut strings = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let s = item.as_str().ok_or_else(|| bad_element(spec, index))?;
                strings.push(s.to_string());
            }
            Ok(ArgValue::StringArray(strings))
        }
    }
}

fn bad_element(spec: &ParameterSpec, index: usize) -> ToolError {
    ToolError::InvalidArrayElement {
        name: spec.name().clone(),
        index,
        expected: spec.kind().expected_item(spec.is_integral()),
    }
}
