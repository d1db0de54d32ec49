//! JSON-Schema (draft-07 subset) representation.
//!
//! A [`Schema`] is an immutable record mirroring the draft-07 vocabulary the
//! validator understands. Schemas are deserialized once (see
//! [`Schema::parse`]) and shared by reference afterwards; sub-schemas are
//! held behind [`SchemaRef`] so a resolved sub-view can be cached cheaply by
//! the parser's container stack.
//!
//! Keywords outside the supported subset are ignored on deserialization.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::value::Value;

/// Shared handle to an immutable [`Schema`].
pub type SchemaRef = Arc<Schema>;

/// The `type` keyword: a single type name or a list of admissible names.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    One(TypeName),
    Many(Vec<TypeName>),
}

impl TypeSet {
    /// Iterates the admissible type names.
    pub fn iter(&self) -> impl Iterator<Item = TypeName> + '_ {
        let slice = match self {
            TypeSet::One(t) => core::slice::from_ref(t),
            TypeSet::Many(ts) => ts.as_slice(),
        };
        slice.iter().copied()
    }
}

/// A draft-07 primitive type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeName {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl TypeName {
    /// Whether `value` satisfies this type name. `integer` admits numbers
    /// with a zero fractional part.
    #[must_use]
    pub fn admits(self, value: &Value) -> bool {
        match self {
            TypeName::Null => value.is_null(),
            TypeName::Boolean => value.is_bool(),
            TypeName::Number => value.is_number(),
            TypeName::Integer => value
                .as_number()
                .is_some_and(|n| n.is_finite() && n.fract() == 0.0),
            TypeName::String => value.is_string(),
            TypeName::Array => value.is_array(),
            TypeName::Object => value.is_object(),
        }
    }
}

impl core::fmt::Display for TypeName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            TypeName::Null => "null",
            TypeName::Boolean => "boolean",
            TypeName::Integer => "integer",
            TypeName::Number => "number",
            TypeName::String => "string",
            TypeName::Array => "array",
            TypeName::Object => "object",
        })
    }
}

/// The `items` keyword: one uniform schema or a positional tuple.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Items {
    Uniform(SchemaRef),
    Tuple(Vec<SchemaRef>),
}

/// Keywords that accept either a boolean or a schema
/// (`additionalProperties`, `additionalItems`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SchemaOrBool {
    Bool(bool),
    Schema(SchemaRef),
}

/// A JSON-Schema draft-07 subset record.
///
/// # Examples
///
/// ```
/// use jsonflow::Schema;
///
/// let schema = Schema::parse(
///     r#"{"type": "object", "properties": {"age": {"type": "number"}}}"#,
/// )
/// .unwrap();
/// assert!(schema.properties.is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: Option<TypeSet>,
    #[serde(rename = "const")]
    pub const_value: Option<Value>,
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<Value>>,

    // string
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    pub format: Option<String>,

    // number
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub exclusive_maximum: Option<f64>,
    pub multiple_of: Option<f64>,

    // array
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: Option<bool>,
    pub items: Option<Items>,
    pub additional_items: Option<SchemaOrBool>,
    pub contains: Option<SchemaRef>,

    // object
    pub min_properties: Option<u64>,
    pub max_properties: Option<u64>,
    pub required: Option<Vec<String>>,
    pub properties: Option<IndexMap<String, SchemaRef>>,
    pub pattern_properties: Option<IndexMap<String, SchemaRef>>,
    pub additional_properties: Option<SchemaOrBool>,
    pub property_names: Option<SchemaRef>,

    // combinators
    pub all_of: Option<Vec<SchemaRef>>,
    pub any_of: Option<Vec<SchemaRef>>,
    pub one_of: Option<Vec<SchemaRef>>,
    pub not: Option<SchemaRef>,
    #[serde(rename = "if")]
    pub if_schema: Option<SchemaRef>,
    #[serde(rename = "then")]
    pub then_schema: Option<SchemaRef>,
    #[serde(rename = "else")]
    pub else_schema: Option<SchemaRef>,

    // references and definitions
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    #[serde(rename = "$defs")]
    pub defs: Option<IndexMap<String, SchemaRef>>,
    pub definitions: Option<IndexMap<String, SchemaRef>>,
}

impl Schema {
    /// Parses a schema from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the underlying deserialization error when `text` is not valid
    /// JSON or a keyword has an unusable shape.
    pub fn parse(text: &str) -> Result<SchemaRef, serde_json::Error> {
        serde_json::from_str::<Schema>(text).map(Arc::new)
    }

    /// Converts an in-memory [`serde_json::Value`] into a schema.
    ///
    /// # Errors
    ///
    /// Returns the underlying deserialization error when a keyword has an
    /// unusable shape.
    pub fn from_json(value: serde_json::Value) -> Result<SchemaRef, serde_json::Error> {
        serde_json::from_value::<Schema>(value).map(Arc::new)
    }

    /// Whether any object-shaped structural keyword is present. Used by
    /// `can_be_type` when no `type` keyword constrains the schema.
    #[must_use]
    pub(crate) fn hints_object(&self) -> bool {
        self.properties.is_some() || self.required.is_some()
    }

    /// Whether any array-shaped structural keyword is present.
    #[must_use]
    pub(crate) fn hints_array(&self) -> bool {
        self.items.is_some()
    }
}
