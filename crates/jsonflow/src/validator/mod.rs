//! The schema validator.
//!
//! A [`Validator`] is a set of pure functions over one resolved schema: it
//! decides, for a given value and sub-schema, whether all asserted
//! constraints hold, producing zero or more structured
//! [`ValidationError`]s. Beyond the definitions table built at
//! construction, it keeps no state, so repeated calls with the same inputs
//! return the same errors and speculative sub-validations (for `anyOf`,
//! `oneOf`, `not`, `if`) cannot observe each other.
//!
//! During streaming, the parser queries [`Validator::schema_at`] and
//! [`Validator::can_be_type`] on structural transitions for early type
//! rejection, and runs full validation as each value completes.

mod formats;

use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::path::PathComponent;
use crate::schema::{Items, Schema, SchemaOrBool, SchemaRef, TypeName};
use crate::value::{Value, ValueKind};

/// A single failed constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Path segments from the root to the offending value.
    pub path: Vec<String>,
    pub message: String,
    /// The schema keyword that failed, e.g. `type` or `required`. Syntax
    /// errors recorded in lenient mode use the keyword `syntax`.
    pub keyword: &'static str,
    /// The sub-schema the check ran against; absent for synthetic syntax
    /// errors.
    pub schema: Option<SchemaRef>,
    /// The offending value, when it is cheap to carry.
    pub value: Option<Value>,
}

impl core::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} at '{}'", self.message, self.path.join("."))
        }
    }
}

/// Validator behavior knobs.
#[derive(Debug, Clone, Copy)]
pub struct ValidatorOptions {
    /// Stop checking a value after a failed `type` assertion.
    pub early_reject: bool,
    /// Accepted for interface compatibility; errors are always accumulated
    /// within a call.
    pub all_errors: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            early_reject: true,
            all_errors: true,
        }
    }
}

/// Pure validation over a shared [`Schema`].
#[derive(Debug, Clone)]
pub struct Validator {
    root: SchemaRef,
    definitions: HashMap<String, SchemaRef>,
    options: ValidatorOptions,
}

/// Follow at most this many `$ref` hops before giving up on a chain, which
/// bounds reference cycles.
const MAX_REF_HOPS: usize = 32;

impl Validator {
    /// Builds a validator over `root`, merging `$defs` and `definitions`
    /// into one lookup table (`$defs` wins on name collisions).
    #[must_use]
    pub fn new(root: SchemaRef) -> Self {
        Self::with_options(root, ValidatorOptions::default())
    }

    #[must_use]
    pub fn with_options(root: SchemaRef, options: ValidatorOptions) -> Self {
        let mut definitions = HashMap::new();
        if let Some(defs) = &root.definitions {
            for (name, schema) in defs {
                definitions.insert(name.clone(), schema.clone());
            }
        }
        if let Some(defs) = &root.defs {
            for (name, schema) in defs {
                definitions.insert(name.clone(), schema.clone());
            }
        }
        Self {
            root,
            definitions,
            options,
        }
    }

    /// The schema this validator was built over.
    #[must_use]
    pub fn schema(&self) -> &SchemaRef {
        &self.root
    }

    /// Validates `value` against the root schema.
    #[must_use]
    pub fn validate(&self, value: &Value) -> Vec<ValidationError> {
        self.validate_with(&self.root.clone(), value, &[])
    }

    /// Validates `value` against the sub-schema addressed by `path`. When no
    /// sub-schema exists at that path the value is unconstrained.
    #[must_use]
    pub fn validate_at(&self, value: &Value, path: &[PathComponent]) -> Vec<ValidationError> {
        match self.schema_at(path) {
            Some(schema) => self.validate_with(&schema, value, path),
            None => Vec::new(),
        }
    }

    /// Validates `value` against a specific (already resolved) sub-schema,
    /// reporting error paths relative to `path`.
    #[must_use]
    pub fn validate_with(
        &self,
        schema: &SchemaRef,
        value: &Value,
        path: &[PathComponent],
    ) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut segments: Vec<String> = path.iter().map(ToString::to_string).collect();
        self.check(schema, value, &mut segments, &mut errors);
        errors
    }

    /// Resolves the sub-schema addressed by `path`, descending `properties`
    /// by name, numeric indices through tuple or uniform `items`, or
    /// `additionalProperties` when present, resolving `$ref` at each hop.
    #[must_use]
    pub fn schema_at(&self, path: &[PathComponent]) -> Option<SchemaRef> {
        let mut current = self.resolve(&self.root.clone());
        for component in path {
            let next = match component {
                PathComponent::Key(key) => current
                    .properties
                    .as_ref()
                    .and_then(|props| props.get(key).cloned())
                    .or_else(|| match &current.additional_properties {
                        Some(SchemaOrBool::Schema(s)) => Some(s.clone()),
                        _ => None,
                    }),
                PathComponent::Index(index) => match &current.items {
                    Some(Items::Tuple(tuple)) => tuple.get(*index).cloned(),
                    Some(Items::Uniform(s)) => Some(s.clone()),
                    None => None,
                },
            }?;
            current = self.resolve(&next);
        }
        Some(current)
    }

    /// Whether a value of `kind` is admissible at `path`. True when no
    /// schema constrains that location; `number` passes an `integer`
    /// constraint so numeric containers are not rejected before their value
    /// is known.
    #[must_use]
    pub fn can_be_type(&self, kind: ValueKind, path: &[PathComponent]) -> bool {
        match self.schema_at(path) {
            Some(schema) => Self::admits_kind(&schema, kind),
            None => true,
        }
    }

    /// The `required` property names of the (object) schema at `path`.
    #[must_use]
    pub fn required(&self, path: &[PathComponent]) -> Vec<String> {
        self.schema_at(path)
            .and_then(|s| s.required.clone())
            .unwrap_or_default()
    }

    /// Whether `name` is a required property of the object at `parent_path`.
    #[must_use]
    pub fn is_required(&self, name: &str, parent_path: &[PathComponent]) -> bool {
        self.required(parent_path).iter().any(|n| n == name)
    }

    /// Kind admissibility against an already resolved schema; used by the
    /// parser with the sub-schema cached on its stack frames.
    #[must_use]
    pub(crate) fn admits_kind(schema: &Schema, kind: ValueKind) -> bool {
        match &schema.schema_type {
            Some(types) => types.iter().any(|t| match (t, kind) {
                (TypeName::Null, ValueKind::Null)
                | (TypeName::Boolean, ValueKind::Boolean)
                | (TypeName::Number | TypeName::Integer, ValueKind::Number)
                | (TypeName::String, ValueKind::String)
                | (TypeName::Array, ValueKind::Array)
                | (TypeName::Object, ValueKind::Object) => true,
                _ => false,
            }),
            None => {
                let object_only = schema.hints_object();
                let array_only = schema.hints_array();
                if !object_only && !array_only {
                    return true;
                }
                (object_only && kind == ValueKind::Object)
                    || (array_only && kind == ValueKind::Array)
            }
        }
    }

    /// Follows same-document `$ref` pointers (`#/$defs/NAME`,
    /// `#/definitions/NAME`). Unresolvable or overly deep chains return the
    /// last schema reached; its remaining keywords still apply.
    fn resolve(&self, schema: &SchemaRef) -> SchemaRef {
        let mut current = schema.clone();
        for _ in 0..MAX_REF_HOPS {
            let Some(reference) = current.reference.as_deref() else {
                break;
            };
            let name = reference
                .strip_prefix("#/$defs/")
                .or_else(|| reference.strip_prefix("#/definitions/"));
            match name.and_then(|n| self.definitions.get(n)) {
                Some(next) => current = next.clone(),
                None => {
                    tracing::debug!(reference, "unresolvable schema reference");
                    break;
                }
            }
        }
        current
    }

    fn check(
        &self,
        schema: &SchemaRef,
        value: &Value,
        path: &mut Vec<String>,
        errors: &mut Vec<ValidationError>,
    ) {
        let schema = self.resolve(schema);

        if let Some(types) = &schema.schema_type {
            if !types.iter().any(|t| t.admits(value)) {
                let expected: Vec<String> = types.iter().map(|t| t.to_string()).collect();
                errors.push(Self::error(
                    path,
                    "type",
                    format!(
                        "expected {} but got {}",
                        expected.join(" or "),
                        value.kind()
                    ),
                    &schema,
                    Some(value),
                ));
                if self.options.early_reject {
                    return;
                }
            }
        }

        if let Some(expected) = &schema.const_value {
            if value != expected {
                errors.push(Self::error(
                    path,
                    "const",
                    format!("value must equal {expected}"),
                    &schema,
                    Some(value),
                ));
            }
        }

        if let Some(allowed) = &schema.enum_values {
            if !allowed.iter().any(|v| v == value) {
                errors.push(Self::error(
                    path,
                    "enum",
                    "value is not one of the permitted alternatives".to_string(),
                    &schema,
                    Some(value),
                ));
            }
        }

        match value {
            Value::String(s) => self.check_string(&schema, s, value, path, errors),
            Value::Number(n) => Self::check_number(&schema, *n, value, path, errors),
            Value::Array(items) => self.check_array(&schema, items, path, errors),
            Value::Object(map) => self.check_object(&schema, map, path, errors),
            Value::Null | Value::Boolean(_) => {}
        }

        self.check_combinators(&schema, value, path, errors);

        if let Some(condition) = &schema.if_schema {
            let branch = if self.probe(condition, value, path) {
                schema.then_schema.as_ref()
            } else {
                schema.else_schema.as_ref()
            };
            if let Some(branch) = branch {
                self.check(branch, value, path, errors);
            }
        }
    }

    fn check_string(
        &self,
        schema: &SchemaRef,
        s: &str,
        value: &Value,
        path: &mut Vec<String>,
        errors: &mut Vec<ValidationError>,
    ) {
        let length = s.chars().count() as u64;
        if let Some(min) = schema.min_length {
            if length < min {
                errors.push(Self::error(
                    path,
                    "minLength",
                    format!("string is shorter than {min} characters"),
                    schema,
                    Some(value),
                ));
            }
        }
        if let Some(max) = schema.max_length {
            if length > max {
                errors.push(Self::error(
                    path,
                    "maxLength",
                    format!("string is longer than {max} characters"),
                    schema,
                    Some(value),
                ));
            }
        }
        if let Some(pattern) = &schema.pattern {
            match Regex::new(pattern) {
                Ok(re) => {
                    if !re.is_match(s) {
                        errors.push(Self::error(
                            path,
                            "pattern",
                            format!("string does not match pattern {pattern:?}"),
                            schema,
                            Some(value),
                        ));
                    }
                }
                Err(_) => tracing::debug!(%pattern, "uncompilable pattern skipped"),
            }
        }
        if let Some(format) = &schema.format {
            if formats::check(format, s) == Some(false) {
                errors.push(Self::error(
                    path,
                    "format",
                    format!("string is not a valid {format}"),
                    schema,
                    Some(value),
                ));
            }
        }
    }

    fn check_number(
        schema: &SchemaRef,
        n: f64,
        value: &Value,
        path: &mut Vec<String>,
        errors: &mut Vec<ValidationError>,
    ) {
        if let Some(min) = schema.minimum {
            if n < min {
                errors.push(Self::error(
                    path,
                    "minimum",
                    format!("{n} is less than {min}"),
                    schema,
                    Some(value),
                ));
            }
        }
        if let Some(max) = schema.maximum {
            if n > max {
                errors.push(Self::error(
                    path,
                    "maximum",
                    format!("{n} is greater than {max}"),
                    schema,
                    Some(value),
                ));
            }
        }
        if let Some(min) = schema.exclusive_minimum {
            if n <= min {
                errors.push(Self::error(
                    path,
                    "exclusiveMinimum",
                    format!("{n} is not greater than {min}"),
                    schema,
                    Some(value),
                ));
            }
        }
        if let Some(max) = schema.exclusive_maximum {
            if n >= max {
                errors.push(Self::error(
                    path,
                    "exclusiveMaximum",
                    format!("{n} is not less than {max}"),
                    schema,
                    Some(value),
                ));
            }
        }
        if let Some(step) = schema.multiple_of {
            // Ordinary f64 remainder; inherits floating-point imprecision
            // for non-integral steps.
            if step != 0.0 && n % step != 0.0 {
                errors.push(Self::error(
                    path,
                    "multipleOf",
                    format!("{n} is not a multiple of {step}"),
                    schema,
                    Some(value),
                ));
            }
        }
    }

    fn check_array(
        &self,
        schema: &SchemaRef,
        items: &[Value],
        path: &mut Vec<String>,
        errors: &mut Vec<ValidationError>,
    ) {
        let count = items.len() as u64;
        if let Some(min) = schema.min_items {
            if count < min {
                errors.push(Self::error(
                    path,
                    "minItems",
                    format!("array has fewer than {min} items"),
                    schema,
                    None,
                ));
            }
        }
        if let Some(max) = schema.max_items {
            if count > max {
                errors.push(Self::error(
                    path,
                    "maxItems",
                    format!("array has more than {max} items"),
                    schema,
                    None,
                ));
            }
        }

        if schema.unique_items == Some(true) {
            let mut seen = HashSet::new();
            for (index, item) in items.iter().enumerate() {
                if !seen.insert(item.to_string()) {
                    errors.push(Self::error(
                        path,
                        "uniqueItems",
                        format!("duplicate item at index {index}"),
                        schema,
                        Some(item),
                    ));
                    break;
                }
            }
        }

        match &schema.items {
            Some(Items::Uniform(item_schema)) => {
                for (index, item) in items.iter().enumerate() {
                    path.push(index.to_string());
                    self.check(item_schema, item, path, errors);
                    path.pop();
                }
            }
            Some(Items::Tuple(tuple)) => {
                for (index, item) in items.iter().enumerate() {
                    if let Some(item_schema) = tuple.get(index) {
                        path.push(index.to_string());
                        self.check(item_schema, item, path, errors);
                        path.pop();
                        continue;
                    }
                    match &schema.additional_items {
                        Some(SchemaOrBool::Bool(false)) => {
                            path.push(index.to_string());
                            errors.push(Self::error(
                                path,
                                "additionalItems",
                                format!("item {index} exceeds the tuple length"),
                                schema,
                                Some(item),
                            ));
                            path.pop();
                        }
                        Some(SchemaOrBool::Schema(extra)) => {
                            path.push(index.to_string());
                            self.check(extra, item, path, errors);
                            path.pop();
                        }
                        Some(SchemaOrBool::Bool(true)) | None => {}
                    }
                }
            }
            None => {}
        }

        if let Some(contains) = &schema.contains {
            let any = items.iter().any(|item| self.probe(contains, item, path));
            if !any {
                errors.push(Self::error(
                    path,
                    "contains",
                    "no item matches the contains schema".to_string(),
                    schema,
                    None,
                ));
            }
        }
    }

    fn check_object(
        &self,
        schema: &SchemaRef,
        map: &crate::value::Map,
        path: &mut Vec<String>,
        errors: &mut Vec<ValidationError>,
    ) {
        let count = map.len() as u64;
        if let Some(min) = schema.min_properties {
            if count < min {
                errors.push(Self::error(
                    path,
                    "minProperties",
                    format!("object has fewer than {min} properties"),
                    schema,
                    None,
                ));
            }
        }
        if let Some(max) = schema.max_properties {
            if count > max {
                errors.push(Self::error(
                    path,
                    "maxProperties",
                    format!("object has more than {max} properties"),
                    schema,
                    None,
                ));
            }
        }

        if let Some(required) = &schema.required {
            for name in required {
                if !map.contains_key(name) {
                    errors.push(Self::error(
                        path,
                        "required",
                        format!("missing required property {name:?}"),
                        schema,
                        None,
                    ));
                }
            }
        }

        if let Some(properties) = &schema.properties {
            for (name, property_schema) in properties {
                if let Some(v) = map.get(name) {
                    path.push(name.clone());
                    self.check(property_schema, v, path, errors);
                    path.pop();
                }
            }
        }

        let pattern_schemas: Vec<(Regex, &SchemaRef)> = schema
            .pattern_properties
            .as_ref()
            .map(|patterns| {
                patterns
                    .iter()
                    .filter_map(|(pattern, s)| match Regex::new(pattern) {
                        Ok(re) => Some((re, s)),
                        Err(_) => {
                            tracing::debug!(%pattern, "uncompilable patternProperties key skipped");
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        for (re, pattern_schema) in &pattern_schemas {
            for (name, v) in map {
                if re.is_match(name) {
                    path.push(name.clone());
                    self.check(pattern_schema, v, path, errors);
                    path.pop();
                }
            }
        }

        if let Some(additional) = &schema.additional_properties {
            let known = |name: &str| {
                schema
                    .properties
                    .as_ref()
                    .is_some_and(|p| p.contains_key(name))
                    || pattern_schemas.iter().any(|(re, _)| re.is_match(name))
            };
            match additional {
                SchemaOrBool::Bool(false) => {
                    for (name, v) in map {
                        if !known(name) {
                            path.push(name.clone());
                            errors.push(Self::error(
                                path,
                                "additionalProperties",
                                format!("unexpected property {name:?}"),
                                schema,
                                Some(v),
                            ));
                            path.pop();
                        }
                    }
                }
                SchemaOrBool::Schema(extra) => {
                    for (name, v) in map {
                        if !known(name) {
                            path.push(name.clone());
                            self.check(extra, v, path, errors);
                            path.pop();
                        }
                    }
                }
                SchemaOrBool::Bool(true) => {}
            }
        }

        if let Some(names_schema) = &schema.property_names {
            for name in map.keys() {
                if !self.probe(names_schema, &Value::String(name.clone()), path) {
                    path.push(name.clone());
                    errors.push(Self::error(
                        path,
                        "propertyNames",
                        format!("property name {name:?} is not permitted"),
                        schema,
                        None,
                    ));
                    path.pop();
                }
            }
        }
    }

    fn check_combinators(
        &self,
        schema: &SchemaRef,
        value: &Value,
        path: &mut Vec<String>,
        errors: &mut Vec<ValidationError>,
    ) {
        if let Some(all) = &schema.all_of {
            for sub in all {
                self.check(sub, value, path, errors);
            }
        }

        if let Some(any) = &schema.any_of {
            if !any.iter().any(|sub| self.probe(sub, value, path)) {
                errors.push(Self::error(
                    path,
                    "anyOf",
                    format!("value matches none of the {} alternatives", any.len()),
                    schema,
                    Some(value),
                ));
            }
        }

        if let Some(one) = &schema.one_of {
            let matching = one
                .iter()
                .filter(|sub| self.probe(sub, value, path))
                .count();
            if matching != 1 {
                errors.push(Self::error(
                    path,
                    "oneOf",
                    format!("value matches {matching} alternatives instead of exactly one"),
                    schema,
                    Some(value),
                ));
            }
        }

        if let Some(not) = &schema.not {
            if self.probe(not, value, path) {
                errors.push(Self::error(
                    path,
                    "not",
                    "value matches the forbidden schema".to_string(),
                    schema,
                    Some(value),
                ));
            }
        }
    }

    /// Speculative sub-validation: whether `value` passes `schema` with zero
    /// errors. Runs against a scratch error list so the caller's output is
    /// untouched.
    fn probe(&self, schema: &SchemaRef, value: &Value, path: &mut Vec<String>) -> bool {
        let mut scratch = Vec::new();
        self.check(schema, value, path, &mut scratch);
        scratch.is_empty()
    }

    fn error(
        path: &[String],
        keyword: &'static str,
        message: String,
        schema: &SchemaRef,
        value: Option<&Value>,
    ) -> ValidationError {
        ValidationError {
            path: path.to_vec(),
            message,
            keyword,
            schema: Some(schema.clone()),
            value: value.cloned(),
        }
    }
}
