//! Per-operation synthesis of the access marker and the validation schema.
//!
//! Synthesis is best effort: anything that cannot be resolved is left out of
//! the generated schema and recorded as a [`Degradation`] instead of failing
//! the run.

use std::fmt;

use openapiv3::ReferenceOr;
use serde_json::{json, Map, Value};

use crate::document::{Components, Operation, Parameter, ParameterLocation, RequestBody};

const AUTHORIZATION_HEADER: &str = "Authorization";
const FALLBACK_HEADER_TYPE: &str = "string";

/// Marks an operation as requiring authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessMarker {
    /// Description of the `Authorization` header, kept as a comment.
    pub comment: Option<String>,
}

/// Header and body fragments of a route's validation schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationSchema {
    pub headers: Option<Value>,
    pub body: Option<Value>,
}

impl ValidationSchema {
    /// The composite object, headers first.
    pub fn to_value(&self) -> Value {
        let mut composite = Map::new();
        if let Some(headers) = &self.headers {
            composite.insert("headers".to_string(), headers.clone());
        }
        if let Some(body) = &self.body {
            composite.insert("body".to_string(), body.clone());
        }
        Value::Object(composite)
    }
}

/// Why part of a schema was left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    UnresolvedParameter(String),
    UnresolvedRequestBody(String),
    UnresolvedBodySchema(String),
    MissingBodySchema,
    UntypedHeader(String),
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degradation::UnresolvedParameter(reference) => {
                write!(f, "parameter reference {reference} does not resolve; skipped")
            }
            Degradation::UnresolvedRequestBody(reference) => {
                write!(f, "request body reference {reference} does not resolve; body schema omitted")
            }
            Degradation::UnresolvedBodySchema(reference) => {
                write!(f, "schema reference {reference} does not resolve; body schema omitted")
            }
            Degradation::MissingBodySchema => {
                f.write_str("required request body declares no schema; body schema omitted")
            }
            Degradation::UntypedHeader(name) => {
                write!(f, "header {name} has no resolvable type; defaulting to {FALLBACK_HEADER_TYPE}")
            }
        }
    }
}

/// Result of synthesizing one operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynthesizedOperation {
    pub access: Option<AccessMarker>,
    pub validation_schema: Option<ValidationSchema>,
    pub notes: Vec<Degradation>,
}

impl SynthesizedOperation {
    pub fn is_private(&self) -> bool {
        self.access.is_some()
    }
}

pub fn synthesize(operation: &Operation, components: &Components) -> SynthesizedOperation {
    let mut notes = Vec::new();

    let parameters = operation
        .parameters
        .as_deref()
        .map(|list| resolve_parameters(list, components, &mut notes));
    let headers: Vec<&Parameter> = parameters
        .iter()
        .flatten()
        .copied()
        .filter(|param| param.location == ParameterLocation::Header)
        .collect();

    let access = headers
        .iter()
        .find(|param| param.name == AUTHORIZATION_HEADER)
        .map(|param| AccessMarker {
            comment: param.description.as_deref().and_then(single_line),
        });

    let header_fields: Vec<&Parameter> = headers
        .into_iter()
        .filter(|param| param.name != AUTHORIZATION_HEADER)
        .collect();
    let schema = ValidationSchema {
        headers: header_schema(&header_fields, components, &mut notes),
        body: operation
            .request_body
            .as_ref()
            .and_then(|body| body_schema(body, components, &mut notes)),
    };

    let validation_schema = if schema.headers.is_some() || schema.body.is_some() {
        Some(schema)
    } else if parameters.is_some() {
        Some(ValidationSchema::default())
    } else {
        None
    };

    SynthesizedOperation {
        access,
        validation_schema,
        notes,
    }
}

fn resolve_parameters<'a>(
    list: &'a [ReferenceOr<Parameter>],
    components: &'a Components,
    notes: &mut Vec<Degradation>,
) -> Vec<&'a Parameter> {
    list.iter()
        .filter_map(|entry| match entry {
            ReferenceOr::Item(param) => Some(param),
            ReferenceOr::Reference { reference } => {
                let resolved = components.parameter(reference);
                if resolved.is_none() {
                    notes.push(Degradation::UnresolvedParameter(reference.clone()));
                }
                resolved
            }
        })
        .collect()
}

fn header_schema(
    headers: &[&Parameter],
    components: &Components,
    notes: &mut Vec<Degradation>,
) -> Option<Value> {
    if headers.is_empty() {
        return None;
    }

    let mut properties = Map::new();
    let mut required = Vec::new();
    for param in headers {
        let ty = header_type(param, components).unwrap_or_else(|| {
            notes.push(Degradation::UntypedHeader(param.name.clone()));
            FALLBACK_HEADER_TYPE.to_string()
        });
        let mut field = Map::new();
        field.insert("type".to_string(), Value::String(ty));
        if let Some(description) = &param.description {
            field.insert("description".to_string(), Value::String(description.clone()));
        }
        properties.insert(param.name.clone(), Value::Object(field));
        if param.required {
            required.push(Value::String(param.name.clone()));
        }
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), Value::Array(required));
    }
    Some(Value::Object(schema))
}

fn header_type(param: &Parameter, components: &Components) -> Option<String> {
    let schema = param.schema.as_ref()?;
    let schema = match schema_reference(schema) {
        Some(reference) => components.schema(reference)?,
        None => schema,
    };
    schema.get("type")?.as_str().map(str::to_string)
}

fn body_schema(
    body: &ReferenceOr<RequestBody>,
    components: &Components,
    notes: &mut Vec<Degradation>,
) -> Option<Value> {
    let body = match body {
        ReferenceOr::Item(body) => body,
        ReferenceOr::Reference { reference } => match components.request_body(reference) {
            Some(body) => body,
            None => {
                notes.push(Degradation::UnresolvedRequestBody(reference.clone()));
                return None;
            }
        },
    };
    if !body.required {
        return None;
    }

    let Some(schema) = body.content.values().next().and_then(|media| media.schema.as_ref()) else {
        notes.push(Degradation::MissingBodySchema);
        return None;
    };
    match schema_reference(schema) {
        Some(reference) => {
            let resolved = components.schema(reference).cloned();
            if resolved.is_none() {
                notes.push(Degradation::UnresolvedBodySchema(reference.to_string()));
            }
            resolved
        }
        None => Some(schema.clone()),
    }
}

fn schema_reference(schema: &Value) -> Option<&str> {
    schema.get("$ref")?.as_str()
}

fn single_line(text: &str) -> Option<String> {
    let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!line.is_empty()).then_some(line)
}
