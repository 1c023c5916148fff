//! Ordered, read-only model of an OpenAPI document.
//!
//! Only the parts the compiler reads are modelled. Schemas stay raw JSON so
//! they can be embedded exactly as written.

use std::fmt;

use indexmap::IndexMap;
use openapiv3::ReferenceOr;
use serde::Deserialize;
use serde_json::Value;

/// Pointer prefix of entries in `components.schemas`.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";
const PARAMETER_REF_PREFIX: &str = "#/components/parameters/";
const REQUEST_BODY_REF_PREFIX: &str = "#/components/requestBodies/";

#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub info: Info,
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    #[serde(default)]
    pub components: Components,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
}

/// Shared named definitions referenced through `$ref` pointers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, Value>,
    #[serde(default)]
    pub parameters: IndexMap<String, Parameter>,
    #[serde(default)]
    pub request_bodies: IndexMap<String, RequestBody>,
}

impl Components {
    /// Single-level lookup of a `#/components/schemas/<Name>` pointer.
    pub fn schema(&self, reference: &str) -> Option<&Value> {
        let name = reference.strip_prefix(SCHEMA_REF_PREFIX)?;
        self.schemas.get(name)
    }

    pub fn parameter(&self, reference: &str) -> Option<&Parameter> {
        let name = reference.strip_prefix(PARAMETER_REF_PREFIX)?;
        self.parameters.get(name)
    }

    pub fn request_body(&self, reference: &str) -> Option<&RequestBody> {
        let name = reference.strip_prefix(REQUEST_BODY_REF_PREFIX)?;
        self.request_bodies.get(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub fn parse(token: &str) -> Option<Self> {
        let method = match token {
            "get" => HttpMethod::Get,
            "put" => HttpMethod::Put,
            "post" => HttpMethod::Post,
            "delete" => HttpMethod::Delete,
            "options" => HttpMethod::Options,
            "head" => HttpMethod::Head,
            "patch" => HttpMethod::Patch,
            "trace" => HttpMethod::Trace,
            _ => return None,
        };
        Some(method)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

/// Operations of one path template, in the order the document lists them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(try_from = "IndexMap<String, Value>")]
pub struct PathItem {
    pub operations: IndexMap<HttpMethod, Operation>,
    pub parameters: Vec<ReferenceOr<Parameter>>,
}

impl TryFrom<IndexMap<String, Value>> for PathItem {
    type Error = String;

    fn try_from(entries: IndexMap<String, Value>) -> Result<Self, Self::Error> {
        let mut item = PathItem::default();
        for (key, value) in entries {
            if key == "parameters" {
                item.parameters = serde_json::from_value(value)
                    .map_err(|err| format!("invalid path parameters: {err}"))?;
            } else if let Some(method) = HttpMethod::parse(&key) {
                let operation = serde_json::from_value(value)
                    .map_err(|err| format!("invalid `{key}` operation: {err}"))?;
                item.operations.insert(method, operation);
            }
        }
        Ok(item)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub parameters: Option<Vec<ReferenceOr<Parameter>>>,
    pub request_body: Option<ReferenceOr<RequestBody>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Header,
    Path,
    Query,
    Cookie,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
    pub schema: Option<Value>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaType {
    pub schema: Option<Value>,
}
