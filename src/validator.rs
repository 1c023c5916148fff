//! Structural and strict validation of a decoded document.

use std::collections::{HashMap, HashSet};

use openapiv3::{Components, OpenAPI, Parameter, ReferenceOr};
use serde_json::Value;

use crate::error::{Result, ScaffoldError};
use crate::router::path_variables;

/// Checks the tree against the OpenAPI 3 data model.
pub fn validate_structure(value: &Value) -> Result<OpenAPI> {
    serde_json::from_value(value.clone()).map_err(|err| ScaffoldError::Validation(err.to_string()))
}

/// Semantic checks enabled by `--validate-spec`.
///
/// Every violation is collected so a single run reports all of them.
pub fn validate_strict(value: &Value, api: &OpenAPI) -> Result<()> {
    let mut violations = Vec::new();

    if !api.openapi.starts_with("3.") {
        violations.push(format!("unsupported OpenAPI version {:?}", api.openapi));
    }
    check_references(value, value, &mut violations);
    check_paths(api, &mut violations);

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ScaffoldError::Validation(violations.join("; ")))
    }
}

fn check_references(root: &Value, node: &Value, violations: &mut Vec<String>) {
    match node {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get("$ref") {
                match reference.strip_prefix('#') {
                    Some(pointer) if root.pointer(pointer).is_some() => {}
                    Some(_) => violations.push(format!("unresolved reference {reference}")),
                    None => violations.push(format!("unsupported external reference {reference}")),
                }
            }
            for child in map.values() {
                check_references(root, child, violations);
            }
        }
        Value::Array(items) => {
            for child in items {
                check_references(root, child, violations);
            }
        }
        _ => {}
    }
}

fn check_paths(api: &OpenAPI, violations: &mut Vec<String>) {
    let shared = api.components.as_ref();
    let mut operation_ids: HashMap<&str, usize> = HashMap::new();

    for (template, item) in &api.paths.paths {
        if !template.starts_with('/') {
            violations.push(format!("path {template:?} must start with '/'"));
        }
        let ReferenceOr::Item(item) = item else {
            continue;
        };
        let inherited = path_parameter_names(&item.parameters, shared);

        for (method, operation) in item.iter() {
            if let Some(id) = &operation.operation_id {
                *operation_ids.entry(id.as_str()).or_default() += 1;
            }
            let declared = path_parameter_names(&operation.parameters, shared);
            for variable in path_variables(template) {
                if !declared.contains(variable) && !inherited.contains(variable) {
                    violations.push(format!(
                        "{} {template}: path parameter {variable:?} is not declared",
                        method.to_ascii_uppercase()
                    ));
                }
            }
        }
    }

    let mut duplicates: Vec<_> = operation_ids
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, _)| id)
        .collect();
    duplicates.sort_unstable();
    for id in duplicates {
        violations.push(format!("operationId {id:?} is used more than once"));
    }
}

fn path_parameter_names<'a>(
    parameters: &'a [ReferenceOr<Parameter>],
    shared: Option<&'a Components>,
) -> HashSet<&'a str> {
    parameters
        .iter()
        .filter_map(|entry| match entry {
            ReferenceOr::Item(param) => Some(param),
            ReferenceOr::Reference { reference } => {
                let name = reference.strip_prefix("#/components/parameters/")?;
                match shared?.parameters.get(name)? {
                    ReferenceOr::Item(param) => Some(param),
                    ReferenceOr::Reference { .. } => None,
                }
            }
        })
        .filter_map(|param| match param {
            Parameter::Path { parameter_data, .. } => Some(parameter_data.name.as_str()),
            _ => None,
        })
        .collect()
}
