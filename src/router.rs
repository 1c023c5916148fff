use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, ScaffoldError};

static PATH_VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("path variable pattern"));

/// Rewrites every `{name}` segment of a path template into `$name`.
///
/// ```
/// use openapi_route_scaffolder::router::map_path_template;
///
/// assert_eq!(map_path_template("/users/{id}/posts/{postId}"), "/users/$id/posts/$postId");
/// ```
pub fn map_path_template(template: &str) -> String {
    PATH_VARIABLE.replace_all(template, "$$${1}").into_owned()
}

/// Names of the variables declared by a path template, in order.
pub fn path_variables(template: &str) -> Vec<&str> {
    PATH_VARIABLE
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .map(|name| name.as_str())
        .collect()
}

/// Directory holding the scaffolds of a mapped path, below `destination`.
pub fn route_directory(destination: &Path, mapped: &str) -> Result<PathBuf> {
    let mut dir = destination.to_path_buf();
    for component in Path::new(mapped.trim_start_matches('/')).components() {
        match component {
            Component::Normal(segment) => dir.push(segment),
            Component::CurDir => {}
            _ => {
                return Err(ScaffoldError::UnsafePath {
                    template: mapped.to_string(),
                })
            }
        }
    }
    Ok(dir)
}
