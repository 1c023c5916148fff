use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors raised while compiling a document into scaffolds.
///
/// Resolution gaps inside a single operation are not errors; they are
/// reported as [`crate::schema::Degradation`] notes instead.
#[derive(Debug, Error)]
pub enum ScaffoldError {
    /// The source document does not exist.
    #[error("source file does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),
    /// The source document could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The source is neither valid JSON nor valid YAML.
    #[error("{0}")]
    Syntax(String),
    /// The document does not satisfy the OpenAPI model or the strict checks.
    #[error("{0}")]
    Validation(String),
    /// The validated document could not be normalized.
    #[error("{0}")]
    Parse(String),
    /// A path template would resolve outside of the destination directory.
    #[error("path template {template:?} escapes the destination directory")]
    UnsafePath { template: String },
    /// Directory creation or a file write failed.
    #[error("failed to write {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The route module template failed to render.
    #[error("failed to render template: {0}")]
    Template(#[from] minijinja::Error),
}

impl ScaffoldError {
    /// Short category name shown to the user next to the message.
    pub fn category(&self) -> &'static str {
        match self {
            ScaffoldError::SourceNotFound(_) => "SourceNotFound",
            ScaffoldError::Read { .. } | ScaffoldError::Filesystem { .. } => "FilesystemError",
            ScaffoldError::Syntax(_) => "SyntaxError",
            ScaffoldError::Validation(_) => "ValidationError",
            ScaffoldError::Parse(_) => "ParseError",
            ScaffoldError::UnsafePath { .. } => "PathError",
            ScaffoldError::Template(_) => "TemplateError",
        }
    }

    pub(crate) fn filesystem(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| ScaffoldError::Filesystem { path, source }
    }
}

pub type Result<T, E = ScaffoldError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_distinguish_error_classes() {
        assert_eq!(
            ScaffoldError::SourceNotFound(PathBuf::from("api.yaml")).category(),
            "SourceNotFound"
        );
        assert_eq!(
            ScaffoldError::Validation("missing field `info`".into()).category(),
            "ValidationError"
        );
        let err = ScaffoldError::filesystem("out/users")(io::Error::other("disk full"));
        assert_eq!(err.category(), "FilesystemError");
        assert_eq!(err.to_string(), "failed to write out/users: disk full");
    }
}
