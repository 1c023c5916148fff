use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use minijinja::{context, AutoEscape, Environment};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{ModuleStyle, WritePolicy};
use crate::document::HttpMethod;
use crate::error::{Result, ScaffoldError};
use crate::router::{map_path_template, route_directory};
use crate::schema::{AccessMarker, SynthesizedOperation, ValidationSchema};

const ROUTE_TEMPLATE_NAME: &str = "route";
const ROUTE_TEMPLATE: &str = r#"/**
 * Generated REST API endpoint handler
 * @generator: {{ generator }} {{ version }}
 *
 * {{ method | upper }} {{ path }}
 */

const {{ binding }} = {
{% if private %}
{% if private_comment %}
    // {{ private_comment }}
{% endif %}
    private: true,
{% endif %}
{% if schema %}
    schema: {{ schema }},
{% endif %}
    handler: (req, res) => {
        res.send('Hello {{ path_literal }}');
    }
};

{{ export }}
"#;

/// A path template mapped to its directory, ready to receive scaffolds.
#[derive(Debug, Clone)]
pub struct RouteTarget {
    pub template: String,
    pub mapped: String,
    pub directory: PathBuf,
}

/// One generated route module.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaffoldArtifact {
    pub file: PathBuf,
    pub method: HttpMethod,
    pub path_template: String,
    pub mapped_path: String,
    pub access: Option<AccessMarker>,
    pub validation_schema: Option<ValidationSchema>,
    pub module_style: ModuleStyle,
}

impl ScaffoldArtifact {
    pub fn is_private(&self) -> bool {
        self.access.is_some()
    }

    fn binding(&self) -> String {
        format!("{}Route", self.method.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    Written,
    Skipped,
    Overwritten,
}

/// Renders route modules and writes them below a destination directory.
pub struct ScaffoldEmitter {
    env: Environment<'static>,
    destination: PathBuf,
    module_style: ModuleStyle,
    write_policy: WritePolicy,
}

impl ScaffoldEmitter {
    pub fn new(
        destination: impl Into<PathBuf>,
        module_style: ModuleStyle,
        write_policy: WritePolicy,
    ) -> Result<Self> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_template(ROUTE_TEMPLATE_NAME, ROUTE_TEMPLATE)?;
        Ok(Self {
            env,
            destination: destination.into(),
            module_style,
            write_policy,
        })
    }

    /// Maps a path template and creates its directory if needed.
    pub fn prepare_route(&self, template: &str) -> Result<RouteTarget> {
        let mapped = map_path_template(template);
        let directory = route_directory(&self.destination, &mapped)?;
        fs::create_dir_all(&directory).map_err(ScaffoldError::filesystem(&directory))?;
        Ok(RouteTarget {
            template: template.to_string(),
            mapped,
            directory,
        })
    }

    pub fn artifact(
        &self,
        route: &RouteTarget,
        method: HttpMethod,
        synthesized: SynthesizedOperation,
    ) -> ScaffoldArtifact {
        let file_name = format!("{}.{}", method.as_str(), self.module_style.extension());
        ScaffoldArtifact {
            file: route.directory.join(file_name),
            method,
            path_template: route.template.clone(),
            mapped_path: route.mapped.clone(),
            access: synthesized.access,
            validation_schema: synthesized.validation_schema,
            module_style: self.module_style,
        }
    }

    pub fn render(&self, artifact: &ScaffoldArtifact) -> Result<String> {
        let schema = artifact
            .validation_schema
            .as_ref()
            .map(|schema| schema_literal(&schema.to_value()))
            .transpose()?;
        let binding = artifact.binding();
        let rendered = self.env.get_template(ROUTE_TEMPLATE_NAME)?.render(context! {
            generator => env!("CARGO_PKG_NAME"),
            version => env!("CARGO_PKG_VERSION"),
            method => artifact.method.as_str(),
            path => js_comment_content(&artifact.mapped_path),
            path_literal => js_string_content(&artifact.mapped_path),
            private => artifact.is_private(),
            private_comment => artifact.access.as_ref().and_then(|access| access.comment.clone()),
            schema => schema,
            export => artifact.module_style.export_statement(&binding),
            binding => &binding,
        })?;
        Ok(rendered)
    }

    /// Writes the artifact according to the write policy.
    pub fn emit(&self, artifact: &ScaffoldArtifact) -> Result<EmitOutcome> {
        let existed = artifact.file.exists();
        if existed && self.write_policy == WritePolicy::SkipExisting {
            info!(file = %artifact.file.display(), "already exists, skipping");
            return Ok(EmitOutcome::Skipped);
        }

        let contents = self.render(artifact)?;
        let outcome = match self.write_policy {
            WritePolicy::SkipExisting => create_new(&artifact.file, &contents)?,
            WritePolicy::Overwrite => {
                fs::write(&artifact.file, &contents)
                    .map_err(ScaffoldError::filesystem(&artifact.file))?;
                if existed {
                    EmitOutcome::Overwritten
                } else {
                    EmitOutcome::Written
                }
            }
        };
        debug!(file = %artifact.file.display(), ?outcome, "emitted scaffold");
        Ok(outcome)
    }
}

fn create_new(file: &Path, contents: &str) -> Result<EmitOutcome> {
    let mut handle = match OpenOptions::new().write(true).create_new(true).open(file) {
        Ok(handle) => handle,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => return Ok(EmitOutcome::Skipped),
        Err(err) => return Err(ScaffoldError::filesystem(file)(err)),
    };
    handle
        .write_all(contents.as_bytes())
        .map_err(ScaffoldError::filesystem(file))?;
    Ok(EmitOutcome::Written)
}

/// Pretty JSON indented to sit one level inside the route object.
fn schema_literal(value: &Value) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer).map_err(|err| {
        minijinja::Error::new(minijinja::ErrorKind::BadSerialization, "schema literal")
            .with_source(err)
    })?;
    let pretty = String::from_utf8_lossy(&buf);
    Ok(pretty.lines().collect::<Vec<_>>().join("\n    "))
}

/// Keeps `*/` in a path from closing the header comment.
fn js_comment_content(text: &str) -> String {
    text.replace("*/", "*\\/")
}

fn js_string_content(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "\\'")
}
