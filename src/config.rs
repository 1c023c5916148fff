use std::path::PathBuf;

use clap::ValueEnum;

/// Export syntax used by generated route modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ModuleStyle {
    /// `export default getRoute;` in a `.ts` file.
    #[default]
    #[value(name = "ts", alias = "static-export")]
    StaticExport,
    /// `module.exports = getRoute;` in a `.js` file.
    #[value(name = "js", alias = "dynamic-assignment")]
    DynamicAssignment,
}

impl ModuleStyle {
    pub fn extension(self) -> &'static str {
        match self {
            ModuleStyle::StaticExport => "ts",
            ModuleStyle::DynamicAssignment => "js",
        }
    }

    /// Trailing statement exporting `binding` from the module.
    pub fn export_statement(self, binding: &str) -> String {
        match self {
            ModuleStyle::StaticExport => format!("export default {binding};"),
            ModuleStyle::DynamicAssignment => format!("module.exports = {binding};"),
        }
    }
}

/// What to do when a scaffold already exists on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Leave hand-edited scaffolds alone.
    #[default]
    SkipExisting,
    /// Rewrite every scaffold.
    Overwrite,
}

impl WritePolicy {
    pub fn from_force(force: bool) -> Self {
        if force {
            WritePolicy::Overwrite
        } else {
            WritePolicy::SkipExisting
        }
    }
}

/// Everything a single compiler run needs.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub module_style: ModuleStyle,
    pub strict: bool,
    pub write_policy: WritePolicy,
}

impl GeneratorConfig {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            module_style: ModuleStyle::default(),
            strict: false,
            write_policy: WritePolicy::default(),
        }
    }

    pub fn module_style(mut self, style: ModuleStyle) -> Self {
        self.module_style = style;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn write_policy(mut self, policy: WritePolicy) -> Self {
        self.write_policy = policy;
        self
    }
}
