//! Generates per-route handler scaffolds from OpenAPI documents.
//!
//! Every operation of the document becomes one module at
//! `<destination>/<mapped path>/<method>.<ext>`, where `{param}` segments of
//! the path template turn into `$param` directories. Each module carries the
//! header and body validation schema derived from the document, a `private`
//! marker for operations taking an `Authorization` header, and a handler stub.
//! Existing modules are never overwritten unless forced.

pub mod config;
pub mod document;
pub mod driver;
pub mod emitter;
pub mod error;
pub mod parser;
pub mod router;
pub mod schema;
pub mod validator;

pub use config::{GeneratorConfig, ModuleStyle, WritePolicy};
pub use driver::{compile, Compiler, RunReport, Stage};
pub use error::{Result, ScaffoldError};
