//! Error types for IP generation.

use crate::validate::ValidationReport;

/// Errors that can occur during a generation run.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// A schema definition breaks its own invariants.
    #[error("invalid schema '{schema}': {detail}")]
    Schema { schema: String, detail: String },

    /// One or more parameter values are outside their declared domains.
    #[error("{0}")]
    Configuration(ValidationReport),

    /// A configuration names a field the schema does not declare.
    #[error("unknown parameter '{field}' for '{schema}'")]
    UnknownField { schema: String, field: String },

    /// A generator asked for a field the configuration does not hold.
    #[error("configuration has no {expected} field '{field}'")]
    MissingField {
        field: String,
        expected: &'static str,
    },

    /// The wrapper module name cannot be emitted as an HDL identifier.
    #[error("'{name}' is not a valid module name")]
    ModuleName { name: String },

    /// An imported configuration document is malformed.
    #[error("invalid configuration document: {detail}")]
    Document { detail: String },

    /// The port manifest and the sub-core disagree.
    #[error("assembly failed: {0}")]
    Assembly(#[from] AssemblyError),

    /// The build orchestrator failed. The source is the orchestrator's own error.
    #[error("build failed: {0}")]
    Build(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Binding failures between a port manifest and a sub-core instance.
///
/// These always indicate a template or generator authoring bug rather than a
/// user input problem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyError {
    #[error("port '{port}' binds to '{signal}', which sub-core '{core}' does not have")]
    UnboundPort {
        port: String,
        signal: String,
        core: String,
    },

    #[error("sub-core '{core}' signal '{signal}' is not bound to any port")]
    UnboundSignal { core: String, signal: String },

    #[error("width mismatch on port '{port}': {port_width} bits, sub-core signal '{signal}' is {signal_width} bits")]
    WidthMismatch {
        port: String,
        port_width: u32,
        signal: String,
        signal_width: u32,
    },

    #[error("direction mismatch on port '{port}': sub-core signal '{signal}' flows the other way")]
    DirectionMismatch { port: String, signal: String },

    #[error("sub-core signal '{signal}' is bound to both '{first}' and '{second}'")]
    Redriven {
        signal: String,
        first: String,
        second: String,
    },

    #[error("duplicate port '{port}'")]
    DuplicatePort { port: String },

    #[error("sub-core '{core}' declares signal '{signal}' twice")]
    DuplicateSignal { core: String, signal: String },

    #[error("interface '{interface}' cannot size signal '{signal}' from '{field}': {detail}")]
    TemplateField {
        interface: String,
        signal: String,
        field: String,
        detail: String,
    },
}

/// Result type for generation operations.
pub type Result<T> = std::result::Result<T, GenError>;
