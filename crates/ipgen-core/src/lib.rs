//! Generic IP generation engine shared by every wrapper generator.
//!
//! A generation run moves through fixed stages:
//! - **Schema:** declarative parameter descriptions with domains and dependencies
//! - **Validation:** whole-configuration checking with aggregated diagnostics
//! - **Serialization:** JSON template export and import
//! - **Fan-out:** interface templates expanded into named, sized port groups
//! - **Assembly:** the port manifest bound to an opaque sub-core instance
//!
//! Building artifacts from the assembled module is delegated to a
//! [`BuildOrchestrator`](pipeline::BuildOrchestrator).

pub mod assemble;
pub mod config;
pub mod error;
pub mod fanout;
pub mod generator;
pub mod pipeline;
pub mod platform;
pub mod schema;
pub mod serialize;
pub mod topology;
pub mod validate;

pub use assemble::{assemble, PortManifest, SubCore, SubCoreFactory, WrapperModule};
pub use config::{Configuration, RawConfig};
pub use error::{AssemblyError, GenError, Result};
pub use generator::IpGenerator;
pub use platform::PlatformDescriptor;
pub use schema::{is_identifier, Domain, ParamKind, ParameterSchema, ParameterSpec, Value};
pub use validate::{validate, Validated, ValidationReport, Violation};
