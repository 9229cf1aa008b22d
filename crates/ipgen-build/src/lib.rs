//! Build orchestration for generated IP wrappers.
//!
//! [`IpBuilder`] implements [`BuildOrchestrator`](ipgen_core::pipeline::BuildOrchestrator):
//! it lays out the build directory, copies the core's HDL sources, writes a
//! Raptor project script, and emits the wrapper as Verilog together with a
//! build record carrying SHA-256 digests of every file.

pub mod builder;
pub mod error;
pub mod record;
pub mod tcl;
pub mod verilog;

pub use builder::{module_name, BuildLayout, IpBuilder};
pub use error::{BuildError, Result};
pub use record::{BuildRecord, ContentHash};
