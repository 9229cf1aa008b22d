//! The interface every catalog generator implements.

use semver::Version;

use crate::assemble::{PortManifest, SubCoreFactory};
use crate::config::Configuration;
use crate::error::Result;
use crate::schema::ParameterSchema;

/// A parametrized wrapper generator.
///
/// The generator owns its schema and describes its boundary ports for a
/// validated configuration; as a [`SubCoreFactory`] it also describes the core
/// those ports bind to.
pub trait IpGenerator: SubCoreFactory {
    /// Catalog name, also the CLI subcommand (`fifo`).
    fn ip_name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn version(&self) -> Version;

    /// Module and build folder name used when none is given.
    fn default_build_name(&self) -> &'static str;

    /// A fresh schema for one generation run.
    fn schema(&self) -> Result<ParameterSchema>;

    /// Describe every boundary port for `config`.
    fn manifest(&self, config: &Configuration) -> Result<PortManifest>;
}
