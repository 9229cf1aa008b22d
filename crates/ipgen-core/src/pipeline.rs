//! The generation pipeline: validate → derive → assemble → (optional) build.
//!
//! [`generate`] runs the pure stages and returns a [`Generation`]; only a
//! successful generation can be handed to [`build`], so the orchestrator is
//! never reached after a validation or assembly failure.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::assemble::{assemble, WrapperModule};
use crate::config::{Configuration, RawConfig};
use crate::error::{GenError, Result};
use crate::generator::IpGenerator;
use crate::platform::PlatformDescriptor;
use crate::schema::is_identifier;
use crate::validate::{validate, Violation};

/// Persists generated artifacts. Operations are called once each, in order.
pub trait BuildOrchestrator {
    type Error: std::error::Error + Send + Sync + 'static;

    fn prepare(&mut self, build_dir: &Path, build_name: &str) -> std::result::Result<(), Self::Error>;

    fn copy_files(&mut self, source_dir: &Path) -> std::result::Result<(), Self::Error>;

    fn generate_tcl(&mut self) -> std::result::Result<(), Self::Error>;

    fn generate_artifact(
        &mut self,
        platform: &PlatformDescriptor,
        module: &WrapperModule,
    ) -> std::result::Result<(), Self::Error>;
}

/// Where and how to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub build_dir: PathBuf,
    pub build_name: String,
    /// Directory holding the core's HDL sources.
    pub source_dir: PathBuf,
    pub platform: PlatformDescriptor,
}

/// Output of the pure generation stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub config: Configuration,
    /// Domain violations on inert fields.
    pub warnings: Vec<Violation>,
    pub module: WrapperModule,
}

/// Validate `raw`, derive the port manifest and assemble the wrapper.
///
/// `module_name` must be an HDL identifier.
pub fn generate<G: IpGenerator + ?Sized>(
    generator: &G,
    raw: &RawConfig,
    module_name: &str,
) -> Result<Generation> {
    if !is_identifier(module_name) {
        return Err(GenError::ModuleName {
            name: module_name.to_string(),
        });
    }
    let schema = generator.schema()?;
    let validated = validate(&schema, raw)?;
    for w in &validated.warnings {
        warn!(ip = generator.ip_name(), "ignoring disabled parameter {w}");
    }
    debug!(ip = generator.ip_name(), "configuration valid");

    let manifest = generator.manifest(&validated.config)?;
    let module = assemble(module_name, &validated.config, manifest, generator)?;
    Ok(Generation {
        config: validated.config,
        warnings: validated.warnings,
        module,
    })
}

/// Run every orchestrator stage in order for a completed generation.
///
/// Orchestrator errors are returned unmodified inside [`GenError::Build`].
pub fn build<B: BuildOrchestrator>(
    orchestrator: &mut B,
    request: &BuildRequest,
    generation: &Generation,
) -> Result<()> {
    let wrap = |e: B::Error| GenError::Build(Box::new(e));
    orchestrator
        .prepare(&request.build_dir, &request.build_name)
        .map_err(wrap)?;
    orchestrator.copy_files(&request.source_dir).map_err(wrap)?;
    orchestrator.generate_tcl().map_err(wrap)?;
    orchestrator
        .generate_artifact(&request.platform, &generation.module)
        .map_err(wrap)?;
    debug!(module = generation.module.name(), "build complete");
    Ok(())
}
