//! On-disk build tree for one generated wrapper.
//!
//! Layout:
//! ```text
//! <build_dir>/
//!   <build_name>/
//!     src/                    copied HDL sources and the generated wrapper
//!     sim/                    simulation workspace (created empty)
//!     <build_name>.tcl        Raptor project script
//!     <build_name>.json       build record with file digests
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use semver::Version;
use tracing::{debug, info, warn};

use ipgen_core::pipeline::BuildOrchestrator;
use ipgen_core::{is_identifier, PlatformDescriptor, RawConfig, WrapperModule};

use crate::error::{BuildError, Result};
use crate::record::{BuildRecord, ContentHash};
use crate::{tcl, verilog};

/// Extensions of HDL sources copied into `src/`.
pub const HDL_EXTENSIONS: &[&str] = &["v", "sv", "vh", "svh"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    New,
    Prepared,
    Copied,
    Scripted,
    Generated,
}

impl Stage {
    /// The operation that completes this stage.
    fn operation(self) -> &'static str {
        match self {
            Stage::New => "new",
            Stage::Prepared => "prepare",
            Stage::Copied => "copy_files",
            Stage::Scripted => "generate_tcl",
            Stage::Generated => "generate_artifact",
        }
    }
}

/// Paths of a prepared build tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    /// Build name with any extension stripped.
    pub name: String,
    pub root: PathBuf,
    pub src: PathBuf,
    pub sim: PathBuf,
}

/// Module name of `build_name`: the name with one extension stripped.
///
/// The name must be a single path component whose stem is an HDL identifier.
pub fn module_name(build_name: &str) -> Result<String> {
    let path = Path::new(build_name);
    let mut components = path.components();
    let stem = match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => path.file_stem().and_then(|s| s.to_str()),
        _ => None,
    };
    match stem {
        Some(stem) if is_identifier(stem) => Ok(stem.to_string()),
        _ => Err(BuildError::InvalidName {
            name: build_name.to_string(),
        }),
    }
}

impl BuildLayout {
    fn new(build_dir: &Path, build_name: &str) -> Result<Self> {
        let name = module_name(build_name)?;
        let root = build_dir.join(&name);
        Ok(BuildLayout {
            src: root.join("src"),
            sim: root.join("sim"),
            root,
            name,
        })
    }

    pub fn tcl_path(&self) -> PathBuf {
        self.root.join(format!("{}.tcl", self.name))
    }

    pub fn record_path(&self) -> PathBuf {
        self.root.join(format!("{}.json", self.name))
    }

    /// Root-relative path of the generated wrapper.
    fn wrapper_file(&self, platform: &PlatformDescriptor) -> String {
        format!("src/{}.{}", self.name, platform.language.extension())
    }
}

/// Writes the build tree stage by stage; each stage requires the previous one.
#[derive(Debug)]
pub struct IpBuilder {
    ip: String,
    version: Version,
    platform: PlatformDescriptor,
    configuration: RawConfig,
    stage: Stage,
    layout: Option<BuildLayout>,
    /// Root-relative path → digest of every file written so far.
    files: BTreeMap<String, ContentHash>,
}

impl IpBuilder {
    pub fn new(ip: impl Into<String>, version: Version, platform: PlatformDescriptor) -> Self {
        IpBuilder {
            ip: ip.into(),
            version,
            platform,
            configuration: RawConfig::new(),
            stage: Stage::New,
            layout: None,
            files: BTreeMap::new(),
        }
    }

    /// Configuration recorded in the build record.
    pub fn with_configuration(mut self, configuration: RawConfig) -> Self {
        self.configuration = configuration;
        self
    }

    pub fn layout(&self) -> Option<&BuildLayout> {
        self.layout.as_ref()
    }

    fn require_stage(&self, operation: &'static str, required: Stage) -> Result<BuildLayout> {
        match &self.layout {
            Some(layout) if self.stage == required => Ok(layout.clone()),
            _ => Err(BuildError::OutOfOrder {
                stage: operation,
                expected: required.operation(),
            }),
        }
    }

    fn write(&mut self, layout: &BuildLayout, relative: &str, data: &[u8]) -> Result<()> {
        let path = layout.root.join(relative);
        fs::write(&path, data).map_err(BuildError::io(&path))?;
        self.files.insert(relative.to_string(), ContentHash::compute(data));
        Ok(())
    }

    /// Create a fresh build tree, removing any previous one at the same path.
    ///
    /// May be called at any point; it restarts the build.
    pub fn prepare(&mut self, build_dir: &Path, build_name: &str) -> Result<&BuildLayout> {
        let layout = BuildLayout::new(build_dir, build_name)?;
        if layout.root.exists() {
            debug!(path = %layout.root.display(), "removing previous build");
            fs::remove_dir_all(&layout.root).map_err(BuildError::io(&layout.root))?;
        }
        for dir in [&layout.src, &layout.sim] {
            fs::create_dir_all(dir).map_err(BuildError::io(dir))?;
        }
        info!(path = %layout.root.display(), "prepared build directory");

        self.files.clear();
        self.stage = Stage::Prepared;
        Ok(self.layout.insert(layout))
    }

    /// Copy HDL sources of `source_dir` into `src/`, in name order.
    ///
    /// A missing source directory is skipped with a warning.
    pub fn copy_files(&mut self, source_dir: &Path) -> Result<usize> {
        let layout = self.require_stage("copy_files", Stage::Prepared)?;
        self.stage = Stage::Copied;

        if !source_dir.is_dir() {
            warn!(path = %source_dir.display(), "source directory not found, no files copied");
            return Ok(0);
        }

        let entries = fs::read_dir(source_dir).map_err(BuildError::io(source_dir))?;
        let mut sources = Vec::new();
        for entry in entries {
            let path = entry.map_err(BuildError::io(source_dir))?.path();
            let is_hdl = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| HDL_EXTENSIONS.contains(&e));
            if is_hdl && path.is_file() {
                sources.push(path);
            }
        }
        sources.sort();

        for path in &sources {
            let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            let data = fs::read(path).map_err(BuildError::io(path))?;
            self.write(&layout, &format!("src/{file_name}"), &data)?;
        }
        info!(count = sources.len(), "copied HDL sources");
        Ok(sources.len())
    }

    /// Write `<build_name>.tcl` listing every source and the wrapper.
    pub fn generate_tcl(&mut self) -> Result<PathBuf> {
        let layout = self.require_stage("generate_tcl", Stage::Copied)?;
        let mut design_files: Vec<String> = self.files.keys().cloned().collect();
        design_files.push(layout.wrapper_file(&self.platform));

        let script = tcl::render(&layout.name, &self.platform, &design_files);
        let relative = format!("{}.tcl", layout.name);
        self.write(&layout, &relative, script.as_bytes())?;
        self.stage = Stage::Scripted;
        info!(path = %layout.tcl_path().display(), "wrote project script");
        Ok(layout.tcl_path())
    }

    /// Write the wrapper HDL and the build record.
    pub fn generate_artifact(
        &mut self,
        platform: &PlatformDescriptor,
        module: &WrapperModule,
    ) -> Result<PathBuf> {
        let layout = self.require_stage("generate_artifact", Stage::Scripted)?;

        let wrapper = layout.wrapper_file(platform);
        let text = verilog::render(module, platform.language);
        self.write(&layout, &wrapper, text.as_bytes())?;
        info!(path = %layout.root.join(&wrapper).display(), "wrote wrapper");

        let record = BuildRecord {
            ip: self.ip.clone(),
            version: self.version.clone(),
            module: module.name().to_string(),
            platform: platform.clone(),
            configuration: self.configuration.clone(),
            files: self.files.clone(),
        };
        let mut json = serde_json::to_string_pretty(&record)?;
        json.push('\n');
        let path = layout.record_path();
        fs::write(&path, json).map_err(BuildError::io(&path))?;

        self.stage = Stage::Generated;
        Ok(layout.root.join(wrapper))
    }
}

impl BuildOrchestrator for IpBuilder {
    type Error = BuildError;

    fn prepare(&mut self, build_dir: &Path, build_name: &str) -> Result<()> {
        IpBuilder::prepare(self, build_dir, build_name).map(|_| ())
    }

    fn copy_files(&mut self, source_dir: &Path) -> Result<()> {
        IpBuilder::copy_files(self, source_dir).map(|_| ())
    }

    fn generate_tcl(&mut self) -> Result<()> {
        IpBuilder::generate_tcl(self).map(|_| ())
    }

    fn generate_artifact(&mut self, platform: &PlatformDescriptor, module: &WrapperModule) -> Result<()> {
        IpBuilder::generate_artifact(self, platform, module).map(|_| ())
    }
}
