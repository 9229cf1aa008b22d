//! `ipgen.toml` project configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use ipgen_core::platform::HdlLanguage;
use ipgen_core::PlatformDescriptor;

/// Optional per-project defaults for generation runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IpgenManifest {
    /// Target platform overrides.
    #[serde(default)]
    pub platform: Option<PlatformConfig>,
    /// Build location defaults.
    #[serde(default)]
    pub build: Option<BuildConfig>,
}

/// `[platform]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub toolchain: Option<String>,
    #[serde(default)]
    pub language: Option<HdlLanguage>,
}

/// `[build]` section. Relative paths are resolved against the manifest's directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Default `--build-dir`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Directory holding one HDL source folder per generator.
    #[serde(default)]
    pub source_root: Option<PathBuf>,
}

impl IpgenManifest {
    /// Search upward from `start_dir` for an `ipgen.toml` file, parse and return it
    /// along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join("ipgen.toml");
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest: IpgenManifest = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a manifest from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing ipgen.toml")
    }

    /// The default platform with this manifest's overrides applied.
    pub fn platform(&self) -> PlatformDescriptor {
        let mut platform = PlatformDescriptor::default();
        if let Some(p) = &self.platform {
            if let Some(device) = &p.device {
                platform.device = device.clone();
            }
            if let Some(toolchain) = &p.toolchain {
                platform.toolchain = toolchain.clone();
            }
            if let Some(language) = p.language {
                platform.language = language;
            }
        }
        platform
    }

    pub fn build_dir(&self, project_dir: &Path) -> Option<PathBuf> {
        let dir = self.build.as_ref()?.dir.as_ref()?;
        Some(project_dir.join(dir))
    }

    /// `<source-root>/<ip_name>`, if a source root is configured.
    pub fn source_dir(&self, project_dir: &Path, ip_name: &str) -> Option<PathBuf> {
        let root = self.build.as_ref()?.source_root.as_ref()?;
        Some(project_dir.join(root).join(ip_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_manifest() {
        let manifest = IpgenManifest::from_str(
            r#"
[platform]
device = "gemini_2"
language = "systemverilog"

[build]
dir = "out"
source-root = "rtl"
"#,
        )
        .unwrap();
        let platform = manifest.platform();
        assert_eq!(platform.device, "gemini_2");
        assert_eq!(platform.toolchain, "raptor");
        assert_eq!(platform.language, HdlLanguage::SystemVerilog);

        let project = Path::new("/work");
        assert_eq!(manifest.build_dir(project), Some(PathBuf::from("/work/out")));
        assert_eq!(
            manifest.source_dir(project, "fifo"),
            Some(PathBuf::from("/work/rtl/fifo"))
        );
    }

    #[test]
    fn parse_empty_manifest() {
        let manifest = IpgenManifest::from_str("").unwrap();
        assert_eq!(manifest.platform(), PlatformDescriptor::default());
        assert_eq!(manifest.build_dir(Path::new(".")), None);
        assert_eq!(manifest.source_dir(Path::new("."), "fifo"), None);
    }

    #[test]
    fn find_searches_upward() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ipgen.toml"), "[build]\ndir = \"build\"\n").unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let (manifest, found) = IpgenManifest::find_and_load(&nested).unwrap().unwrap();
        assert_eq!(found, dir.path());
        assert_eq!(manifest.build_dir(&found), Some(dir.path().join("build")));
    }

    #[test]
    fn malformed_manifest_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ipgen.toml"), "[build\n").unwrap();
        let err = IpgenManifest::find_and_load(dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("ipgen.toml"));
    }
}
