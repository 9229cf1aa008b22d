//! Target platform description handed to the build orchestrator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// HDL used for generated artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HdlLanguage {
    #[default]
    Verilog,
    SystemVerilog,
}

impl HdlLanguage {
    /// File extension of generated sources.
    pub fn extension(self) -> &'static str {
        match self {
            HdlLanguage::Verilog => "v",
            HdlLanguage::SystemVerilog => "sv",
        }
    }
}

impl fmt::Display for HdlLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HdlLanguage::Verilog => write!(f, "verilog"),
            HdlLanguage::SystemVerilog => write!(f, "systemverilog"),
        }
    }
}

/// Device, toolchain and language an artifact is generated for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlatformDescriptor {
    pub device: String,
    pub toolchain: String,
    #[serde(default)]
    pub language: HdlLanguage,
}

impl Default for PlatformDescriptor {
    fn default() -> Self {
        Self {
            device: "gemini".into(),
            toolchain: "raptor".into(),
            language: HdlLanguage::Verilog,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_platform() {
        let p = PlatformDescriptor::default();
        assert_eq!(p.device, "gemini");
        assert_eq!(p.toolchain, "raptor");
        assert_eq!(p.language.extension(), "v");
    }

    #[test]
    fn language_serializes_lowercase() {
        let json = serde_json::to_string(&HdlLanguage::SystemVerilog).unwrap();
        assert_eq!(json, "\"systemverilog\"");
        assert_eq!(HdlLanguage::SystemVerilog.to_string(), "systemverilog");
    }
}
