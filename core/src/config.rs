//! Configuration management for global settings

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Current config version for migration support
pub const CONFIG_VERSION: u32 = 1;

/// Global configuration for the application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub version: u32,
    pub paths: PathsSection,
    #[serde(default)]
    pub tools: ToolsSection,
    #[serde(default)]
    pub ui: UiSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsSection {
    /// Directory holding one `<domain>.xml` definition per domain
    pub xml_dir: PathBuf,
}

/// Executable names of the external tools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    pub virsh: String,
    pub qemu_img: String,
    pub virt_install: String,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            virsh: "virsh".to_string(),
            qemu_img: "qemu-img".to_string(),
            virt_install: "virt-install".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSection {
    /// Animate the "working…" indicator during long tool calls
    pub spinner: bool,
}

impl Default for UiSection {
    fn default() -> Self {
        Self { spinner: true }
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        let data = dirs::data_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
        Self {
            version: CONFIG_VERSION,
            paths: PathsSection {
                xml_dir: data.join("kvm-configurator").join("xml"),
            },
            tools: ToolsSection::default(),
            ui: UiSection::default(),
        }
    }
}

impl GlobalConfig {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("kvm-configurator")
            .join("config.toml")
    }

    /// Load config from the default path, or create default if not exists
    pub fn load_or_default() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            let config = Self::default();
            config.save_to(&path)?;
            log::info!("wrote default configuration to {}", path.display());
            Ok(config)
        }
    }

    /// Load config from a specific path
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;

        if config.version != CONFIG_VERSION {
            log::warn!(
                "config {} has version {}, expected {}",
                path.display(),
                config.version,
                CONFIG_VERSION
            );
        }

        Ok(config)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.paths.xml_dir.as_os_str().is_empty() {
            return Err(Error::config("xml_dir cannot be empty"));
        }
        for (key, value) in [
            ("tools.virsh", &self.tools.virsh),
            ("tools.qemu_img", &self.tools.qemu_img),
            ("tools.virt_install", &self.tools.virt_install),
        ] {
            if value.trim().is_empty() {
                return Err(Error::config(format!("{} cannot be empty", key)));
            }
        }
        Ok(())
    }
}

/// `<xml_dir>/<domain>.xml`
pub fn xml_path(xml_dir: &Path, domain: &str) -> PathBuf {
    xml_dir.join(format!("{}.xml", domain))
}
