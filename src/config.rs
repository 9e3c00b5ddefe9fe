//! Decoder configuration and its persistence

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::format::BarcodeFormat;

/// Settings applied to every decode a reader performs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Spend more effort searching for a barcode
    pub try_harder: bool,
    /// Also try the image rotated by 90, 180 and 270 degrees
    pub auto_rotate: bool,
    /// Accepted symbologies (empty = every one-dimensional format)
    pub formats: Vec<BarcodeFormat>,
}

impl ReaderConfig {
    /// Directory name used under the user's config dir
    pub const ID: &'static str = "barcode-reader";

    /// Build a config from explicit search settings
    pub fn new(try_harder: bool, auto_rotate: bool, formats: &[BarcodeFormat]) -> Self {
        Self {
            try_harder,
            auto_rotate,
            formats: formats.to_vec(),
        }
    }

    /// Build a config from a single performance switch.
    ///
    /// Performance mode disables both the harder search and rotation.
    pub fn performance(performance_mode: bool, formats: &[BarcodeFormat]) -> Self {
        Self::new(!performance_mode, !performance_mode, formats)
    }

    /// Concrete formats the decoder should accept, group values expanded
    pub fn possible_formats(&self) -> Vec<BarcodeFormat> {
        let mut formats: Vec<BarcodeFormat> = if self.formats.is_empty() {
            BarcodeFormat::All1D.expand()
        } else {
            self.formats.iter().flat_map(|f| f.expand()).collect()
        };
        formats.sort();
        formats.dedup();
        formats
    }

    /// Default location of the persisted config file
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_or_default(&path),
            None => {
                log::warn!("No config directory available, using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from `path`, falling back to defaults when it is
    /// missing, unreadable or malformed
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:?}", err);
                Self::default()
            }
        }
    }

    /// Load configuration from a specific JSON file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read(path.as_ref())?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no config directory")
        })?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save configuration as pretty JSON, creating parent directories
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(self)?;
        fs::write(path, data)?;
        log::debug!("Saved reader config to {}", path.display());
        Ok(())
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        // Performance mode, all 1D formats
        Self::performance(true, &[])
    }
}
