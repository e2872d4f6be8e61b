//! Application configuration
//!
//! A JSON file where every field is optional. A missing file means defaults;
//! a file that exists but does not parse is an error.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{FlameError, Result};
use crate::images::{DirectoryImageLister, DEFAULT_IMAGE_PREFIX};
use crate::layers::{BlendMode, LayerMode, RegistryOptions, DEFAULT_FALLBACK_IMAGE};
use crate::state::DEFAULT_NAMESPACE;

/// Browser storage allows roughly 5 MiB per origin
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "flamelayer.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Directory holding the mask images
    pub images_dir: PathBuf,

    /// Only images whose file name starts with this are listed
    pub image_prefix: String,

    /// Image used when the directory has no matching images
    pub fallback_image: String,

    /// Settings file backing the settings store
    pub storage_path: PathBuf,

    /// Key prefix for per-layer settings records
    pub namespace: String,

    /// Storage limit in bytes; `null` disables it
    pub quota_bytes: Option<u64>,

    pub layer_mode: LayerMode,

    /// Blend mode for layers without stored settings
    pub default_blend_mode: BlendMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from("Flame-images"),
            image_prefix: DEFAULT_IMAGE_PREFIX.to_string(),
            fallback_image: DEFAULT_FALLBACK_IMAGE.to_string(),
            storage_path: PathBuf::from("flamelayer-settings.json"),
            namespace: DEFAULT_NAMESPACE.to_string(),
            quota_bytes: Some(DEFAULT_QUOTA_BYTES),
            layer_mode: LayerMode::default(),
            default_blend_mode: BlendMode::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, or defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(FlameError::Config {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        };

        let config = serde_json::from_str(&content).map_err(|e| FlameError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Registry options derived from this configuration
    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions {
            mode: self.layer_mode,
            fallback_image: self.fallback_image.clone(),
            default_blend_mode: self.default_blend_mode,
        }
    }

    /// Lister for the configured image directory
    pub fn image_lister(&self) -> DirectoryImageLister {
        DirectoryImageLister::new(&self.images_dir).with_prefix(self.image_prefix.clone())
    }
}
