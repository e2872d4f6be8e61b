//! Image Listing
//!
//! Discovers the mask images the scene is built from. Paths come back in the
//! form the texture loader and [`LayerId`](crate::layers::LayerId) expect:
//! `./<dir>/<file>`.

use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;

use crate::error::{FlameError, Result};

/// Prefix shared by the bundled flame mask images
pub const DEFAULT_IMAGE_PREFIX: &str = "flame_mask";

/// Image-list collaborator
pub trait ImageLister {
    /// Ordered list of image paths
    fn list_images(&self) -> Result<Vec<String>>;
}

/// Lists `.png` files directly inside a directory
#[derive(Debug, Clone)]
pub struct DirectoryImageLister {
    dir: PathBuf,
    prefix: Option<String>,
}

impl DirectoryImageLister {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: None,
        }
    }

    /// Only list files whose name starts with `prefix`
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn accepts(&self, file_name: &str) -> bool {
        let is_png = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));
        let prefixed = self
            .prefix
            .as_deref()
            .map_or(true, |p| file_name.starts_with(p));
        is_png && prefixed
    }

    fn display_dir(&self) -> String {
        let dir = self.dir.to_string_lossy().replace('\\', "/");
        let dir = dir.trim_end_matches('/');
        if self.dir.is_absolute() || dir.starts_with("./") || dir.starts_with("../") {
            dir.to_string()
        } else {
            format!("./{}", dir)
        }
    }
}

impl ImageLister for DirectoryImageLister {
    fn list_images(&self) -> Result<Vec<String>> {
        if !self.dir.is_dir() {
            return Err(FlameError::ImageListUnavailable {
                reason: format!("{} is not a directory", self.dir.display()),
            });
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| FlameError::ImageListUnavailable {
                reason: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                debug!("Skipping non UTF-8 file name {:?}", entry.file_name());
                continue;
            };
            if self.accepts(name) {
                names.push(name.to_string());
            }
        }
        names.sort();

        let dir = self.display_dir();
        info!("Found {} image(s) in {}", names.len(), self.dir.display());
        Ok(names
            .into_iter()
            .map(|name| format!("{}/{}", dir, name))
            .collect())
    }
}

/// Fetches the image list from the `/api/mask-images` endpoint
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpImageLister {
    url: String,
    timeout: std::time::Duration,
}

#[cfg(feature = "http")]
impl HttpImageLister {
    /// `base_url` is the server root, e.g. `http://localhost:3000`
    pub fn new(base_url: &str) -> Self {
        Self {
            url: format!("{}/api/mask-images", base_url.trim_end_matches('/')),
            timeout: std::time::Duration::from_secs(5),
        }
    }
}

#[cfg(feature = "http")]
impl ImageLister for HttpImageLister {
    fn list_images(&self) -> Result<Vec<String>> {
        let unavailable = |e: reqwest::Error| FlameError::ImageListUnavailable {
            reason: format!("{}: {}", self.url, e),
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(unavailable)?;

        let response = client.get(&self.url).send().map_err(unavailable)?;
        if !response.status().is_success() {
            return Err(FlameError::ImageListUnavailable {
                reason: format!("{} returned {}", self.url, response.status()),
            });
        }

        let images: Vec<String> = response.json().map_err(unavailable)?;
        info!("Image list endpoint returned {} image(s)", images.len());
        Ok(images)
    }
}
