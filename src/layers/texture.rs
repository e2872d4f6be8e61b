//! Texture resolution
//!
//! Textures resolve independently per layer and never block a frame. The
//! registry files a request per layer and collects whatever has finished on
//! each tick through [`TextureLoader::poll`].

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use log::debug;

use super::layer::{LayerId, TextureHandle};
use crate::error::{FlameError, Result};

/// A texture the registry is waiting for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRequest {
    pub layer: LayerId,
    pub path: String,
    /// Registry load generation the request belongs to
    pub generation: u64,
}

/// A finished texture resolution, successful or not
#[derive(Debug)]
pub struct TextureEvent {
    pub layer: LayerId,
    pub generation: u64,
    pub result: Result<TextureHandle>,
}

impl TextureEvent {
    /// Complete a request with a result
    pub fn for_request(request: &TextureRequest, result: Result<TextureHandle>) -> Self {
        Self {
            layer: request.layer.clone(),
            generation: request.generation,
            result,
        }
    }
}

/// Texture resolution collaborator
pub trait TextureLoader {
    /// Start resolving a texture
    fn request(&mut self, request: TextureRequest);

    /// Collect every resolution that finished since the last poll
    fn poll(&mut self) -> Vec<TextureEvent>;

    /// Give back a texture the registry no longer owns
    fn release(&mut self, _texture: TextureHandle) {}
}

/// Resolves mask images from the filesystem.
///
/// Requests are queued and resolved on the next poll, reading only the image
/// header to size the texture.
#[derive(Debug)]
pub struct FsTextureLoader {
    root: PathBuf,
    queue: VecDeque<TextureRequest>,
}

impl FsTextureLoader {
    /// Resolve image paths relative to `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            queue: VecDeque::new(),
        }
    }

    /// Number of requests not yet resolved
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    fn resolve_path(&self, image_path: &str) -> PathBuf {
        let relative = image_path.trim_start_matches("./");
        let path = Path::new(relative);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn resolve(&self, request: &TextureRequest) -> Result<TextureHandle> {
        let path = self.resolve_path(&request.path);
        let (width, height) =
            image::image_dimensions(&path).map_err(|e| FlameError::TextureLoadFailed {
                path: request.path.clone(),
                reason: e.to_string(),
            })?;

        if width == 0 || height == 0 {
            return Err(FlameError::TextureLoadFailed {
                path: request.path.clone(),
                reason: "image has no pixels".to_string(),
            });
        }

        Ok(TextureHandle {
            path: request.path.clone(),
            width,
            height,
        })
    }
}

impl TextureLoader for FsTextureLoader {
    fn request(&mut self, request: TextureRequest) {
        debug!("Texture requested: {}", request.path);
        self.queue.push_back(request);
    }

    fn poll(&mut self) -> Vec<TextureEvent> {
        let requests: Vec<_> = self.queue.drain(..).collect();
        requests
            .iter()
            .map(|request| TextureEvent::for_request(request, self.resolve(request)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
        let img = image::RgbaImage::new(width, height);
        img.save(dir.join(name)).unwrap();
    }

    fn request(path: &str) -> TextureRequest {
        TextureRequest {
            layer: LayerId::from_image_path(path),
            path: path.to_string(),
            generation: 1,
        }
    }

    #[test]
    fn test_resolves_on_poll() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("Flame-images")).unwrap();
        write_png(&temp_dir.path().join("Flame-images"), "flame_mask1.png", 4, 2);

        let mut loader = FsTextureLoader::new(temp_dir.path());
        loader.request(request("./Flame-images/flame_mask1.png"));
        assert_eq!(loader.pending(), 1);

        let events = loader.poll();
        assert_eq!(loader.pending(), 0);
        assert_eq!(events.len(), 1);

        let handle = events[0].result.as_ref().unwrap();
        assert_eq!((handle.width, handle.height), (4, 2));
        assert_eq!(events[0].layer.as_str(), "flame_mask1.png");
        assert_eq!(events[0].generation, 1);
    }

    #[test]
    fn test_failures_are_per_request() {
        let temp_dir = TempDir::new().unwrap();
        write_png(temp_dir.path(), "good.png", 1, 1);
        fs::write(temp_dir.path().join("broken.png"), b"not a png").unwrap();

        let mut loader = FsTextureLoader::new(temp_dir.path());
        loader.request(request("./missing.png"));
        loader.request(request("./good.png"));
        loader.request(request("./broken.png"));

        let events = loader.poll();
        let ok: Vec<bool> = events.iter().map(|e| e.result.is_ok()).collect();
        assert_eq!(ok, vec![false, true, false]);
        assert!(matches!(
            events[0].result,
            Err(FlameError::TextureLoadFailed { .. })
        ));
    }
}
