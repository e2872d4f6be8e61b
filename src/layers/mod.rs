//! Layer Module
//!
//! One layer per mask image, each with its own flame parameters, visibility,
//! blend mode and texture. The [`LayerRegistry`] owns the layers and keeps
//! them in sync with the settings store.

mod layer;
mod registry;
mod texture;

pub use layer::{BlendMode, Layer, LayerId, TextureHandle, TextureState, Viewport};
pub use registry::{LayerMode, LayerRegistry, RegistryOptions, DEFAULT_FALLBACK_IMAGE};
pub use texture::{FsTextureLoader, TextureEvent, TextureLoader, TextureRequest};
