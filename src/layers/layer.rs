//! A single flame layer
//!
//! A layer is one mask image with its own parameter set, visibility flag and
//! blend mode. Layers are always referenced by [`LayerId`], never by position.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FlameError, Result};
use crate::params::ParameterSet;

/// Stable layer identity: the image file name.
///
/// Derived from the file name rather than the full path so that settings
/// survive moving the images to another directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(String);

impl LayerId {
    /// Derive the identity of an image path (`./Flame-images/a.png` -> `a.png`)
    pub fn from_image_path(path: &str) -> Self {
        let name = path
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or(path);
        Self(name.to_string())
    }

    /// Wrap an identity string as-is
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identity string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// How a layer is composited over the layers below it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    #[default]
    Additive,
    Normal,
    Multiply,
    Screen,
}

impl BlendMode {
    /// All blend modes
    pub const ALL: [BlendMode; 4] = [
        BlendMode::Additive,
        BlendMode::Normal,
        BlendMode::Multiply,
        BlendMode::Screen,
    ];

    /// Lowercase name used in stored records
    pub fn as_str(&self) -> &'static str {
        match self {
            BlendMode::Additive => "additive",
            BlendMode::Normal => "normal",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
        }
    }
}

impl FromStr for BlendMode {
    type Err = FlameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FlameError::UnknownBlendMode {
                mode: s.to_string(),
            })
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Viewport size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Opaque handle to a resolved mask texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureHandle {
    /// Image path the texture was resolved from
    pub path: String,
    pub width: u32,
    pub height: u32,
}

/// Texture resolution state of a layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureState {
    /// Requested, not resolved yet; the layer is not drawn
    Pending,
    /// Resolved and owned by the layer
    Ready(TextureHandle),
}

/// One independently configured flame instance
#[derive(Debug, Clone)]
pub struct Layer {
    /// Stable identity (image file name)
    pub id: LayerId,
    /// Image path as reported by the image lister
    pub image_path: String,
    /// Whether the layer is drawn
    pub visible: bool,
    /// Compositing mode
    pub blend_mode: BlendMode,
    /// Live parameter values
    pub params: ParameterSet,
    /// Paint order; higher draws on top
    pub draw_order: usize,
    /// Texture resolution state
    pub texture: TextureState,
    /// Seconds since start, updated every tick
    pub time: f32,
    /// Viewport size, updated every tick
    pub viewport: Viewport,
}

impl Layer {
    /// Create a layer with default settings and a pending texture
    pub fn new(image_path: impl Into<String>, draw_order: usize, blend_mode: BlendMode) -> Self {
        let image_path = image_path.into();
        Self {
            id: LayerId::from_image_path(&image_path),
            image_path,
            visible: true,
            blend_mode,
            params: ParameterSet::new(),
            draw_order,
            texture: TextureState::Pending,
            time: 0.0,
            viewport: Viewport::default(),
        }
    }

    /// Whether the texture has been resolved
    pub fn is_texture_ready(&self) -> bool {
        matches!(self.texture, TextureState::Ready(_))
    }

    /// The resolved texture, if any
    pub fn texture(&self) -> Option<&TextureHandle> {
        match &self.texture {
            TextureState::Ready(handle) => Some(handle),
            TextureState::Pending => None,
        }
    }

    /// Take the texture out of the layer, leaving it pending
    pub fn take_texture(&mut self) -> Option<TextureHandle> {
        match std::mem::replace(&mut self.texture, TextureState::Pending) {
            TextureState::Ready(handle) => Some(handle),
            TextureState::Pending => None,
        }
    }
}
