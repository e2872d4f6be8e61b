//! Flamelayer - Per-Image Flame Layers
//!
//! Renders one animated flame effect per mask image. Every layer carries its
//! own shader parameters, visibility and blend mode, and those settings are
//! persisted per image so they survive restarts.
//!
//! # Architecture
//!
//! - [`layers::LayerRegistry`]: owns the layers, applies edits and texture
//!   loads, and drives the renderer every tick.
//! - [`state::SettingsStore`]: reads and writes one settings snapshot per
//!   image over a [`state::KeyValueStorage`] backend.
//!
//! Rendering, texture decoding, image discovery and the control panel are
//! collaborators behind traits ([`render::Renderer`],
//! [`layers::TextureLoader`], [`images::ImageLister`],
//! [`control::ControlSurface`]).

pub mod cli;
pub mod config;
pub mod control;
pub mod error;
pub mod images;
pub mod layers;
pub mod params;
pub mod render;
pub mod state;

pub use config::AppConfig;
pub use error::{FlameError, Result};
pub use layers::{BlendMode, Layer, LayerId, LayerMode, LayerRegistry};
pub use params::{ParamName, ParamValue, ParameterSet, Rgb};
pub use state::SettingsStore;
