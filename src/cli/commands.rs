//! CLI Command Implementations
//!
//! Every command builds a scene from the configured image directory, the same
//! way the renderer would at startup, and works through the layer registry.

use log::{debug, info, warn};

use crate::config::AppConfig;
use crate::control::{self, TextPanel};
use crate::error::{FlameError, Result};
use crate::images::ImageLister;
use crate::layers::{BlendMode, FsTextureLoader, LayerId, LayerRegistry, Viewport};
use crate::params::{ParamName, ParamValue, Rgb};
use crate::render::RecordingRenderer;
use crate::state::{FileStorage, KeyValueStorage, MemoryStorage, SettingsStore};

type Scene = LayerRegistry<FsTextureLoader, RecordingRenderer>;

/// Open the settings store described by the configuration.
///
/// An unreadable settings file falls back to in-memory storage so the scene
/// still comes up with defaults.
pub fn open_settings(config: &AppConfig) -> SettingsStore {
    let storage: Box<dyn KeyValueStorage> =
        match FileStorage::open(&config.storage_path, config.quota_bytes) {
            Ok(storage) => {
                debug!("Settings stored in {}", storage.path().display());
                Box::new(storage)
            }
            Err(e) => {
                warn!("{}; settings will not be saved", e);
                Box::new(MemoryStorage::new())
            }
        };
    SettingsStore::with_namespace(storage, config.namespace.clone())
}

/// Build and initialize the scene for the configuration
pub fn open_scene(config: &AppConfig) -> Scene {
    let mut scene = LayerRegistry::new(
        open_settings(config),
        FsTextureLoader::new("."),
        RecordingRenderer::with_history(1),
        config.registry_options(),
    );
    scene.initialize_from(&config.image_lister());
    scene
}

fn require_layer(scene: &Scene, layer: &str) -> Result<LayerId> {
    let id = LayerId::new(layer);
    match scene.layer(&id) {
        Some(_) => Ok(id),
        None => Err(FlameError::LayerNotFound { id: layer.to_string() }),
    }
}

/// Parse a command-line value for a parameter
pub fn parse_value(name: ParamName, raw: &str) -> Result<ParamValue> {
    if name.is_color() {
        return raw.parse::<Rgb>().map(ParamValue::Color);
    }
    raw.trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .map(ParamValue::Scalar)
        .ok_or(FlameError::ValueKindMismatch {
            name: name.key(),
            expected: "number",
        })
}

/// List the mask images.
pub fn list_images(config: &AppConfig) -> Result<()> {
    let lister = config.image_lister();
    let images = lister.list_images()?;

    if images.is_empty() {
        println!(
            "No images found in {}; the scene would use {}",
            lister.dir().display(),
            config.fallback_image
        );
        return Ok(());
    }

    for (i, image) in images.iter().enumerate() {
        println!("{:>3}  {:<32} {}", i + 1, LayerId::from_image_path(image), image);
    }

    Ok(())
}

/// Show the control panel.
pub fn show(config: &AppConfig, layer: Option<&str>) -> Result<()> {
    let scene = open_scene(config);
    let mut panel = TextPanel::new();

    match layer {
        Some(layer) => {
            let id = require_layer(&scene, layer)?;
            if let Some(layer) = scene.layer(&id) {
                control::describe_layer(&mut panel, layer, scene.selected() == Some(&id));
            }
            let stored = scene.settings().load(&id).is_some();
            println!("{}", panel);
            println!("Stored settings: {}", if stored { "yes" } else { "no (defaults)" });
        }
        None => {
            scene.build_controls(&mut panel);
            println!("{}", panel);
            let stored = scene.settings().identities();
            println!("Stored settings for {} image(s)", stored.len());
        }
    }

    Ok(())
}

/// Set one parameter of a layer.
pub fn set(config: &AppConfig, layer: &str, param: &str, value: &str) -> Result<()> {
    let name = ParamName::parse_loose(param)?;
    let value = parse_value(name, value)?;

    let mut scene = open_scene(config);
    let id = require_layer(&scene, layer)?;

    if !scene.set_param(&id, name, value) {
        return Err(FlameError::ValueKindMismatch {
            name: name.key(),
            expected: if name.is_color() { "color" } else { "number" },
        });
    }

    if let Some(layer) = scene.layer(&id) {
        let stored = layer.params.get(name);
        info!("{} {} = {}", id, name, stored);
        println!("{}: {} = {}", id, name, stored);
    }

    Ok(())
}

/// Show or hide a layer.
pub fn visibility(config: &AppConfig, layer: &str, visible: bool) -> Result<()> {
    let mut scene = open_scene(config);
    let id = require_layer(&scene, layer)?;

    scene.set_visibility(&id, visible);
    println!("{}: {}", id, if visible { "visible" } else { "hidden" });

    Ok(())
}

/// Change a layer's blend mode.
pub fn blend(config: &AppConfig, layer: &str, mode: &str) -> Result<()> {
    let mode: BlendMode = mode.parse()?;
    let mut scene = open_scene(config);
    let id = require_layer(&scene, layer)?;

    scene.set_blend_mode(&id, mode);
    println!("{}: blend mode {}", id, mode);

    Ok(())
}

/// Select the layer after `from` and show its controls.
pub fn next(config: &AppConfig, from: Option<&str>) -> Result<()> {
    let mut scene = open_scene(config);

    if let Some(from) = from {
        let id = require_layer(&scene, from)?;
        scene.select(&id);
    }

    let Some(selected) = scene.advance_selection().cloned() else {
        println!("No layers");
        return Ok(());
    };

    let mut panel = TextPanel::new();
    if let Some(layer) = scene.layer(&selected) {
        control::describe_layer(&mut panel, layer, true);
    }
    println!("Selected {}", selected);
    println!("{}", panel);

    Ok(())
}

/// Run the scene and print the draw list of the last frame.
pub fn preview(config: &AppConfig, frames: u32, fps: f32, viewport: Viewport) -> Result<()> {
    let mut scene = open_scene(config);
    let step = if fps > 0.0 { 1.0 / fps } else { 0.0 };

    for frame in 0..frames.max(1) {
        scene.tick(frame as f32 * step, viewport);
    }

    println!(
        "{} layer(s), viewport {}x{}",
        scene.len(),
        viewport.width,
        viewport.height
    );
    println!("{:-<60}", "");

    let draws = scene.renderer().last_frame().unwrap_or_default();
    if draws.is_empty() {
        println!("Nothing drawn");
    }
    for draw in draws {
        println!(
            "{:>3}  {:<32} {:<8} {}",
            draw.draw_order,
            draw.layer,
            draw.blend_mode,
            if draw.visible { "visible" } else { "hidden" }
        );
        let changed = draw.params.changed();
        if !changed.is_empty() {
            let names: Vec<_> = changed.iter().map(|n| n.key()).collect();
            println!("     changed: {}", names.join(", "));
        }
    }

    Ok(())
}

/// Delete every stored snapshot.
pub fn reset(config: &AppConfig) -> Result<()> {
    let mut scene = open_scene(config);
    let removed = scene.settings_mut().clear_all();
    info!("Cleared settings for {} layer(s) in {}", removed, config.storage_path.display());
    println!("Removed {} stored snapshot(s)", removed);
    Ok(())
}
