//! Layer Registry
//!
//! Owns the layers of the scene and mediates between the settings store,
//! the texture loader, the renderer and the control surface. All
//! collaborators are injected at construction; nothing is global.
//!
//! Layers are looked up by [`LayerId`] everywhere. Texture completions carry
//! the load generation they were requested in, so results that arrive after
//! a re-initialize are recognized as stale and discarded.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::layer::{BlendMode, Layer, LayerId, TextureState, Viewport};
use super::texture::{TextureEvent, TextureLoader, TextureRequest};
use crate::control::{self, ControlChange, ControlSurface};
use crate::images::ImageLister;
use crate::params::{ParamName, ParamValue};
use crate::render::{DrawCall, Frame, Renderer};
use crate::state::{SettingsSnapshot, SettingsStore};

/// Image used when no mask images are available
pub const DEFAULT_FALLBACK_IMAGE: &str = "./Flame-images/flame_mask.png";

/// How the control surface presents layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerMode {
    /// Controls for every layer are shown at once
    #[default]
    AllLayers,
    /// Controls for one selected layer, with a "next" action to cycle
    SingleLayer,
}

/// Registry behavior taken from configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryOptions {
    pub mode: LayerMode,
    pub fallback_image: String,
    /// Blend mode of layers without stored settings
    pub default_blend_mode: BlendMode,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            mode: LayerMode::default(),
            fallback_image: DEFAULT_FALLBACK_IMAGE.to_string(),
            default_blend_mode: BlendMode::default(),
        }
    }
}

/// The set of layers in the scene
pub struct LayerRegistry<T: TextureLoader, R: Renderer> {
    layers: Vec<Layer>,
    settings: SettingsStore,
    textures: T,
    renderer: R,
    options: RegistryOptions,
    selected: Option<LayerId>,
    generation: u64,
}

impl<T: TextureLoader, R: Renderer> LayerRegistry<T, R> {
    /// Create an empty registry
    pub fn new(settings: SettingsStore, textures: T, renderer: R, options: RegistryOptions) -> Self {
        Self {
            layers: Vec::new(),
            settings,
            textures,
            renderer,
            options,
            selected: None,
            generation: 0,
        }
    }

    /// Replace all layers with one layer per image, in list order.
    ///
    /// Later images draw on top. Duplicate identities collapse to the first
    /// occurrence. An empty list yields a single layer for the fallback
    /// image. Settings are hydrated immediately; textures resolve later and
    /// a layer is only drawn once its texture is ready.
    pub fn initialize<S: AsRef<str>>(&mut self, images: &[S]) {
        self.reset();
        self.generation += 1;

        let fallback = [self.options.fallback_image.clone()];
        let paths: Vec<&str> = if images.is_empty() {
            warn!(
                "No mask images available, using fallback {}",
                self.options.fallback_image
            );
            fallback.iter().map(String::as_str).collect()
        } else {
            images.iter().map(|s| s.as_ref()).collect()
        };

        for path in paths {
            let id = LayerId::from_image_path(path);
            if self.layer(&id).is_some() {
                warn!("Skipping duplicate image {} (already loaded as {})", path, id);
                continue;
            }

            let mut layer = Layer::new(path, self.layers.len(), self.options.default_blend_mode);
            if let Some(snapshot) = self.settings.load(&id) {
                snapshot.apply_to(&mut layer);
            }

            self.textures.request(TextureRequest {
                layer: id,
                path: path.to_string(),
                generation: self.generation,
            });
            self.layers.push(layer);
        }

        self.selected = self.layers.first().map(|l| l.id.clone());
        info!(
            "Initialized {} layer(s) (generation {})",
            self.layers.len(),
            self.generation
        );
    }

    /// Initialize from an image lister, falling back on any listing error
    pub fn initialize_from(&mut self, lister: &dyn ImageLister) {
        let images = match lister.list_images() {
            Ok(images) => images,
            Err(e) => {
                warn!("{}", e);
                Vec::new()
            }
        };
        self.initialize(&images);
    }

    /// Drop every layer and release its texture. Stored settings are kept.
    pub fn reset(&mut self) {
        for mut layer in self.layers.drain(..) {
            if let Some(texture) = layer.take_texture() {
                self.textures.release(texture);
            }
        }
        self.selected = None;
    }

    /// Set a parameter by its storage key and persist the layer.
    ///
    /// Unknown layers, names outside the schema and values of the wrong kind
    /// are ignored. Returns whether the value was applied.
    pub fn set_parameter(&mut self, id: &LayerId, name: &str, value: ParamValue) -> bool {
        match ParamName::from_key(name) {
            Some(name) => self.set_param(id, name, value),
            None => {
                warn!("Ignoring unknown parameter '{}' for {}", name, id);
                false
            }
        }
    }

    /// Set a parameter and persist the layer. Scalars are clamped to range.
    pub fn set_param(&mut self, id: &LayerId, name: ParamName, value: ParamValue) -> bool {
        let Some(layer) = self.layer_mut(id) else {
            warn!("Ignoring {} change for unknown layer {}", name, id);
            return false;
        };

        match layer.params.set_clamped(name, value) {
            Ok(stored) => {
                debug!("{}: {} = {}", id, name, stored);
                self.persist(id);
                true
            }
            Err(e) => {
                warn!("Ignoring change for {}: {}", id, e);
                false
            }
        }
    }

    /// Show or hide a layer and persist it
    pub fn set_visibility(&mut self, id: &LayerId, visible: bool) -> bool {
        let Some(layer) = self.layer_mut(id) else {
            warn!("Ignoring visibility change for unknown layer {}", id);
            return false;
        };
        layer.visible = visible;
        self.persist(id);
        true
    }

    /// Change a layer's blend mode and persist it
    pub fn set_blend_mode(&mut self, id: &LayerId, mode: BlendMode) -> bool {
        let Some(layer) = self.layer_mut(id) else {
            warn!("Ignoring blend mode change for unknown layer {}", id);
            return false;
        };
        layer.blend_mode = mode;
        self.persist(id);
        true
    }

    /// Apply an edit coming from the control surface
    pub fn apply_change(&mut self, change: ControlChange) -> bool {
        match change {
            ControlChange::Param { layer, name, value } => self.set_param(&layer, name, value),
            ControlChange::Visibility { layer, visible } => self.set_visibility(&layer, visible),
            ControlChange::BlendMode { layer, mode } => self.set_blend_mode(&layer, mode),
        }
    }

    /// Advance one frame.
    ///
    /// Applies finished texture loads, updates the time and viewport inputs
    /// of every layer, and redraws. Never persists anything.
    pub fn tick(&mut self, elapsed_seconds: f32, viewport: Viewport) {
        for event in self.textures.poll() {
            self.apply_texture_event(event);
        }

        for layer in &mut self.layers {
            layer.time = elapsed_seconds;
            layer.viewport = viewport;
        }

        let draws = self
            .layers
            .iter()
            .filter_map(|layer| {
                layer.texture().map(|texture| DrawCall {
                    layer: &layer.id,
                    params: &layer.params,
                    texture,
                    visible: layer.visible,
                    blend_mode: layer.blend_mode,
                    draw_order: layer.draw_order,
                    time: layer.time,
                    viewport: layer.viewport,
                })
            })
            .collect();

        let frame = Frame {
            viewport,
            time: elapsed_seconds,
            draws,
        };
        self.renderer.render(&frame);
    }

    fn apply_texture_event(&mut self, event: TextureEvent) {
        if event.generation != self.generation {
            debug!(
                "Discarding stale texture for {} (generation {}, current {})",
                event.layer, event.generation, self.generation
            );
            if let Ok(texture) = event.result {
                self.textures.release(texture);
            }
            return;
        }

        match event.result {
            Ok(texture) => {
                let Some(layer) = self.layer_mut(&event.layer) else {
                    debug!("Texture arrived for removed layer {}", event.layer);
                    self.textures.release(texture);
                    return;
                };
                debug!(
                    "Texture ready for {} ({}x{})",
                    event.layer, texture.width, texture.height
                );
                let previous = std::mem::replace(&mut layer.texture, TextureState::Ready(texture));
                if let TextureState::Ready(old) = previous {
                    self.textures.release(old);
                }
            }
            Err(e) => {
                warn!("{}; dropping layer {}", e, event.layer);
                self.remove_layer(&event.layer);
            }
        }
    }

    fn remove_layer(&mut self, id: &LayerId) {
        let Some(position) = self.position(id) else {
            return;
        };
        let mut layer = self.layers.remove(position);
        if let Some(texture) = layer.take_texture() {
            self.textures.release(texture);
        }

        if self.selected.as_ref() == Some(id) {
            // Selection moves to the layer that took the removed one's place.
            let next = position.min(self.layers.len().saturating_sub(1));
            self.selected = self.layers.get(next).map(|l| l.id.clone());
        }
    }

    /// Select a layer by identity. Returns `false` if there is no such layer.
    pub fn select(&mut self, id: &LayerId) -> bool {
        if self.layer(id).is_none() {
            return false;
        }
        self.selected = Some(id.clone());
        true
    }

    /// Move the selection to the next layer in draw order, wrapping around.
    ///
    /// Returns the newly selected layer, or `None` if there are no layers.
    pub fn advance_selection(&mut self) -> Option<&LayerId> {
        if self.layers.is_empty() {
            warn!("No layers to select");
            self.selected = None;
            return None;
        }

        let next = match self.selected.as_ref().and_then(|id| self.position(id)) {
            Some(position) => (position + 1) % self.layers.len(),
            None => 0,
        };
        self.selected = Some(self.layers[next].id.clone());
        debug!("Selected layer {}", self.layers[next].id);
        self.selected.as_ref()
    }

    /// Describe the control panel.
    ///
    /// In [`LayerMode::AllLayers`] every layer gets its controls; in
    /// [`LayerMode::SingleLayer`] only the selected one does. The visibility
    /// folder always lists every layer.
    pub fn build_controls(&self, surface: &mut dyn ControlSurface) {
        for layer in &self.layers {
            let selected = self.selected.as_ref() == Some(&layer.id);
            if self.options.mode == LayerMode::AllLayers || selected {
                control::describe_layer(surface, layer, selected);
            }
        }
        control::describe_visibility(surface, &self.layers);
    }

    fn persist(&mut self, id: &LayerId) {
        if let Some(layer) = self.layer(id) {
            let snapshot = SettingsSnapshot::of_layer(layer);
            self.settings.save(id, &snapshot);
        }
    }

    fn position(&self, id: &LayerId) -> Option<usize> {
        self.layers.iter().position(|l| &l.id == id)
    }

    fn layer_mut(&mut self, id: &LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| &l.id == id)
    }

    /// Get a layer by identity
    pub fn layer(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| &l.id == id)
    }

    /// All layers in draw order
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the registry has no layers
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Currently selected layer
    pub fn selected(&self) -> Option<&LayerId> {
        self.selected.as_ref()
    }

    /// Presentation mode
    pub fn mode(&self) -> LayerMode {
        self.options.mode
    }

    /// Current load generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The settings store
    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// The settings store, for maintenance such as clearing all snapshots
    pub fn settings_mut(&mut self) -> &mut SettingsStore {
        &mut self.settings
    }

    /// The texture loader
    pub fn textures(&self) -> &T {
        &self.textures
    }

    /// The renderer
    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::TextureHandle;
    use crate::render::RecordingRenderer;
    use crate::state::MemoryStorage;

    /// Resolves every request successfully on the next poll
    #[derive(Default)]
    struct InstantLoader {
        queue: Vec<TextureRequest>,
        released: usize,
    }

    impl TextureLoader for InstantLoader {
        fn request(&mut self, request: TextureRequest) {
            self.queue.push(request);
        }

        fn poll(&mut self) -> Vec<TextureEvent> {
            self.queue
                .drain(..)
                .map(|r| {
                    let handle = TextureHandle {
                        path: r.path.clone(),
                        width: 8,
                        height: 8,
                    };
                    TextureEvent::for_request(&r, Ok(handle))
                })
                .collect()
        }

        fn release(&mut self, _texture: TextureHandle) {
            self.released += 1;
        }
    }

    fn registry(mode: LayerMode) -> LayerRegistry<InstantLoader, RecordingRenderer> {
        LayerRegistry::new(
            SettingsStore::new(Box::new(MemoryStorage::new())),
            InstantLoader::default(),
            RecordingRenderer::new(),
            RegistryOptions {
                mode,
                ..Default::default()
            },
        )
    }

    fn viewport() -> Viewport {
        Viewport::new(1280.0, 720.0)
    }

    #[test]
    fn test_initialize_assigns_draw_order() {
        let mut reg = registry(LayerMode::AllLayers);
        reg.initialize(&["./img/a.png", "./img/b.png", "./img/c.png"]);

        let orders: Vec<_> = reg.layers().iter().map(|l| l.draw_order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
        assert_eq!(reg.selected(), Some(&LayerId::new("a.png")));
        assert_eq!(reg.generation(), 1);
    }

    #[test]
    fn test_tick_draws_ready_layers() {
        let mut reg = registry(LayerMode::AllLayers);
        reg.initialize(&["./a.png"]);
        assert!(!reg.layers()[0].is_texture_ready());

        reg.tick(0.5, viewport());
        let frame = reg.renderer().last_frame().unwrap();
        assert_eq!(frame.len(), 1);
        assert_eq!(frame[0].time, 0.5);
        assert_eq!(reg.layers()[0].viewport, viewport());
    }

    #[test]
    fn test_reinitialize_releases_textures() {
        let mut reg = registry(LayerMode::AllLayers);
        reg.initialize(&["./a.png", "./b.png"]);
        reg.tick(0.0, viewport());

        reg.initialize(&["./c.png"]);
        assert_eq!(reg.textures().released, 2);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.generation(), 2);
    }

    #[test]
    fn test_stale_textures_are_discarded() {
        let mut reg = registry(LayerMode::AllLayers);
        reg.initialize(&["./a.png"]);
        // Re-initialize before the first request resolved.
        reg.initialize(&["./a.png"]);

        reg.tick(0.0, viewport());
        assert_eq!(reg.textures().released, 1);
        assert!(reg.layers()[0].is_texture_ready());
    }

    #[test]
    fn test_set_parameter_clamps_and_persists() {
        let mut reg = registry(LayerMode::AllLayers);
        reg.initialize(&["./a.png"]);
        let id = LayerId::new("a.png");

        assert!(reg.set_parameter(&id, "uFlameHeight", ParamValue::Scalar(9.0)));
        assert_eq!(
            reg.layer(&id).unwrap().params.scalar(ParamName::FlameHeight),
            Some(3.0)
        );
        let stored = reg.settings().load(&id).unwrap();
        assert_eq!(stored.params.scalar(ParamName::FlameHeight), Some(3.0));
    }

    #[test]
    fn test_set_parameter_rejects_unknown() {
        let mut reg = registry(LayerMode::AllLayers);
        reg.initialize(&["./a.png"]);
        let id = LayerId::new("a.png");

        assert!(!reg.set_parameter(&id, "uTime", ParamValue::Scalar(1.0)));
        assert!(!reg.set_parameter(&id, "uColor1", ParamValue::Scalar(1.0)));
        assert!(!reg.set_parameter(&id, "flameheight", ParamValue::Scalar(2.0)));
        assert!(!reg.set_parameter(&id, "FlameHeight", ParamValue::Scalar(2.0)));
        assert!(!reg.set_parameter(&LayerId::new("zz.png"), "uFlameHeight", ParamValue::Scalar(1.0)));
        assert!(reg.settings().load(&id).is_none());
    }

    #[test]
    fn test_single_layer_controls() {
        let mut reg = registry(LayerMode::SingleLayer);
        reg.initialize(&["./a.png", "./b.png"]);

        let mut panel = control::TextPanel::new();
        reg.build_controls(&mut panel);
        // One layer's parameters and blend mode, plus a visibility toggle per layer.
        assert_eq!(panel.bindings().len(), ParamName::ALL.len() + 1 + 2);

        let mut all = registry(LayerMode::AllLayers);
        all.initialize(&["./a.png", "./b.png"]);
        let mut panel = control::TextPanel::new();
        all.build_controls(&mut panel);
        assert_eq!(panel.bindings().len(), 2 * (ParamName::ALL.len() + 1) + 2);
    }

    #[test]
    fn test_advance_selection_on_empty_registry() {
        let mut reg = registry(LayerMode::SingleLayer);
        assert_eq!(reg.advance_selection(), None);
        assert!(reg.is_empty());
    }
}
