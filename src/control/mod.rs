//! Control Surface Module
//!
//! The parameter panel is an external widget library. The registry describes
//! the panel through [`ControlSurface`]; every control carries a
//! [`ControlBinding`] that turns an edited value into a [`ControlChange`],
//! which the panel hands back to `LayerRegistry::apply_change`.

mod panel;

pub use panel::TextPanel;

use crate::layers::{BlendMode, Layer, LayerId};
use crate::params::{ParamGroup, ParamKind, ParamName, ParamValue, Rgb};

/// Which layer setting a control edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlTarget {
    Param(ParamName),
    Visibility,
    BlendMode,
}

/// Connects a displayed control to a layer setting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlBinding {
    pub layer: LayerId,
    pub target: ControlTarget,
}

impl ControlBinding {
    pub fn new(layer: LayerId, target: ControlTarget) -> Self {
        Self { layer, target }
    }

    /// Change produced by a slider edit, `None` if this is not a scalar control
    pub fn scalar(&self, value: f32) -> Option<ControlChange> {
        match self.target {
            ControlTarget::Param(name) if !name.is_color() => Some(ControlChange::Param {
                layer: self.layer.clone(),
                name,
                value: ParamValue::Scalar(value),
            }),
            _ => None,
        }
    }

    /// Change produced by a color picker edit
    pub fn color(&self, value: Rgb) -> Option<ControlChange> {
        match self.target {
            ControlTarget::Param(name) if name.is_color() => Some(ControlChange::Param {
                layer: self.layer.clone(),
                name,
                value: ParamValue::Color(value),
            }),
            _ => None,
        }
    }

    /// Change produced by a checkbox edit
    pub fn toggle(&self, value: bool) -> Option<ControlChange> {
        match self.target {
            ControlTarget::Visibility => Some(ControlChange::Visibility {
                layer: self.layer.clone(),
                visible: value,
            }),
            _ => None,
        }
    }

    /// Change produced by a dropdown edit
    pub fn choice(&self, mode: BlendMode) -> Option<ControlChange> {
        match self.target {
            ControlTarget::BlendMode => Some(ControlChange::BlendMode {
                layer: self.layer.clone(),
                mode,
            }),
            _ => None,
        }
    }
}

/// A user edit coming back from the control surface
#[derive(Debug, Clone, PartialEq)]
pub enum ControlChange {
    Param {
        layer: LayerId,
        name: ParamName,
        value: ParamValue,
    },
    Visibility {
        layer: LayerId,
        visible: bool,
    },
    BlendMode {
        layer: LayerId,
        mode: BlendMode,
    },
}

/// Parameter-panel collaborator
pub trait ControlSurface {
    /// Start the controls of one layer
    fn begin_layer(&mut self, layer: &LayerId, selected: bool);

    /// Start a folder of controls
    fn folder(&mut self, title: &str);

    /// A ranged numeric control
    fn slider(&mut self, binding: ControlBinding, label: &str, min: f32, max: f32, value: f32);

    /// A color picker
    fn color(&mut self, binding: ControlBinding, label: &str, value: Rgb);

    /// A checkbox
    fn toggle(&mut self, binding: ControlBinding, label: &str, value: bool);

    /// A dropdown of blend modes
    fn blend_choice(&mut self, binding: ControlBinding, label: &str, value: BlendMode);
}

/// Describe the grouped parameter controls of one layer
pub fn describe_layer(surface: &mut dyn ControlSurface, layer: &Layer, selected: bool) {
    surface.begin_layer(&layer.id, selected);

    for group in ParamGroup::ALL {
        surface.folder(group.title());
        for name in ParamName::in_group(group) {
            let binding = ControlBinding::new(layer.id.clone(), ControlTarget::Param(name));
            match (name.kind(), layer.params.get(name)) {
                (ParamKind::Scalar { min, max, .. }, ParamValue::Scalar(value)) => {
                    surface.slider(binding, name.label(), min, max, value);
                }
                (ParamKind::Color { .. }, ParamValue::Color(value)) => {
                    surface.color(binding, name.label(), value);
                }
                // ParameterSet never holds a value of the wrong kind.
                _ => {}
            }
        }
    }

    surface.blend_choice(
        ControlBinding::new(layer.id.clone(), ControlTarget::BlendMode),
        "Blend Mode",
        layer.blend_mode,
    );
}

/// Describe the visibility folder: one checkbox per layer, in draw order
pub fn describe_visibility<'a>(
    surface: &mut dyn ControlSurface,
    layers: impl IntoIterator<Item = &'a Layer>,
) {
    surface.folder("Layer Visibility");
    for (index, layer) in layers.into_iter().enumerate() {
        surface.toggle(
            ControlBinding::new(layer.id.clone(), ControlTarget::Visibility),
            &format!("Layer {} ({})", index + 1, layer.id),
            layer.visible,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_changes_match_target() {
        let id = LayerId::new("a.png");

        let slider = ControlBinding::new(id.clone(), ControlTarget::Param(ParamName::Turbulence));
        assert_eq!(
            slider.scalar(0.8),
            Some(ControlChange::Param {
                layer: id.clone(),
                name: ParamName::Turbulence,
                value: ParamValue::Scalar(0.8),
            })
        );
        assert_eq!(slider.color(Rgb::new(1, 2, 3)), None);
        assert_eq!(slider.toggle(true), None);

        let picker = ControlBinding::new(id.clone(), ControlTarget::Param(ParamName::Color1));
        assert!(picker.color(Rgb::new(1, 2, 3)).is_some());
        assert_eq!(picker.scalar(1.0), None);

        let check = ControlBinding::new(id.clone(), ControlTarget::Visibility);
        assert_eq!(
            check.toggle(false),
            Some(ControlChange::Visibility {
                layer: id.clone(),
                visible: false,
            })
        );

        let dropdown = ControlBinding::new(id.clone(), ControlTarget::BlendMode);
        assert_eq!(
            dropdown.choice(BlendMode::Screen),
            Some(ControlChange::BlendMode {
                layer: id,
                mode: BlendMode::Screen,
            })
        );
    }

    #[test]
    fn test_describe_layer_covers_schema() {
        let layer = Layer::new("./a.png", 0, BlendMode::Additive);
        let mut panel = TextPanel::new();
        describe_layer(&mut panel, &layer, true);

        assert_eq!(panel.bindings().len(), ParamName::ALL.len() + 1);
        let text = panel.to_string();
        assert!(text.contains("Shape Controls"));
        assert!(text.contains("Core Color"));
        assert!(text.contains("#ff8019"));
    }
}
