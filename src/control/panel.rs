//! Plain-text control surface used by the command-line front end.

use std::fmt;

use super::{ControlBinding, ControlSurface};
use crate::layers::{BlendMode, LayerId};
use crate::params::Rgb;

/// Renders the panel description as indented text
#[derive(Debug, Default)]
pub struct TextPanel {
    lines: Vec<String>,
    bindings: Vec<ControlBinding>,
}

impl TextPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every control added so far, in panel order
    pub fn bindings(&self) -> &[ControlBinding] {
        &self.bindings
    }

    fn control(&mut self, binding: ControlBinding, line: String) {
        self.lines.push(line);
        self.bindings.push(binding);
    }
}

impl ControlSurface for TextPanel {
    fn begin_layer(&mut self, layer: &LayerId, selected: bool) {
        let marker = if selected { " (selected)" } else { "" };
        self.lines.push(format!("[{}]{}", layer, marker));
    }

    fn folder(&mut self, title: &str) {
        self.lines.push(format!("  {}", title));
    }

    fn slider(&mut self, binding: ControlBinding, label: &str, min: f32, max: f32, value: f32) {
        let line = format!("    {:<20} {:>8.3}  [{} .. {}]", label, value, min, max);
        self.control(binding, line);
    }

    fn color(&mut self, binding: ControlBinding, label: &str, value: Rgb) {
        let line = format!("    {:<20} {:>8}", label, value);
        self.control(binding, line);
    }

    fn toggle(&mut self, binding: ControlBinding, label: &str, value: bool) {
        let mark = if value { "x" } else { " " };
        let line = format!("    [{}] {}", mark, label);
        self.control(binding, line);
    }

    fn blend_choice(&mut self, binding: ControlBinding, label: &str, value: BlendMode) {
        let line = format!("  {:<22} {:>8}", label, value);
        self.control(binding, line);
    }
}

impl fmt::Display for TextPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
