//! Render Module
//!
//! The GPU pipeline is an external collaborator. Once per tick the registry
//! hands it a [`Frame`]: one draw call per layer whose texture is ready, in
//! draw order, carrying everything the flame shader needs.

use log::trace;

use crate::layers::{BlendMode, LayerId, TextureHandle, Viewport};
use crate::params::ParameterSet;

/// Everything needed to draw one layer
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    pub layer: &'a LayerId,
    pub params: &'a ParameterSet,
    pub texture: &'a TextureHandle,
    pub visible: bool,
    pub blend_mode: BlendMode,
    pub draw_order: usize,
    /// Seconds since start (`uTime`)
    pub time: f32,
    /// Viewport size (`uResolution`)
    pub viewport: Viewport,
}

/// A full scene redraw
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    pub viewport: Viewport,
    pub time: f32,
    /// Sorted by draw order, bottom first
    pub draws: Vec<DrawCall<'a>>,
}

impl Frame<'_> {
    /// Draw calls for visible layers only
    pub fn visible_draws(&self) -> impl Iterator<Item = &DrawCall<'_>> {
        self.draws.iter().filter(|d| d.visible)
    }
}

/// Render pipeline collaborator
pub trait Renderer {
    /// Redraw the whole scene
    fn render(&mut self, frame: &Frame<'_>);
}

/// What a recorded draw call looked like
#[derive(Debug, Clone, PartialEq)]
pub struct DrawSummary {
    pub layer: LayerId,
    pub visible: bool,
    pub blend_mode: BlendMode,
    pub draw_order: usize,
    pub time: f32,
    pub params: ParameterSet,
}

/// Renderer that records frame summaries instead of drawing
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    frames: Vec<Vec<DrawSummary>>,
    max_frames: Option<usize>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the most recent `max_frames` frames
    pub fn with_history(max_frames: usize) -> Self {
        Self {
            frames: Vec::new(),
            max_frames: Some(max_frames),
        }
    }

    /// Recorded frames, oldest first
    pub fn frames(&self) -> &[Vec<DrawSummary>] {
        &self.frames
    }

    /// The most recent frame
    pub fn last_frame(&self) -> Option<&[DrawSummary]> {
        self.frames.last().map(Vec::as_slice)
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, frame: &Frame<'_>) {
        trace!("Frame at {:.3}s with {} draws", frame.time, frame.draws.len());

        let summary = frame
            .draws
            .iter()
            .map(|d| DrawSummary {
                layer: d.layer.clone(),
                visible: d.visible,
                blend_mode: d.blend_mode,
                draw_order: d.draw_order,
                time: d.time,
                params: d.params.clone(),
            })
            .collect();
        self.frames.push(summary);

        if let Some(max) = self.max_frames {
            if self.frames.len() > max {
                let excess = self.frames.len() - max;
                self.frames.drain(..excess);
            }
        }
    }
}
