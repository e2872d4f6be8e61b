//! CLI Module
//!
//! Command-line interface for inspecting and editing persisted layer settings.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_FILE;

/// Flamelayer - per-image flame layer settings
#[derive(Parser, Debug)]
#[command(name = "flamelayer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the mask images a scene would be built from
    #[command(name = "list-images")]
    ListImages,

    /// Show the control panel for one layer or for every layer
    #[command(name = "show")]
    Show {
        /// Layer identity (image file name)
        layer: Option<String>,
    },

    /// Set a layer parameter
    #[command(name = "set")]
    Set {
        /// Layer identity (image file name)
        layer: String,

        /// Parameter name, e.g. uFlameHeight or flameheight
        param: String,

        /// Number, or a color such as #ff8019
        value: String,
    },

    /// Show or hide a layer
    #[command(name = "visibility")]
    Visibility {
        /// Layer identity (image file name)
        layer: String,

        /// true to show, false to hide
        #[arg(action = clap::ArgAction::Set)]
        visible: bool,
    },

    /// Change a layer's blend mode
    #[command(name = "blend")]
    Blend {
        /// Layer identity (image file name)
        layer: String,

        /// additive, normal, multiply or screen
        mode: String,
    },

    /// Select the layer after the given one and show its controls
    #[command(name = "next")]
    Next {
        /// Currently selected layer; the first layer is selected if omitted
        #[arg(short, long)]
        from: Option<String>,
    },

    /// Run the scene for a few frames and print what would be drawn
    #[command(name = "preview")]
    Preview {
        /// Number of frames to run
        #[arg(short, long, default_value_t = 3)]
        frames: u32,

        /// Frames per second used to advance time
        #[arg(long, default_value_t = 60.0)]
        fps: f32,

        /// Viewport width in pixels
        #[arg(long, default_value_t = 1280.0)]
        width: f32,

        /// Viewport height in pixels
        #[arg(long, default_value_t = 720.0)]
        height: f32,
    },

    /// Delete every stored layer snapshot
    #[command(name = "reset")]
    Reset,
}
