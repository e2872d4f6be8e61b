//! Error handling for Flamelayer
//!
//! Every failure is isolated to the layer or operation that caused it. The
//! registry and settings store log these and keep going; only configuration
//! and the command-line front end surface them to the user.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Flamelayer operations
pub type Result<T> = std::result::Result<T, FlameError>;

/// Main error type for Flamelayer operations
#[derive(Error, Debug)]
pub enum FlameError {
    // Image Errors
    #[error("Image list unavailable: {reason}")]
    ImageListUnavailable { reason: String },

    #[error("Failed to load texture '{path}': {reason}")]
    TextureLoadFailed { path: String, reason: String },

    // Settings Errors
    #[error("Stored settings for '{key}' are corrupt: {reason}")]
    SettingsCorrupt { key: String, reason: String },

    #[error("Failed to write settings for '{key}': {reason}")]
    SettingsWriteFailed { key: String, reason: String },

    // Storage Errors
    #[error("Storage quota exceeded: {needed_bytes} bytes needed, limit is {limit_bytes} bytes")]
    StorageQuotaExceeded { needed_bytes: u64, limit_bytes: u64 },

    #[error("Storage unavailable at {path}: {reason}")]
    StorageUnavailable { path: PathBuf, reason: String },

    // Parameter Errors
    #[error("Unknown parameter: {name}")]
    UnknownParameter { name: String },

    #[error("Parameter '{name}' expects a {expected} value")]
    ValueKindMismatch {
        name: &'static str,
        expected: &'static str,
    },

    #[error("Invalid color: {value}")]
    InvalidColor { value: String },

    #[error("Unknown blend mode: {mode}")]
    UnknownBlendMode { mode: String },

    #[error("Layer not found: {id}")]
    LayerNotFound { id: String },

    // Configuration Errors
    #[error("Invalid configuration at {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FlameError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            FlameError::ImageListUnavailable { .. } => "IMAGE_LIST_UNAVAILABLE",
            FlameError::TextureLoadFailed { .. } => "TEXTURE_LOAD_FAILED",
            FlameError::SettingsCorrupt { .. } => "SETTINGS_CORRUPT",
            FlameError::SettingsWriteFailed { .. } => "SETTINGS_WRITE_FAILED",
            FlameError::StorageQuotaExceeded { .. } => "STORAGE_QUOTA_EXCEEDED",
            FlameError::StorageUnavailable { .. } => "STORAGE_UNAVAILABLE",
            FlameError::UnknownParameter { .. } => "UNKNOWN_PARAMETER",
            FlameError::ValueKindMismatch { .. } => "VALUE_KIND_MISMATCH",
            FlameError::InvalidColor { .. } => "INVALID_COLOR",
            FlameError::UnknownBlendMode { .. } => "UNKNOWN_BLEND_MODE",
            FlameError::LayerNotFound { .. } => "LAYER_NOT_FOUND",
            FlameError::Config { .. } => "CONFIG_ERROR",
            FlameError::Io(_) => "IO_ERROR",
            FlameError::Json(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if the application keeps running normally after this error.
    ///
    /// Only configuration problems stop the front end; everything else
    /// degrades to defaults, a fallback image, or a dropped layer.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, FlameError::Config { .. })
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            FlameError::ImageListUnavailable { .. } => {
                Some("Check the images directory; the fallback image is shown meanwhile.")
            }
            FlameError::TextureLoadFailed { .. } => {
                Some("Make sure the mask image exists and is a valid PNG.")
            }
            FlameError::SettingsCorrupt { .. } => {
                Some("Defaults were used. Saving any change overwrites the corrupt record.")
            }
            FlameError::SettingsWriteFailed { .. } | FlameError::StorageQuotaExceeded { .. } => {
                Some("Changes stay active for this session. Free storage or run 'reset'.")
            }
            FlameError::UnknownParameter { .. } => {
                Some("Run 'show' to list the available parameter names.")
            }
            FlameError::UnknownBlendMode { .. } => {
                Some("Valid blend modes: additive, normal, multiply, screen.")
            }
            _ => None,
        }
    }
}
