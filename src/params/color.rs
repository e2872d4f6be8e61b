//! Canonical RGB color
//!
//! Stored records carry colors either as a packed `0xRRGGBB` integer or as a
//! hex string, depending on which version of the app wrote them. Both are
//! normalized here and nowhere else.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{FlameError, Result};

/// 8-bit per channel RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Create a color from channel values
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a packed `0xRRGGBB` value.
    ///
    /// Bits above the low 24 are ignored.
    pub const fn from_packed(packed: u32) -> Self {
        Self {
            r: ((packed >> 16) & 0xff) as u8,
            g: ((packed >> 8) & 0xff) as u8,
            b: (packed & 0xff) as u8,
        }
    }

    /// Pack into `0xRRGGBB`
    pub const fn to_packed(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Lowercase `#rrggbb` form
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channels scaled to 0.0..=1.0, as a shader uniform expects them
    pub fn to_unit(self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }

    /// Parse a stored JSON value: a packed integer or a hex string.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => {
                let packed = n
                    .as_u64()
                    .or_else(|| {
                        // Older records went through a float round-trip.
                        n.as_f64()
                            .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                            .map(|f| f as u64)
                    })
                    .filter(|p| *p <= 0xff_ffff)
                    .ok_or_else(|| FlameError::InvalidColor {
                        value: n.to_string(),
                    })?;
                Ok(Self::from_packed(packed as u32))
            }
            Value::String(s) => s.parse(),
            other => Err(FlameError::InvalidColor {
                value: other.to_string(),
            }),
        }
    }

    /// Canonical JSON form (`"#rrggbb"`)
    pub fn to_json(self) -> Value {
        Value::String(self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = FlameError;

    /// Accepts `#rrggbb`, `rrggbb`, `0xrrggbb` and `#rgb`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || FlameError::InvalidColor {
            value: s.to_string(),
        };

        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("0x"))
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        match digits.len() {
            6 => u32::from_str_radix(digits, 16)
                .map(Self::from_packed)
                .map_err(|_| invalid()),
            3 => {
                let mut channels = [0u8; 3];
                for (slot, c) in channels.iter_mut().zip(digits.chars()) {
                    let nibble = c.to_digit(16).ok_or_else(invalid)? as u8;
                    *slot = nibble * 17;
                }
                Ok(Self::new(channels[0], channels[1], channels[2]))
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.to_hex())
    }
}
