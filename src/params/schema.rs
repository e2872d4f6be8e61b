//! Fixed parameter schema
//!
//! The flame shader exposes a fixed set of uniforms. Each one has a storage
//! name (the uniform name, which is also the key used in persisted records),
//! a panel label, a group, a kind and a default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::color::Rgb;
use crate::error::{FlameError, Result};

/// Panel folder a parameter belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamGroup {
    Shape,
    Movement,
    Appearance,
    Color,
}

impl ParamGroup {
    /// All groups in panel order
    pub const ALL: [ParamGroup; 4] = [
        ParamGroup::Shape,
        ParamGroup::Movement,
        ParamGroup::Appearance,
        ParamGroup::Color,
    ];

    /// Folder title shown on the control surface
    pub fn title(&self) -> &'static str {
        match self {
            ParamGroup::Shape => "Shape Controls",
            ParamGroup::Movement => "Movement Controls",
            ParamGroup::Appearance => "Appearance Controls",
            ParamGroup::Color => "Color Controls",
        }
    }
}

/// What kind of value a parameter holds, with its default
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    /// Scalar with an inclusive control range
    Scalar { default: f32, min: f32, max: f32 },
    /// RGB color
    Color { default: Rgb },
}

/// A single parameter value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Scalar(f32),
    Color(Rgb),
}

impl ParamValue {
    /// The scalar, if this is one
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            ParamValue::Scalar(v) => Some(*v),
            ParamValue::Color(_) => None,
        }
    }

    /// The color, if this is one
    pub fn as_color(&self) -> Option<Rgb> {
        match self {
            ParamValue::Color(c) => Some(*c),
            ParamValue::Scalar(_) => None,
        }
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Scalar(value)
    }
}

impl From<Rgb> for ParamValue {
    fn from(value: Rgb) -> Self {
        ParamValue::Color(value)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Scalar(v) => write!(f, "{:.3}", v),
            ParamValue::Color(c) => write!(f, "{}", c),
        }
    }
}

/// Every parameter of the flame shader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamName {
    // Shape
    FlameHeight,
    FlameSpread,
    DistortionAmount,
    BaseWidth,
    TipShape,
    // Movement
    FlameSpeed,
    Turbulence,
    FlickerSpeed,
    FlickerIntensity,
    SwayAmount,
    SwaySpeed,
    // Appearance
    SourceIntensity,
    NoiseScale,
    AlphaFalloff,
    DetailLevel,
    Brightness,
    Contrast,
    // Color
    Color1,
    Color2,
    Color3,
    ColorMix,
    ColorShift,
}

/// Number of parameters in the schema
pub const PARAM_COUNT: usize = 22;

impl ParamName {
    /// All parameters in panel order
    pub const ALL: [ParamName; PARAM_COUNT] = [
        ParamName::FlameHeight,
        ParamName::FlameSpread,
        ParamName::DistortionAmount,
        ParamName::BaseWidth,
        ParamName::TipShape,
        ParamName::FlameSpeed,
        ParamName::Turbulence,
        ParamName::FlickerSpeed,
        ParamName::FlickerIntensity,
        ParamName::SwayAmount,
        ParamName::SwaySpeed,
        ParamName::SourceIntensity,
        ParamName::NoiseScale,
        ParamName::AlphaFalloff,
        ParamName::DetailLevel,
        ParamName::Brightness,
        ParamName::Contrast,
        ParamName::Color1,
        ParamName::Color2,
        ParamName::Color3,
        ParamName::ColorMix,
        ParamName::ColorShift,
    ];

    /// Position in [`ParamName::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Storage key and uniform name
    pub fn key(self) -> &'static str {
        match self {
            ParamName::FlameHeight => "uFlameHeight",
            ParamName::FlameSpread => "uFlameSpread",
            ParamName::DistortionAmount => "uDistortionAmount",
            ParamName::BaseWidth => "uBaseWidth",
            ParamName::TipShape => "uTipShape",
            ParamName::FlameSpeed => "uFlameSpeed",
            ParamName::Turbulence => "uTurbulence",
            ParamName::FlickerSpeed => "uFlickerSpeed",
            ParamName::FlickerIntensity => "uFlickerIntensity",
            ParamName::SwayAmount => "uSwayAmount",
            ParamName::SwaySpeed => "uSwaySpeed",
            ParamName::SourceIntensity => "uSourceIntensity",
            ParamName::NoiseScale => "uNoiseScale",
            ParamName::AlphaFalloff => "uAlphaFalloff",
            ParamName::DetailLevel => "uDetailLevel",
            ParamName::Brightness => "uBrightness",
            ParamName::Contrast => "uContrast",
            ParamName::Color1 => "uColor1",
            ParamName::Color2 => "uColor2",
            ParamName::Color3 => "uColor3",
            ParamName::ColorMix => "uColorMix",
            ParamName::ColorShift => "uColorShift",
        }
    }

    /// Label shown on the control surface
    pub fn label(self) -> &'static str {
        match self {
            ParamName::FlameHeight => "Flame Height",
            ParamName::FlameSpread => "Flame Spread",
            ParamName::DistortionAmount => "Distortion",
            ParamName::BaseWidth => "Base Width",
            ParamName::TipShape => "Tip Shape",
            ParamName::FlameSpeed => "Flame Speed",
            ParamName::Turbulence => "Turbulence",
            ParamName::FlickerSpeed => "Flicker Speed",
            ParamName::FlickerIntensity => "Flicker Intensity",
            ParamName::SwayAmount => "Sway Amount",
            ParamName::SwaySpeed => "Sway Speed",
            ParamName::SourceIntensity => "Source Intensity",
            ParamName::NoiseScale => "Noise Scale",
            ParamName::AlphaFalloff => "Alpha Falloff",
            ParamName::DetailLevel => "Detail Level",
            ParamName::Brightness => "Brightness",
            ParamName::Contrast => "Contrast",
            ParamName::Color1 => "Core Color",
            ParamName::Color2 => "Mid Color",
            ParamName::Color3 => "Base Color",
            ParamName::ColorMix => "Color Mix",
            ParamName::ColorShift => "Color Shift",
        }
    }

    /// Panel folder
    pub fn group(self) -> ParamGroup {
        use ParamName::*;
        match self {
            FlameHeight | FlameSpread | DistortionAmount | BaseWidth | TipShape => {
                ParamGroup::Shape
            }
            FlameSpeed | Turbulence | FlickerSpeed | FlickerIntensity | SwayAmount | SwaySpeed => {
                ParamGroup::Movement
            }
            SourceIntensity | NoiseScale | AlphaFalloff | DetailLevel | Brightness | Contrast => {
                ParamGroup::Appearance
            }
            Color1 | Color2 | Color3 | ColorMix | ColorShift => ParamGroup::Color,
        }
    }

    /// Kind, default and range
    pub fn kind(self) -> ParamKind {
        use ParamName::*;
        let scalar = |default, min, max| ParamKind::Scalar { default, min, max };
        match self {
            FlameHeight => scalar(1.5, 0.5, 3.0),
            FlameSpread => scalar(0.5, 0.0, 1.0),
            DistortionAmount => scalar(0.3, 0.0, 1.0),
            BaseWidth => scalar(0.5, 0.1, 1.0),
            TipShape => scalar(0.3, 0.1, 1.0),
            FlameSpeed => scalar(1.0, 0.1, 2.0),
            Turbulence => scalar(0.5, 0.0, 1.0),
            FlickerSpeed => scalar(2.0, 0.1, 5.0),
            FlickerIntensity => scalar(0.2, 0.0, 1.0),
            SwayAmount => scalar(0.1, 0.0, 0.5),
            SwaySpeed => scalar(0.5, 0.1, 2.0),
            SourceIntensity => scalar(2.0, 0.5, 3.0),
            NoiseScale => scalar(2.0, 0.5, 4.0),
            AlphaFalloff => scalar(0.5, 0.1, 1.0),
            DetailLevel => scalar(1.0, 0.1, 2.0),
            Brightness => scalar(1.5, 0.5, 2.0),
            Contrast => scalar(1.2, 0.5, 2.0),
            Color1 => ParamKind::Color {
                default: Rgb::from_packed(0xff8019),
            },
            Color2 => ParamKind::Color {
                default: Rgb::from_packed(0xff4d0d),
            },
            Color3 => ParamKind::Color {
                default: Rgb::from_packed(0xcc1a00),
            },
            ColorMix => scalar(0.5, 0.0, 1.0),
            ColorShift => scalar(0.3, 0.0, 1.0),
        }
    }

    /// Default value
    pub fn default_value(self) -> ParamValue {
        match self.kind() {
            ParamKind::Scalar { default, .. } => ParamValue::Scalar(default),
            ParamKind::Color { default } => ParamValue::Color(default),
        }
    }

    /// Whether this parameter holds a color
    pub fn is_color(self) -> bool {
        matches!(self.kind(), ParamKind::Color { .. })
    }

    /// Look up a parameter by its exact storage key (`uFlameHeight`).
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.key() == key)
    }

    /// Look up a parameter typed by a person.
    ///
    /// The `u` prefix is optional and matching ignores ASCII case, so
    /// `uFlameHeight`, `flameheight` and `FlameHeight` all resolve. Stored
    /// records never go through this.
    pub fn parse_loose(name: &str) -> Result<Self> {
        let name = name.trim();
        Self::from_key(name)
            .or_else(|| {
                Self::ALL.iter().copied().find(|p| {
                    let key = p.key();
                    key.eq_ignore_ascii_case(name) || key[1..].eq_ignore_ascii_case(name)
                })
            })
            .ok_or_else(|| FlameError::UnknownParameter {
                name: name.to_string(),
            })
    }

    /// Parameters belonging to a group, in panel order
    pub fn in_group(group: ParamGroup) -> impl Iterator<Item = ParamName> {
        Self::ALL.into_iter().filter(move |p| p.group() == group)
    }
}

impl FromStr for ParamName {
    type Err = FlameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_key(s).ok_or_else(|| FlameError::UnknownParameter {
            name: s.to_string(),
        })
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_indexed_in_order() {
        for (i, name) in ParamName::ALL.iter().enumerate() {
            assert_eq!(name.index(), i, "{} out of order", name);
        }
    }

    #[test]
    fn test_keys_are_unique() {
        let mut keys: Vec<_> = ParamName::ALL.iter().map(|p| p.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), PARAM_COUNT);
    }

    #[test]
    fn test_defaults_inside_ranges() {
        for name in ParamName::ALL {
            if let ParamKind::Scalar { default, min, max } = name.kind() {
                assert!(min < max, "{} has an empty range", name);
                assert!(
                    (min..=max).contains(&default),
                    "{} default {} outside {}..={}",
                    name,
                    default,
                    min,
                    max
                );
            }
        }
    }

    #[test]
    fn test_from_key_is_exact() {
        assert_eq!(ParamName::from_key("uFlameHeight"), Some(ParamName::FlameHeight));
        assert_eq!(ParamName::from_key("uColor1"), Some(ParamName::Color1));
        assert_eq!(ParamName::from_key("FlameHeight"), None);
        assert_eq!(ParamName::from_key("flameheight"), None);
        assert_eq!(ParamName::from_key("uflameheight"), None);
        assert_eq!(ParamName::from_key("uTime"), None);
        assert!("flameheight".parse::<ParamName>().is_err());
        assert_eq!("uBrightness".parse::<ParamName>().unwrap(), ParamName::Brightness);
    }

    #[test]
    fn test_parse_loose_accepts_typed_names() {
        for typed in ["uFlameHeight", "FlameHeight", "flameheight", "UFLAMEHEIGHT", " flameHeight "] {
            assert_eq!(ParamName::parse_loose(typed).unwrap(), ParamName::FlameHeight);
        }
        assert!(ParamName::parse_loose("uResolution").is_err());
        assert!(ParamName::parse_loose("bogus").is_err());
    }

    #[test]
    fn test_colors_only_in_color_group() {
        let colors: Vec<_> = ParamName::ALL.iter().filter(|p| p.is_color()).collect();
        assert_eq!(colors.len(), 3);
        assert!(colors.iter().all(|p| p.group() == ParamGroup::Color));
        assert!(!ParamName::ColorMix.is_color());
    }

    #[test]
    fn test_groups_cover_schema() {
        let total: usize = ParamGroup::ALL
            .iter()
            .map(|g| ParamName::in_group(*g).count())
            .sum();
        assert_eq!(total, PARAM_COUNT);
    }
}
