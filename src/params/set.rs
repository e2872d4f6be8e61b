//! Parameter Set
//!
//! One value per schema entry, indexed by [`ParamName`]. There is no way to
//! hold a key outside the schema, and every setter checks the value kind.

use serde_json::{Map, Value};

use super::color::Rgb;
use super::schema::{ParamKind, ParamName, ParamValue, PARAM_COUNT};
use crate::error::{FlameError, Result};

/// Live parameter values for one layer
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    values: [ParamValue; PARAM_COUNT],
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            values: ParamName::ALL.map(ParamName::default_value),
        }
    }
}

impl ParameterSet {
    /// Create a parameter set holding the schema defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value
    pub fn get(&self, name: ParamName) -> ParamValue {
        self.values[name.index()]
    }

    /// Get a scalar value, `None` for color parameters
    pub fn scalar(&self, name: ParamName) -> Option<f32> {
        self.get(name).as_scalar()
    }

    /// Get a color value, `None` for scalar parameters
    pub fn color(&self, name: ParamName) -> Option<Rgb> {
        self.get(name).as_color()
    }

    /// Set a value, checking that its kind matches the schema.
    ///
    /// Scalars must be finite; they are stored as given.
    pub fn set(&mut self, name: ParamName, value: ParamValue) -> Result<()> {
        match (name.kind(), value) {
            (ParamKind::Scalar { .. }, ParamValue::Scalar(v)) if v.is_finite() => {}
            (ParamKind::Color { .. }, ParamValue::Color(_)) => {}
            (ParamKind::Scalar { .. }, _) => {
                return Err(FlameError::ValueKindMismatch {
                    name: name.key(),
                    expected: "finite scalar",
                })
            }
            (ParamKind::Color { .. }, _) => {
                return Err(FlameError::ValueKindMismatch {
                    name: name.key(),
                    expected: "color",
                })
            }
        }
        self.values[name.index()] = value;
        Ok(())
    }

    /// Set a value, clamping scalars into the control range.
    ///
    /// Returns the value actually stored.
    pub fn set_clamped(&mut self, name: ParamName, value: ParamValue) -> Result<ParamValue> {
        let value = match (name.kind(), value) {
            (ParamKind::Scalar { min, max, .. }, ParamValue::Scalar(v)) if v.is_finite() => {
                ParamValue::Scalar(v.clamp(min, max))
            }
            _ => value,
        };
        self.set(name, value)?;
        Ok(value)
    }

    /// Reset a single value to its default
    pub fn reset(&mut self, name: ParamName) {
        self.values[name.index()] = name.default_value();
    }

    /// Iterate over every parameter and its value in schema order
    pub fn iter(&self) -> impl Iterator<Item = (ParamName, ParamValue)> + '_ {
        ParamName::ALL.iter().map(move |name| (*name, self.get(*name)))
    }

    /// Parameters whose value differs from the default
    pub fn changed(&self) -> Vec<ParamName> {
        self.iter()
            .filter(|(name, value)| *value != name.default_value())
            .map(|(name, _)| name)
            .collect()
    }

    /// Apply stored values over this set.
    ///
    /// Recognized keys with a valid value override; unknown keys and values of
    /// the wrong kind are skipped. Returns the keys that were skipped.
    pub fn merge_json(&mut self, stored: &Map<String, Value>) -> Vec<String> {
        let mut skipped = Vec::new();

        for (key, raw) in stored {
            let Some(name) = ParamName::from_key(key) else {
                skipped.push(key.clone());
                continue;
            };

            let parsed = if name.is_color() {
                Rgb::from_json(raw).map(ParamValue::Color)
            } else {
                raw.as_f64()
                    .map(|v| ParamValue::Scalar(v as f32))
                    .ok_or_else(|| FlameError::ValueKindMismatch {
                        name: name.key(),
                        expected: "finite scalar",
                    })
            };

            if parsed.and_then(|value| self.set(name, value)).is_err() {
                skipped.push(key.clone());
            }
        }

        skipped
    }

    /// Serialize to a JSON object keyed by uniform name, colors as `#rrggbb`
    pub fn to_json(&self) -> Map<String, Value> {
        self.iter()
            .map(|(name, value)| {
                let json = match value {
                    ParamValue::Scalar(v) => Value::from(v),
                    ParamValue::Color(c) => c.to_json(),
                };
                (name.key().to_string(), json)
            })
            .collect()
    }
}
