//! Settings Snapshot encoding
//!
//! A snapshot is a JSON record of a layer's visibility, blend mode and
//! parameter set. Two record versions exist:
//!
//! - version 1: a flat object keyed by uniform name, colors as packed
//!   integers, often with non-persistent uniforms (`uTime`, `uResolution`,
//!   `uMask`) mixed in. Written before visibility and blend mode were saved.
//! - version 2: `{ "version", "visible", "blendMode", "savedAt", "params" }`
//!   with colors as `#rrggbb` strings.
//!
//! Decoding accepts both and always produces the current in-memory form.

use chrono::{DateTime, Utc};
use log::debug;
use serde_json::{json, Map, Value};

use crate::error::{FlameError, Result};
use crate::layers::{BlendMode, Layer};
use crate::params::ParameterSet;

/// Record version written by [`encode`]
pub const SNAPSHOT_VERSION: u64 = 2;

/// Version assumed for records without a `version` field
const LEGACY_VERSION: u64 = 1;

/// Persisted form of a layer's settings
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsSnapshot {
    pub visible: bool,
    pub blend_mode: BlendMode,
    pub params: ParameterSet,
}

impl Default for SettingsSnapshot {
    fn default() -> Self {
        Self {
            visible: true,
            blend_mode: BlendMode::default(),
            params: ParameterSet::default(),
        }
    }
}

impl SettingsSnapshot {
    /// Capture the persisted part of a layer
    pub fn of_layer(layer: &Layer) -> Self {
        Self {
            visible: layer.visible,
            blend_mode: layer.blend_mode,
            params: layer.params.clone(),
        }
    }

    /// Apply onto a layer, leaving texture, draw order and frame inputs alone
    pub fn apply_to(&self, layer: &mut Layer) {
        layer.visible = self.visible;
        layer.blend_mode = self.blend_mode;
        layer.params = self.params.clone();
    }
}

/// Encode a snapshot as a current-version JSON record
pub fn encode(snapshot: &SettingsSnapshot, saved_at: DateTime<Utc>) -> Result<String> {
    let record = json!({
        "version": SNAPSHOT_VERSION,
        "visible": snapshot.visible,
        "blendMode": snapshot.blend_mode,
        "savedAt": saved_at.to_rfc3339(),
        "params": snapshot.params.to_json(),
    });
    Ok(serde_json::to_string(&record)?)
}

/// Decode a stored record of any known version.
///
/// Values are merged over defaults: present keys override, absent keys keep
/// their default, unknown keys and wrong-kind values are dropped.
///
/// # Errors
/// Returns `SettingsCorrupt` if the text is not JSON, is not an object, or
/// declares a version this build does not understand.
pub fn decode(key: &str, raw: &str) -> Result<SettingsSnapshot> {
    let corrupt = |reason: String| FlameError::SettingsCorrupt {
        key: key.to_string(),
        reason,
    };

    let value: Value = serde_json::from_str(raw).map_err(|e| corrupt(e.to_string()))?;
    let Value::Object(record) = value else {
        return Err(corrupt("record is not a JSON object".to_string()));
    };

    let version = detect_version(&record);
    let (mut snapshot, params) = match version {
        LEGACY_VERSION => (SettingsSnapshot::default(), record),
        SNAPSHOT_VERSION => read_current(key, record)?,
        other => {
            return Err(corrupt(format!(
                "unsupported record version {} (current is {})",
                other, SNAPSHOT_VERSION
            )))
        }
    };

    let skipped = snapshot.params.merge_json(&params);
    if !skipped.is_empty() {
        debug!("Dropped keys from '{}': {}", key, skipped.join(", "));
    }

    Ok(snapshot)
}

fn detect_version(record: &Map<String, Value>) -> u64 {
    match record.get("version").and_then(Value::as_u64) {
        Some(version) => version,
        // Unversioned records with a params object come from early v2 writers.
        None if record.get("params").is_some_and(Value::is_object) => SNAPSHOT_VERSION,
        None => LEGACY_VERSION,
    }
}

fn read_current(
    key: &str,
    mut record: Map<String, Value>,
) -> Result<(SettingsSnapshot, Map<String, Value>)> {
    let mut snapshot = SettingsSnapshot::default();

    match record.get("visible") {
        Some(Value::Bool(visible)) => snapshot.visible = *visible,
        Some(other) => debug!("Ignoring non-boolean visibility in '{}': {}", key, other),
        None => {}
    }

    if let Some(mode) = record.get("blendMode") {
        match mode.as_str().map(str::parse::<BlendMode>) {
            Some(Ok(mode)) => snapshot.blend_mode = mode,
            _ => debug!("Ignoring unknown blend mode in '{}': {}", key, mode),
        }
    }

    let params = match record.remove("params") {
        Some(Value::Object(params)) => params,
        Some(_) => {
            return Err(FlameError::SettingsCorrupt {
                key: key.to_string(),
                reason: "params is not a JSON object".to_string(),
            })
        }
        None => Map::new(),
    };

    Ok((snapshot, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ParamName, Rgb};
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let mut snapshot = SettingsSnapshot {
            visible: false,
            blend_mode: BlendMode::Screen,
            ..Default::default()
        };
        snapshot
            .params
            .set(ParamName::FlickerSpeed, 4.25_f32.into())
            .unwrap();
        snapshot
            .params
            .set(ParamName::Color3, Rgb::from_packed(0x336699).into())
            .unwrap();

        let raw = encode(&snapshot, fixed_time()).unwrap();
        assert!(raw.contains("\"#336699\""));
        assert!(raw.contains("2024-01-15T12:00:00"));

        let decoded = decode("k", &raw).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_legacy_flat_record() {
        let raw = r#"{
            "uTime": 42.1,
            "uResolution": {"x": 1920, "y": 1080},
            "uMask": null,
            "uFlameHeight": 2.0,
            "uColor1": 16744473,
            "uColor2": 1193046,
            "uColorMix": 0.75
        }"#;

        let decoded = decode("flameSettings_a.png", raw).unwrap();
        assert!(decoded.visible);
        assert_eq!(decoded.blend_mode, BlendMode::Additive);
        assert_eq!(decoded.params.scalar(ParamName::FlameHeight), Some(2.0));
        assert_eq!(decoded.params.scalar(ParamName::ColorMix), Some(0.75));
        assert_eq!(
            decoded.params.color(ParamName::Color1),
            Some(Rgb::from_packed(0xff8019))
        );
        assert_eq!(
            decoded.params.color(ParamName::Color2),
            Some(Rgb::from_packed(0x123456))
        );
        assert_eq!(
            decoded.params.scalar(ParamName::Turbulence),
            ParameterSet::new().scalar(ParamName::Turbulence)
        );
    }

    #[test]
    fn test_unversioned_params_record() {
        let raw = r#"{"visible": false, "params": {"uTipShape": 0.9}}"#;
        let decoded = decode("k", raw).unwrap();
        assert!(!decoded.visible);
        assert_eq!(decoded.params.scalar(ParamName::TipShape), Some(0.9));
    }

    #[test]
    fn test_bad_fields_fall_back() {
        let raw = r#"{"version": 2, "visible": "yes", "blendMode": "overlay", "params": {}}"#;
        let decoded = decode("k", raw).unwrap();
        assert_eq!(decoded, SettingsSnapshot::default());
    }

    #[test]
    fn test_corrupt_records() {
        for raw in [
            "",
            "{",
            "[1, 2, 3]",
            "\"just a string\"",
            r#"{"version": 2, "params": 5}"#,
            r#"{"version": 99, "params": {}}"#,
        ] {
            let err = decode("k", raw).unwrap_err();
            assert!(
                matches!(err, FlameError::SettingsCorrupt { .. }),
                "{:?} should be corrupt",
                raw
            );
        }
    }
}
