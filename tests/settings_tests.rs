//! Settings Store Tests
//!
//! Record compatibility and storage behavior of the settings store.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;

use flamelayer::layers::{BlendMode, LayerId};
use flamelayer::params::{ParamName, ParameterSet, Rgb};
use flamelayer::state::{
    FileStorage, KeyValueStorage, MemoryStorage, SettingsSnapshot, SettingsStore,
    SNAPSHOT_VERSION,
};

fn store_with(records: &[(&str, String)]) -> SettingsStore {
    let mut storage = MemoryStorage::new();
    for (key, value) in records {
        storage.set(key, value).unwrap();
    }
    SettingsStore::new(Box::new(storage))
}

#[test]
fn test_legacy_flat_record() {
    let legacy = json!({
        "uFlameHeight": 2.0,
        "uTurbulence": 0.75,
        "uColor1": 0xff8019,
        "uColor3": 0x112233,
        "uTime": 12.5,
        "uResolution": {"x": 800, "y": 600},
        "uMask": null,
    });
    let store = store_with(&[("flameSettings_mask.png", legacy.to_string())]);

    let snapshot = store.load(&LayerId::new("mask.png")).unwrap();
    assert!(snapshot.visible);
    assert_eq!(snapshot.blend_mode, BlendMode::Additive);
    assert_eq!(snapshot.params.scalar(ParamName::FlameHeight), Some(2.0));
    assert_eq!(snapshot.params.scalar(ParamName::Turbulence), Some(0.75));
    assert_eq!(snapshot.params.color(ParamName::Color3), Some(Rgb::new(0x11, 0x22, 0x33)));
    assert_eq!(
        snapshot.params.changed(),
        vec![ParamName::FlameHeight, ParamName::Turbulence, ParamName::Color3]
    );
}

#[test]
fn test_packed_and_hex_colors_load_identically() {
    let packed = json!({"version": 2, "params": {"uColor1": 0xff8019}});
    let hex = json!({"version": 2, "params": {"uColor1": "#ff8019"}});
    let store = store_with(&[
        ("flameSettings_packed.png", packed.to_string()),
        ("flameSettings_hex.png", hex.to_string()),
    ]);

    let a = store.load_params_or_default(&LayerId::new("packed.png"));
    let b = store.load_params_or_default(&LayerId::new("hex.png"));
    assert_eq!(a.color(ParamName::Color1), b.color(ParamName::Color1));
    assert_eq!(a, b);
}

#[test]
fn test_saved_record_format() {
    let mut store = SettingsStore::new(Box::new(MemoryStorage::new()));
    let id = LayerId::new("a.png");

    let mut snapshot = SettingsSnapshot::default();
    snapshot.visible = false;
    snapshot.blend_mode = BlendMode::Screen;
    assert!(store.save(&id, &snapshot));

    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.json");
    let mut file_store = SettingsStore::new(Box::new(FileStorage::open(&path, None).unwrap()));
    assert!(file_store.save(&id, &snapshot));

    let file: std::collections::BTreeMap<String, String> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let record: Value = serde_json::from_str(&file["flameSettings_a.png"]).unwrap();

    assert_eq!(record["version"], json!(SNAPSHOT_VERSION));
    assert_eq!(record["visible"], json!(false));
    assert_eq!(record["blendMode"], json!("screen"));
    assert!(record["savedAt"].is_string());
    assert_eq!(record["params"]["uColor1"], json!("#ff8019"));
    assert_eq!(record["params"].as_object().unwrap().len(), ParamName::ALL.len());
}

#[test]
fn test_unknown_version_falls_back_to_defaults() {
    let future = json!({"version": 99, "params": {"uFlameHeight": 2.0}});
    let store = store_with(&[("flameSettings_a.png", future.to_string())]);

    assert!(store.load(&LayerId::new("a.png")).is_none());
    let params = store.load_params_or_default(&LayerId::new("a.png"));
    assert!(params.changed().is_empty());
}

#[test]
fn test_wrong_kind_values_are_dropped() {
    let record = json!({
        "version": 2,
        "visible": "yes",
        "blendMode": "overlay",
        "params": {"uFlameHeight": "tall", "uColor2": 1.5, "uBrightness": 1.9},
    });
    let store = store_with(&[("flameSettings_a.png", record.to_string())]);

    let snapshot = store.load(&LayerId::new("a.png")).unwrap();
    assert!(snapshot.visible);
    assert_eq!(snapshot.blend_mode, BlendMode::Additive);
    assert_eq!(snapshot.params.changed(), vec![ParamName::Brightness]);
}

#[test]
fn test_keys_outside_schema_are_ignored() {
    let record = json!({
        "version": 2,
        "params": {"flameheight": 2.75, "Brightness": 1.9, "uflamespeed": 1.7},
    });
    let legacy = json!({"FlameHeight": 2.75, "ucolor1": "#000000"});
    let store = store_with(&[
        ("flameSettings_a.png", record.to_string()),
        ("flameSettings_b.png", legacy.to_string()),
    ]);

    let a = store.load_params_or_default(&LayerId::new("a.png"));
    let b = store.load_params_or_default(&LayerId::new("b.png"));
    assert_eq!(a, ParameterSet::default());
    assert_eq!(b, ParameterSet::default());
}

#[test]
fn test_clear_all_only_touches_namespace() {
    let mut store = store_with(&[
        ("flameSettings_a.png", "{}".to_string()),
        ("flameSettings_b.png", "{}".to_string()),
        ("unrelated", "keep".to_string()),
    ]);

    assert_eq!(store.identities(), vec![LayerId::new("a.png"), LayerId::new("b.png")]);
    assert_eq!(store.clear_all(), 2);
    assert!(store.identities().is_empty());
}

#[test]
fn test_namespaces_are_independent() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.json");
    let id = LayerId::new("a.png");

    let mut snapshot = SettingsSnapshot::default();
    snapshot.visible = false;

    let mut first = SettingsStore::with_namespace(
        Box::new(FileStorage::open(&path, None).unwrap()),
        "sceneA_",
    );
    assert!(first.save(&id, &snapshot));

    let second = SettingsStore::with_namespace(
        Box::new(FileStorage::open(&path, None).unwrap()),
        "sceneB_",
    );
    assert!(second.load(&id).is_none());

    let reopened = SettingsStore::with_namespace(
        Box::new(FileStorage::open(&path, None).unwrap()),
        "sceneA_",
    );
    assert!(!reopened.load(&id).unwrap().visible);
}
