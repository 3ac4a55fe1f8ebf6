use super::*;
use crate::foundation::error::ValidationCode;
use serde_json::json;

fn minimal(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "schemaVersion": 1,
        "inputs": [{ "name": "source", "type": "image" }],
        "passes": [{ "name": "p", "kernel": "k", "inputs": ["source"], "outputs": ["out"] }]
    })
}

#[test]
fn single_object_document_parses() {
    let src = ManifestSource::from_value("a.json", &minimal("fx.a"));
    let (manifests, errors) = src.parse();
    assert!(errors.is_empty());
    assert_eq!(manifests.len(), 1);
    assert_eq!(manifests[0].id, "fx.a");
}

#[test]
fn array_document_keeps_good_elements() {
    let doc = json!([minimal("fx.a"), { "id": "fx.bad", "schemaVersion": 1 }, minimal("fx.c")]);
    let src = ManifestSource::from_value("bundle.json", &doc);
    let (manifests, errors) = src.parse();
    assert_eq!(
        manifests.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
        vec!["fx.a", "fx.c"]
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ValidationCode::MalformedManifest);
    assert_eq!(errors[0].feature_id.as_deref(), Some("fx.bad"));
    assert!(errors[0].message.starts_with("[1]:"));
}

#[test]
fn invalid_json_is_reported_not_panicked() {
    let src = ManifestSource::new("broken.json", "{ not json");
    let (manifests, errors) = src.parse();
    assert!(manifests.is_empty());
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].source, "broken.json");
    assert_eq!(errors[0].feature_id, None);
}

#[test]
fn read_dir_only_picks_json_sorted() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("b.json"), minimal("fx.b").to_string()).unwrap();
    std::fs::write(dir.path().join("a.json"), minimal("fx.a").to_string()).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let sources = ManifestSource::read_dir(dir.path()).unwrap();
    assert_eq!(sources.len(), 2);
    assert!(sources[0].name.ends_with("a.json"));
    assert!(sources[1].name.ends_with("b.json"));
}

#[test]
fn read_dir_missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    assert!(ManifestSource::read_dir(&missing).is_err());
}

#[test]
fn misspelled_keys_are_malformed() {
    let mut top = minimal("fx.a");
    top["parmeters"] = json!([]);
    let mut pass = minimal("fx.b");
    pass["passes"][0]["input"] = json!(["source"]);

    for (name, doc) in [("top.json", top), ("pass.json", pass)] {
        let (manifests, errors) = ManifestSource::from_value(name, &doc).parse();
        assert!(manifests.is_empty(), "{name}");
        assert_eq!(errors.len(), 1, "{name}");
        assert_eq!(errors[0].code, ValidationCode::MalformedManifest);
        assert!(errors[0].message.contains("unknown field"), "{}", errors[0].message);
    }
}
