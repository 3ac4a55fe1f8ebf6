use super::*;
use serde_json::json;

fn blur() -> FeatureManifest {
    serde_json::from_value(json!({
        "id": "fx.blur",
        "schemaVersion": 1,
        "inputs": [{ "name": "source", "type": "image" }],
        "outputs": [{ "name": "result", "type": "image" }],
        "parameters": [
            { "name": "radius", "type": "float", "default": 4.0, "min": 0.0, "max": 64.0 }
        ],
        "passes": [
            { "name": "down", "kernel": "blurDown", "inputs": ["source"], "outputs": ["half"], "scale": 0.5 },
            { "name": "up", "kernel": "blurUp", "inputs": ["half"], "outputs": ["result"] }
        ]
    }))
    .unwrap()
}

#[test]
fn deserializes_camel_case_document() {
    let m = blur();
    assert_eq!(m.schema_version, SCHEMA_VERSION_1);
    assert_eq!(m.domain, None);
    assert_eq!(m.passes.len(), 2);
    assert_eq!(m.passes[0].scale, 0.5);
    assert_eq!(m.passes[1].scale, 1.0);
    assert_eq!(m.passes[1].primary_input(), Some("half"));
    assert_eq!(m.parameters[0].default, ParamValue::Float(4.0));
}

#[test]
fn domain_inference_uses_namespace_prefix() {
    assert_eq!(Domain::infer_from_id("fx.blur"), Some(Domain::Video));
    assert_eq!(Domain::infer_from_id("gen.solid"), Some(Domain::Video));
    assert_eq!(Domain::infer_from_id("afx.reverb"), Some(Domain::Audio));
    assert_eq!(Domain::infer_from_id("core.over"), Some(Domain::Intrinsic));
    assert_eq!(Domain::infer_from_id("vendor.thing"), None);
    assert_eq!(Domain::infer_from_id("blur"), None);
    assert_eq!(Domain::infer_from_id("fx."), None);
    assert_eq!(blur().effective_domain(), Some(Domain::Video));
}

#[test]
fn primary_output_is_first_declared_output() {
    let mut m = blur();
    assert_eq!(m.primary_output(), Some("result"));
    m.outputs.clear();
    assert_eq!(m.primary_output(), None);
}

#[test]
fn param_values_deserialize_untagged() {
    let v: ParamValue = serde_json::from_str("true").unwrap();
    assert_eq!(v, ParamValue::Bool(true));
    let v: ParamValue = serde_json::from_str("3").unwrap();
    assert_eq!(v, ParamValue::Int(3));
    let v: ParamValue = serde_json::from_str("3.5").unwrap();
    assert_eq!(v, ParamValue::Float(3.5));
}

#[test]
fn int_conforms_to_float_but_not_the_reverse() {
    assert!(ParamValue::Int(1).conforms_to(ParamType::Float));
    assert!(!ParamValue::Float(1.0).conforms_to(ParamType::Int));
    assert!(!ParamValue::Bool(true).conforms_to(ParamType::Float));
    assert_eq!(ParamValue::Bool(true).as_f64(), None);
}

#[test]
fn parameter_range_helpers() {
    let p = &blur().parameters[0];
    assert!(p.in_range(0.0));
    assert!(p.in_range(64.0));
    assert!(!p.in_range(64.5));
    assert_eq!(p.clamp(100.0), 64.0);
    assert_eq!(p.clamp(-1.0), 0.0);
}

#[test]
fn external_inputs_fall_back_to_implicit_source() {
    let m = blur();
    assert_eq!(m.external_input("source"), Some(PortType::Image));
    assert_eq!(m.external_input("half"), None);

    let bare: FeatureManifest = serde_json::from_value(json!({
        "id": "fx.blur",
        "schemaVersion": 1,
        "passes": [{ "name": "down", "kernel": "blurDown", "inputs": ["source"], "outputs": ["half"] }]
    }))
    .unwrap();
    assert_eq!(bare.external_input("source"), Some(PortType::Image));
    assert_eq!(bare.external_input("mask"), None);
}
