use super::*;
use crate::graph::builder::GraphBuilder;
use crate::graph::model::NodeId;
use crate::manifest::source::ManifestSource;
use crate::registry::feature_registry::FeatureRegistry;
use crate::registry::kernels::{KernelHandle, KernelTable};
use serde_json::json;

fn registry() -> FeatureRegistry {
    let blur = json!({
        "id": "fx.blur",
        "schemaVersion": 1,
        "inputs": [{ "name": "source", "type": "image" }],
        "parameters": [{ "name": "radius", "type": "float", "default": 4.0, "min": 0.0, "max": 64.0 }],
        "passes": [
            { "name": "up", "kernel": "blurUp", "inputs": ["half"], "outputs": ["result"] },
            { "name": "down", "kernel": "blurDown", "inputs": ["source"], "outputs": ["half"], "scale": 0.5 }
        ]
    });
    let matte = json!({
        "id": "fx.matte",
        "schemaVersion": 1,
        "inputs": [
            { "name": "source", "type": "image" },
            { "name": "matte", "type": "mask" }
        ],
        "outputs": [{ "name": "keyed", "type": "image" }],
        "passes": [
            { "name": "key", "kernel": "matte", "inputs": ["source", "matte"], "outputs": ["keyed"] }
        ]
    });
    FeatureRegistry::load(
        &[
            ManifestSource::from_value("blur.json", &blur),
            ManifestSource::from_value("matte.json", &matte),
        ],
        KernelTable::from_names(["blurDown", "blurUp", "matte"]),
    )
    .unwrap()
}

fn src_port() -> PortRef {
    PortRef::image(NodeId(0))
}

#[test]
fn passes_are_emitted_in_scheduler_order() {
    let reg = registry();
    let blur = reg.get("fx.blur").unwrap();
    let params = BTreeMap::from([("radius".to_string(), ParamValue::Float(8.0))]);
    let sub = expand(blur, &FeatureBinding::primary(src_port()), &params, 1.5).unwrap();

    let names: Vec<&str> = sub
        .nodes
        .iter()
        .map(|n| match &n.kind {
            NodeKind::EffectPass { pass, .. } => pass.as_str(),
            _ => "?",
        })
        .collect();
    assert_eq!(names, vec!["down", "up"]);

    match &sub.nodes[0].kind {
        NodeKind::EffectPass {
            kernel,
            local_time,
            scale,
            ..
        } => {
            assert_eq!(*kernel, KernelHandle(0));
            assert_eq!(*local_time, 1.5);
            assert_eq!(*scale, 0.5);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(sub.nodes[1].props["radius"], ParamValue::Float(8.0));

    assert_eq!(sub.externals.len(), 1);
    assert_eq!(sub.externals[0].binding, Some(src_port()));
    assert_eq!(sub.links[0].from, LinkSource::External(0));
    assert_eq!(
        sub.links[1].from,
        LinkSource::Local(LocalPort {
            node: 0,
            port: "half".to_string()
        })
    );
    assert_eq!(
        sub.tail,
        LocalPort {
            node: 1,
            port: "result".to_string()
        }
    );
}

#[test]
fn mask_inputs_bind_to_named_resources() {
    let reg = registry();
    let matte = reg.get("fx.matte").unwrap();
    let binding = FeatureBinding {
        primary: src_port(),
        resources: BTreeMap::from([("matte".to_string(), PortRef::image(NodeId(1)))]),
    };
    let sub = expand(matte, &binding, &BTreeMap::new(), 0.0).unwrap();
    assert_eq!(sub.externals.len(), 2);
    assert_eq!(sub.externals[1].name, "matte");
    assert_eq!(sub.externals[1].binding, Some(PortRef::image(NodeId(1))));
    assert_eq!(sub.tail.port, "keyed");
}

#[test]
fn missing_resource_fails_at_splice() {
    let reg = registry();
    let matte = reg.get("fx.matte").unwrap();
    let sub = expand(matte, &FeatureBinding::primary(src_port()), &BTreeMap::new(), 0.0).unwrap();
    assert_eq!(sub.externals[1].binding, None);

    let mut b = GraphBuilder::new();
    let err = b.splice(sub).unwrap_err();
    assert_eq!(
        err,
        CompileError::contract("fx.matte", "missing binding for input 'matte'")
    );
}

#[test]
fn unknown_secondary_input_is_a_contract_mismatch() {
    let reg = registry();
    let mut blur = reg.get("fx.blur").unwrap().clone();
    let mut manifest = (*blur.manifest).clone();
    manifest.passes[0].inputs.push("ghost".to_string());
    blur.manifest = std::sync::Arc::new(manifest);

    let err = expand(&blur, &FeatureBinding::primary(src_port()), &BTreeMap::new(), 0.0)
        .unwrap_err();
    assert_eq!(
        err,
        CompileError::contract("fx.blur", "pass 'up' reads unknown input 'ghost'")
    );
}

#[test]
fn cyclic_passes_surface_as_pass_cycle() {
    let reg = registry();
    let mut blur = reg.get("fx.blur").unwrap().clone();
    let mut manifest = (*blur.manifest).clone();
    manifest.passes[1].inputs = vec!["result".to_string()];
    blur.manifest = std::sync::Arc::new(manifest);

    let err = expand(&blur, &FeatureBinding::primary(src_port()), &BTreeMap::new(), 0.0)
        .unwrap_err();
    match err {
        CompileError::PassCycle { feature_id, cycle } => {
            assert_eq!(feature_id, "fx.blur");
            assert_eq!(cycle.passes, vec!["up", "down"]);
        }
        other => panic!("unexpected {other:?}"),
    }
}
