use super::*;
use crate::foundation::core::{ColorSpace, Rgba};
use crate::graph::model::{IMAGE_PORT, TransformDomain};
use crate::graph::subgraph::{ExternalInput, LocalPort, SubgraphLink, SubgraphNode};
use crate::registry::kernels::KernelHandle;

fn generator(b: &mut GraphBuilder) -> NodeId {
    b.add(NodeKind::Generator { color: Rgba::BLACK })
}

fn odt(b: &mut GraphBuilder) -> NodeId {
    b.add(NodeKind::OutputTransform {
        from: ColorSpace::AcesCg,
        to: ColorSpace::Rec709,
    })
}

fn pass_node(name: &str, inputs: &[&str], outputs: &[&str]) -> SubgraphNode {
    SubgraphNode {
        kind: NodeKind::EffectPass {
            feature_id: "fx.test".to_string(),
            pass: name.to_string(),
            kernel: KernelHandle(0),
            local_time: 0.0,
            scale: 1.0,
        },
        inputs: inputs.iter().map(|s| (*s).to_owned()).collect(),
        outputs: outputs.iter().map(|s| (*s).to_owned()).collect(),
        props: BTreeMap::new(),
    }
}

fn two_pass(binding: Option<PortRef>) -> FeatureSubgraph {
    FeatureSubgraph {
        feature_id: "fx.test".to_string(),
        nodes: vec![
            pass_node("down", &["source"], &["half"]),
            pass_node("up", &["half"], &["result"]),
        ],
        links: vec![
            SubgraphLink {
                from: LinkSource::External(0),
                to: LocalPort {
                    node: 0,
                    port: "source".to_string(),
                },
            },
            SubgraphLink {
                from: LinkSource::Local(LocalPort {
                    node: 0,
                    port: "half".to_string(),
                }),
                to: LocalPort {
                    node: 1,
                    port: "half".to_string(),
                },
            },
        ],
        externals: vec![ExternalInput {
            name: "source".to_string(),
            binding,
        }],
        tail: LocalPort {
            node: 1,
            port: "result".to_string(),
        },
    }
}

#[test]
fn connect_rejects_backward_edges_and_self_loops() {
    let mut b = GraphBuilder::new();
    let g = generator(&mut b);
    let o = odt(&mut b);
    assert!(matches!(
        b.connect(PortRef::image(o), PortRef::image(o)),
        Err(CompileError::InvalidGraph(_))
    ));
    assert!(b.connect(PortRef::image(o), PortRef::image(g)).is_err());
    b.connect(PortRef::image(g), PortRef::image(o)).unwrap();
}

#[test]
fn connect_rejects_undeclared_ports_and_double_binding() {
    let mut b = GraphBuilder::new();
    let g1 = generator(&mut b);
    let g2 = generator(&mut b);
    let o = odt(&mut b);
    assert!(b.connect(PortRef::new(g1, "mask"), PortRef::image(o)).is_err());
    assert!(b.connect(PortRef::image(g1), PortRef::new(o, "other")).is_err());
    b.connect(PortRef::image(g1), PortRef::image(o)).unwrap();
    let err = b.connect(PortRef::image(g2), PortRef::image(o)).unwrap_err();
    assert_eq!(
        err,
        CompileError::InvalidGraph("N2.image is already bound".to_string())
    );
}

#[test]
fn finish_requires_bound_inputs_and_a_sink_root() {
    let mut b = GraphBuilder::new();
    let _ = generator(&mut b);
    let o = odt(&mut b);
    assert!(matches!(b.finish(o), Err(CompileError::InvalidGraph(msg)) if msg.contains("unbound")));

    let mut b = GraphBuilder::new();
    let g = generator(&mut b);
    let idt = b.add(NodeKind::InputTransform {
        domain: TransformDomain::Linear,
        from: ColorSpace::AcesCg,
        to: ColorSpace::AcesCg,
    });
    b.connect(PortRef::image(g), PortRef::image(idt)).unwrap();
    assert!(b.finish(g).is_err());
}

#[test]
fn splice_offsets_local_ids_and_returns_tail() {
    let mut b = GraphBuilder::new();
    let g = generator(&mut b);
    let tail = b.splice(two_pass(Some(PortRef::image(g)))).unwrap();
    assert_eq!(tail, PortRef::new(NodeId(2), "result"));

    let o = odt(&mut b);
    b.connect(tail, PortRef::image(o)).unwrap();
    let graph = b.finish(o).unwrap();
    assert_eq!(graph.edges().len(), 3);
    assert_eq!(graph.edges()[0].from, PortRef::image(g));
    assert_eq!(graph.edges()[0].to, PortRef::new(NodeId(1), "source"));
    assert_eq!(graph.edges()[1].to, PortRef::new(NodeId(2), "half"));
    assert_eq!(graph.edges()[2].to.port, IMAGE_PORT);
}

#[test]
fn splice_without_binding_is_a_contract_mismatch() {
    let mut b = GraphBuilder::new();
    let err = b.splice(two_pass(None)).unwrap_err();
    assert_eq!(
        err,
        CompileError::ContractMismatch {
            feature_id: "fx.test".to_string(),
            detail: "missing binding for input 'source'".to_string(),
        }
    );
    assert!(b.is_empty());
}

#[test]
fn splice_maps_wiring_errors_to_contract_mismatch() {
    let mut b = GraphBuilder::new();
    let g = generator(&mut b);
    // Bound to a port the generator does not have.
    let err = b
        .splice(two_pass(Some(PortRef::new(g, "matte"))))
        .unwrap_err();
    assert!(matches!(err, CompileError::ContractMismatch { feature_id, .. } if feature_id == "fx.test"));
}
