use super::*;
use crate::foundation::core::Rgba;
use crate::graph::builder::GraphBuilder;
use crate::graph::model::{NodeGraph, PortRef};

fn graph(opacity: f64) -> NodeGraph {
    let mut b = GraphBuilder::new();
    let bg = b.add(NodeKind::Generator { color: Rgba::BLACK });
    let fg = b.add(NodeKind::Generator {
        color: Rgba {
            r: 1.0,
            g: 0.0,
            b: 0.0,
            a: 1.0,
        },
    });
    let comp = b.add(NodeKind::Composite {
        blend: BlendMode::Screen,
        opacity,
        progress: None,
    });
    b.connect(PortRef::image(bg), PortRef::new(comp, "background"))
        .unwrap();
    b.connect(PortRef::image(fg), PortRef::new(comp, "foreground"))
        .unwrap();
    let odt = b.add(NodeKind::OutputTransform {
        from: ColorSpace::AcesCg,
        to: ColorSpace::Srgb,
    });
    b.connect(PortRef::image(comp), PortRef::image(odt)).unwrap();
    b.finish(odt).unwrap()
}

#[test]
fn fingerprint_is_deterministic_for_same_graph() {
    assert_eq!(fingerprint_graph(&graph(0.5)), fingerprint_graph(&graph(0.5)));
}

#[test]
fn fingerprint_changes_when_graph_changes() {
    let base = fingerprint_graph(&graph(0.5));
    assert_ne!(base, fingerprint_graph(&graph(0.25)));

    let mut g = graph(0.5);
    g.nodes[3].kind = NodeKind::OutputTransform {
        from: ColorSpace::AcesCg,
        to: ColorSpace::Rec709,
    };
    assert_ne!(base, fingerprint_graph(&g));

    let mut g = graph(0.5);
    g.nodes[2]
        .props
        .insert("gain".to_string(), ParamValue::Float(1.0));
    assert_ne!(base, fingerprint_graph(&g));
}

#[test]
fn fingerprint_displays_as_hex() {
    let s = fingerprint_graph(&graph(1.0)).to_string();
    assert_eq!(s.len(), 32);
    assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
}
