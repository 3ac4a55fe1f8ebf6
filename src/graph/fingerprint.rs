use crate::foundation::core::{BlendMode, ColorSpace, Rgba};
use crate::graph::model::{
    Edge, GraphNode, NodeGraph, NodeId, NodeKind, PortRef, TransformDomain,
};
use crate::manifest::model::ParamValue;
use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x8b5ad4a0c7d8e9f1;

/// Stable 128-bit fingerprint of a compiled graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct GraphFingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

impl std::fmt::Display for GraphFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

/// Fingerprint every node, edge and the root of `graph`.
///
/// Floats are fed by bit pattern, integers little-endian and strings length-prefixed, so the
/// value is identical across runs and machines for identical graphs.
pub fn fingerprint_graph(graph: &NodeGraph) -> GraphFingerprint {
    let mut h = Xxh3::with_seed(XXH3_SEED);
    graph.nodes.as_slice().feed(&mut h);
    graph.edges.as_slice().feed(&mut h);
    graph.root.feed(&mut h);

    let v = h.digest128();
    GraphFingerprint {
        hi: (v >> 64) as u64,
        lo: v as u64,
    }
}

/// Platform-independent byte encoding fed into the hasher.
trait Feed {
    fn feed(&self, h: &mut Xxh3);
}

impl Feed for u8 {
    fn feed(&self, h: &mut Xxh3) {
        h.update(&[*self]);
    }
}

impl Feed for u32 {
    fn feed(&self, h: &mut Xxh3) {
        h.update(&self.to_le_bytes());
    }
}

impl Feed for u64 {
    fn feed(&self, h: &mut Xxh3) {
        h.update(&self.to_le_bytes());
    }
}

impl Feed for bool {
    fn feed(&self, h: &mut Xxh3) {
        u8::from(*self).feed(h);
    }
}

impl Feed for f32 {
    fn feed(&self, h: &mut Xxh3) {
        self.to_bits().feed(h);
    }
}

impl Feed for f64 {
    fn feed(&self, h: &mut Xxh3) {
        self.to_bits().feed(h);
    }
}

impl Feed for str {
    fn feed(&self, h: &mut Xxh3) {
        (self.len() as u32).feed(h);
        h.update(self.as_bytes());
    }
}

impl Feed for String {
    fn feed(&self, h: &mut Xxh3) {
        self.as_str().feed(h);
    }
}

impl<T: Feed> Feed for Option<T> {
    fn feed(&self, h: &mut Xxh3) {
        match self {
            Some(v) => {
                true.feed(h);
                v.feed(h);
            }
            None => false.feed(h),
        }
    }
}

impl<T: Feed> Feed for [T] {
    fn feed(&self, h: &mut Xxh3) {
        (self.len() as u32).feed(h);
        for v in self {
            v.feed(h);
        }
    }
}

impl Feed for NodeId {
    fn feed(&self, h: &mut Xxh3) {
        self.0.feed(h);
    }
}

impl Feed for PortRef {
    fn feed(&self, h: &mut Xxh3) {
        self.node.feed(h);
        self.port.feed(h);
    }
}

impl Feed for Edge {
    fn feed(&self, h: &mut Xxh3) {
        self.from.feed(h);
        self.to.feed(h);
    }
}

// Discriminants are pinned here rather than derived from declaration order.
impl Feed for ColorSpace {
    fn feed(&self, h: &mut Xxh3) {
        let tag: u8 = match self {
            ColorSpace::AcesCg => 0,
            ColorSpace::LinearRec709 => 1,
            ColorSpace::LinearRec2020 => 2,
            ColorSpace::Srgb => 3,
            ColorSpace::Rec709 => 4,
            ColorSpace::DisplayP3 => 5,
            ColorSpace::Rec2020Pq => 6,
        };
        tag.feed(h);
    }
}

impl Feed for BlendMode {
    fn feed(&self, h: &mut Xxh3) {
        let tag: u8 = match self {
            BlendMode::Normal => 0,
            BlendMode::Multiply => 1,
            BlendMode::Screen => 2,
            BlendMode::Overlay => 3,
            BlendMode::Darken => 4,
            BlendMode::Lighten => 5,
            BlendMode::ColorDodge => 6,
            BlendMode::ColorBurn => 7,
            BlendMode::SoftLight => 8,
            BlendMode::HardLight => 9,
            BlendMode::Difference => 10,
            BlendMode::Exclusion => 11,
            BlendMode::Add => 12,
        };
        tag.feed(h);
    }
}

impl Feed for Rgba {
    fn feed(&self, h: &mut Xxh3) {
        for c in [self.r, self.g, self.b, self.a] {
            c.feed(h);
        }
    }
}

impl Feed for ParamValue {
    fn feed(&self, h: &mut Xxh3) {
        match self {
            ParamValue::Bool(b) => {
                0u8.feed(h);
                b.feed(h);
            }
            ParamValue::Int(i) => {
                1u8.feed(h);
                (*i as u64).feed(h);
            }
            ParamValue::Float(f) => {
                2u8.feed(h);
                f.feed(h);
            }
        }
    }
}

impl Feed for NodeKind {
    fn feed(&self, h: &mut Xxh3) {
        match self {
            NodeKind::Source {
                asset,
                color_space,
                local_time,
            } => {
                0u8.feed(h);
                asset.feed(h);
                color_space.feed(h);
                local_time.feed(h);
            }
            NodeKind::Resource { asset, port } => {
                1u8.feed(h);
                asset.feed(h);
                port.feed(h);
            }
            NodeKind::InputTransform { domain, from, to } => {
                2u8.feed(h);
                u8::from(*domain == TransformDomain::Display).feed(h);
                from.feed(h);
                to.feed(h);
            }
            NodeKind::EffectPass {
                feature_id,
                pass,
                kernel,
                local_time,
                scale,
            } => {
                3u8.feed(h);
                feature_id.feed(h);
                pass.feed(h);
                kernel.0.feed(h);
                local_time.feed(h);
                scale.feed(h);
            }
            NodeKind::Composite {
                blend,
                opacity,
                progress,
            } => {
                4u8.feed(h);
                blend.feed(h);
                opacity.feed(h);
                progress.feed(h);
            }
            NodeKind::Generator { color } => {
                5u8.feed(h);
                color.feed(h);
            }
            NodeKind::OutputTransform { from, to } => {
                6u8.feed(h);
                from.feed(h);
                to.feed(h);
            }
        }
    }
}

impl Feed for GraphNode {
    fn feed(&self, h: &mut Xxh3) {
        self.id.feed(h);
        self.kind.feed(h);
        self.inputs.as_slice().feed(h);
        self.outputs.as_slice().feed(h);
        (self.props.len() as u32).feed(h);
        for (k, v) in &self.props {
            k.feed(h);
            v.feed(h);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/fingerprint.rs"]
mod tests;
