use crate::foundation::core::{BlendMode, ColorSpace, Rgba};
use crate::manifest::model::ParamValue;
use crate::registry::kernels::KernelHandle;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Port name used by single-image nodes for both input and output.
pub const IMAGE_PORT: &str = "image";
/// Composite input receiving the accumulated lower layers.
pub const BACKGROUND_PORT: &str = "background";
/// Composite input receiving the upper track.
pub const FOREGROUND_PORT: &str = "foreground";

/// Index of a node in its [`NodeGraph`]; equals creation order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct NodeId(pub u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// A named port on a node.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct PortRef {
    /// Owning node.
    pub node: NodeId,
    /// Port name.
    pub port: String,
}

impl PortRef {
    /// Build a port reference.
    pub fn new(node: NodeId, port: impl Into<String>) -> Self {
        Self {
            node,
            port: port.into(),
        }
    }

    /// The conventional `image` port of `node`.
    pub fn image(node: NodeId) -> Self {
        Self::new(node, IMAGE_PORT)
    }
}

impl std::fmt::Display for PortRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.node, self.port)
    }
}

/// Directed data dependency from an output port to an input port.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Edge {
    /// Producing output port.
    pub from: PortRef,
    /// Consuming input port.
    pub to: PortRef,
}

/// Which encoding an input transform decodes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TransformDomain {
    /// Scene-linear source; a matrix conversion into the working space.
    Linear,
    /// Display-encoded source; transfer-function decode, then matrix conversion.
    Display,
}

/// What a node does.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NodeKind {
    /// Decoded frame of a clip's asset.
    #[serde(rename_all = "camelCase")]
    Source {
        /// Asset id.
        asset: String,
        /// Native color space of the asset.
        color_space: ColorSpace,
        /// Clip-local time the frame is fetched at.
        local_time: f64,
    },
    /// Externally supplied named resource (e.g. a mask) bound to a feature port.
    Resource {
        /// Asset id.
        asset: String,
        /// Feature port the resource is bound to.
        port: String,
    },
    /// Conversion from a source's native encoding into the working space.
    InputTransform {
        /// Decode path.
        domain: TransformDomain,
        /// Source color space.
        from: ColorSpace,
        /// Working color space.
        to: ColorSpace,
    },
    /// One pass of an expanded feature.
    #[serde(rename_all = "camelCase")]
    EffectPass {
        /// Feature the pass belongs to.
        feature_id: String,
        /// Pass name within the feature.
        pass: String,
        /// Resolved kernel.
        kernel: KernelHandle,
        /// Clip-local time handed to the kernel.
        local_time: f64,
        /// Output resolution relative to the canvas.
        scale: f32,
    },
    /// Blend of an upper layer over the accumulated lower layers.
    Composite {
        /// Blend mode of the upper layer.
        blend: BlendMode,
        /// Upper layer opacity in `[0, 1]`.
        opacity: f64,
        /// Transition progress in `[0, 1]`, when a transition is running.
        progress: Option<f64>,
    },
    /// Solid fill.
    Generator {
        /// Fill color in the working space.
        color: Rgba,
    },
    /// Conversion from the working space to the deliverable space.
    OutputTransform {
        /// Working color space.
        from: ColorSpace,
        /// Deliverable color space.
        to: ColorSpace,
    },
}

impl NodeKind {
    /// Stable kebab-case tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Source { .. } => "source",
            Self::Resource { .. } => "resource",
            Self::InputTransform { .. } => "input-transform",
            Self::EffectPass { .. } => "effect-pass",
            Self::Composite { .. } => "composite",
            Self::Generator { .. } => "generator",
            Self::OutputTransform { .. } => "output-transform",
        }
    }

    /// Default port layout for kinds with a fixed shape. Effect passes take theirs from the pass.
    pub(crate) fn fixed_ports(&self) -> (SmallVec<[String; 2]>, SmallVec<[String; 2]>) {
        let one = |s: &str| -> SmallVec<[String; 2]> { smallvec::smallvec![s.to_owned()] };
        match self {
            Self::Source { .. } | Self::Resource { .. } | Self::Generator { .. } => {
                (SmallVec::new(), one(IMAGE_PORT))
            }
            Self::InputTransform { .. } | Self::OutputTransform { .. } => {
                (one(IMAGE_PORT), one(IMAGE_PORT))
            }
            Self::Composite { .. } => (
                smallvec::smallvec![BACKGROUND_PORT.to_owned(), FOREGROUND_PORT.to_owned()],
                one(IMAGE_PORT),
            ),
            Self::EffectPass { .. } => (SmallVec::new(), SmallVec::new()),
        }
    }
}

/// One instantiated operation.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct GraphNode {
    /// Node id.
    pub id: NodeId,
    /// Operation.
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Declared input ports; each must be bound by exactly one edge.
    pub inputs: SmallVec<[String; 2]>,
    /// Declared output ports.
    pub outputs: SmallVec<[String; 2]>,
    /// Resolved parameters.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub props: BTreeMap<String, ParamValue>,
}

impl GraphNode {
    /// Return `true` if `port` is a declared input.
    pub fn has_input(&self, port: &str) -> bool {
        self.inputs.iter().any(|p| p == port)
    }

    /// Return `true` if `port` is a declared output.
    pub fn has_output(&self, port: &str) -> bool {
        self.outputs.iter().any(|p| p == port)
    }
}

/// A compiled frame graph.
///
/// Nodes are stored in creation order, which is also a valid topological order: every edge runs
/// from a lower id to a higher one.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct NodeGraph {
    pub(crate) nodes: Vec<GraphNode>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) root: NodeId,
}

impl NodeGraph {
    /// All nodes in creation order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// All edges in creation order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The single output-transform node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id.index())
    }

    /// Edges feeding `id`.
    pub fn incoming(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.to.node == id)
    }

    /// Edges leaving `id`.
    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.from.node == id)
    }

    /// The edge bound to input `port` of `id`, if any.
    pub fn input_edge(&self, id: NodeId, port: &str) -> Option<&Edge> {
        self.incoming(id).find(|e| e.to.port == port)
    }

    /// Nodes with the given tag, in creation order.
    pub fn nodes_tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a GraphNode> {
        self.nodes.iter().filter(move |n| n.kind.tag() == tag)
    }

    /// Deterministic textual dump.
    ///
    /// Contains no addresses and no hash-map ordering, so identical graphs dump identically.
    pub fn dump(&self) -> String {
        let mut s = String::new();
        s.push_str("NodeGraph\n");
        let _ = writeln!(s, "nodes: {}", self.nodes.len());
        for n in &self.nodes {
            let _ = write!(s, "  {}: {}", n.id, n.kind.tag());
            match &n.kind {
                NodeKind::Source {
                    asset,
                    color_space,
                    local_time,
                } => {
                    let _ = write!(s, " asset={asset:?} space={color_space:?} t={local_time:?}");
                }
                NodeKind::Resource { asset, port } => {
                    let _ = write!(s, " asset={asset:?} port={port:?}");
                }
                NodeKind::InputTransform { domain, from, to } => {
                    let _ = write!(s, " domain={domain:?} {from:?}->{to:?}");
                }
                NodeKind::EffectPass {
                    feature_id,
                    pass,
                    kernel,
                    local_time,
                    scale,
                } => {
                    let _ = write!(
                        s,
                        " feature={feature_id:?} pass={pass:?} kernel=K{} t={local_time:?} scale={scale:?}",
                        kernel.0
                    );
                }
                NodeKind::Composite {
                    blend,
                    opacity,
                    progress,
                } => {
                    let _ = write!(
                        s,
                        " blend={} opacity={opacity:?} progress={progress:?}",
                        blend.as_str()
                    );
                }
                NodeKind::Generator { color } => {
                    let _ = write!(
                        s,
                        " color=({:?}, {:?}, {:?}, {:?})",
                        color.r, color.g, color.b, color.a
                    );
                }
                NodeKind::OutputTransform { from, to } => {
                    let _ = write!(s, " {from:?}->{to:?}");
                }
            }
            let _ = write!(
                s,
                " in=[{}] out=[{}]",
                n.inputs.join(","),
                n.outputs.join(",")
            );
            if !n.props.is_empty() {
                let props: Vec<String> = n.props.iter().map(|(k, v)| format!("{k}={v}")).collect();
                let _ = write!(s, " props={{{}}}", props.join(","));
            }
            s.push('\n');
        }
        let _ = writeln!(s, "edges: {}", self.edges.len());
        for e in &self.edges {
            let _ = writeln!(s, "  {} -> {}", e.from, e.to);
        }
        let _ = writeln!(s, "root: {}", self.root);
        s
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/model.rs"]
mod tests;
