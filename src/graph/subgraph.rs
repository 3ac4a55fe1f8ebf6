use crate::graph::model::{NodeKind, PortRef};
use crate::manifest::model::ParamValue;
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// A port on a node local to a [`FeatureSubgraph`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalPort {
    /// Index into [`FeatureSubgraph::nodes`].
    pub node: usize,
    /// Port name.
    pub port: String,
}

/// Node of a subgraph, not yet assigned a graph id.
#[derive(Clone, Debug, PartialEq)]
pub struct SubgraphNode {
    /// Operation.
    pub kind: NodeKind,
    /// Declared inputs.
    pub inputs: SmallVec<[String; 2]>,
    /// Declared outputs.
    pub outputs: SmallVec<[String; 2]>,
    /// Resolved parameters.
    pub props: BTreeMap<String, ParamValue>,
}

/// Where a subgraph link reads from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkSource {
    /// Output of a sibling node.
    Local(LocalPort),
    /// An external input, by index into [`FeatureSubgraph::externals`].
    External(usize),
}

/// Data dependency inside a subgraph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubgraphLink {
    /// Producer.
    pub from: LinkSource,
    /// Consumer.
    pub to: LocalPort,
}

/// A feature input the subgraph reads from the parent graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalInput {
    /// Manifest input name (`source` or a resource port).
    pub name: String,
    /// Parent-graph port bound to it, if the caller supplied one.
    pub binding: Option<PortRef>,
}

/// Self-contained expansion of one feature application, spliced by
/// [`GraphBuilder::splice`](crate::GraphBuilder::splice).
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureSubgraph {
    /// Feature the subgraph was expanded from.
    pub feature_id: String,
    /// Nodes in scheduler order.
    pub nodes: Vec<SubgraphNode>,
    /// Links in creation order.
    pub links: Vec<SubgraphLink>,
    /// External inputs in first-use order.
    pub externals: Vec<ExternalInput>,
    /// Port exposed to the parent graph.
    pub tail: LocalPort,
}
