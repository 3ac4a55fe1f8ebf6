use crate::foundation::error::CompileError;
use crate::graph::model::{Edge, GraphNode, NodeGraph, NodeId, NodeKind, PortRef};
use crate::graph::subgraph::{FeatureSubgraph, LinkSource};
use crate::manifest::model::ParamValue;
use smallvec::SmallVec;
use std::collections::{BTreeMap, BTreeSet};

/// Incremental, append-only [`NodeGraph`] construction.
///
/// Edges may only point from an existing node to a later one, so the creation order of the
/// finished graph is always a topological order.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<GraphNode>,
    edges: Vec<Edge>,
    bound: BTreeSet<(NodeId, String)>,
}

impl GraphBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes added so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Return `true` when no node was added.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node with the fixed port layout of its kind.
    pub fn add(&mut self, kind: NodeKind) -> NodeId {
        let (inputs, outputs) = kind.fixed_ports();
        self.add_node(kind, inputs, outputs, BTreeMap::new())
    }

    /// Add a node with an explicit port layout.
    pub fn add_node(
        &mut self,
        kind: NodeKind,
        inputs: SmallVec<[String; 2]>,
        outputs: SmallVec<[String; 2]>,
        props: BTreeMap<String, ParamValue>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(GraphNode {
            id,
            kind,
            inputs,
            outputs,
            props,
        });
        id
    }

    /// Connect an output port to an input port.
    pub fn connect(&mut self, from: PortRef, to: PortRef) -> Result<(), CompileError> {
        if from.node >= to.node {
            return Err(CompileError::InvalidGraph(format!(
                "edge {from} -> {to} does not point forward"
            )));
        }
        let src = self
            .nodes
            .get(from.node.index())
            .ok_or_else(|| CompileError::InvalidGraph(format!("unknown node {}", from.node)))?;
        if !src.has_output(&from.port) {
            return Err(CompileError::InvalidGraph(format!(
                "{} has no output '{}'",
                from.node, from.port
            )));
        }
        let dst = self
            .nodes
            .get(to.node.index())
            .ok_or_else(|| CompileError::InvalidGraph(format!("unknown node {}", to.node)))?;
        if !dst.has_input(&to.port) {
            return Err(CompileError::InvalidGraph(format!(
                "{} has no input '{}'",
                to.node, to.port
            )));
        }
        if !self.bound.insert((to.node, to.port.clone())) {
            return Err(CompileError::InvalidGraph(format!("{to} is already bound")));
        }
        self.edges.push(Edge { from, to });
        Ok(())
    }

    /// Append `sub` to the graph, wiring its external inputs to their bindings.
    ///
    /// Returns the parent-graph port of the subgraph's tail output.
    pub fn splice(&mut self, sub: FeatureSubgraph) -> Result<PortRef, CompileError> {
        let mismatch = |detail: String| CompileError::contract(&sub.feature_id, detail);

        let mut resolved = Vec::with_capacity(sub.externals.len());
        for ext in &sub.externals {
            match &ext.binding {
                Some(p) => resolved.push(p.clone()),
                None => return Err(mismatch(format!("missing binding for input '{}'", ext.name))),
            }
        }
        if sub.tail.node >= sub.nodes.len() {
            return Err(mismatch(format!("tail node {} out of range", sub.tail.node)));
        }

        let base = self.nodes.len();
        for n in &sub.nodes {
            self.add_node(
                n.kind.clone(),
                n.inputs.clone(),
                n.outputs.clone(),
                n.props.clone(),
            );
        }
        let global = |local: usize| NodeId((base + local) as u32);

        for link in &sub.links {
            let from = match &link.from {
                LinkSource::Local(p) => PortRef::new(global(p.node), p.port.clone()),
                LinkSource::External(i) => resolved
                    .get(*i)
                    .cloned()
                    .ok_or_else(|| mismatch(format!("external input {i} out of range")))?,
            };
            let to = PortRef::new(global(link.to.node), link.to.port.clone());
            self.connect(from, to).map_err(|e| match e {
                CompileError::InvalidGraph(msg) => mismatch(msg),
                other => other,
            })?;
        }

        let tail = PortRef::new(global(sub.tail.node), sub.tail.port.clone());
        if !self.nodes[tail.node.index()].has_output(&tail.port) {
            return Err(mismatch(format!("tail {tail} is not an output")));
        }
        Ok(tail)
    }

    /// Seal the graph with `root` as its single output.
    ///
    /// Fails if any declared input is unbound or if `root` feeds another node.
    pub fn finish(self, root: NodeId) -> Result<NodeGraph, CompileError> {
        if root.index() >= self.nodes.len() {
            return Err(CompileError::InvalidGraph(format!("unknown root {root}")));
        }
        for n in &self.nodes {
            for port in &n.inputs {
                if !self.bound.contains(&(n.id, port.clone())) {
                    return Err(CompileError::InvalidGraph(format!(
                        "input {}.{port} is unbound",
                        n.id
                    )));
                }
            }
        }
        if self.edges.iter().any(|e| e.from.node == root) {
            return Err(CompileError::InvalidGraph(format!(
                "root {root} has outgoing edges"
            )));
        }
        Ok(NodeGraph {
            nodes: self.nodes,
            edges: self.edges,
            root,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/builder.rs"]
mod tests;
