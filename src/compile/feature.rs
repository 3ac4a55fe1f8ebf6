use crate::foundation::error::CompileError;
use crate::graph::model::{NodeKind, PortRef};
use crate::graph::subgraph::{
    ExternalInput, FeatureSubgraph, LinkSource, LocalPort, SubgraphLink, SubgraphNode,
};
use crate::manifest::model::{PRIMARY_INPUT, ParamValue, PortType};
use crate::registry::feature_registry::RegisteredFeature;
use crate::schedule::scheduler;
use std::collections::BTreeMap;

/// Parent-graph ports a feature application reads from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureBinding {
    /// Bound to the manifest's `source` input.
    pub primary: PortRef,
    /// Bound to mask inputs, by manifest input name.
    pub resources: BTreeMap<String, PortRef>,
}

impl FeatureBinding {
    /// Binding with only a primary input.
    pub fn primary(port: PortRef) -> Self {
        Self {
            primary: port,
            resources: BTreeMap::new(),
        }
    }
}

/// Expand one registered feature into a self-contained subgraph.
///
/// One effect-pass node is created per pass, in scheduler order. Each pass input binds to the
/// sibling output of the same name when one exists, otherwise to the declared manifest input:
/// `image` inputs to `binding.primary`, `mask` inputs to `binding.resources`. A manifest without
/// declared inputs still reads `source` as its primary input. A mask input without
/// a supplied resource is left unbound and rejected when the subgraph is spliced.
///
/// The tail is the first declared manifest output, else the first output of the last scheduled
/// pass.
pub fn expand(
    feature: &RegisteredFeature,
    binding: &FeatureBinding,
    params: &BTreeMap<String, ParamValue>,
    local_time: f64,
) -> Result<FeatureSubgraph, CompileError> {
    let manifest = &feature.manifest;
    let id = manifest.id.as_str();

    let order = scheduler::order_indices(&manifest.passes).map_err(|cycle| {
        CompileError::PassCycle {
            feature_id: id.to_owned(),
            cycle,
        }
    })?;

    let mut nodes = Vec::with_capacity(order.len());
    let mut links = Vec::new();
    let mut externals: Vec<ExternalInput> = Vec::new();
    let mut produced = BTreeMap::<&str, LocalPort>::new();

    for (local, &pi) in order.iter().enumerate() {
        let pass = &manifest.passes[pi];
        let kernel = feature.kernels.get(pi).copied().ok_or_else(|| {
            CompileError::contract(id, format!("pass '{}' has no resolved kernel", pass.name))
        })?;

        for input in &pass.inputs {
            let from = if let Some(port) = produced.get(input.as_str()) {
                LinkSource::Local(port.clone())
            } else {
                let Some(ty) = manifest.external_input(input) else {
                    return Err(CompileError::contract(
                        id,
                        format!("pass '{}' reads unknown input '{input}'", pass.name),
                    ));
                };
                let bound = match ty {
                    PortType::Image if input.as_str() == PRIMARY_INPUT => {
                        Some(binding.primary.clone())
                    }
                    PortType::Mask => binding.resources.get(input).cloned(),
                    other => {
                        return Err(CompileError::contract(
                            id,
                            format!(
                                "input '{input}' of type {} cannot be bound in a frame graph",
                                other.as_str()
                            ),
                        ));
                    }
                };
                let idx = match externals.iter().position(|e| e.name == *input) {
                    Some(i) => i,
                    None => {
                        externals.push(ExternalInput {
                            name: input.clone(),
                            binding: bound,
                        });
                        externals.len() - 1
                    }
                };
                LinkSource::External(idx)
            };
            links.push(SubgraphLink {
                from,
                to: LocalPort {
                    node: local,
                    port: input.clone(),
                },
            });
        }

        for out in &pass.outputs {
            produced.entry(out.as_str()).or_insert_with(|| LocalPort {
                node: local,
                port: out.clone(),
            });
        }

        nodes.push(SubgraphNode {
            kind: NodeKind::EffectPass {
                feature_id: id.to_owned(),
                pass: pass.name.clone(),
                kernel,
                local_time,
                scale: pass.scale,
            },
            inputs: pass.inputs.iter().cloned().collect(),
            outputs: pass.outputs.iter().cloned().collect(),
            props: params.clone(),
        });
    }

    let tail_name = manifest
        .primary_output()
        .or_else(|| {
            let last = order.last()?;
            manifest.passes[*last].outputs.first().map(String::as_str)
        })
        .ok_or_else(|| CompileError::contract(id, "feature has no output"))?;
    let tail = produced
        .get(tail_name)
        .cloned()
        .ok_or_else(|| CompileError::contract(id, format!("no pass produces '{tail_name}'")))?;

    Ok(FeatureSubgraph {
        feature_id: id.to_owned(),
        nodes,
        links,
        externals,
        tail,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/compile/feature.rs"]
mod tests;
