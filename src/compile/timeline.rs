use crate::compile::feature::{FeatureBinding, expand};
use crate::compile::opts::CompileOpts;
use crate::compile::params::resolve_params;
use crate::foundation::core::ColorEncoding;
use crate::foundation::error::CompileError;
use crate::graph::builder::GraphBuilder;
use crate::graph::model::{
    BACKGROUND_PORT, FOREGROUND_PORT, NodeGraph, NodeKind, PortRef, TransformDomain,
};
use crate::manifest::model::{Domain, PortType};
use crate::registry::feature_registry::FeatureRegistry;
use crate::timeline::model::{Clip, Timeline, TrackKind};
use std::collections::BTreeMap;

/// Compiles a timeline at one instant into a [`NodeGraph`].
///
/// Pure and synchronous: the same registry, options, timeline and time always produce the same
/// graph.
#[derive(Clone, Copy, Debug)]
pub struct TimelineCompiler<'a> {
    registry: &'a FeatureRegistry,
    opts: &'a CompileOpts,
}

impl<'a> TimelineCompiler<'a> {
    /// Compiler resolving features against `registry`.
    pub fn new(registry: &'a FeatureRegistry, opts: &'a CompileOpts) -> Self {
        Self { registry, opts }
    }

    /// Compile the frame at timeline time `at` (seconds).
    #[tracing::instrument(skip(self, timeline), fields(tracks = timeline.tracks.len()))]
    pub fn compile(&self, timeline: &Timeline, at: f64) -> Result<NodeGraph, CompileError> {
        if !at.is_finite() {
            return Err(CompileError::InvalidTime(at));
        }

        let mut b = GraphBuilder::new();
        let mut acc: Option<PortRef> = None;

        for track in &timeline.tracks {
            if track.kind != TrackKind::Video || track.muted {
                continue;
            }
            let Some(clip) = track.active_clip(at) else {
                continue;
            };

            let layer = self.compile_clip(&mut b, clip, at)?;
            acc = Some(match acc {
                None => layer,
                Some(below) => {
                    let comp = b.add(NodeKind::Composite {
                        blend: track.blend,
                        opacity: (track.opacity * clip.opacity).clamp(0.0, 1.0),
                        progress: clip.transition_progress(at),
                    });
                    b.connect(below, PortRef::new(comp, BACKGROUND_PORT))?;
                    b.connect(layer, PortRef::new(comp, FOREGROUND_PORT))?;
                    PortRef::image(comp)
                }
            });
        }

        let top = match acc {
            Some(p) => p,
            None => {
                let generator = b.add(NodeKind::Generator {
                    color: self.opts.fallback_color(),
                });
                PortRef::image(generator)
            }
        };

        let odt = b.add(NodeKind::OutputTransform {
            from: self.opts.working_space,
            to: self.opts.deliverable,
        });
        b.connect(top, PortRef::image(odt))?;

        let graph = b.finish(odt)?;
        tracing::debug!(
            nodes = graph.nodes().len(),
            edges = graph.edges().len(),
            "compiled frame graph"
        );
        Ok(graph)
    }

    /// Source, input transform and the clip's feature chain. Returns the chain's tail port.
    fn compile_clip(
        &self,
        b: &mut GraphBuilder,
        clip: &Clip,
        at: f64,
    ) -> Result<PortRef, CompileError> {
        let local_time = clip.local_time(at);
        let space = clip.asset.color_space;

        let src = b.add(NodeKind::Source {
            asset: clip.asset.id.clone(),
            color_space: space,
            local_time,
        });
        let domain = match space.encoding() {
            ColorEncoding::Linear => TransformDomain::Linear,
            ColorEncoding::Display => TransformDomain::Display,
        };
        let idt = b.add(NodeKind::InputTransform {
            domain,
            from: space,
            to: self.opts.working_space,
        });
        b.connect(PortRef::image(src), PortRef::image(idt))?;

        let mut cur = PortRef::image(idt);
        for app in &clip.features {
            let feature = self.registry.get(&app.feature_id).ok_or_else(|| {
                CompileError::UnresolvedFeature {
                    feature_id: app.feature_id.clone(),
                    clip_id: clip.id.clone(),
                }
            })?;
            let manifest = &feature.manifest;
            if feature.domain != Domain::Video {
                return Err(CompileError::contract(
                    &manifest.id,
                    format!(
                        "{} feature cannot be applied to video clip '{}'",
                        feature.domain.as_str(),
                        clip.id
                    ),
                ));
            }

            let mut resources = BTreeMap::new();
            for (port, asset) in &app.resources {
                if !manifest
                    .input(port)
                    .is_some_and(|p| p.ty == PortType::Mask)
                {
                    return Err(CompileError::contract(
                        &manifest.id,
                        format!("resource '{port}' is not a declared mask input"),
                    ));
                }
                let node = b.add(NodeKind::Resource {
                    asset: asset.clone(),
                    port: port.clone(),
                });
                resources.insert(port.clone(), PortRef::image(node));
            }

            let params = resolve_params(manifest, &app.parameters, local_time)?;
            let binding = FeatureBinding {
                primary: cur,
                resources,
            };
            let sub = expand(feature, &binding, &params, local_time)?;
            cur = b.splice(sub)?;
        }
        Ok(cur)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/timeline.rs"]
mod tests;
