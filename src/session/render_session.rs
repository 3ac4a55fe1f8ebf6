use crate::compile::opts::CompileOpts;
use crate::compile::timeline::TimelineCompiler;
use crate::device::catalog::{DeviceCatalog, QualityProfile, RenderDeviceCapabilities};
use crate::foundation::error::{FxGraphResult, ResourceError, ValidationErrors};
use crate::graph::fingerprint::{GraphFingerprint, fingerprint_graph};
use crate::graph::model::NodeGraph;
use crate::manifest::source::ManifestSource;
use crate::registry::feature_registry::FeatureRegistry;
use crate::resources::plan::{FrameResources, ResourcePlan};
use crate::resources::pool::{PoolStats, ResourcePool};
use crate::session::config::SessionConfig;
use crate::timeline::model::Timeline;

/// One compiled frame, ready for dispatch.
///
/// `resources` holds the frame's pool buffers until the value is dropped.
#[derive(Debug)]
pub struct CompiledFrame {
    /// Device selected for the configured profile.
    pub device: RenderDeviceCapabilities,
    /// The frame graph.
    pub graph: NodeGraph,
    /// Stable fingerprint of `graph`.
    pub fingerprint: GraphFingerprint,
    /// Slot assignment for every node output.
    pub plan: ResourcePlan,
    /// Buffers backing `plan`.
    pub resources: FrameResources,
}

/// Per-session state: registry, compile options, buffer pool and device catalog.
///
/// Compilation borrows the session immutably, so frames can be compiled from several threads
/// against one session; the pool is the only shared mutable state.
#[derive(Debug)]
pub struct Session {
    registry: FeatureRegistry,
    catalog: DeviceCatalog,
    pool: ResourcePool,
    opts: CompileOpts,
    profile: QualityProfile,
    overlay: Option<bool>,
}

impl Session {
    /// Build a session from a loaded registry, a device catalog and `config`.
    pub fn new(registry: FeatureRegistry, catalog: DeviceCatalog, config: SessionConfig) -> Self {
        Self {
            registry,
            catalog,
            pool: ResourcePool::with_opts(&config.pool),
            opts: config.compile,
            profile: config.profile,
            overlay: config.overlay,
        }
    }

    /// Feature registry.
    pub fn registry(&self) -> &FeatureRegistry {
        &self.registry
    }

    /// Compile options.
    pub fn opts(&self) -> &CompileOpts {
        &self.opts
    }

    /// Handle to the session pool.
    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    /// Pool counters.
    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Device catalog.
    pub fn catalog(&self) -> &DeviceCatalog {
        &self.catalog
    }

    /// Compile the graph for `at` without selecting a device or acquiring buffers.
    pub fn compile_graph(&self, timeline: &Timeline, at: f64) -> FxGraphResult<NodeGraph> {
        Ok(TimelineCompiler::new(&self.registry, &self.opts).compile(timeline, at)?)
    }

    /// Select a device, compile the graph for `at`, plan and acquire its buffers.
    ///
    /// The configured canvas must fit the selected device; nothing is acquired otherwise.
    #[tracing::instrument(skip(self, timeline))]
    pub fn compile_frame(&self, timeline: &Timeline, at: f64) -> FxGraphResult<CompiledFrame> {
        let device = self.catalog.best_capabilities(self.profile, self.overlay)?;
        if !self.opts.canvas.fits_within(device.max_resolution) {
            return Err(ResourceError::OversizedImage {
                size: self.opts.canvas,
                ceiling: device.max_resolution,
            }
            .into());
        }
        let graph = self.compile_graph(timeline, at)?;
        let fingerprint = fingerprint_graph(&graph);
        let plan = ResourcePlan::build(&graph, self.opts.canvas, self.opts.pixel_format)?;
        let resources = FrameResources::acquire(&plan, &self.pool);
        tracing::debug!(
            %fingerprint,
            slots = plan.slot_count(),
            device = %device.name,
            "frame ready"
        );
        Ok(CompiledFrame {
            device,
            graph,
            fingerprint,
            plan,
            resources,
        })
    }

    /// Clear the registry and load `sources` from scratch, returning every rejection.
    #[tracing::instrument(skip_all, fields(sources = sources.len()))]
    pub fn reload(&mut self, sources: &[ManifestSource]) -> ValidationErrors {
        self.registry.reload(sources)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/render_session.rs"]
mod tests;
