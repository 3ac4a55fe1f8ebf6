//! fxgraph is a deterministic render-graph compiler for manifest-driven video effects.
//!
//! It turns a declarative edit timeline (tracks, clips, ordered effect applications) into an
//! acyclic graph of kernel passes, and manages the intermediate image buffers those passes use.
//!
//! # Pipeline overview
//!
//! 1. **Load**: JSON feature manifests -> [`FeatureRegistry`] (validated, with every rejection
//!    reported as a [`ValidationError`])
//! 2. **Compile**: `Timeline + time` -> [`NodeGraph`] via [`TimelineCompiler`], expanding each
//!    multi-pass feature in [`PassScheduler`] order
//! 3. **Plan**: [`NodeGraph`] -> [`ResourcePlan`] (buffer slots shared by liveness)
//! 4. **Acquire**: [`ResourcePlan`] -> [`FrameResources`] checked out of a [`ResourcePool`]
//!
//! [`Session`] ties these together with a [`DeviceCatalog`] that picks an execution backend for
//! the requested [`QualityProfile`].
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: identical inputs produce identical graphs, dumps and fingerprints.
//! - **No IO in compilation**: only manifest/timeline loading touches the filesystem.
//! - **Color contract**: every source gets exactly one input transform, and every graph ends in
//!   exactly one output transform.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod compile;
mod device;
mod foundation;
mod graph;
mod manifest;
mod registry;
mod resources;
mod schedule;
mod session;
mod timeline;

pub use animation::ease::Ease;
pub use animation::keyframes::{InterpMode, Keyframe, Keyframes};
pub use compile::feature::{FeatureBinding, expand};
pub use compile::opts::CompileOpts;
pub use compile::params::ParamInput;
pub use compile::timeline::TimelineCompiler;
pub use device::catalog::{
    BackendFactory, BackendKind, BackendProvider, DeviceCatalog, QualityProfile,
    RenderDeviceCapabilities,
};
pub use foundation::core::{BlendMode, Canvas, ColorEncoding, ColorSpace, PixelFormat, Rgba};
pub use foundation::error::{
    CompileError, CycleError, FxGraphError, FxGraphResult, ResourceError, ValidationCode,
    ValidationError, ValidationErrors,
};
pub use graph::builder::GraphBuilder;
pub use graph::fingerprint::{GraphFingerprint, fingerprint_graph};
pub use graph::model::{
    BACKGROUND_PORT, Edge, FOREGROUND_PORT, GraphNode, IMAGE_PORT, NodeGraph, NodeId, NodeKind,
    PortRef, TransformDomain,
};
pub use graph::subgraph::{
    ExternalInput, FeatureSubgraph, LinkSource, LocalPort, SubgraphLink, SubgraphNode,
};
pub use manifest::model::{
    Domain, FeatureManifest, MAX_PASS_SCALE, PRIMARY_INPUT, ParamType, ParamValue, ParameterDecl,
    PassDecl, PortDecl, PortType, SCHEMA_VERSION_1, SUPPORTED_SCHEMA_VERSIONS,
};
pub use manifest::source::ManifestSource;
pub use registry::feature_registry::{FeatureRegistry, RegisteredFeature};
pub use registry::kernels::{KernelHandle, KernelSymbols, KernelTable};
pub use resources::plan::{FrameResources, ResourcePlan, SlotId};
pub use resources::pool::{
    ImageDesc, PoolStats, PooledImage, PrewarmEntry, ResourcePool, ResourcePoolOpts,
};
pub use schedule::scheduler::{PassScheduler, order, order_indices};
pub use session::config::SessionConfig;
pub use session::render_session::{CompiledFrame, Session};
pub use timeline::model::{
    AssetRef, Clip, FeatureApplication, Timeline, Track, TrackKind, TransitionSpec,
};
