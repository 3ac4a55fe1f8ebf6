pub(crate) mod builder;
pub(crate) mod fingerprint;
pub(crate) mod model;
pub(crate) mod subgraph;
