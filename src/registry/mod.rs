pub(crate) mod feature_registry;
pub(crate) mod kernels;
pub(crate) mod validate;
