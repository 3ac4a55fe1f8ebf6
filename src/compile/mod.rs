pub(crate) mod feature;
pub(crate) mod opts;
pub(crate) mod params;
pub(crate) mod timeline;
