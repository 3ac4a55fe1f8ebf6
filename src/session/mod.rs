pub(crate) mod config;
pub(crate) mod render_session;
