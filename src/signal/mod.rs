pub(crate) mod graph;
#[allow(clippy::module_inception)]
pub(crate) mod signal;
