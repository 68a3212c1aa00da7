pub(crate) mod arena;
pub(crate) mod report;
pub(crate) mod runtime;
pub(crate) mod trace;
