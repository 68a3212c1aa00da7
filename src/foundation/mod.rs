pub(crate) mod color;
pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod rng;
