pub(crate) mod animate;
pub(crate) mod combinators;
pub(crate) mod cue;
pub(crate) mod thread;
