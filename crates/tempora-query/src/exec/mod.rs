//! Query execution support: the execution context and the clause
//! executor that materializes triple patterns against open graphs.

pub mod context;
pub(crate) mod fetch;

pub use context::{ExecutionContext, DEFAULT_CHAN_SIZE};
