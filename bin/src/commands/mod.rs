//! CLI command implementations.

pub(crate) mod estimate;
pub(crate) mod queries;
pub(crate) mod tables;
