//! CLI command implementations.

pub mod check;
pub mod lookup;
pub mod validate;
