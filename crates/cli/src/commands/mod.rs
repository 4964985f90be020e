//! Command implementations.

mod send;
mod stress;
mod validate;

pub use send::run_send;
pub use stress::run_stress;
pub use validate::run_validate;
