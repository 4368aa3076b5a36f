//! Command implementations.

mod check;
mod monitor;
mod validate;

pub use check::run_check;
pub use monitor::run_monitor;
pub use validate::run_validate;
