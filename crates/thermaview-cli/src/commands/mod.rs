//! Command implementations for the thermaview CLI.

pub mod scan;
pub mod watch;
