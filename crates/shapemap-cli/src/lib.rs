//! Library side of the `shapemap` binary: logging setup, the order shapes and
//! the command implementations.

pub mod commands;
pub mod logging;
pub mod orders;
