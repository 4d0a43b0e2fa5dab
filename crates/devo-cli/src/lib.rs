//! Library side of the `devo` command-line runner.

pub mod logging;
pub mod pipeline;
pub mod types;
