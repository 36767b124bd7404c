//! Library components of the mailsheet CLI.

pub mod logging;
pub mod pipeline;
