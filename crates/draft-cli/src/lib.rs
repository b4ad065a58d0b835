//! Library side of the `drafts` CLI: logging, settings and commands.

pub mod commands;
pub mod logging;
pub mod settings;
