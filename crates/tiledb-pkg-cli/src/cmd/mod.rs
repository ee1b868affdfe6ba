//! Subcommand implementations.

pub(crate) mod matrix;
pub(crate) mod release;
pub(crate) mod verify;
