//! Subcommand implementations.

pub mod keygen;
pub mod sync;
