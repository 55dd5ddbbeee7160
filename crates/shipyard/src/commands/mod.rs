//! Subcommands.

pub mod init;
pub mod release;
