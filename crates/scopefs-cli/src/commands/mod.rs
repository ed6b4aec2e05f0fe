//! Subcommand implementations.

pub(crate) mod call;
pub(crate) mod export;
pub(crate) mod tools;
pub(crate) mod tree;
pub(crate) mod watch;
