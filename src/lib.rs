//! Multisig console: live owner preview for the wallet creation form,
//! driven from standard input.

pub mod bootstrap;
pub mod console;

pub use console::run_console;
