//! # djkr8 CLI
//!
//! Argument parsing, JSON I/O and console output for the `djkr8` binary.

pub mod cli;
pub mod io;
pub mod report;
