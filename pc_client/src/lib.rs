//! Internal modules for the product catalog client.
//!
//! This library provides command parsing, output formatting, and command
//! execution used by the pc_client binary.

pub mod commands;
pub mod logging;
pub mod output;
pub mod runner;
