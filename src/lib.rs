// ABOUTME: Library root for deployprobe - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod manifest;
pub mod output;
pub mod platform;
pub mod poll;
pub mod probe;
pub mod types;
