//! cf-core: profile loading, batch and interactive front ends for the
//! obfuscation engine. Exposed as a library for integration testing.

pub mod audit;
pub mod batch;
pub mod cli;
pub mod clipboard;
pub mod config;
pub mod listing;
pub mod loader;
pub mod repl;
pub mod session;
pub mod style;
