//! Verox: a terminal explorer for the Vero chain.
//!
//! Library surface for the binary and the integration tests.

pub mod app;
pub mod config;
pub mod domain;
pub mod explorer;
pub mod infrastructure;
pub mod modules;
pub mod store;
pub mod ui;
