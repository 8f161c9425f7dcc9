//! Thread and runtime plumbing between the TUI and the network

pub mod bridge;
pub mod worker;

pub use bridge::{RuntimeBridge, RuntimeCommand, RuntimeEvent};
pub use worker::WorkerEndpoints;
