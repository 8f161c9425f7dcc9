//! Chain-agnostic display and derivation logic.
//!
//! Everything in here is pure: no RPC, no I/O. The service layer feeds it
//! raw values and renders whatever comes back.

pub mod calldata;
pub mod format;
pub mod search;
pub mod units;
