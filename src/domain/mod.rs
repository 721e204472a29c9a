//! Domain modules organized as vertical slices.
//!
//! Each sub-module contains:
//! - `mod.rs` — Domain types and the pure logic over them
//! - `convert.rs` — `TryFrom` conversions from raw ledger data
//! - `state.rs` — State containers with merge/update methods
//! - `client.rs` — Sub-client reading through the client's ledger

pub mod market;
pub mod position;
pub mod price_history;
pub mod swap;
