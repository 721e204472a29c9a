//! Contract interaction: selectors, ABI words, call builders.

pub mod abi;
pub mod calls;
pub mod constants;

pub use calls::{CallRequest, EnterMarketParams, ExitMarketParams};
