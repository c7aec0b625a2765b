//! CLI command implementations.

pub mod account;
pub mod category;
pub mod status;
pub mod sync;
pub mod txn;
